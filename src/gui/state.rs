use std::{sync::Arc, time::Duration};

use crate::core::{ProjectStore, Route, SimulatedImporter};

/// Services and navigation shared by every screen.
#[derive(Debug)]
pub struct AppState<I = SimulatedImporter> {
    pub store: ProjectStore,
    pub importer: Arc<I>,
    pub route: Route,
    pub default_repo_url: String,
    pub confirmation_delay: Duration,
}

impl<I> Clone for AppState<I> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            importer: Arc::clone(&self.importer),
            route: self.route.clone(),
            default_repo_url: self.default_repo_url.clone(),
            confirmation_delay: self.confirmation_delay,
        }
    }
}
