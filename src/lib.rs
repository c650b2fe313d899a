pub mod config;
pub mod core;
pub mod logging;

pub use config::AppConfig;
pub use core::{
    ImportError, ImportForm, PersistedValue, ProjectOverview, ProjectStore, RepoUrl,
    RepositoryImporter, Route, SimulatedImporter, SqliteStorage, StorageArea, StorageEvent,
    SubmissionState,
};

#[cfg(feature = "gui")]
pub mod gui;
