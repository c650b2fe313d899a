pub mod importer;
pub mod project;
pub mod route;
pub mod storage;
pub mod store;
pub mod submission;
pub mod validation;

pub use importer::{ImportError, RepositoryImporter, SimulatedImporter};
pub use project::{ConnectionStatus, ProjectOrigin, ProjectOverview, UNNAMED_PROJECT, display_name};
pub use route::{Route, RouteError};
pub use storage::{PersistenceError, SqliteStorage, StorageArea, StorageEvent};
pub use store::{PROJECT_URL_STORAGE_KEY, PersistedValue, ProjectStore, Subscription};
pub use submission::{
    ImportForm, SubmissionState, SubmitError, SubmitRejected, finish_import,
};
pub use validation::{RepoUrl, ValidationError};
