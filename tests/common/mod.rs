mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from repoimport for tests
pub use repoimport::core::{
    ConnectionStatus, ImportError, ImportForm, PROJECT_URL_STORAGE_KEY, PersistedValue,
    ProjectOverview, RepoUrl, RepositoryImporter, Route, SimulatedImporter, SqliteStorage, StorageArea,
    StorageEvent, SubmissionState, SubmitError, SubmitRejected, UNNAMED_PROJECT,
    ValidationError, finish_import,
};
