//! The shared key-value medium that persisted values live in.
//!
//! A medium is anything that can get, set and remove string values by key and
//! broadcast a [`StorageEvent`] whenever a value changes. Every handle that
//! observes the same medium receives the same events, which is how separate
//! windows (or processes) stay in sync.

mod sqlite;

use std::{future::Future, path::PathBuf};

use thiserror::Error;
use tokio::sync::broadcast;

pub use sqlite::SqliteStorage;

/// Capacity of the in-process event channel. Slow subscribers that fall
/// further behind than this re-read the medium instead.
pub(crate) const EVENT_CAPACITY: usize = 64;

/// A change notification for a single key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    pub key: String,
    /// The new serialized value, or `None` when the key was removed.
    pub new_value: Option<String>,
}

impl StorageEvent {
    pub fn new(key: impl Into<String>, new_value: Option<String>) -> Self {
        Self {
            key: key.into(),
            new_value,
        }
    }
}

/// Failures of the storage medium.
///
/// These never reach the user: callers log them and carry on as if nothing
/// was stored.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Local storage database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Failed to prepare local storage schema: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("Failed to serialize stored value: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Failed to prepare storage directory {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("No suitable data directory available for local storage")]
    NoDataDir,
}

pub trait StorageArea: Clone + Send + Sync + 'static {
    fn get_item(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<String>, PersistenceError>> + Send;

    fn set_item(
        &self,
        key: &str,
        value: &str,
    ) -> impl Future<Output = Result<(), PersistenceError>> + Send;

    fn remove_item(&self, key: &str) -> impl Future<Output = Result<(), PersistenceError>> + Send;

    /// Receive every event dispatched on this medium from now on.
    fn subscribe(&self) -> broadcast::Receiver<StorageEvent>;

    /// Announce a change to every subscriber of this medium.
    fn dispatch(&self, event: StorageEvent);
}
