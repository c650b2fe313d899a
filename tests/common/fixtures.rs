use std::collections::HashMap;
use std::io;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};
use std::time::Duration;

use repoimport::core::{
    ImportError, PROJECT_URL_STORAGE_KEY, PersistedValue, PersistenceError, RepoUrl,
    RepositoryImporter, SimulatedImporter, SqliteStorage, StorageArea, StorageEvent,
    Subscription,
};
use tokio::sync::broadcast;

pub const TEST_URL: &str = "https://github.com/foo/bar";
pub const OTHER_URL: &str = "https://github.com/acme/widgets.git";

/// Creates a SqliteStorage backed by a file in a fresh temp directory.
/// Returns both the storage and the temp directory (which must be kept alive).
pub async fn create_test_storage() -> (SqliteStorage, tempfile::TempDir) {
    let dir = tempfile::TempDir::new().expect("Failed to create temp directory");
    let storage = SqliteStorage::open(dir.path().join("storage.db"))
        .await
        .expect("Failed to open test storage");
    (storage, dir)
}

/// Creates a project store on a fresh temporary medium.
pub async fn create_test_store() -> (PersistedValue<SqliteStorage>, tempfile::TempDir) {
    let (storage, dir) = create_test_storage().await;
    let store = PersistedValue::load(storage, PROJECT_URL_STORAGE_KEY).await;
    (store, dir)
}

/// An importer that answers immediately with a fixed outcome.
pub fn instant_importer(success_probability: f64) -> SimulatedImporter {
    SimulatedImporter::with_seed(Duration::ZERO, success_probability, 7)
}

/// Wait for the next value on a subscription, failing the test after a few
/// seconds instead of hanging.
pub async fn next_change<S: StorageArea>(subscription: &mut Subscription<S>) -> Option<String> {
    tokio::time::timeout(Duration::from_secs(5), subscription.changed())
        .await
        .expect("Timed out waiting for a storage change")
        .expect("Storage event channel closed")
}

/// Medium backed by a plain map. Unlike the SQLite pool it never waits on
/// timers, so it works under `start_paused` tokio time.
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    values: Arc<Mutex<HashMap<String, String>>>,
    events: broadcast::Sender<StorageEvent>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            values: Arc::new(Mutex::new(HashMap::new())),
            events,
        }
    }
}

impl StorageArea for MemoryStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), PersistenceError> {
        self.values.lock().unwrap().remove(key);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.events.subscribe()
    }

    fn dispatch(&self, event: StorageEvent) {
        let _ = self.events.send(event);
    }
}

/// Storage whose writes can be switched to fail, reads keep working.
#[derive(Debug, Clone)]
pub struct FlakyStorage {
    inner: SqliteStorage,
    failing: Arc<AtomicBool>,
}

impl FlakyStorage {
    pub fn new(inner: SqliteStorage) -> Self {
        Self {
            inner,
            failing: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), PersistenceError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(PersistenceError::Io {
                path: "storage.db".into(),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only medium"),
            });
        }
        Ok(())
    }
}

impl StorageArea for FlakyStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        self.inner.get_item(key).await
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.check()?;
        self.inner.set_item(key, value).await
    }

    async fn remove_item(&self, key: &str) -> Result<(), PersistenceError> {
        self.check()?;
        self.inner.remove_item(key).await
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.inner.subscribe()
    }

    fn dispatch(&self, event: StorageEvent) {
        self.inner.dispatch(event)
    }
}

/// Importer that counts how often it is called.
#[derive(Debug, Default)]
pub struct CountingImporter {
    pub calls: AtomicUsize,
    pub succeed: bool,
}

impl CountingImporter {
    pub fn succeeding() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            succeed: true,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RepositoryImporter for CountingImporter {
    async fn import_repository(&self, _url: &RepoUrl) -> Result<(), ImportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.succeed {
            Ok(())
        } else {
            Err(ImportError::Unavailable("offline".to_string()))
        }
    }
}
