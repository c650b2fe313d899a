use std::sync::{Arc, RwLock};

use tokio::sync::broadcast::{self, error::RecvError};

use crate::core::storage::{PersistenceError, SqliteStorage, StorageArea, StorageEvent};

/// Key under which the imported repository URL is remembered.
pub const PROJECT_URL_STORAGE_KEY: &str = "githubRepoUrl";

/// The store the application uses for the imported project.
pub type ProjectStore = PersistedValue<SqliteStorage>;

/// A single optional string kept under one key of a storage medium.
///
/// The value is cached in memory and kept in step with the medium: writes go
/// through to storage and are announced to every other observer, and
/// [`Subscription`]s apply changes announced by others. Storage failures are
/// logged and swallowed; the worst outcome is that nothing is remembered.
///
/// Cloning is cheap and every clone shares the same cache.
#[derive(Debug)]
pub struct PersistedValue<S> {
    inner: Arc<Inner<S>>,
}

#[derive(Debug)]
struct Inner<S> {
    storage: S,
    key: String,
    current: RwLock<Option<String>>,
}

impl<S> Clone for PersistedValue<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S: StorageArea> PersistedValue<S> {
    /// Create the store and read its initial value from `storage`.
    pub async fn load(storage: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let current = read_from(&storage, &key).await;
        Self {
            inner: Arc::new(Inner {
                storage,
                key,
                current: RwLock::new(current),
            }),
        }
    }

    pub fn key(&self) -> &str {
        &self.inner.key
    }

    pub fn storage(&self) -> &S {
        &self.inner.storage
    }

    /// The current value, `None` when nothing (or nothing readable) is stored.
    pub fn read(&self) -> Option<String> {
        match self.inner.current.read() {
            Ok(current) => current.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Persist `value`, or remove the key for `None`, then tell every other
    /// observer. On failure the cached value is left as it was.
    pub async fn write(&self, value: Option<String>) {
        if let Err(error) = self.try_write(value).await {
            tracing::error!(key = %self.inner.key, %error, "Error writing to local storage");
        }
    }

    pub async fn clear(&self) {
        self.write(None).await;
    }

    async fn try_write(&self, value: Option<String>) -> Result<(), PersistenceError> {
        let storage = &self.inner.storage;
        let key = self.inner.key.as_str();
        let payload = match &value {
            Some(value) => {
                let serialized = serde_json::to_string(value)?;
                storage.set_item(key, &serialized).await?;
                Some(serialized)
            }
            None => {
                storage.remove_item(key).await?;
                None
            }
        };
        self.set_cached(value);
        storage.dispatch(StorageEvent::new(key, payload));
        Ok(())
    }

    /// Re-read the value from the medium, replacing the cache.
    pub async fn refresh(&self) -> Option<String> {
        let value = read_from(&self.inner.storage, &self.inner.key).await;
        self.set_cached(value.clone());
        value
    }

    /// Apply a change notification. Returns the new value when the event
    /// concerns this store's key and `None` when it is about some other key.
    ///
    /// A payload that does not deserialize counts as removal.
    pub fn apply(&self, event: &StorageEvent) -> Option<Option<String>> {
        if event.key != self.inner.key {
            return None;
        }
        let value = match event.new_value.as_deref().map(serde_json::from_str::<String>) {
            Some(Ok(value)) => Some(value),
            Some(Err(error)) => {
                tracing::warn!(key = %event.key, %error, "Error parsing storage value");
                None
            }
            None => None,
        };
        self.set_cached(value.clone());
        Some(value)
    }

    /// Follow changes made through this or any other handle on the medium.
    pub fn subscribe(&self) -> Subscription<S> {
        Subscription {
            store: self.clone(),
            events: self.inner.storage.subscribe(),
        }
    }

    fn set_cached(&self, value: Option<String>) {
        match self.inner.current.write() {
            Ok(mut current) => *current = value,
            Err(poisoned) => *poisoned.into_inner() = value,
        }
    }
}

async fn read_from<S: StorageArea>(storage: &S, key: &str) -> Option<String> {
    match storage.get_item(key).await {
        Ok(Some(raw)) => match serde_json::from_str::<String>(&raw) {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::error!(%key, %error, "Error reading from local storage");
                None
            }
        },
        Ok(None) => None,
        Err(error) => {
            tracing::error!(%key, %error, "Error reading from local storage");
            None
        }
    }
}

/// A stream of values for one [`PersistedValue`].
pub struct Subscription<S> {
    store: PersistedValue<S>,
    events: broadcast::Receiver<StorageEvent>,
}

impl<S: StorageArea> Subscription<S> {
    /// Wait for the next change to the store's key and return the new value.
    ///
    /// Returns `None` once the medium can no longer deliver events.
    pub async fn changed(&mut self) -> Option<Option<String>> {
        loop {
            match self.events.recv().await {
                Ok(event) => {
                    if let Some(value) = self.store.apply(&event) {
                        return Some(value);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Storage subscriber lagged, reloading value");
                    return Some(self.store.refresh().await);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    pub fn store(&self) -> &PersistedValue<S> {
        &self.store
    }
}
