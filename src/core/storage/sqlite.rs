use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    str::FromStr,
    sync::{Arc, Weak},
    time::Duration,
};

use sqlx::{
    Connection, Executor, Sqlite, SqliteConnection,
    sqlite::{
        SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
    },
};
use tokio::{
    sync::{Mutex, broadcast},
    task::JoinHandle,
    time::MissedTickBehavior,
};

use super::{EVENT_CAPACITY, PersistenceError, StorageArea, StorageEvent};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Key-value medium backed by a single SQLite table.
///
/// Clones share one pool and one event channel, so every clone observes
/// every other clone's writes immediately. Writes made through a different
/// handle on the same file (another window, another process) are picked up
/// by [`SqliteStorage::watch_external`].
#[derive(Clone)]
pub struct SqliteStorage {
    inner: Arc<StorageState>,
}

struct StorageState {
    path: Option<PathBuf>,
    pool: SqlitePool,
    events: broadcast::Sender<StorageEvent>,
    /// Last committed contents as seen by this handle. Held for the whole of
    /// every write so the watcher never reports our own commits.
    snapshot: Mutex<HashMap<String, String>>,
}

impl std::fmt::Debug for SqliteStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStorage")
            .field("path", &self.inner.path)
            .field("subscribers", &self.inner.events.receiver_count())
            .finish()
    }
}

fn connect_options(path: &Path) -> SqliteConnectOptions {
    SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(BUSY_TIMEOUT)
}

async fn load_all<'e, E>(executor: E) -> Result<HashMap<String, String>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows: Vec<(String, String)> = sqlx::query_as("SELECT key, value FROM local_storage")
        .fetch_all(executor)
        .await?;
    Ok(rows.into_iter().collect())
}

async fn data_version(conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("PRAGMA data_version")
        .fetch_one(conn)
        .await
}

impl SqliteStorage {
    /// Open (or create) the storage file at `path`.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| PersistenceError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options(&path))
            .await?;
        let storage = Self::with_pool(pool, Some(path)).await?;
        tracing::debug!(path = ?storage.inner.path, "Opened local storage");
        Ok(storage)
    }

    /// A medium that lives only as long as this process. Used when the
    /// storage file cannot be opened.
    pub async fn in_memory() -> Result<Self, PersistenceError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        // The database vanishes with its last connection, so pin exactly one.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Self::with_pool(pool, None).await
    }

    async fn with_pool(pool: SqlitePool, path: Option<PathBuf>) -> Result<Self, PersistenceError> {
        sqlx::migrate!("./migrations").run(&pool).await?;
        let snapshot = load_all(&pool).await?;
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Ok(Self {
            inner: Arc::new(StorageState {
                path,
                pool,
                events,
                snapshot: Mutex::new(snapshot),
            }),
        })
    }

    /// Location of the storage file, `None` for an in-memory medium.
    pub fn path(&self) -> Option<&Path> {
        self.inner.path.as_deref()
    }

    pub fn is_persistent(&self) -> bool {
        self.inner.path.is_some()
    }

    /// Start polling the storage file for commits made by other handles and
    /// broadcast them as [`StorageEvent`]s.
    ///
    /// Must be called from within a tokio runtime. The task stops on its own
    /// once every clone of this handle has been dropped. Returns `None` for
    /// an in-memory medium, which nothing else can write to.
    pub fn watch_external(&self, interval: Duration) -> Option<JoinHandle<()>> {
        let Some(path) = self.inner.path.clone() else {
            tracing::debug!("In-memory storage has no external writers to watch");
            return None;
        };
        let state = Arc::downgrade(&self.inner);
        let interval = interval.max(MIN_POLL_INTERVAL);
        Some(tokio::spawn(poll_external_changes(state, path, interval)))
    }
}

impl StorageState {
    /// Diff the table against the snapshot and announce what changed.
    async fn sync_external(&self, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
        let mut snapshot = self.snapshot.lock().await;
        let current = load_all(&mut *conn).await?;

        let mut changed = Vec::new();
        for (key, value) in &current {
            if snapshot.get(key) != Some(value) {
                changed.push(StorageEvent::new(key.clone(), Some(value.clone())));
            }
        }
        for key in snapshot.keys() {
            if !current.contains_key(key) {
                changed.push(StorageEvent::new(key.clone(), None));
            }
        }
        *snapshot = current;
        drop(snapshot);

        for event in changed {
            tracing::debug!(key = %event.key, "Local storage changed by another writer");
            let _ = self.events.send(event);
        }
        Ok(())
    }
}

async fn poll_external_changes(state: Weak<StorageState>, path: PathBuf, interval: Duration) {
    let mut conn = match SqliteConnection::connect_with(&connect_options(&path)).await {
        Ok(conn) => conn,
        Err(error) => {
            tracing::error!(?path, %error, "Failed to open watcher connection to local storage");
            return;
        }
    };
    let mut last_version = match data_version(&mut conn).await {
        Ok(version) => version,
        Err(error) => {
            tracing::error!(?path, %error, "Failed to read local storage data version");
            return;
        }
    };

    // Catch anything committed between opening the handle and now.
    match state.upgrade() {
        Some(state) => {
            if let Err(error) = state.sync_external(&mut conn).await {
                tracing::warn!(%error, "Failed to reload local storage before watching");
            }
        }
        None => return,
    }

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let Some(state) = state.upgrade() else {
            break;
        };
        let version = match data_version(&mut conn).await {
            Ok(version) => version,
            Err(error) => {
                tracing::warn!(%error, "Failed to poll local storage data version");
                continue;
            }
        };
        if version == last_version {
            continue;
        }
        last_version = version;
        if let Err(error) = state.sync_external(&mut conn).await {
            tracing::warn!(%error, "Failed to reload local storage after external change");
        }
    }
    tracing::debug!(?path, "Local storage dropped, watcher stopping");
}

impl StorageArea for SqliteStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM local_storage WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.inner.pool)
            .await?;
        Ok(value)
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        let mut snapshot = self.inner.snapshot.lock().await;
        sqlx::query(
            r#"INSERT INTO local_storage (key, value) VALUES ($1, $2)
            ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value"#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.inner.pool)
        .await?;
        snapshot.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), PersistenceError> {
        let mut snapshot = self.inner.snapshot.lock().await;
        sqlx::query("DELETE FROM local_storage WHERE key = $1")
            .bind(key)
            .execute(&self.inner.pool)
            .await?;
        snapshot.remove(key);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.inner.events.subscribe()
    }

    fn dispatch(&self, event: StorageEvent) {
        // Err only means there are no subscribers right now.
        let _ = self.inner.events.send(event);
    }
}
