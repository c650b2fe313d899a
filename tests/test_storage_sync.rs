//! Tests for change notifications between separate handles on one storage
//! file, the way two running instances of the app share a project.

mod common;

use std::time::Duration;

use common::*;

const POLL: Duration = Duration::from_millis(20);

async fn open_pair() -> anyhow::Result<(
    PersistedValue<SqliteStorage>,
    PersistedValue<SqliteStorage>,
    tempfile::TempDir,
)> {
    let dir = tempfile::TempDir::new()?;
    let path = dir.path().join("storage.db");
    let a = SqliteStorage::open(&path).await?;
    let b = SqliteStorage::open(&path).await?;
    let a = PersistedValue::load(a, PROJECT_URL_STORAGE_KEY).await;
    let b = PersistedValue::load(b, PROJECT_URL_STORAGE_KEY).await;
    Ok((a, b, dir))
}

#[tokio::test]
async fn test_write_in_one_handle_reaches_the_other() -> anyhow::Result<()> {
    let (a, b, _dir) = open_pair().await?;
    let _watcher = b.storage().watch_external(POLL);
    let mut changes = b.subscribe();

    a.write(Some(TEST_URL.to_string())).await;

    assert_eq!(next_change(&mut changes).await.as_deref(), Some(TEST_URL));
    assert_eq!(b.read().as_deref(), Some(TEST_URL));

    Ok(())
}

#[tokio::test]
async fn test_clear_in_one_handle_reaches_the_other() -> anyhow::Result<()> {
    let (a, b, _dir) = open_pair().await?;
    let _watcher = b.storage().watch_external(POLL);
    let mut changes = b.subscribe();

    a.write(Some(OTHER_URL.to_string())).await;
    assert_eq!(next_change(&mut changes).await.as_deref(), Some(OTHER_URL));

    a.clear().await;

    assert_eq!(next_change(&mut changes).await, None);
    assert_eq!(b.read(), None);

    Ok(())
}

#[tokio::test]
async fn test_own_writes_are_not_echoed() -> anyhow::Result<()> {
    let (_a, b, _dir) = open_pair().await?;
    let _watcher = b.storage().watch_external(POLL);
    let mut changes = b.subscribe();

    b.write(Some(TEST_URL.to_string())).await;
    assert_eq!(next_change(&mut changes).await.as_deref(), Some(TEST_URL));

    // Give the watcher several polls to notice the commit.
    let echo = tokio::time::timeout(Duration::from_millis(200), changes.changed()).await;
    assert!(echo.is_err(), "unexpected second notification: {echo:?}");

    Ok(())
}

#[tokio::test]
async fn test_in_memory_storage_has_no_watcher() -> anyhow::Result<()> {
    let storage = SqliteStorage::in_memory().await?;
    assert!(!storage.is_persistent());
    assert!(storage.watch_external(POLL).is_none());

    let store = PersistedValue::load(storage, PROJECT_URL_STORAGE_KEY).await;
    store.write(Some(TEST_URL.to_string())).await;
    assert_eq!(store.refresh().await.as_deref(), Some(TEST_URL));

    Ok(())
}
