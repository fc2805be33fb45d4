use storage::repository::{KeyValueStore, Storage};
use storage::sqlite::SqliteStore;

#[tokio::test]
async fn sqlite_roundtrip_replaces_values() {
    let store = SqliteStore::connect("sqlite:file:memdb_kv_roundtrip?mode=memory&cache=shared")
        .await
        .expect("connect");
    store.migrate().await.expect("migrate");

    assert!(store.load("critter-arcade.trivia.progress").await.unwrap().is_none());

    store
        .save("critter-arcade.trivia.progress", br#"{"version":1}"#)
        .await
        .unwrap();
    store
        .save("critter-arcade.trivia.progress", br#"{"version":2}"#)
        .await
        .unwrap();

    let loaded = store
        .load("critter-arcade.trivia.progress")
        .await
        .expect("load")
        .expect("present");
    assert_eq!(loaded, br#"{"version":2}"#.to_vec());
}

#[tokio::test]
async fn sqlite_migrations_are_idempotent() {
    let store = SqliteStore::connect("sqlite:file:memdb_kv_migrate?mode=memory&cache=shared")
        .await
        .expect("connect");
    store.migrate().await.expect("first migrate");
    store.migrate().await.expect("second migrate");

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM schema_migrations")
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(applied, 1);
}

#[tokio::test]
async fn storage_sqlite_keeps_keys_separate() {
    let storage = Storage::sqlite("sqlite:file:memdb_kv_storage?mode=memory&cache=shared")
        .await
        .expect("storage");

    storage.kv.save("a", b"alpha").await.unwrap();
    storage.kv.save("b", b"beta").await.unwrap();

    assert_eq!(storage.kv.load("a").await.unwrap().as_deref(), Some(&b"alpha"[..]));
    assert_eq!(storage.kv.load("b").await.unwrap().as_deref(), Some(&b"beta"[..]));
}

#[tokio::test]
async fn connections_wait_on_locked_database() {
    let store = SqliteStore::connect("sqlite:file:memdb_kv_busy?mode=memory&cache=shared")
        .await
        .expect("connect");

    let timeout_ms: i64 = sqlx::query_scalar("PRAGMA busy_timeout")
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(
        u128::try_from(timeout_ms).unwrap(),
        storage::sqlite::BUSY_TIMEOUT.as_millis()
    );
}
