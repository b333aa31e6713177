//! Record store integration tests against in-memory and file databases.

use chrono::{DateTime, Utc};
use pretty_assertions::assert_eq;
use recipe_rs_config::DatabaseConfig;
use recipe_rs_protocol::RecipeAttributes;
use recipe_rs_store::{CodecError, RecordStore, SqliteRecordStore, StoreError};
use std::collections::BTreeSet;
use tempfile::tempdir;

fn pancakes() -> RecipeAttributes {
    RecipeAttributes::new(
        "Pancakes",
        vec!["flour".to_string(), "egg".to_string(), "milk".to_string()],
    )
}

/// A created record is returned unchanged by id.
#[tokio::test]
async fn create_then_get_returns_same_attributes() {
    let store = SqliteRecordStore::in_memory().expect("store");
    let inserted = store.create(&pancakes()).await.expect("create");
    assert_eq!(inserted.rows_affected, 1);

    let record = store
        .get_by_id(inserted.id)
        .await
        .expect("get")
        .expect("record exists");
    assert_eq!(record.id, inserted.id);
    assert_eq!(record.attributes, pancakes());
    assert_eq!(record.created_at, record.updated_at);
}

/// Absent fields stay absent after persistence.
#[tokio::test]
async fn sparse_attributes_round_trip_through_store() {
    let store = SqliteRecordStore::in_memory().expect("store");
    let cases = [
        RecipeAttributes::default(),
        RecipeAttributes {
            name: Some("Water".to_string()),
            ingredients: None,
        },
        RecipeAttributes {
            name: None,
            ingredients: Some(Vec::new()),
        },
    ];
    for attributes in cases {
        let inserted = store.create(&attributes).await.expect("create");
        let record = store
            .get_by_id(inserted.id)
            .await
            .expect("get")
            .expect("record");
        assert_eq!(record.attributes, attributes);
    }
}

#[tokio::test]
async fn missing_id_is_not_found_rather_than_error() {
    let store = SqliteRecordStore::in_memory().expect("store");
    let record = store.get_by_id(404).await.expect("get");
    assert!(record.is_none());
}

#[tokio::test]
async fn list_all_returns_every_record() {
    let store = SqliteRecordStore::in_memory().expect("store");
    assert!(store.list_all().await.expect("empty list").is_empty());

    let first = store.create(&pancakes()).await.expect("create");
    let second = store
        .create(&RecipeAttributes::new("Toast", vec!["bread".to_string()]))
        .await
        .expect("create");

    let ids: BTreeSet<_> = store
        .list_all()
        .await
        .expect("list")
        .into_iter()
        .map(|record| record.id)
        .collect();
    assert_eq!(ids, BTreeSet::from([first.id, second.id]));
}

#[tokio::test]
async fn scan_visits_rows_without_collecting() {
    let store = SqliteRecordStore::in_memory().expect("store");
    for _ in 0..3 {
        store.create(&pancakes()).await.expect("create");
    }
    let mut names = Vec::new();
    let count = store
        .scan(|record| {
            names.push(record.attributes.name.unwrap_or_default());
            Ok(())
        })
        .expect("scan");
    assert_eq!(count, 3);
    assert_eq!(names, vec!["Pancakes".to_string(); 3]);
}

/// Update rewrites attributes only; id and created_at are preserved.
#[tokio::test]
async fn update_replaces_attributes_and_keeps_identity() {
    let store = SqliteRecordStore::in_memory().expect("store");
    let inserted = store.create(&pancakes()).await.expect("create");
    let before = store
        .get_by_id(inserted.id)
        .await
        .expect("get")
        .expect("record");

    let replacement = RecipeAttributes {
        name: Some("Crepes".to_string()),
        ingredients: None,
    };
    let rows = store
        .update(inserted.id, &replacement)
        .await
        .expect("update");
    assert_eq!(rows, 1);

    let after = store
        .get_by_id(inserted.id)
        .await
        .expect("get")
        .expect("record");
    assert_eq!(after.id, before.id);
    assert_eq!(after.attributes, replacement);
    assert_eq!(after.created_at, before.created_at);
    assert!(after.updated_at >= before.updated_at);
}

/// A later stored updated_at is kept when the clock reads earlier.
#[tokio::test]
async fn update_never_moves_updated_at_backwards() {
    let store = SqliteRecordStore::in_memory().expect("store");
    let inserted = store.create(&pancakes()).await.expect("create");
    let future = "2999-01-01T00:00:00.000000Z";
    store
        .pool()
        .get()
        .execute(
            "UPDATE recipes SET updated_at = ?1 WHERE id = ?2",
            rusqlite::params![future, inserted.id],
        )
        .expect("raw update");

    let rows = store
        .update(inserted.id, &RecipeAttributes::new("Crepes", Vec::new()))
        .await
        .expect("update");
    assert_eq!(rows, 1);

    let record = store
        .get_by_id(inserted.id)
        .await
        .expect("get")
        .expect("record");
    let expected: DateTime<Utc> = DateTime::parse_from_rfc3339(future)
        .expect("timestamp")
        .with_timezone(&Utc);
    assert_eq!(record.updated_at, expected);
    assert_eq!(record.attributes.name.as_deref(), Some("Crepes"));
}

#[tokio::test]
async fn update_of_missing_id_affects_zero_rows() {
    let store = SqliteRecordStore::in_memory().expect("store");
    let rows = store.update(99, &pancakes()).await.expect("update");
    assert_eq!(rows, 0);
}

#[tokio::test]
async fn delete_removes_record_and_reports_count() {
    let store = SqliteRecordStore::in_memory().expect("store");
    let inserted = store.create(&pancakes()).await.expect("create");

    assert_eq!(store.delete(inserted.id).await.expect("delete"), 1);
    assert!(store.get_by_id(inserted.id).await.expect("get").is_none());
    assert_eq!(store.delete(inserted.id).await.expect("delete again"), 0);
}

/// Ids are never reused after deletion.
#[tokio::test]
async fn ids_are_not_reused() {
    let store = SqliteRecordStore::in_memory().expect("store");
    let first = store.create(&pancakes()).await.expect("create");
    store.delete(first.id).await.expect("delete");
    let second = store.create(&pancakes()).await.expect("create");
    assert!(second.id > first.id);
}

/// A non-byte attributes value surfaces as a codec type mismatch.
#[tokio::test]
async fn integer_attributes_column_is_a_type_mismatch() {
    let store = SqliteRecordStore::in_memory().expect("store");
    store
        .pool()
        .get()
        .execute(
            "INSERT INTO recipes (attributes, created_at, updated_at) VALUES (42, ?1, ?1)",
            ["2024-01-01T00:00:00.000000Z"],
        )
        .expect("raw insert");

    let err = store.list_all().await.unwrap_err();
    assert!(matches!(
        err,
        StoreError::Codec(CodecError::UnexpectedType { .. })
    ));
}

/// Corrupt JSON surfaces as a malformed payload, distinct from a type mismatch.
#[tokio::test]
async fn corrupt_attributes_payload_is_malformed() {
    let store = SqliteRecordStore::in_memory().expect("store");
    store
        .pool()
        .get()
        .execute(
            "INSERT INTO recipes (attributes, created_at, updated_at) VALUES (?1, ?2, ?2)",
            rusqlite::params![b"{not json".to_vec(), "2024-01-01T00:00:00.000000Z"],
        )
        .expect("raw insert");
    let id = store.pool().get().last_insert_rowid();

    let err = store.get_by_id(id).await.unwrap_err();
    assert!(matches!(err, StoreError::Codec(CodecError::Malformed(_))));
}

#[tokio::test]
async fn writes_fail_when_table_is_missing() {
    let config = DatabaseConfig {
        create_schema: false,
        ..DatabaseConfig::default()
    };
    let store = SqliteRecordStore::open(&config).expect("store");
    let err = store.create(&pancakes()).await.unwrap_err();
    assert!(matches!(err, StoreError::Write(_)));
    let err = store.list_all().await.unwrap_err();
    assert!(matches!(err, StoreError::Query(_)));
}

/// File databases persist across store instances and share data between pooled connections.
#[tokio::test]
async fn file_database_persists_between_opens() {
    let dir = tempdir().expect("tempdir");
    let config = DatabaseConfig {
        path: Some(dir.path().join("recipes.db").to_string_lossy().to_string()),
        pool_size: 3,
        ..DatabaseConfig::default()
    };

    let id = {
        let store = SqliteRecordStore::open(&config).expect("store");
        assert_eq!(store.pool().size(), 3);
        let inserted = store.create(&pancakes()).await.expect("create");
        // Read through the other pooled connections as well.
        for _ in 0..3 {
            let record = store.get_by_id(inserted.id).await.expect("get");
            assert!(record.is_some());
        }
        inserted.id
    };

    let reopened = SqliteRecordStore::open(&config).expect("reopen");
    let record = reopened
        .get_by_id(id)
        .await
        .expect("get")
        .expect("persisted record");
    assert_eq!(record.attributes, pancakes());
}

/// Concurrent writers on a shared store each get their own id.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_assign_distinct_ids() {
    let dir = tempdir().expect("tempdir");
    let config = DatabaseConfig {
        path: Some(dir.path().join("concurrent.db").to_string_lossy().to_string()),
        pool_size: 4,
        ..DatabaseConfig::default()
    };
    let store = SqliteRecordStore::open(&config).expect("store");

    let mut handles = Vec::new();
    for index in 0..16 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            let attributes = RecipeAttributes {
                name: Some(format!("recipe-{index}")),
                ingredients: None,
            };
            store.create(&attributes).await.expect("create").id
        }));
    }
    let mut ids = BTreeSet::new();
    for handle in handles {
        ids.insert(handle.await.expect("join"));
    }
    assert_eq!(ids.len(), 16);
    assert_eq!(store.list_all().await.expect("list").len(), 16);
}
