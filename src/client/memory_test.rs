use super::*;
use crate::snapshot::SaveReason;

fn seeded(id: &str, version: i64) -> Snapshot {
    Snapshot {
        id: id.to_owned(),
        version,
        created_at: version * 1000,
        reason: "interval".into(),
        snapshot: serde_json::json!({}),
    }
}

#[tokio::test]
async fn list_empty_project_returns_empty() {
    let store = MemorySnapshotStore::new();
    assert!(store.list_snapshots("nobody").await.unwrap().is_empty());
}

#[tokio::test]
async fn list_orders_most_recent_first() {
    let store = MemorySnapshotStore::new();
    store.insert("p", seeded("s1", 1));
    store.insert("p", seeded("s3", 3));
    store.insert("p", seeded("s2", 2));
    let versions: Vec<i64> = store
        .list_snapshots("p")
        .await
        .unwrap()
        .iter()
        .map(|s| s.version)
        .collect();
    assert_eq!(versions, vec![3, 2, 1]);
}

#[tokio::test]
async fn create_assigns_next_version_per_project() {
    let store = MemorySnapshotStore::new();
    store.insert("a", seeded("s1", 1));
    store.insert("a", seeded("s2", 2));

    let body = NewSnapshot::new(SaveReason::Manual, 0, serde_json::json!({"k": 1}));
    let created = store.create_snapshot("a", &body).await.unwrap();
    assert_eq!(created.version, 3);
    assert_eq!(created.reason, "manual");
    assert_eq!(created.snapshot, serde_json::json!({"k": 1}));

    let other = store.create_snapshot("b", &body).await.unwrap();
    assert_eq!(other.version, 1);
    assert_eq!(store.len("a"), 3);
    assert_eq!(store.len("b"), 1);
}

#[tokio::test]
async fn get_returns_payload_or_404() {
    let store = MemorySnapshotStore::new();
    let body = NewSnapshot::new(SaveReason::Interval, 0, serde_json::json!({"shapes": []}));
    let created = store.create_snapshot("p", &body).await.unwrap();

    let fetched = store.get_snapshot("p", &created.id).await.unwrap();
    assert_eq!(fetched, created);

    let err = store.get_snapshot("p", "missing").await.unwrap_err();
    assert!(matches!(err, StoreError::Http { status: 404, .. }));
}
