use std::collections::BTreeSet;

use storage::repository::{KeyValueStore, StoredValue};
use storage::sqlite::SqliteRepository;

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

#[tokio::test]
async fn sqlite_roundtrip_persists_every_value_kind() {
    let repo = connect("memdb_kv_roundtrip").await;
    let medals: BTreeSet<String> = ["bronze", "speedster"]
        .into_iter()
        .map(String::from)
        .collect();

    repo.set_many(&[
        ("total_score", StoredValue::Int(-30)),
        ("medals", StoredValue::StringSet(medals.clone())),
        ("sound_enabled", StoredValue::Bool(false)),
        ("completed_levels", StoredValue::Text("[0,3]".into())),
    ])
    .await
    .unwrap();

    assert_eq!(
        repo.get("total_score").await.unwrap(),
        Some(StoredValue::Int(-30))
    );
    assert_eq!(
        repo.get("medals").await.unwrap(),
        Some(StoredValue::StringSet(medals))
    );
    assert_eq!(
        repo.get("sound_enabled").await.unwrap(),
        Some(StoredValue::Bool(false))
    );
    assert_eq!(
        repo.get("completed_levels").await.unwrap(),
        Some(StoredValue::Text("[0,3]".into()))
    );
}

#[tokio::test]
async fn sqlite_set_overwrites_and_remove_deletes() {
    let repo = connect("memdb_kv_overwrite").await;

    repo.set("total_score", StoredValue::Int(100)).await.unwrap();
    repo.set("total_score", StoredValue::Int(240)).await.unwrap();
    assert_eq!(
        repo.get("total_score").await.unwrap(),
        Some(StoredValue::Int(240))
    );

    repo.remove(&["total_score", "never_written"]).await.unwrap();
    assert_eq!(repo.get("total_score").await.unwrap(), None);
    assert_eq!(
        repo.get_or("total_score", StoredValue::Int(0)).await.unwrap(),
        StoredValue::Int(0)
    );
}

#[tokio::test]
async fn sqlite_migrate_is_idempotent() {
    let repo = connect("memdb_kv_migrate_twice").await;
    repo.set("k", StoredValue::Int(1)).await.unwrap();

    repo.migrate().await.expect("second migrate");
    assert_eq!(repo.get("k").await.unwrap(), Some(StoredValue::Int(1)));
}
