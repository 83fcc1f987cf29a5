use gemba_core::application::ports::PendingStore;
use gemba_core::domain::entities::PendingRecordDraft;
use gemba_core::domain::value_objects::{NaturalKey, RecordCategory, RecordPayload, TourId};
use gemba_core::infrastructure::storage::SqlitePendingStore;
use serde_json::json;
use sqlx::sqlite::SqlitePoolOptions;

async fn open_store(path: &str) -> SqlitePendingStore {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&format!("sqlite://{path}?mode=rwc"))
        .await
        .unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();
    SqlitePendingStore::new(pool, 30)
}

#[tokio::test]
async fn queue_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("gemba.db");
    let db_path = db_path.to_str().unwrap();

    {
        let store = open_store(db_path).await;
        store
            .upsert_pending_record(PendingRecordDraft::new(
                TourId::new("t-1".into()).unwrap(),
                RecordCategory::ChecklistObservation,
                NaturalKey::criterion("c-1"),
                RecordPayload::new(json!({"status": "Approved"})).unwrap(),
            ))
            .await
            .unwrap();
    }

    // A fresh pool over the same file sees the queued record.
    let reopened = open_store(db_path).await;
    let backlogs = reopened.list_pending_for_sync().await.unwrap();
    assert_eq!(backlogs.len(), 1);
    assert_eq!(backlogs[0].tour_id.as_str(), "t-1");
    assert_eq!(
        backlogs[0].records[0].payload.as_json()["status"],
        json!("Approved")
    );
}
