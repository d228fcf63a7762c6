mod common;

use std::sync::Arc;

use common::{date, salmon_and_tuna};
use fishledger_core::core::{AccountSession, BatchPolicy, PurchaseRecordStore};
use fishledger_core::records::{records_to_csv, GroupKey};
use fishledger_core::storage::JsonBackend;
use tempfile::tempdir;
use uuid::Uuid;

fn file_store(root: &std::path::Path) -> PurchaseRecordStore {
    let backend = JsonBackend::new(Some(root.to_path_buf())).expect("create json backend");
    PurchaseRecordStore::new(Arc::new(backend)).with_policy(BatchPolicy::immediate())
}

#[tokio::test]
async fn lifecycle_survives_a_store_restart() {
    let temp = tempdir().unwrap();
    let account_id = Uuid::new_v4();

    let mut store = file_store(temp.path());
    store.sign_in(AccountSession::new(account_id)).await.unwrap();
    store
        .add_many("Ocean Fresh", "John", date(2024, 1, 1), salmon_and_tuna())
        .await
        .unwrap();
    let key = GroupKey::new("Ocean Fresh", date(2024, 1, 1), "John");
    store.delete_group(&key).await.unwrap();
    drop(store);

    let mut reopened = file_store(temp.path());
    reopened
        .sign_in(AccountSession::new(account_id))
        .await
        .unwrap();
    assert!(reopened.active().is_empty());
    assert_eq!(reopened.deleted().len(), 2);

    let outcome = reopened.recover_group(&key).await.unwrap();
    assert_eq!(outcome.succeeded, 2);
    assert_eq!(reopened.active().len(), 2);
}

#[tokio::test]
async fn exported_csv_matches_the_active_set() {
    let temp = tempdir().unwrap();
    let mut store = file_store(temp.path());
    store
        .sign_in(AccountSession::new(Uuid::new_v4()))
        .await
        .unwrap();
    store
        .add_many("Ocean Fresh", "John", date(2024, 1, 1), salmon_and_tuna())
        .await
        .unwrap();

    let csv = records_to_csv(store.active());
    assert_eq!(csv.lines().count(), 3);
    assert!(csv.contains("Salmon"));
    assert!(csv.contains("1000"));
    assert!(csv.contains("300"));
}
