#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use fishledger_core::core::store::PersistenceBackend;
use fishledger_core::core::{AccountSession, BatchPolicy, PurchaseRecordStore};
use fishledger_core::errors::PersistenceError;
use fishledger_core::records::{PaymentStatus, PurchaseDraft, PurchaseEntry, PurchaseRecord};
use fishledger_core::storage::MemoryBackend;

/// Creates a signed-in store over the given backend with no batch throttle.
pub async fn signed_in_store(backend: Arc<dyn PersistenceBackend>) -> (PurchaseRecordStore, Uuid) {
    let account_id = Uuid::new_v4();
    let mut store = PurchaseRecordStore::new(backend).with_policy(BatchPolicy::immediate());
    store
        .sign_in(AccountSession::new(account_id))
        .await
        .expect("sign in");
    (store, account_id)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn salmon_and_tuna() -> Vec<PurchaseEntry> {
    vec![
        PurchaseEntry::new("Salmon", 5.0, 10.0, 20.0),
        PurchaseEntry::new("Tuna", 2.0, 5.0, 30.0),
    ]
}

/// Backend wrapper that rejects writes for a configured set of row ids,
/// for exercising best-effort batches.
pub struct FlakyBackend {
    inner: MemoryBackend,
    failing: Mutex<HashSet<Uuid>>,
}

impl FlakyBackend {
    pub fn new() -> Self {
        Self {
            inner: MemoryBackend::default(),
            failing: Mutex::new(HashSet::new()),
        }
    }

    pub fn fail_writes_for(&self, id: Uuid) {
        self.failing.lock().unwrap().insert(id);
    }

    fn check(&self, id: Uuid) -> Result<(), PersistenceError> {
        if self.failing.lock().unwrap().contains(&id) {
            Err(PersistenceError::Unavailable(format!(
                "injected failure for row {id}"
            )))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl PersistenceBackend for FlakyBackend {
    async fn insert(
        &self,
        account_id: Uuid,
        draft: PurchaseDraft,
    ) -> Result<PurchaseRecord, PersistenceError> {
        self.inner.insert(account_id, draft).await
    }

    async fn insert_many(
        &self,
        account_id: Uuid,
        drafts: Vec<PurchaseDraft>,
    ) -> Result<Vec<PurchaseRecord>, PersistenceError> {
        self.inner.insert_many(account_id, drafts).await
    }

    async fn update_status(
        &self,
        account_id: Uuid,
        id: Uuid,
        status: PaymentStatus,
    ) -> Result<PurchaseRecord, PersistenceError> {
        self.check(id)?;
        self.inner.update_status(account_id, id, status).await
    }

    async fn soft_delete(
        &self,
        account_id: Uuid,
        id: Uuid,
    ) -> Result<PurchaseRecord, PersistenceError> {
        self.check(id)?;
        self.inner.soft_delete(account_id, id).await
    }

    async fn restore(
        &self,
        account_id: Uuid,
        id: Uuid,
    ) -> Result<PurchaseRecord, PersistenceError> {
        self.check(id)?;
        self.inner.restore(account_id, id).await
    }

    async fn fetch(
        &self,
        account_id: Uuid,
        deleted: bool,
    ) -> Result<Vec<PurchaseRecord>, PersistenceError> {
        self.inner.fetch(account_id, deleted).await
    }
}
