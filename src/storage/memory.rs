use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::core::store::PersistenceBackend;
use crate::errors::PersistenceError;
use crate::records::{PaymentStatus, PurchaseDraft, PurchaseRecord};

/// In-process reference backend: account-scoped rows behind a mutex.
///
/// Assigns row ids at insert time and enforces the account-match rule on
/// every read and write, mirroring the hosted service's row-level scoping.
#[derive(Default)]
pub struct MemoryBackend {
    rows: Mutex<Vec<StoredRow>>,
}

struct StoredRow {
    account_id: Uuid,
    record: PurchaseRecord,
}

impl MemoryBackend {
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<StoredRow>>, PersistenceError> {
        self.rows
            .lock()
            .map_err(|_| PersistenceError::Unavailable("row store poisoned".into()))
    }

    fn mutate_row<F>(
        &self,
        account_id: Uuid,
        id: Uuid,
        apply: F,
    ) -> Result<PurchaseRecord, PersistenceError>
    where
        F: FnOnce(&mut PurchaseRecord),
    {
        let mut rows = self.lock()?;
        let row = rows
            .iter_mut()
            .find(|row| row.account_id == account_id && row.record.id == id)
            .ok_or_else(|| PersistenceError::Rejected(format!("no row {id} for account")))?;
        apply(&mut row.record);
        Ok(row.record.clone())
    }
}

#[async_trait]
impl PersistenceBackend for MemoryBackend {
    async fn insert(
        &self,
        account_id: Uuid,
        draft: PurchaseDraft,
    ) -> Result<PurchaseRecord, PersistenceError> {
        let record = draft.into_record(Uuid::new_v4());
        self.lock()?.push(StoredRow {
            account_id,
            record: record.clone(),
        });
        Ok(record)
    }

    async fn insert_many(
        &self,
        account_id: Uuid,
        drafts: Vec<PurchaseDraft>,
    ) -> Result<Vec<PurchaseRecord>, PersistenceError> {
        // Materialize every row before touching the store so the write is
        // all-or-nothing.
        let records: Vec<PurchaseRecord> = drafts
            .into_iter()
            .map(|draft| draft.into_record(Uuid::new_v4()))
            .collect();
        let mut rows = self.lock()?;
        rows.extend(records.iter().cloned().map(|record| StoredRow {
            account_id,
            record,
        }));
        Ok(records)
    }

    async fn update_status(
        &self,
        account_id: Uuid,
        id: Uuid,
        status: PaymentStatus,
    ) -> Result<PurchaseRecord, PersistenceError> {
        self.mutate_row(account_id, id, |record| record.payment_status = status)
    }

    async fn soft_delete(
        &self,
        account_id: Uuid,
        id: Uuid,
    ) -> Result<PurchaseRecord, PersistenceError> {
        self.mutate_row(account_id, id, |record| record.deleted_at = Some(Utc::now()))
    }

    async fn restore(
        &self,
        account_id: Uuid,
        id: Uuid,
    ) -> Result<PurchaseRecord, PersistenceError> {
        self.mutate_row(account_id, id, |record| record.deleted_at = None)
    }

    async fn fetch(
        &self,
        account_id: Uuid,
        deleted: bool,
    ) -> Result<Vec<PurchaseRecord>, PersistenceError> {
        let rows = self.lock()?;
        let mut records: Vec<PurchaseRecord> = rows
            .iter()
            .filter(|row| row.account_id == account_id && row.record.is_deleted() == deleted)
            .map(|row| row.record.clone())
            .collect();
        if deleted {
            records.sort_by(|a, b| b.deleted_at.cmp(&a.deleted_at));
        } else {
            records.sort_by(|a, b| b.purchase_date.cmp(&a.purchase_date));
        }
        Ok(records)
    }
}
