use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{info, warn};
use uuid::Uuid;

use crate::core::batch::{BatchAction, BatchOutcome, BatchPolicy};
use crate::core::session::AccountSession;
use crate::errors::{PersistenceError, StoreError, StoreResult};
use crate::records::{GroupKey, PaymentStatus, PurchaseDraft, PurchaseEntry, PurchaseRecord};

/// Trait that abstracts the remote persistence service.
///
/// Each call is an independent durable write or read scoped to one account;
/// no consistency across separate calls is assumed. A row belonging to a
/// different account is invisible to every method.
#[async_trait]
pub trait PersistenceBackend: Send + Sync {
    async fn insert(
        &self,
        account_id: Uuid,
        draft: PurchaseDraft,
    ) -> Result<PurchaseRecord, PersistenceError>;

    /// Single batched insert; all rows are written or none are.
    async fn insert_many(
        &self,
        account_id: Uuid,
        drafts: Vec<PurchaseDraft>,
    ) -> Result<Vec<PurchaseRecord>, PersistenceError>;

    async fn update_status(
        &self,
        account_id: Uuid,
        id: Uuid,
        status: PaymentStatus,
    ) -> Result<PurchaseRecord, PersistenceError>;

    /// Stamps `deleted_at` on the row.
    async fn soft_delete(
        &self,
        account_id: Uuid,
        id: Uuid,
    ) -> Result<PurchaseRecord, PersistenceError>;

    /// Clears `deleted_at` on the row.
    async fn restore(
        &self,
        account_id: Uuid,
        id: Uuid,
    ) -> Result<PurchaseRecord, PersistenceError>;

    /// Fetches one side of the soft-delete split: active rows date-desc,
    /// deleted rows deleted-at-desc.
    async fn fetch(
        &self,
        account_id: Uuid,
        deleted: bool,
    ) -> Result<Vec<PurchaseRecord>, PersistenceError>;
}

/// Facade that owns the active and deleted purchase sets for one account.
///
/// Every durable write goes through the backend first; local state is only
/// reconciled after the backend confirms, so a failed call leaves both sets
/// untouched. A record lives in exactly one of the two sets at any time.
pub struct PurchaseRecordStore {
    backend: Arc<dyn PersistenceBackend>,
    session: Option<AccountSession>,
    active: Vec<PurchaseRecord>,
    deleted: Vec<PurchaseRecord>,
    policy: BatchPolicy,
}

impl PurchaseRecordStore {
    pub fn new(backend: Arc<dyn PersistenceBackend>) -> Self {
        Self {
            backend,
            session: None,
            active: Vec::new(),
            deleted: Vec::new(),
            policy: BatchPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: BatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn session(&self) -> Option<&AccountSession> {
        self.session.as_ref()
    }

    pub fn active(&self) -> &[PurchaseRecord] {
        &self.active
    }

    pub fn deleted(&self) -> &[PurchaseRecord] {
        &self.deleted
    }

    /// Installs the login context and loads both sets from the backend.
    pub async fn sign_in(&mut self, session: AccountSession) -> StoreResult<()> {
        info!(account = %session.account_id, "signing in");
        self.session = Some(session);
        if let Err(err) = self.refresh().await {
            self.session = None;
            return Err(err);
        }
        Ok(())
    }

    /// Tears down the session and clears the in-memory sets.
    pub fn sign_out(&mut self) {
        if let Some(session) = self.session.take() {
            info!(account = %session.account_id, "signing out");
        }
        self.active.clear();
        self.deleted.clear();
    }

    fn require_session(&self) -> StoreResult<&AccountSession> {
        self.session.as_ref().ok_or(StoreError::NotAuthenticated)
    }

    /// Reloads both sets from the backend.
    pub async fn refresh(&mut self) -> StoreResult<()> {
        let account_id = self.require_session()?.account_id;
        let active = self.backend.fetch(account_id, false).await?;
        let deleted = self.backend.fetch(account_id, true).await?;
        self.active = active;
        self.deleted = deleted;
        self.sort_active();
        self.sort_deleted();
        Ok(())
    }

    /// Creates one purchase line. No optimistic insert: the record enters the
    /// active set only once the backend returns the canonical row.
    pub async fn add(&mut self, draft: PurchaseDraft) -> StoreResult<PurchaseRecord> {
        let account_id = self.require_session()?.account_id;
        let record = self
            .backend
            .insert(account_id, draft.normalized())
            .await?;
        self.active.push(record.clone());
        self.sort_active();
        info!(id = %record.id, group = %GroupKey::of(&record), "purchase added");
        Ok(record)
    }

    /// Creates N lines sharing company, buyer, and date in one batched
    /// insert; all-or-nothing at the backend call boundary.
    pub async fn add_many(
        &mut self,
        company_name: &str,
        buyer_name: &str,
        purchase_date: NaiveDate,
        entries: Vec<PurchaseEntry>,
    ) -> StoreResult<Vec<PurchaseRecord>> {
        let account_id = self.require_session()?.account_id;
        let drafts: Vec<PurchaseDraft> = entries
            .into_iter()
            .map(|entry| {
                entry
                    .into_draft(company_name, buyer_name, purchase_date)
                    .normalized()
            })
            .collect();
        let records = self.backend.insert_many(account_id, drafts).await?;
        info!(count = records.len(), "purchases added");
        self.active.extend(records.iter().cloned());
        self.sort_active();
        Ok(records)
    }

    /// Changes one record's payment status.
    pub async fn update_status(
        &mut self,
        id: Uuid,
        status: PaymentStatus,
    ) -> StoreResult<PurchaseRecord> {
        let account_id = self.require_session()?.account_id;
        if !self.contains(id) {
            return Err(StoreError::NotFound(id));
        }
        let record = self.backend.update_status(account_id, id, status).await?;
        self.patch_everywhere(&record);
        Ok(record)
    }

    /// Moves one record from the active to the deleted set.
    pub async fn soft_delete(&mut self, id: Uuid) -> StoreResult<PurchaseRecord> {
        let account_id = self.require_session()?.account_id;
        let position = self
            .active
            .iter()
            .position(|record| record.id == id)
            .ok_or(StoreError::NotFound(id))?;
        let record = self.backend.soft_delete(account_id, id).await?;
        self.active.remove(position);
        self.deleted.push(record.clone());
        self.sort_deleted();
        Ok(record)
    }

    /// Moves one record from the deleted set back to the active set.
    /// Recovering an id that is not in the deleted set is a [`StoreError::NotFound`],
    /// raised before any backend call.
    pub async fn recover(&mut self, id: Uuid) -> StoreResult<PurchaseRecord> {
        let account_id = self.require_session()?.account_id;
        let position = self
            .deleted
            .iter()
            .position(|record| record.id == id)
            .ok_or(StoreError::NotFound(id))?;
        let record = self.backend.restore(account_id, id).await?;
        self.deleted.remove(position);
        self.active.push(record.clone());
        self.sort_active();
        Ok(record)
    }

    /// Applies one action to each target in order, one at a time.
    ///
    /// Step N+1 starts only after step N has settled, with the policy's
    /// delay between settled steps. Failures are tallied and logged, never
    /// propagated, and never abort the batch; each success patches local
    /// state immediately at that step.
    pub async fn run_batch(&mut self, ids: &[Uuid], action: BatchAction) -> StoreResult<BatchOutcome> {
        self.require_session()?;
        let mut outcome = BatchOutcome::default();
        for (index, id) in ids.iter().copied().enumerate() {
            if index > 0 && !self.policy.step_delay.is_zero() {
                tokio::time::sleep(self.policy.step_delay).await;
            }
            let step = match action {
                BatchAction::SetStatus(status) => {
                    self.update_status(id, status).await.map(|_| ())
                }
                BatchAction::SoftDelete => self.soft_delete(id).await.map(|_| ()),
                BatchAction::Recover => self.recover(id).await.map(|_| ()),
            };
            match step {
                Ok(()) => outcome.record_success(),
                Err(err) => {
                    warn!(%id, error = %err, "batch step failed");
                    outcome.record_failure();
                }
            }
        }
        info!(
            succeeded = outcome.succeeded,
            failed = outcome.failed,
            summary = ?outcome.summary(),
            "batch settled"
        );
        Ok(outcome)
    }

    /// Soft-deletes every active record in the group. Zero matches is a
    /// benign empty outcome, not an error.
    pub async fn delete_group(&mut self, key: &GroupKey) -> StoreResult<BatchOutcome> {
        self.require_session()?;
        let ids = collect_ids(&self.active, key);
        if ids.is_empty() {
            info!(group = %key, "no active records in group");
            return Ok(BatchOutcome::default());
        }
        self.run_batch(&ids, BatchAction::SoftDelete).await
    }

    /// Recovers every deleted record in the group; symmetric to
    /// [`Self::delete_group`] and idempotent, since a second call finds
    /// nothing left to recover.
    pub async fn recover_group(&mut self, key: &GroupKey) -> StoreResult<BatchOutcome> {
        self.require_session()?;
        let ids = collect_ids(&self.deleted, key);
        if ids.is_empty() {
            info!(group = %key, "no deleted records in group");
            return Ok(BatchOutcome::default());
        }
        self.run_batch(&ids, BatchAction::Recover).await
    }

    /// Batch payment-status change over the group's active records.
    pub async fn set_group_status(
        &mut self,
        key: &GroupKey,
        status: PaymentStatus,
    ) -> StoreResult<BatchOutcome> {
        self.require_session()?;
        let ids = collect_ids(&self.active, key);
        if ids.is_empty() {
            info!(group = %key, "no active records in group");
            return Ok(BatchOutcome::default());
        }
        self.run_batch(&ids, BatchAction::SetStatus(status)).await
    }

    fn contains(&self, id: Uuid) -> bool {
        self.active.iter().any(|record| record.id == id)
            || self.deleted.iter().any(|record| record.id == id)
    }

    /// Rewrites the record wherever the id matches. A record should only
    /// ever live in one list, but the patch covers both.
    fn patch_everywhere(&mut self, record: &PurchaseRecord) {
        for slot in self.active.iter_mut().filter(|slot| slot.id == record.id) {
            *slot = record.clone();
        }
        for slot in self.deleted.iter_mut().filter(|slot| slot.id == record.id) {
            *slot = record.clone();
        }
    }

    fn sort_active(&mut self) {
        self.active
            .sort_by(|a, b| b.purchase_date.cmp(&a.purchase_date));
    }

    fn sort_deleted(&mut self) {
        self.deleted.sort_by(|a, b| b.deleted_at.cmp(&a.deleted_at));
    }
}

fn collect_ids(records: &[PurchaseRecord], key: &GroupKey) -> Vec<Uuid> {
    records
        .iter()
        .filter(|record| key.matches(record))
        .map(|record| record.id)
        .collect()
}
