use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::store::PersistenceBackend;
use crate::errors::PersistenceError;
use crate::records::{PaymentStatus, PurchaseDraft, PurchaseRecord};

const FILE_EXTENSION: &str = "json";
const TMP_SUFFIX: &str = "tmp";

pub const CURRENT_SCHEMA_VERSION: u8 = 1;

/// File-backed backend: one JSON document per account under a data
/// directory. Writes go through a temp file and rename so a crash never
/// leaves a half-written account file behind.
pub struct JsonBackend {
    data_dir: PathBuf,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct AccountFile {
    #[serde(default = "AccountFile::schema_version_default")]
    schema_version: u8,
    #[serde(default)]
    records: Vec<PurchaseRecord>,
}

impl AccountFile {
    fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }
}

impl JsonBackend {
    pub fn new(root: Option<PathBuf>) -> Result<Self, PersistenceError> {
        let data_dir = root.unwrap_or_else(default_data_dir);
        fs::create_dir_all(&data_dir)?;
        Ok(Self { data_dir })
    }

    pub fn new_default() -> Result<Self, PersistenceError> {
        Self::new(None)
    }

    pub fn account_path(&self, account_id: Uuid) -> PathBuf {
        self.data_dir
            .join(format!("{account_id}.{FILE_EXTENSION}"))
    }

    fn read_account(&self, account_id: Uuid) -> Result<AccountFile, PersistenceError> {
        let path = self.account_path(account_id);
        if !path.exists() {
            return Ok(AccountFile {
                schema_version: CURRENT_SCHEMA_VERSION,
                records: Vec::new(),
            });
        }
        let data = fs::read_to_string(&path)?;
        let file: AccountFile = serde_json::from_str(&data)?;
        if file.schema_version > CURRENT_SCHEMA_VERSION {
            return Err(PersistenceError::Rejected(format!(
                "account file schema v{} is newer than supported v{}",
                file.schema_version, CURRENT_SCHEMA_VERSION
            )));
        }
        Ok(file)
    }

    fn write_account(&self, account_id: Uuid, file: &AccountFile) -> Result<(), PersistenceError> {
        let path = self.account_path(account_id);
        let json = serde_json::to_string_pretty(file)?;
        write_atomic(&path, &json)
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
        let mut file = self.read_account(account_id)?;
        let record = file
            .records
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or_else(|| PersistenceError::Rejected(format!("no row {id} for account")))?;
        apply(record);
        let updated = record.clone();
        self.write_account(account_id, &file)?;
        Ok(updated)
    }
}

#[async_trait]
impl PersistenceBackend for JsonBackend {
    async fn insert(
        &self,
        account_id: Uuid,
        draft: PurchaseDraft,
    ) -> Result<PurchaseRecord, PersistenceError> {
        let mut file = self.read_account(account_id)?;
        let record = draft.into_record(Uuid::new_v4());
        file.records.push(record.clone());
        self.write_account(account_id, &file)?;
        Ok(record)
    }

    async fn insert_many(
        &self,
        account_id: Uuid,
        drafts: Vec<PurchaseDraft>,
    ) -> Result<Vec<PurchaseRecord>, PersistenceError> {
        let mut file = self.read_account(account_id)?;
        let records: Vec<PurchaseRecord> = drafts
            .into_iter()
            .map(|draft| draft.into_record(Uuid::new_v4()))
            .collect();
        file.records.extend(records.iter().cloned());
        // One write for the whole batch keeps the insert all-or-nothing.
        self.write_account(account_id, &file)?;
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
        let file = self.read_account(account_id)?;
        let mut records: Vec<PurchaseRecord> = file
            .records
            .into_iter()
            .filter(|record| record.is_deleted() == deleted)
            .collect();
        if deleted {
            records.sort_by(|a, b| b.deleted_at.cmp(&a.deleted_at));
        } else {
            records.sort_by(|a, b| b.purchase_date.cmp(&a.purchase_date));
        }
        Ok(records)
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("fishledger")
}

fn write_atomic(path: &Path, contents: &str) -> Result<(), PersistenceError> {
    let tmp = path.with_extension(format!("{FILE_EXTENSION}.{TMP_SUFFIX}"));
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn draft(fish: &str) -> PurchaseDraft {
        PurchaseDraft::new(
            "Ocean Fresh",
            "John",
            fish,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            1.0,
            1.0,
            1.0,
        )
    }

    #[tokio::test]
    async fn rows_survive_a_backend_restart() {
        let temp = tempdir().unwrap();
        let account = Uuid::new_v4();

        let backend = JsonBackend::new(Some(temp.path().to_path_buf())).unwrap();
        let record = backend.insert(account, draft("Salmon")).await.unwrap();
        drop(backend);

        let reopened = JsonBackend::new(Some(temp.path().to_path_buf())).unwrap();
        let rows = reopened.fetch(account, false).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, record.id);
    }

    #[tokio::test]
    async fn rejects_future_schema_versions() {
        let temp = tempdir().unwrap();
        let account = Uuid::new_v4();
        let backend = JsonBackend::new(Some(temp.path().to_path_buf())).unwrap();

        let payload = format!(
            "{{\"schema_version\": {}, \"records\": []}}",
            CURRENT_SCHEMA_VERSION + 5
        );
        fs::write(backend.account_path(account), payload).unwrap();

        let err = backend.fetch(account, false).await.unwrap_err();
        match err {
            PersistenceError::Rejected(message) => {
                assert!(message.contains("newer"), "unexpected error: {message}");
            }
            other => panic!("expected rejected error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn writes_replace_the_file_atomically() {
        let temp = tempdir().unwrap();
        let account = Uuid::new_v4();
        let backend = JsonBackend::new(Some(temp.path().to_path_buf())).unwrap();

        backend.insert(account, draft("Salmon")).await.unwrap();
        backend.insert(account, draft("Tuna")).await.unwrap();

        let path = backend.account_path(account);
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());

        let file: AccountFile =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(file.schema_version, CURRENT_SCHEMA_VERSION);
        assert_eq!(file.records.len(), 2);
    }
}
