use thiserror::Error;
use uuid::Uuid;

/// Error type raised by persistence backends.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Write rejected: {0}")]
    Rejected(String),
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Error type surfaced by the purchase record store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no account is signed in")]
    NotAuthenticated,
    #[error("no local record with id {0}")]
    NotFound(Uuid),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}
