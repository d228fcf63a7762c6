use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Explicit login context injected into the store.
///
/// Constructed when an account signs in and dropped on sign-out; there is no
/// ambient session singleton, so every operation reads the context it was
/// given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSession {
    pub account_id: Uuid,
    pub email: Option<String>,
    pub signed_in_at: DateTime<Utc>,
}

impl AccountSession {
    pub fn new(account_id: Uuid) -> Self {
        Self {
            account_id,
            email: None,
            signed_in_at: Utc::now(),
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}
