use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Placeholder used when a seller or buyer name is missing at the write boundary.
pub const UNKNOWN_PARTY: &str = "Unknown";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    #[default]
    Unpaid,
    Pending,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "paid",
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::Pending => "pending",
        }
    }
}

/// One purchase line as persisted by the backend.
///
/// `total_price` is derived from the three line-item numerics and is
/// recomputed on every write that touches them; it is never set directly.
/// `deleted_at` is present exactly while the record sits in the deleted set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PurchaseRecord {
    pub id: Uuid,
    pub company_name: String,
    pub buyer_name: String,
    pub fish_name: String,
    pub purchase_date: NaiveDate,
    pub size_kg: f64,
    pub quantity: f64,
    pub price_per_unit: f64,
    pub total_price: f64,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl PurchaseRecord {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Rewrites the line-item numerics, keeping `total_price` in sync.
    pub fn set_line_item(&mut self, size_kg: f64, quantity: f64, price_per_unit: f64) {
        self.size_kg = size_kg;
        self.quantity = quantity;
        self.price_per_unit = price_per_unit;
        self.total_price = line_total(size_kg, quantity, price_per_unit);
    }
}

/// Caller-supplied input for a new purchase line.
///
/// Default-fill happens here, once, instead of at every call site: blank
/// company or buyer names become [`UNKNOWN_PARTY`] and the payment status
/// defaults to `unpaid`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseDraft {
    pub company_name: String,
    pub buyer_name: String,
    pub fish_name: String,
    pub purchase_date: NaiveDate,
    pub size_kg: f64,
    pub quantity: f64,
    pub price_per_unit: f64,
    #[serde(default)]
    pub payment_status: PaymentStatus,
}

impl PurchaseDraft {
    pub fn new(
        company_name: impl Into<String>,
        buyer_name: impl Into<String>,
        fish_name: impl Into<String>,
        purchase_date: NaiveDate,
        size_kg: f64,
        quantity: f64,
        price_per_unit: f64,
    ) -> Self {
        Self {
            company_name: company_name.into(),
            buyer_name: buyer_name.into(),
            fish_name: fish_name.into(),
            purchase_date,
            size_kg,
            quantity,
            price_per_unit,
            payment_status: PaymentStatus::default(),
        }
    }

    pub fn with_status(mut self, status: PaymentStatus) -> Self {
        self.payment_status = status;
        self
    }

    pub fn total_price(&self) -> f64 {
        line_total(self.size_kg, self.quantity, self.price_per_unit)
    }

    /// Applies the write-boundary default-fill rules.
    pub fn normalized(mut self) -> Self {
        self.company_name = normalize_party(&self.company_name);
        self.buyer_name = normalize_party(&self.buyer_name);
        self
    }

    /// Materializes the canonical record once the backend has assigned an id.
    pub fn into_record(self, id: Uuid) -> PurchaseRecord {
        let total_price = self.total_price();
        PurchaseRecord {
            id,
            company_name: self.company_name,
            buyer_name: self.buyer_name,
            fish_name: self.fish_name,
            purchase_date: self.purchase_date,
            size_kg: self.size_kg,
            quantity: self.quantity,
            price_per_unit: self.price_per_unit,
            total_price,
            payment_status: self.payment_status,
            deleted_at: None,
        }
    }
}

/// One line item of a multi-line purchase sharing company, buyer, and date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseEntry {
    pub fish_name: String,
    pub size_kg: f64,
    pub quantity: f64,
    pub price_per_unit: f64,
    #[serde(default)]
    pub payment_status: PaymentStatus,
}

impl PurchaseEntry {
    pub fn new(
        fish_name: impl Into<String>,
        size_kg: f64,
        quantity: f64,
        price_per_unit: f64,
    ) -> Self {
        Self {
            fish_name: fish_name.into(),
            size_kg,
            quantity,
            price_per_unit,
            payment_status: PaymentStatus::default(),
        }
    }

    pub fn into_draft(
        self,
        company_name: &str,
        buyer_name: &str,
        purchase_date: NaiveDate,
    ) -> PurchaseDraft {
        PurchaseDraft {
            company_name: company_name.to_string(),
            buyer_name: buyer_name.to_string(),
            fish_name: self.fish_name,
            purchase_date,
            size_kg: self.size_kg,
            quantity: self.quantity,
            price_per_unit: self.price_per_unit,
            payment_status: self.payment_status,
        }
    }
}

pub(crate) fn normalize_party(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        UNKNOWN_PARTY.to_string()
    } else {
        trimmed.to_string()
    }
}

fn line_total(size_kg: f64, quantity: f64, price_per_unit: f64) -> f64 {
    size_kg * quantity * price_per_unit
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn draft_computes_total_from_line_items() {
        let draft = PurchaseDraft::new("Ocean Fresh", "John", "Salmon", date(2024, 1, 1), 5.0, 10.0, 20.0);
        assert_eq!(draft.total_price(), 1000.0);

        let record = draft.into_record(Uuid::new_v4());
        assert_eq!(record.total_price, 1000.0);
        assert!(record.deleted_at.is_none());
    }

    #[test]
    fn set_line_item_keeps_total_in_sync() {
        let draft = PurchaseDraft::new("Ocean Fresh", "John", "Tuna", date(2024, 1, 1), 2.0, 5.0, 30.0);
        let mut record = draft.into_record(Uuid::new_v4());
        assert_eq!(record.total_price, 300.0);

        record.set_line_item(3.0, 4.0, 10.0);
        assert_eq!(record.total_price, 120.0);
    }

    #[test]
    fn normalization_fills_blank_parties() {
        let draft =
            PurchaseDraft::new("  ", "", "Cod", date(2024, 3, 5), 1.0, 1.0, 1.0).normalized();
        assert_eq!(draft.company_name, UNKNOWN_PARTY);
        assert_eq!(draft.buyer_name, UNKNOWN_PARTY);
    }

    #[test]
    fn payment_status_defaults_to_unpaid() {
        let draft = PurchaseDraft::new("A", "B", "C", date(2024, 1, 1), 1.0, 1.0, 1.0);
        assert_eq!(draft.payment_status, PaymentStatus::Unpaid);

        let parsed: PaymentStatus = serde_json::from_str("\"pending\"").unwrap();
        assert_eq!(parsed, PaymentStatus::Pending);
        assert_eq!(serde_json::to_string(&PaymentStatus::Paid).unwrap(), "\"paid\"");
    }
}
