pub mod export;
pub mod grouping;
pub mod purchase;

pub use export::records_to_csv;
pub use grouping::{group_payment_status, group_records, GroupKey, GroupStatus};
pub use purchase::{PaymentStatus, PurchaseDraft, PurchaseEntry, PurchaseRecord, UNKNOWN_PARTY};
