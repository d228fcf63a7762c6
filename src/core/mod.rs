pub mod batch;
pub mod session;
pub mod store;

pub use batch::{BatchAction, BatchOutcome, BatchPolicy, BatchSummary};
pub use session::AccountSession;
pub use store::{PersistenceBackend, PurchaseRecordStore};
