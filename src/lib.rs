#![doc(test(attr(deny(warnings))))]

//! FishLedger Core owns the purchase record lifecycle for a fish-export
//! ledger: grouped views, soft delete and recovery, and sequential batch
//! operations against a pluggable persistence backend.

pub mod core;
pub mod errors;
pub mod records;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("FishLedger Core tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
    }
}
