use std::time::Duration;

use crate::records::PaymentStatus;

/// Mutation applied to each record of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchAction {
    SetStatus(PaymentStatus),
    SoftDelete,
    Recover,
}

/// Pacing for sequential batches.
///
/// The delay elapses between settled steps, never before the first or after
/// the last; it throttles writes against the backend and is not a
/// correctness requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchPolicy {
    pub step_delay: Duration,
}

impl BatchPolicy {
    pub fn immediate() -> Self {
        Self {
            step_delay: Duration::ZERO,
        }
    }
}

impl Default for BatchPolicy {
    fn default() -> Self {
        Self {
            step_delay: Duration::from_millis(100),
        }
    }
}

/// Aggregate tally of one batch run. Individual failures are counted here,
/// never propagated to the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchOutcome {
    pub fn record_success(&mut self) {
        self.succeeded += 1;
    }

    pub fn record_failure(&mut self) {
        self.failed += 1;
    }

    pub fn attempted(&self) -> usize {
        self.succeeded + self.failed
    }

    /// Terminal classification reported to the caller once the whole batch
    /// has settled.
    pub fn summary(&self) -> BatchSummary {
        match (self.succeeded, self.failed) {
            (0, 0) => BatchSummary::Empty,
            (_, 0) => BatchSummary::Complete,
            (0, _) => BatchSummary::Failed,
            _ => BatchSummary::Partial,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchSummary {
    /// Every target succeeded.
    Complete,
    /// Some targets succeeded, some failed.
    Partial,
    /// Every target failed.
    Failed,
    /// Nothing matched; a benign no-op, not an error.
    Empty,
}
