use std::fmt;

use chrono::NaiveDate;

use super::purchase::{normalize_party, PaymentStatus, PurchaseRecord};

/// Composite key identifying one logical invoice: every line a company sold
/// to one buyer on one date belongs to the same group.
///
/// The key is a typed 3-tuple rather than the delimited string the legacy
/// exports used; the string form survives only as [`fmt::Display`] output
/// for labels and is never parsed back into fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupKey {
    pub company_name: String,
    pub purchase_date: NaiveDate,
    pub buyer_name: String,
}

impl GroupKey {
    pub fn new(
        company_name: impl Into<String>,
        purchase_date: NaiveDate,
        buyer_name: impl Into<String>,
    ) -> Self {
        Self {
            company_name: normalize_party(&company_name.into()),
            purchase_date,
            buyer_name: normalize_party(&buyer_name.into()),
        }
    }

    pub fn of(record: &PurchaseRecord) -> Self {
        Self::new(
            record.company_name.clone(),
            record.purchase_date,
            record.buyer_name.clone(),
        )
    }

    /// Exact 3-field match, applied identically to active and deleted views.
    pub fn matches(&self, record: &PurchaseRecord) -> bool {
        GroupKey::of(record) == *self
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}",
            self.company_name, self.purchase_date, self.buyer_name
        )
    }
}

/// Partitions records by group key.
///
/// Groups appear in order of first appearance in the input; within a group,
/// records keep their input order. Pure and total: key derivation never
/// fails, so neither does grouping.
pub fn group_records(records: &[PurchaseRecord]) -> Vec<(GroupKey, Vec<&PurchaseRecord>)> {
    let mut groups: Vec<(GroupKey, Vec<&PurchaseRecord>)> = Vec::new();
    for record in records {
        let key = GroupKey::of(record);
        match groups.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, members)) => members.push(record),
            None => groups.push((key, vec![record])),
        }
    }
    groups
}

/// Rollup of a group's per-record payment statuses, for display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupStatus {
    Paid,
    Unpaid,
    Pending,
    Mixed,
}

/// Derives the badge status for one group: a unanimous status wins outright,
/// a strict majority (more than half the group) wins otherwise, and anything
/// else is `Mixed`. Never touches per-record status.
pub fn group_payment_status<'a>(
    records: impl IntoIterator<Item = &'a PurchaseRecord>,
) -> GroupStatus {
    let mut paid = 0usize;
    let mut unpaid = 0usize;
    let mut pending = 0usize;
    for record in records {
        match record.payment_status {
            PaymentStatus::Paid => paid += 1,
            PaymentStatus::Unpaid => unpaid += 1,
            PaymentStatus::Pending => pending += 1,
        }
    }
    let total = paid + unpaid + pending;
    if total == 0 {
        return GroupStatus::Mixed;
    }
    let majority = |count: usize| count == total || count * 2 > total;
    if majority(paid) {
        GroupStatus::Paid
    } else if majority(unpaid) {
        GroupStatus::Unpaid
    } else if majority(pending) {
        GroupStatus::Pending
    } else {
        GroupStatus::Mixed
    }
}
