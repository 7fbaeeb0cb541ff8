use chrono::NaiveDateTime;
use serde::Serialize;

/// A contiguous stretch of an event during which one owner is responsible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnershipEntry {
    pub owner_id: String,
    pub effective_from: NaiveDateTime,
    pub effective_to: NaiveDateTime,
}

impl OwnershipEntry {
    /// Half-open containment: the owner is responsible from `effective_from`
    /// up to, but not including, `effective_to`.
    pub fn covers(&self, at: NaiveDateTime) -> bool {
        self.effective_from <= at && at < self.effective_to
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.effective_to - self.effective_from).num_minutes()
    }
}
