use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// One staff member's room coverage inside a shift block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Assignment {
    pub owner_id: String,
    #[serde(default)]
    pub rooms: Vec<String>,
}

/// Which staff cover which rooms during an interval of one day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShiftBlock {
    pub id: i64,
    pub date: NaiveDate,
    #[serde(with = "crate::utils::time::hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "crate::utils::time::hhmm")]
    pub end_time: NaiveTime,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
}

impl ShiftBlock {
    /// The block's [start, end) interval; `None` for an empty or inverted block.
    pub fn window(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let start = self.date.and_time(self.start_time);
        let end = self.date.and_time(self.end_time);
        (end > start).then_some((start, end))
    }
}
