use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;

/// A derived check obligation. Never persisted; recomputed from the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CheckSlot {
    pub event_id: i64,
    pub index: u32, // 1-based
    pub scheduled_time: NaiveDateTime,
}

/// Persisted status of a check record (`check_records.status`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pending,
    Completed,
    Missed,
}

impl CheckStatus {
    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            CheckStatus::Pending => "pending",
            CheckStatus::Completed => "completed",
            CheckStatus::Missed => "missed",
        }
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(CheckStatus::Pending),
            "completed" => Some(CheckStatus::Completed),
            "missed" => Some(CheckStatus::Missed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, CheckStatus::Pending)
    }
}

/// Row of `check_records`, keyed by (event_id, check_index).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckRecord {
    pub event_id: i64,
    pub check_index: u32,
    pub status: CheckStatus,
    pub completed_time: Option<NaiveDateTime>,
    pub completed_by: Option<String>,
    pub updated_at: String,
}

/// Lifecycle state of one obligation at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckState {
    Upcoming,
    Due,
    Overdue,
    Missed,
    Completed,
}

impl CheckState {
    /// Due and Overdue checks can still be completed and trigger reminders.
    pub fn is_actionable(&self) -> bool {
        matches!(self, CheckState::Due | CheckState::Overdue)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, CheckState::Missed | CheckState::Completed)
    }

    pub fn label(&self) -> &'static str {
        match self {
            CheckState::Upcoming => "upcoming",
            CheckState::Due => "due",
            CheckState::Overdue => "overdue",
            CheckState::Missed => "missed",
            CheckState::Completed => "completed",
        }
    }
}

impl fmt::Display for CheckState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
