use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// A scheduled room event, read from the external event store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Event {
    pub id: i64,
    pub date: NaiveDate, // ⇔ events.date (TEXT "YYYY-MM-DD")
    #[serde(default, with = "crate::utils::time::opt_hhmm")]
    pub start_time: Option<NaiveTime>, // ⇔ events.start_time (TEXT "HH:MM", nullable)
    #[serde(default, with = "crate::utils::time::opt_hhmm")]
    pub end_time: Option<NaiveTime>, // ⇔ events.end_time
    pub room_name: String, // may be a merged room, e.g. "GH 1420&30"
    #[serde(default)]
    pub event_type: String,
    #[serde(default)]
    pub requires_check: bool,
    #[serde(default)]
    pub manual_owner: Option<String>,
}

impl Event {
    /// The event's [start, end) window, or `None` when times are missing or
    /// do not describe a positive interval.
    pub fn window(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let start = self.date.and_time(self.start_time?);
        let end = self.date.and_time(self.end_time?);
        (end > start).then_some((start, end))
    }

    pub fn duration_minutes(&self) -> i64 {
        self.window()
            .map(|(s, e)| (e - s).num_minutes())
            .unwrap_or(0)
    }

    pub fn date_str(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    pub fn span_str(&self) -> String {
        let fmt = |t: Option<NaiveTime>| {
            t.map(|t| t.format("%H:%M").to_string())
                .unwrap_or_else(|| "--:--".to_string())
        };
        format!("{}-{}", fmt(self.start_time), fmt(self.end_time))
    }

    /// True when the event type is one of the configured excluded categories.
    pub fn is_excluded_type(&self, excluded: &[String]) -> bool {
        excluded
            .iter()
            .any(|t| t.eq_ignore_ascii_case(self.event_type.trim()))
    }
}
