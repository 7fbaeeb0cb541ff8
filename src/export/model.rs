// src/export/model.rs

use crate::core::ownership::owner_at;
use crate::core::timeline::CheckTimelineEntry;
use crate::models::event::Event;
use crate::models::ownership::OwnershipEntry;
use crate::utils::time::format_datetime;
use serde::Serialize;

/// One flat row of the check report, shared by CSV and JSON.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct CheckReportRow {
    pub event_id: i64,
    pub date: String,
    pub room: String,
    pub event_type: String,
    pub check_index: u32,
    pub scheduled: String,
    /// Owner responsible at the scheduled time; empty for gaps.
    pub owner: String,
    pub state: String,
    pub completed_time: String,
    pub completed_by: String,
    pub lateness_minutes: Option<i64>,
}

impl CheckReportRow {
    pub fn from_entry(event: &Event, owners: &[OwnershipEntry], entry: &CheckTimelineEntry) -> Self {
        let record = entry.record.as_ref();

        Self {
            event_id: event.id,
            date: event.date_str(),
            room: event.room_name.clone(),
            event_type: event.event_type.clone(),
            check_index: entry.slot.index,
            scheduled: format_datetime(entry.slot.scheduled_time),
            owner: owner_at(owners, entry.slot.scheduled_time)
                .unwrap_or_default()
                .to_string(),
            state: entry.state.label().to_string(),
            completed_time: record
                .and_then(|r| r.completed_time)
                .map(format_datetime)
                .unwrap_or_default(),
            completed_by: record
                .and_then(|r| r.completed_by.clone())
                .unwrap_or_default(),
            lateness_minutes: entry.lateness_minutes,
        }
    }
}
