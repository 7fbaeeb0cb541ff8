//! Read models consumed by the presentation layer: the check timeline and
//! the ownership timeline of one event.

use crate::config::Config;
use crate::core::completion::lateness_minutes;
use crate::core::ownership::resolve_ownership;
use crate::core::policy::CheckPolicy;
use crate::core::schedule::generate_slots;
use crate::core::state::classify;
use crate::db::checks::load_records_for_event;
use crate::db::queries::{load_shift_blocks_by_date, require_event};
use crate::errors::AppResult;
use crate::models::check::{CheckRecord, CheckSlot, CheckState};
use crate::models::event::Event;
use crate::models::ownership::OwnershipEntry;
use chrono::NaiveDateTime;
use rusqlite::Connection;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct CheckTimelineEntry {
    pub slot: CheckSlot,
    pub state: CheckState,
    pub record: Option<CheckRecord>,
    /// Minutes past the grace period, for completed checks only.
    pub lateness_minutes: Option<i64>,
}

/// Pair each slot with its state. Records are matched by index only.
pub fn build_check_timeline(
    event: &Event,
    records: &[CheckRecord],
    now: NaiveDateTime,
    policy: &CheckPolicy,
) -> Vec<CheckTimelineEntry> {
    generate_slots(event, policy.interval_minutes)
        .into_iter()
        .map(|slot| {
            let record = records
                .iter()
                .find(|r| r.event_id == slot.event_id && r.check_index == slot.index)
                .cloned();
            let state = classify(&slot, now, record.as_ref(), policy);
            let lateness = match (&state, record.as_ref().and_then(|r| r.completed_time)) {
                (CheckState::Completed, Some(done)) => {
                    Some(lateness_minutes(&slot, done, policy))
                }
                _ => None,
            };

            CheckTimelineEntry {
                slot,
                state,
                record,
                lateness_minutes: lateness,
            }
        })
        .collect()
}

/// Checks still open at `now` (upcoming, due or overdue).
pub fn outstanding(entries: &[CheckTimelineEntry]) -> usize {
    entries.iter().filter(|e| !e.state.is_terminal()).count()
}

pub fn get_check_timeline(
    conn: &Connection,
    event_id: i64,
    now: NaiveDateTime,
    policy: &CheckPolicy,
) -> AppResult<(Event, Vec<CheckTimelineEntry>)> {
    let event = require_event(conn, event_id)?;
    let records = load_records_for_event(conn, event.id)?;
    let entries = build_check_timeline(&event, &records, now, policy);
    Ok((event, entries))
}

pub fn get_ownership_timeline(
    conn: &Connection,
    event_id: i64,
    cfg: &Config,
) -> AppResult<(Event, Vec<OwnershipEntry>)> {
    let event = require_event(conn, event_id)?;
    let blocks = load_shift_blocks_by_date(conn, &event.date)?;
    let timeline = resolve_ownership(&event, &blocks, &cfg.excluded_event_types);
    Ok((event, timeline))
}
