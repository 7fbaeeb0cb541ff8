//! Completion service: an owner confirms a check exactly once.

use crate::config::Config;
use crate::core::ownership::{is_owner_at, resolve_ownership};
use crate::core::policy::CheckPolicy;
use crate::core::schedule::slot_at;
use crate::core::state::classify;
use crate::db::checks::{load_record, try_complete};
use crate::db::log::ttlog_quiet;
use crate::db::queries::{load_shift_blocks_by_date, require_event};
use crate::errors::{AppError, AppResult};
use crate::models::check::{CheckRecord, CheckSlot, CheckState, CheckStatus};
use crate::utils::formatting::lateness_label;
use crate::utils::time::format_datetime;
use chrono::NaiveDateTime;
use rusqlite::Connection;
use tracing::{debug, info};

/// Outcome of a successful completion request.
#[derive(Debug, Clone)]
pub struct CompletionReceipt {
    pub slot: CheckSlot,
    pub record: CheckRecord,
    /// `false` when the check was already completed (retry or lost race).
    pub newly_completed: bool,
    pub lateness_minutes: i64,
}

impl CompletionReceipt {
    pub fn lateness(&self) -> String {
        lateness_label(self.lateness_minutes)
    }
}

/// Minutes past the grace period at completion time, never negative.
pub fn lateness_minutes(slot: &CheckSlot, completed_time: NaiveDateTime, policy: &CheckPolicy) -> i64 {
    let late = (completed_time - slot.scheduled_time) - policy.grace();
    late.num_minutes().max(0)
}

fn receipt(slot: CheckSlot, record: CheckRecord, newly: bool, policy: &CheckPolicy) -> CompletionReceipt {
    let lateness = record
        .completed_time
        .map(|t| lateness_minutes(&slot, t, policy))
        .unwrap_or(0);

    CompletionReceipt {
        slot,
        record,
        newly_completed: newly,
        lateness_minutes: lateness,
    }
}

fn conflict(event_id: i64, check_index: u32, reason: &str) -> AppError {
    AppError::Conflict {
        event_id,
        check_index,
        reason: reason.to_string(),
    }
}

/// Resolve an existing terminal record: completed ones are returned as an
/// idempotent success, missed ones are a conflict.
fn settle_existing(
    slot: CheckSlot,
    record: CheckRecord,
    policy: &CheckPolicy,
) -> AppResult<CompletionReceipt> {
    match record.status {
        CheckStatus::Missed => Err(conflict(
            slot.event_id,
            slot.index,
            "check was missed and cannot be completed",
        )),
        _ => Ok(receipt(slot, record, false, policy)),
    }
}

/// Complete check `check_index` of `event_id` on behalf of `actor` at `now`.
pub fn complete_check(
    conn: &Connection,
    cfg: &Config,
    event_id: i64,
    check_index: u32,
    actor: &str,
    now: NaiveDateTime,
) -> AppResult<CompletionReceipt> {
    let policy = CheckPolicy::from_config(cfg);
    let event = require_event(conn, event_id)?;

    let slot = slot_at(&event, policy.interval_minutes, check_index).ok_or(
        AppError::CheckNotFound {
            event_id,
            check_index,
        },
    )?;

    if let Some(existing) = load_record(conn, event_id, check_index)?
        && existing.status.is_terminal()
    {
        debug!(event_id, check_index, status = existing.status.to_db_str(), "Check already settled");
        return settle_existing(slot, existing, &policy);
    }

    let blocks = load_shift_blocks_by_date(conn, &event.date)?;
    let owners = resolve_ownership(&event, &blocks, &cfg.excluded_event_types);
    if !is_owner_at(&owners, actor, now) {
        return Err(AppError::Unauthorized {
            user: actor.to_string(),
            event_id,
            at: format_datetime(now),
        });
    }

    match classify(&slot, now, None, &policy) {
        CheckState::Upcoming => {
            return Err(conflict(event_id, check_index, "check is not due yet"));
        }
        CheckState::Missed => {
            return Err(conflict(
                event_id,
                check_index,
                "check window has elapsed and cannot be completed",
            ));
        }
        _ => {}
    }

    let won = try_complete(conn, event_id, check_index, actor, now)?;

    let record = load_record(conn, event_id, check_index)?.ok_or_else(|| {
        AppError::Other(format!(
            "check record for event {event_id} #{check_index} vanished after write"
        ))
    })?;

    if !won {
        debug!(event_id, check_index, "Lost completion race");
        return settle_existing(slot, record, &policy);
    }

    let out = receipt(slot, record, true, &policy);
    info!(
        event_id,
        check_index,
        actor,
        lateness = %out.lateness(),
        "Check completed"
    );
    ttlog_quiet(
        conn,
        "complete",
        &format!("event {event_id} #{check_index}"),
        &format!("Completed by {actor} ({})", out.lateness()),
    );

    Ok(out)
}
