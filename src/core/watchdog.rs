//! Overdue watchdog and notification dispatcher.
//!
//! The watchdog decides which obligation, if any, is newly actionable for a
//! user. The dispatcher claims the persisted sentinel for that obligation and
//! only the claimant delivers. There is no in-memory "already sent" state.

use crate::config::Config;
use crate::core::ownership::{is_owner_at, resolve_ownership};
use crate::core::policy::CheckPolicy;
use crate::core::schedule::{generate_slots, slot_at};
use crate::core::state::classify;
use crate::db::checks::{claim_notification, has_sentinel, load_record, load_records_for_event};
use crate::db::log::ttlog_quiet;
use crate::db::queries::{load_check_events_between, load_shift_blocks_by_date};
use crate::errors::AppResult;
use crate::models::check::{CheckRecord, CheckState};
use crate::models::event::Event;
use crate::models::notification::Notification;
use crate::models::ownership::OwnershipEntry;
use crate::utils::time::format_hhmm;
use chrono::NaiveDateTime;
use rusqlite::Connection;
use serde::Serialize;
use std::process::Command;
use tracing::{debug, info, warn};

/// An obligation the current owner should be reminded about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DueCheck {
    pub event_id: i64,
    pub check_index: u32,
    pub owner_id: String,
    pub state: CheckState,
    pub scheduled_time: NaiveDateTime,
    pub room_name: String,
}

impl DueCheck {
    pub fn title(&self) -> String {
        match self.state {
            CheckState::Overdue => format!("Overdue recording check: {}", self.room_name),
            _ => format!("Recording check due: {}", self.room_name),
        }
    }

    pub fn message(&self) -> String {
        format!(
            "Check #{} for event {} was scheduled at {}. Confirm the recording is running.",
            self.check_index,
            self.event_id,
            format_hhmm(self.scheduled_time.time())
        )
    }
}

/// `[start, end + post-event grace]`, inclusive at both ends.
pub fn in_watch_window(event: &Event, now: NaiveDateTime, policy: &CheckPolicy) -> bool {
    match event.window() {
        Some((start, end)) => start <= now && now <= end + policy.post_event_grace(),
        None => false,
    }
}

/// Index of the slot whose interval contains `now`, counted from the start.
pub fn current_check_index(event: &Event, now: NaiveDateTime, policy: &CheckPolicy) -> Option<u32> {
    let (start, _) = event.window()?;
    if now < start || policy.interval_minutes <= 0 {
        return None;
    }
    let elapsed = (now - start).num_minutes();
    u32::try_from(elapsed / policy.interval_minutes + 1).ok()
}

/// Pure evaluation of one event for one user. `record` is the persisted
/// record of the current slot, if any.
pub fn evaluate_event(
    event: &Event,
    owners: &[OwnershipEntry],
    record: Option<&CheckRecord>,
    user: &str,
    now: NaiveDateTime,
    policy: &CheckPolicy,
) -> Option<DueCheck> {
    if !event.requires_check || !in_watch_window(event, now, policy) {
        return None;
    }
    if !is_owner_at(owners, user, now) {
        return None;
    }

    let index = current_check_index(event, now, policy)?;
    let slot = slot_at(event, policy.interval_minutes, index)?;
    let state = classify(&slot, now, record, policy);

    state.is_actionable().then(|| DueCheck {
        event_id: event.id,
        check_index: slot.index,
        owner_id: user.to_string(),
        state,
        scheduled_time: slot.scheduled_time,
        room_name: event.room_name.clone(),
    })
}

/// Recording-check events whose watch window may contain `now`.
fn candidate_events(conn: &Connection, now: NaiveDateTime, policy: &CheckPolicy) -> AppResult<Vec<Event>> {
    // The post-event grace can push the window past midnight of the previous day.
    let from = (now - policy.post_event_grace()).date();
    let events = load_check_events_between(conn, &from, &now.date())?;
    Ok(events
        .into_iter()
        .filter(|e| in_watch_window(e, now, policy))
        .collect())
}

/// Obligations newly actionable for `user` at `now` that nobody has been
/// notified about yet.
pub fn find_due_checks(
    conn: &Connection,
    cfg: &Config,
    user: &str,
    now: NaiveDateTime,
) -> AppResult<Vec<DueCheck>> {
    let policy = CheckPolicy::from_config(cfg);
    let mut out = Vec::new();

    for event in candidate_events(conn, now, &policy)? {
        let blocks = load_shift_blocks_by_date(conn, &event.date)?;
        let owners = resolve_ownership(&event, &blocks, &cfg.excluded_event_types);

        let record = match current_check_index(&event, now, &policy) {
            Some(i) => load_record(conn, event.id, i)?,
            None => None,
        };

        if let Some(due) = evaluate_event(&event, &owners, record.as_ref(), user, now, &policy)
            && !has_sentinel(conn, due.event_id, due.check_index)?
        {
            out.push(due);
        }
    }

    Ok(out)
}

/// Count of Due and Overdue checks across the events `user` owns at `now`.
pub fn badge_count(conn: &Connection, cfg: &Config, user: &str, now: NaiveDateTime) -> AppResult<usize> {
    let policy = CheckPolicy::from_config(cfg);
    let mut count = 0;

    for event in candidate_events(conn, now, &policy)? {
        let blocks = load_shift_blocks_by_date(conn, &event.date)?;
        let owners = resolve_ownership(&event, &blocks, &cfg.excluded_event_types);
        if !is_owner_at(&owners, user, now) {
            continue;
        }

        let records = load_records_for_event(conn, event.id)?;
        count += generate_slots(&event, policy.interval_minutes)
            .iter()
            .filter(|s| {
                let rec = records.iter().find(|r| r.check_index == s.index);
                classify(s, now, rec, &policy).is_actionable()
            })
            .count();
    }

    Ok(count)
}

/// Transport for best-effort native notifications.
pub trait Notifier: Send {
    fn notify(&self, title: &str, message: &str) -> Result<(), String>;
}

impl<N: Notifier + ?Sized> Notifier for Box<N> {
    fn notify(&self, title: &str, message: &str) -> Result<(), String> {
        (**self).notify(title, message)
    }
}

/// Rings the terminal bell; the CLI prints the reminder text itself.
#[derive(Debug, Default, Clone)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, title: &str, message: &str) -> Result<(), String> {
        eprint!("\x07");
        tracing::trace!(title, message, "Terminal bell");
        Ok(())
    }
}

/// Desktop notification through `notify-send` (Linux) or `osascript` (macOS).
#[derive(Debug, Default, Clone)]
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    fn notify(&self, title: &str, message: &str) -> Result<(), String> {
        let status = if cfg!(target_os = "macos") {
            let script = format!(
                "display notification {} with title {}",
                applescript_quote(message),
                applescript_quote(title)
            );
            Command::new("osascript").arg("-e").arg(script).status()
        } else {
            Command::new("notify-send").arg(title).arg(message).status()
        };

        match status {
            Ok(s) if s.success() => Ok(()),
            Ok(s) => Err(format!("notifier exited with {s}")),
            Err(e) => Err(e.to_string()),
        }
    }
}

/// AppleScript string literal: only `\` and `"` need escaping.
fn applescript_quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// This session claimed the sentinel and delivered.
    Delivered(Notification),
    /// Another session already claimed the obligation.
    AlreadyHandled,
}

/// Sentinel-guarded delivery of reminders.
pub struct Dispatcher<N: Notifier> {
    notifier: N,
}

impl<N: Notifier> Dispatcher<N> {
    pub fn new(notifier: N) -> Self {
        Self { notifier }
    }

    /// Claim the sentinel for `due` and deliver. Native delivery failures are
    /// logged; they never undo the claim.
    pub fn dispatch(&self, conn: &Connection, due: &DueCheck) -> AppResult<DispatchOutcome> {
        let title = due.title();
        let message = due.message();

        let Some(stored) = claim_notification(
            conn,
            &due.owner_id,
            due.event_id,
            due.check_index,
            &title,
            &message,
        )?
        else {
            debug!(
                event_id = due.event_id,
                check_index = due.check_index,
                "Reminder already handled by another session"
            );
            return Ok(DispatchOutcome::AlreadyHandled);
        };

        if let Err(e) = self.notifier.notify(&title, &message) {
            warn!(error = %e, event_id = due.event_id, "Native notification failed");
        }

        info!(
            event_id = due.event_id,
            check_index = due.check_index,
            owner = %due.owner_id,
            state = %due.state,
            "Reminder dispatched"
        );
        ttlog_quiet(
            conn,
            "notify",
            &format!("event {} #{}", due.event_id, due.check_index),
            &format!("Reminded {} ({})", due.owner_id, due.state),
        );

        Ok(DispatchOutcome::Delivered(stored))
    }
}

/// One synchronous watchdog pass: find and dispatch every due reminder.
pub fn run_tick<N: Notifier>(
    conn: &Connection,
    cfg: &Config,
    dispatcher: &Dispatcher<N>,
    user: &str,
    now: NaiveDateTime,
) -> AppResult<Vec<DispatchOutcome>> {
    let mut outcomes = Vec::new();
    for due in find_due_checks(conn, cfg, user, now)? {
        outcomes.push(dispatcher.dispatch(conn, &due)?);
    }
    Ok(outcomes)
}
