//! Missed-check sweep: make "missed" durable once a check window has
//! elapsed without a completion. Convergent; safe to run any number of times.

use crate::core::policy::CheckPolicy;
use crate::core::schedule::generate_slots;
use crate::db::checks::mark_missed;
use crate::db::log::ttlog_quiet;
use crate::db::queries::load_check_events_between;
use crate::errors::AppResult;
use crate::models::check::CheckSlot;
use crate::models::event::Event;
use chrono::{Duration, NaiveDateTime};
use rusqlite::Connection;
use tracing::info;

/// Slots of `event` whose window has fully elapsed at `now`.
pub fn elapsed_slots(event: &Event, now: NaiveDateTime, policy: &CheckPolicy) -> Vec<CheckSlot> {
    generate_slots(event, policy.interval_minutes)
        .into_iter()
        .filter(|s| now - s.scheduled_time >= policy.missed_after())
        .collect()
}

/// Persist `missed` for every elapsed, unsettled check of recording events
/// dated within `lookback_days` of `now`. Returns the rows transitioned.
pub fn sweep_missed_checks(
    conn: &Connection,
    now: NaiveDateTime,
    policy: &CheckPolicy,
    lookback_days: i64,
) -> AppResult<usize> {
    let to = now.date();
    let from = to - Duration::days(lookback_days.max(0));
    let events = load_check_events_between(conn, &from, &to)?;

    let tx = conn.unchecked_transaction()?;
    let mut transitioned = 0usize;

    for event in &events {
        for slot in elapsed_slots(event, now, policy) {
            if mark_missed(&tx, slot.event_id, slot.index)? {
                transitioned += 1;
            }
        }
    }

    tx.commit()?;

    if transitioned > 0 {
        info!(transitioned, events = events.len(), "Missed checks persisted");
        ttlog_quiet(
            conn,
            "sweep",
            &format!("{} events", events.len()),
            &format!("Marked {transitioned} checks as missed"),
        );
    }

    Ok(transitioned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::completion::complete_check;
    use crate::config::Config;
    use crate::db::checks::load_records_for_event;
    use crate::db::initialize::init_db;
    use crate::db::queries::upsert_event;
    use crate::models::check::CheckStatus;
    use crate::utils::time::parse_datetime;
    use chrono::{NaiveDate, NaiveTime};

    fn ev(id: i64, requires_check: bool) -> Event {
        Event {
            id,
            date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            start_time: NaiveTime::from_hms_opt(9, 0, 0),
            end_time: NaiveTime::from_hms_opt(10, 30, 0),
            room_name: "GH 1420".into(),
            event_type: "lecture".into(),
            requires_check,
            manual_owner: Some("alice".into()),
        }
    }

    #[test]
    fn elapsed_slots_respect_the_missed_threshold() {
        let p = CheckPolicy::default();
        let e = ev(1, true);
        assert!(elapsed_slots(&e, parse_datetime("2025-03-10 09:29:59").unwrap(), &p).is_empty());
        assert_eq!(
            elapsed_slots(&e, parse_datetime("2025-03-10 10:00").unwrap(), &p).len(),
            2
        );
    }

    #[test]
    fn sweep_is_convergent_and_skips_completed_checks() {
        let conn = Connection::open_in_memory().unwrap();
        init_db(&conn).unwrap();
        upsert_event(&conn, &ev(1, true)).unwrap();
        upsert_event(&conn, &ev(2, false)).unwrap();

        let cfg = Config::with_database(":memory:".into());
        complete_check(
            &conn,
            &cfg,
            1,
            1,
            "alice",
            parse_datetime("2025-03-10 09:04").unwrap(),
        )
        .unwrap();

        let p = CheckPolicy::default();
        let now = parse_datetime("2025-03-10 12:00").unwrap();
        assert_eq!(sweep_missed_checks(&conn, now, &p, 7).unwrap(), 2);
        assert_eq!(sweep_missed_checks(&conn, now, &p, 7).unwrap(), 0);

        let records = load_records_for_event(&conn, 1).unwrap();
        let statuses: Vec<CheckStatus> = records.iter().map(|r| r.status).collect();
        assert_eq!(
            statuses,
            vec![CheckStatus::Completed, CheckStatus::Missed, CheckStatus::Missed]
        );
        assert!(load_records_for_event(&conn, 2).unwrap().is_empty());
    }

    #[test]
    fn events_outside_the_lookback_are_left_alone() {
        let conn = Connection::open_in_memory().unwrap();
        init_db(&conn).unwrap();
        upsert_event(&conn, &ev(1, true)).unwrap();

        let p = CheckPolicy::default();
        let much_later = parse_datetime("2025-04-30 12:00").unwrap();
        assert_eq!(sweep_missed_checks(&conn, much_later, &p, 7).unwrap(), 0);
    }
}
