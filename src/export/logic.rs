// src/export/logic.rs

use crate::config::Config;
use crate::core::ownership::resolve_ownership;
use crate::core::policy::CheckPolicy;
use crate::core::timeline::build_check_timeline;
use crate::db::checks::load_records_for_event;
use crate::db::pool::DbPool;
use crate::db::queries::{load_check_events_between, load_event_dates, load_shift_blocks_by_date};
use crate::errors::{AppError, AppResult};
use crate::export::ExportFormat;
use crate::export::fs_utils::ensure_writable;
use crate::export::json_csv::{export_csv, export_json};
use crate::export::model::CheckReportRow;
use crate::export::range::parse_range;
use crate::ui::messages::warning;
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::Connection;
use std::path::Path;
use tracing::info;

/// High-level check report export.
pub struct ExportLogic;

impl ExportLogic {
    /// Export the check report of every recording event in `range`
    /// (`None` or `"all"` for everything), classified at `now`.
    pub fn export(
        pool: &DbPool,
        cfg: &Config,
        format: ExportFormat,
        file: &str,
        range: Option<&str>,
        force: bool,
        now: NaiveDateTime,
    ) -> AppResult<usize> {
        let path = Path::new(file);
        if file.trim().is_empty() {
            return Err(AppError::Export("output file path is empty".into()));
        }

        ensure_writable(path, force)?;

        let bounds = match range {
            None => None,
            Some(r) if r.eq_ignore_ascii_case("all") => None,
            Some(r) => Some(parse_range(r)?),
        };

        let rows = load_rows(&pool.conn, cfg, bounds, now)?;
        if rows.is_empty() {
            warning("No recording checks found for the selected range.");
            return Ok(0);
        }

        match format {
            ExportFormat::Csv => export_csv(&rows, path)?,
            ExportFormat::Json => export_json(&rows, path)?,
        }

        info!(format = format.as_str(), rows = rows.len(), file, "Check report exported");
        Ok(rows.len())
    }
}

/// Build report rows for every recording event within `bounds`.
pub fn load_rows(
    conn: &Connection,
    cfg: &Config,
    bounds: Option<(NaiveDate, NaiveDate)>,
    now: NaiveDateTime,
) -> AppResult<Vec<CheckReportRow>> {
    let (from, to) = match bounds {
        Some(b) => b,
        None => {
            let dates = load_event_dates(conn)?;
            match (dates.first(), dates.last()) {
                (Some(f), Some(l)) => (*f, *l),
                _ => return Ok(Vec::new()),
            }
        }
    };

    let policy = CheckPolicy::from_config(cfg);
    let mut rows = Vec::new();

    for event in load_check_events_between(conn, &from, &to)? {
        let blocks = load_shift_blocks_by_date(conn, &event.date)?;
        let owners = resolve_ownership(&event, &blocks, &cfg.excluded_event_types);
        let records = load_records_for_event(conn, event.id)?;

        rows.extend(
            build_check_timeline(&event, &records, now, &policy)
                .iter()
                .map(|entry| CheckReportRow::from_entry(&event, &owners, entry)),
        );
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::import::{Snapshot, import_snapshot};
    use crate::db::checks::try_complete;
    use crate::db::initialize::init_db;
    use crate::utils::time::parse_datetime;

    const SNAPSHOT: &str = r#"
events:
  - { id: 1, date: 2025-03-10, start_time: "09:00", end_time: "10:00",
      room_name: "GH 1420", event_type: lecture, requires_check: true }
  - { id: 2, date: 2025-03-11, start_time: "09:00", end_time: "09:20",
      room_name: "GH 1430", event_type: lecture, requires_check: true }
  - { id: 3, date: 2025-03-11, start_time: "11:00", end_time: "12:00",
      room_name: "GH 1500", event_type: lecture, requires_check: false }
shifts:
  - id: 1
    date: 2025-03-10
    start_time: "08:00"
    end_time: "09:30"
    assignments: [{ owner_id: alice, rooms: ["GH 1420"] }]
"#;

    #[test]
    fn rows_follow_the_check_timeline() {
        let conn = Connection::open_in_memory().unwrap();
        init_db(&conn).unwrap();
        import_snapshot(&conn, &Snapshot::from_yaml(SNAPSHOT).unwrap()).unwrap();
        let done = parse_datetime("2025-03-10 09:25").unwrap();
        try_complete(&conn, 1, 1, "alice", done).unwrap();

        let cfg = Config::with_database(":memory:".into());
        let now = parse_datetime("2025-03-10 09:40").unwrap();
        let rows = load_rows(&conn, &cfg, None, now).unwrap();

        // event 2 is shorter than one interval, event 3 needs no checks
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].state, "completed");
        assert_eq!(rows[0].owner, "alice");
        assert_eq!(rows[0].lateness_minutes, Some(15));
        assert_eq!(rows[1].state, "overdue");
        assert_eq!(rows[1].owner, "");
        assert_eq!(rows[1].completed_by, "");
    }

    #[test]
    fn bounds_limit_the_dates() {
        let conn = Connection::open_in_memory().unwrap();
        init_db(&conn).unwrap();
        import_snapshot(&conn, &Snapshot::from_yaml(SNAPSHOT).unwrap()).unwrap();

        let cfg = Config::with_database(":memory:".into());
        let now = parse_datetime("2025-03-12 00:00").unwrap();
        let bounds = parse_range("2025-03-11").unwrap();
        assert!(load_rows(&conn, &cfg, Some(bounds), now).unwrap().is_empty());
    }
}
