//! Read/replace access to the external event and shift tables.

use crate::errors::{AppError, AppResult};
use crate::models::event::Event;
use crate::models::shift::{Assignment, ShiftBlock};
use crate::utils::time::{format_db_time, parse_time};
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Result, Row, params};

fn date_to_db(d: &NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

fn parse_db_date(idx: usize, raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            Box::new(AppError::InvalidDate(raw.to_string())),
        )
    })
}

pub fn map_event_row(row: &Row) -> Result<Event> {
    let date_str: String = row.get("date")?;
    let date = parse_db_date(1, &date_str)?;

    // Unparseable times are kept as `None`: such events yield no checks.
    let start: Option<String> = row.get("start_time")?;
    let end: Option<String> = row.get("end_time")?;

    Ok(Event {
        id: row.get("id")?,
        date,
        start_time: start.as_deref().and_then(parse_time),
        end_time: end.as_deref().and_then(parse_time),
        room_name: row.get("room_name")?,
        event_type: row.get("event_type")?,
        requires_check: row.get::<_, i64>("requires_check")? == 1,
        manual_owner: row
            .get::<_, Option<String>>("manual_owner")?
            .filter(|s| !s.trim().is_empty()),
    })
}

pub fn load_event(conn: &Connection, id: i64) -> AppResult<Option<Event>> {
    let mut stmt = conn.prepare_cached("SELECT * FROM events WHERE id = ?1")?;
    Ok(stmt.query_row([id], map_event_row).optional()?)
}

/// Load an event or fail with `EventNotFound`.
pub fn require_event(conn: &Connection, id: i64) -> AppResult<Event> {
    load_event(conn, id)?.ok_or(AppError::EventNotFound(id))
}

/// Events flagged for recording checks with `from <= date <= to`.
pub fn load_check_events_between(
    conn: &Connection,
    from: &NaiveDate,
    to: &NaiveDate,
) -> AppResult<Vec<Event>> {
    let mut stmt = conn.prepare_cached(
        "SELECT * FROM events
         WHERE requires_check = 1 AND date BETWEEN ?1 AND ?2
         ORDER BY date ASC, start_time ASC, id ASC",
    )?;

    let rows = stmt.query_map(params![date_to_db(from), date_to_db(to)], map_event_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Distinct event dates, ascending.
pub fn load_event_dates(conn: &Connection) -> AppResult<Vec<NaiveDate>> {
    let mut stmt = conn.prepare_cached("SELECT DISTINCT date FROM events ORDER BY date ASC")?;
    let rows = stmt.query_map([], |row| {
        let raw: String = row.get(0)?;
        parse_db_date(0, &raw)
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn load_shift_blocks_by_date(conn: &Connection, date: &NaiveDate) -> AppResult<Vec<ShiftBlock>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, date, start_time, end_time FROM shift_blocks
         WHERE date = ?1
         ORDER BY start_time ASC, id ASC",
    )?;

    let rows = stmt.query_map([date_to_db(date)], |row| {
        let id: i64 = row.get(0)?;
        let date_raw: String = row.get(1)?;
        let start_raw: String = row.get(2)?;
        let end_raw: String = row.get(3)?;
        Ok((id, date_raw, start_raw, end_raw))
    })?;

    let mut blocks = Vec::new();
    for r in rows {
        let (id, date_raw, start_raw, end_raw) = r?;

        // A block with unreadable times covers nothing; skip it.
        let (Some(start_time), Some(end_time)) = (parse_time(&start_raw), parse_time(&end_raw))
        else {
            tracing::warn!(block_id = id, "Skipping shift block with malformed times");
            continue;
        };

        blocks.push(ShiftBlock {
            id,
            date: parse_db_date(1, &date_raw)?,
            start_time,
            end_time,
            assignments: load_assignments(conn, id)?,
        });
    }

    Ok(blocks)
}

/// Assignments of one block, grouped by owner in insertion order.
fn load_assignments(conn: &Connection, block_id: i64) -> AppResult<Vec<Assignment>> {
    let mut stmt = conn.prepare_cached(
        "SELECT owner_id, room_name FROM shift_assignments
         WHERE block_id = ?1
         ORDER BY id ASC",
    )?;

    let rows = stmt.query_map([block_id], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;

    let mut out: Vec<Assignment> = Vec::new();
    for r in rows {
        let (owner_id, room) = r?;
        match out.iter_mut().find(|a| a.owner_id == owner_id) {
            Some(a) => a.rooms.push(room),
            None => out.push(Assignment {
                owner_id,
                rooms: vec![room],
            }),
        }
    }
    Ok(out)
}

pub fn upsert_event(conn: &Connection, ev: &Event) -> AppResult<()> {
    conn.execute(
        "INSERT OR REPLACE INTO events
            (id, date, start_time, end_time, room_name, event_type, requires_check, manual_owner)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            ev.id,
            date_to_db(&ev.date),
            ev.start_time.map(format_db_time),
            ev.end_time.map(format_db_time),
            ev.room_name,
            ev.event_type,
            if ev.requires_check { 1 } else { 0 },
            ev.manual_owner,
        ],
    )?;
    Ok(())
}

/// Replace a shift block and all of its assignments.
pub fn upsert_shift_block(conn: &Connection, block: &ShiftBlock) -> AppResult<()> {
    conn.execute("DELETE FROM shift_assignments WHERE block_id = ?1", [block.id])?;
    conn.execute(
        "INSERT OR REPLACE INTO shift_blocks (id, date, start_time, end_time)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            block.id,
            date_to_db(&block.date),
            format_db_time(block.start_time),
            format_db_time(block.end_time),
        ],
    )?;

    let mut stmt = conn.prepare_cached(
        "INSERT INTO shift_assignments (block_id, owner_id, room_name) VALUES (?1, ?2, ?3)",
    )?;
    for a in &block.assignments {
        for room in &a.rooms {
            stmt.execute(params![block.id, a.owner_id, room])?;
        }
    }
    Ok(())
}
