//! Persistence of check records and notification sentinels.
//!
//! Every write here is a single conditional statement scoped to one
//! (event_id, check_index) key, so concurrent sessions cannot both win.

use crate::errors::{AppError, AppResult};
use crate::models::check::{CheckRecord, CheckStatus};
use crate::models::notification::Notification;
use crate::utils::time::{format_datetime, parse_datetime};
use chrono::{Local, NaiveDateTime};
use rusqlite::{Connection, OptionalExtension, Result, Row, params};

fn map_record_row(row: &Row) -> Result<CheckRecord> {
    let status_raw: String = row.get("status")?;
    let status = CheckStatus::from_db_str(&status_raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            Box::new(AppError::Validation(format!("unknown check status '{status_raw}'"))),
        )
    })?;

    let completed_raw: Option<String> = row.get("completed_time")?;

    Ok(CheckRecord {
        event_id: row.get("event_id")?,
        check_index: row.get("check_index")?,
        status,
        completed_time: completed_raw.as_deref().and_then(parse_datetime),
        completed_by: row.get("completed_by")?,
        updated_at: row.get("updated_at")?,
    })
}

pub fn load_record(conn: &Connection, event_id: i64, check_index: u32) -> AppResult<Option<CheckRecord>> {
    let mut stmt = conn.prepare_cached(
        "SELECT * FROM check_records WHERE event_id = ?1 AND check_index = ?2",
    )?;
    Ok(stmt
        .query_row(params![event_id, check_index], map_record_row)
        .optional()?)
}

pub fn load_records_for_event(conn: &Connection, event_id: i64) -> AppResult<Vec<CheckRecord>> {
    let mut stmt = conn.prepare_cached(
        "SELECT * FROM check_records WHERE event_id = ?1 ORDER BY check_index ASC",
    )?;
    let rows = stmt.query_map([event_id], map_record_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Complete a check iff it is not already terminal.
///
/// Returns `true` when this call performed the transition. `false` means some
/// other writer got there first; the caller re-reads the row to learn which
/// terminal state won.
pub fn try_complete(
    conn: &Connection,
    event_id: i64,
    check_index: u32,
    actor: &str,
    completed_time: NaiveDateTime,
) -> AppResult<bool> {
    let changed = conn.execute(
        "INSERT INTO check_records
            (event_id, check_index, status, completed_time, completed_by, updated_at)
         VALUES (?1, ?2, 'completed', ?3, ?4, ?5)
         ON CONFLICT(event_id, check_index) DO UPDATE SET
            status = 'completed',
            completed_time = excluded.completed_time,
            completed_by = excluded.completed_by,
            updated_at = excluded.updated_at
         WHERE check_records.status = 'pending'",
        params![
            event_id,
            check_index,
            format_datetime(completed_time),
            actor,
            Local::now().to_rfc3339(),
        ],
    )?;
    Ok(changed == 1)
}

/// Persist `missed` iff the check has no terminal record yet.
pub fn mark_missed(conn: &Connection, event_id: i64, check_index: u32) -> AppResult<bool> {
    let changed = conn.execute(
        "INSERT INTO check_records
            (event_id, check_index, status, completed_time, completed_by, updated_at)
         VALUES (?1, ?2, 'missed', NULL, NULL, ?3)
         ON CONFLICT(event_id, check_index) DO UPDATE SET
            status = 'missed',
            updated_at = excluded.updated_at
         WHERE check_records.status = 'pending'",
        params![event_id, check_index, Local::now().to_rfc3339()],
    )?;
    Ok(changed == 1)
}

pub fn has_sentinel(conn: &Connection, event_id: i64, check_index: u32) -> AppResult<bool> {
    let mut stmt = conn.prepare_cached(
        "SELECT 1 FROM check_notifications WHERE event_id = ?1 AND check_index = ?2",
    )?;
    Ok(stmt.exists(params![event_id, check_index])?)
}

/// Claim the right to notify for one obligation.
///
/// The sentinel insert and the in-app notification row share a transaction:
/// either both exist or neither does. Returns the stored notification when
/// this caller won the claim, `None` when a sentinel already existed.
pub fn claim_notification(
    conn: &Connection,
    owner_id: &str,
    event_id: i64,
    check_index: u32,
    title: &str,
    message: &str,
) -> AppResult<Option<Notification>> {
    let created_at = Local::now().to_rfc3339();
    let tx = conn.unchecked_transaction()?;

    let inserted = tx.execute(
        "INSERT INTO check_notifications (event_id, check_index, owner_id, created_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(event_id, check_index) DO NOTHING",
        params![event_id, check_index, owner_id, created_at],
    )?;

    if inserted == 0 {
        // Dropping the transaction rolls it back; nothing was written.
        return Ok(None);
    }

    tx.execute(
        "INSERT INTO notifications (owner_id, event_id, check_index, title, message, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![owner_id, event_id, check_index, title, message, created_at],
    )?;
    let id = tx.last_insert_rowid();
    tx.commit()?;

    Ok(Some(Notification {
        id,
        owner_id: owner_id.to_string(),
        event_id,
        check_index,
        title: title.to_string(),
        message: message.to_string(),
        created_at,
        read: false,
    }))
}

pub fn load_notifications(
    conn: &Connection,
    owner_id: &str,
    unread_only: bool,
) -> AppResult<Vec<Notification>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, owner_id, event_id, check_index, title, message, created_at, read
         FROM notifications
         WHERE owner_id = ?1 AND (?2 = 0 OR read = 0)
         ORDER BY id ASC",
    )?;

    let rows = stmt.query_map(params![owner_id, unread_only as i64], |row| {
        Ok(Notification {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            event_id: row.get(2)?,
            check_index: row.get(3)?,
            title: row.get(4)?,
            message: row.get(5)?,
            created_at: row.get(6)?,
            read: row.get::<_, i64>(7)? == 1,
        })
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Mark every notification of `owner_id` as read; returns the rows touched.
pub fn mark_notifications_read(conn: &Connection, owner_id: &str) -> AppResult<usize> {
    Ok(conn.execute(
        "UPDATE notifications SET read = 1 WHERE owner_id = ?1 AND read = 0",
        [owner_id],
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::initialize::init_db;

    fn conn() -> Connection {
        let c = Connection::open_in_memory().unwrap();
        init_db(&c).unwrap();
        c
    }

    fn at(s: &str) -> NaiveDateTime {
        parse_datetime(s).unwrap()
    }

    #[test]
    fn completion_is_single_writer() {
        let c = conn();
        assert!(try_complete(&c, 1, 2, "alice", at("2025-03-10 09:35")).unwrap());
        assert!(!try_complete(&c, 1, 2, "bob", at("2025-03-10 09:36")).unwrap());

        let rec = load_record(&c, 1, 2).unwrap().unwrap();
        assert_eq!(rec.status, CheckStatus::Completed);
        assert_eq!(rec.completed_by.as_deref(), Some("alice"));
        assert_eq!(rec.completed_time, Some(at("2025-03-10 09:35")));
    }

    #[test]
    fn missed_and_completed_never_overwrite_each_other() {
        let c = conn();
        assert!(mark_missed(&c, 1, 1).unwrap());
        assert!(!mark_missed(&c, 1, 1).unwrap());
        assert!(!try_complete(&c, 1, 1, "alice", at("2025-03-10 10:00")).unwrap());
        let rec = load_record(&c, 1, 1).unwrap().unwrap();
        assert_eq!(rec.status, CheckStatus::Missed);
        assert_eq!(rec.completed_time, None);

        assert!(try_complete(&c, 1, 2, "alice", at("2025-03-10 09:31")).unwrap());
        assert!(!mark_missed(&c, 1, 2).unwrap());
        assert_eq!(
            load_record(&c, 1, 2).unwrap().unwrap().status,
            CheckStatus::Completed
        );
    }

    #[test]
    fn pending_rows_can_still_transition() {
        let c = conn();
        c.execute(
            "INSERT INTO check_records (event_id, check_index, status, updated_at)
             VALUES (4, 1, 'pending', 'x')",
            [],
        )
        .unwrap();
        assert!(try_complete(&c, 4, 1, "alice", at("2025-03-10 09:05")).unwrap());
    }

    #[test]
    fn sentinel_claim_is_unique_and_writes_in_app_row() {
        let c = conn();
        let first = claim_notification(&c, "alice", 5, 1, "t", "m").unwrap();
        assert!(first.is_some());
        let second = claim_notification(&c, "alice", 5, 1, "t", "m").unwrap();
        assert!(second.is_none());

        assert!(has_sentinel(&c, 5, 1).unwrap());
        assert!(!has_sentinel(&c, 5, 2).unwrap());

        let inbox = load_notifications(&c, "alice", true).unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(mark_notifications_read(&c, "alice").unwrap(), 1);
        assert!(load_notifications(&c, "alice", true).unwrap().is_empty());
        assert_eq!(load_notifications(&c, "alice", false).unwrap().len(), 1);
    }
}
