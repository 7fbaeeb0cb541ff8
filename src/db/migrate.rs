use rusqlite::{Connection, OptionalExtension, Result};

/// One schema step. Applied versions are recorded in the `log` table as
/// `migration_applied` rows, so each step runs at most once per database.
struct Migration {
    version: &'static str,
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "20250901_0001_create_events_and_shifts",
        description: "Created events, shift_blocks and shift_assignments tables",
        sql: r#"
        CREATE TABLE IF NOT EXISTS events (
            id             INTEGER PRIMARY KEY,
            date           TEXT NOT NULL,
            start_time     TEXT,
            end_time       TEXT,
            room_name      TEXT NOT NULL,
            event_type     TEXT NOT NULL DEFAULT '',
            requires_check INTEGER NOT NULL DEFAULT 0,
            manual_owner   TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_events_date ON events(date);

        CREATE TABLE IF NOT EXISTS shift_blocks (
            id         INTEGER PRIMARY KEY,
            date       TEXT NOT NULL,
            start_time TEXT NOT NULL,
            end_time   TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_shift_blocks_date ON shift_blocks(date);

        CREATE TABLE IF NOT EXISTS shift_assignments (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            block_id  INTEGER NOT NULL REFERENCES shift_blocks(id) ON DELETE CASCADE,
            owner_id  TEXT NOT NULL,
            room_name TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_shift_assignments_block ON shift_assignments(block_id);
        "#,
    },
    Migration {
        version: "20250901_0002_create_check_records",
        description: "Created check_records keyed by (event_id, check_index)",
        sql: r#"
        CREATE TABLE IF NOT EXISTS check_records (
            event_id       INTEGER NOT NULL,
            check_index    INTEGER NOT NULL CHECK(check_index >= 1),
            status         TEXT NOT NULL CHECK(status IN ('pending','completed','missed')),
            completed_time TEXT,
            completed_by   TEXT,
            updated_at     TEXT NOT NULL,
            PRIMARY KEY (event_id, check_index),
            CHECK ((status = 'completed') = (completed_time IS NOT NULL))
        );
        "#,
    },
    Migration {
        version: "20250915_0003_create_notifications",
        description: "Created check_notifications sentinel and notifications tables",
        sql: r#"
        CREATE TABLE IF NOT EXISTS check_notifications (
            event_id    INTEGER NOT NULL,
            check_index INTEGER NOT NULL,
            owner_id    TEXT NOT NULL,
            created_at  TEXT NOT NULL,
            UNIQUE (event_id, check_index)
        );

        CREATE TABLE IF NOT EXISTS notifications (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            owner_id    TEXT NOT NULL,
            event_id    INTEGER NOT NULL,
            check_index INTEGER NOT NULL,
            title       TEXT NOT NULL,
            message     TEXT NOT NULL,
            created_at  TEXT NOT NULL,
            read        INTEGER NOT NULL DEFAULT 0
        );
        CREATE INDEX IF NOT EXISTS idx_notifications_owner ON notifications(owner_id, read);
        "#,
    },
];

/// Ensure that the `log` table exists.
fn ensure_log_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn is_applied(conn: &Connection, version: &str) -> Result<bool> {
    let mut chk = conn.prepare(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

fn apply(conn: &Connection, m: &Migration) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(m.sql)?;
    tx.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (datetime('now'), 'migration_applied', ?1, ?2)",
        [m.version, m.description],
    )?;
    tx.commit()?;

    tracing::info!(version = m.version, "Migration applied");
    Ok(())
}

/// Public entry point: run all pending migrations, returning the versions
/// applied by this call.
///
/// Invoked by db::initialize::init_db().
pub fn run_pending_migrations(conn: &Connection) -> Result<Vec<&'static str>> {
    ensure_log_table(conn)?;

    let mut applied = Vec::new();
    for m in MIGRATIONS {
        if is_applied(conn, m.version)? {
            continue;
        }
        apply(conn, m)?;
        applied.push(m.version);
    }

    Ok(applied)
}
