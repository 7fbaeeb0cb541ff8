//! Database bootstrap for a session: open the configured file and bring the
//! schema up to date before any query runs.

use crate::config::Config;
use crate::db::migrate::run_pending_migrations;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use rusqlite::Connection;
use tracing::debug;

/// Apply pending migrations; returns the versions applied by this call.
pub fn init_db(conn: &Connection) -> AppResult<Vec<&'static str>> {
    let applied = run_pending_migrations(conn)?;
    if !applied.is_empty() {
        debug!(count = applied.len(), "Schema upgraded");
    }
    Ok(applied)
}

/// Open the configured database with its busy timeout and migrate it.
pub fn open_db(cfg: &Config) -> AppResult<DbPool> {
    let pool = DbPool::with_busy_timeout(&cfg.database, cfg.busy_timeout_ms)?;
    init_db(&pool.conn)?;
    Ok(pool)
}
