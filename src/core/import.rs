//! Snapshot import: the event store and shift schedule are owned elsewhere;
//! they reach this database as a YAML or JSON snapshot.

use crate::db::log::ttlog;
use crate::db::queries::{upsert_event, upsert_shift_block};
use crate::errors::{AppError, AppResult};
use crate::models::event::Event;
use crate::models::shift::ShiftBlock;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub shifts: Vec<ShiftBlock>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportSummary {
    pub events: usize,
    pub shifts: usize,
    /// Events whose times are missing or inverted; stored, but they yield
    /// no checks and no owners.
    pub malformed: usize,
}

impl Snapshot {
    pub fn from_yaml(content: &str) -> AppResult<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_json(content: &str) -> AppResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Parse by file extension: `.json` is JSON, anything else YAML.
    pub fn load(path: &Path) -> AppResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| AppError::Import(format!("{}: {}", path.display(), e)))?;

        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json(&content)
        } else {
            Self::from_yaml(&content)
        }
    }

    fn check_ids(&self) -> AppResult<()> {
        let mut ids: Vec<i64> = self.events.iter().map(|e| e.id).collect();
        ids.sort_unstable();
        if let Some(w) = ids.windows(2).find(|w| w[0] == w[1]) {
            return Err(AppError::Import(format!("duplicate event id {}", w[0])));
        }

        let mut ids: Vec<i64> = self.shifts.iter().map(|s| s.id).collect();
        ids.sort_unstable();
        if let Some(w) = ids.windows(2).find(|w| w[0] == w[1]) {
            return Err(AppError::Import(format!("duplicate shift block id {}", w[0])));
        }
        Ok(())
    }
}

/// Upsert every event and shift block of `snapshot` in one transaction.
pub fn import_snapshot(conn: &Connection, snapshot: &Snapshot) -> AppResult<ImportSummary> {
    snapshot.check_ids()?;

    let tx = conn.unchecked_transaction()?;
    let mut summary = ImportSummary::default();

    for ev in &snapshot.events {
        upsert_event(&tx, ev)?;
        summary.events += 1;
        if ev.window().is_none() {
            summary.malformed += 1;
        }
    }
    for block in &snapshot.shifts {
        upsert_shift_block(&tx, block)?;
        summary.shifts += 1;
    }

    ttlog(
        &tx,
        "import",
        "",
        &format!(
            "Imported {} events, {} shift blocks",
            summary.events, summary.shifts
        ),
    )?;
    tx.commit()?;

    info!(
        events = summary.events,
        shifts = summary.shifts,
        malformed = summary.malformed,
        "Snapshot imported"
    );
    Ok(summary)
}
