use crate::cli::commands::open_pool;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::import::{Snapshot, import_snapshot};
use crate::errors::AppResult;
use crate::ui::messages::{success, warning};
use crate::utils::path::expand_tilde;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Import { file } = cmd {
        let path = expand_tilde(file);
        let snapshot = Snapshot::load(&path)?;

        let pool = open_pool(cfg)?;
        let summary = import_snapshot(&pool.conn, &snapshot)?;

        success(format!(
            "Imported {} events and {} shift blocks from {}",
            summary.events,
            summary.shifts,
            path.display()
        ));
        if summary.malformed > 0 {
            warning(format!(
                "{} events have missing or invalid times and get no checks",
                summary.malformed
            ));
        }
    }
    Ok(())
}
