use crate::cli::commands::open_pool;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::policy::CheckPolicy;
use crate::core::sweep::sweep_missed_checks;
use crate::errors::AppResult;
use crate::ui::messages::{info, warning};
use crate::utils::time::resolve_now;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Sweep { now } = cmd {
        let now = resolve_now(now.as_ref())?;
        let pool = open_pool(cfg)?;
        let policy = CheckPolicy::from_config(cfg);

        let n = sweep_missed_checks(&pool.conn, now, &policy, cfg.sweep_lookback_days)?;
        if n == 0 {
            info("No checks to mark as missed.");
        } else {
            warning(format!("{n} checks marked as missed"));
        }
    }
    Ok(())
}
