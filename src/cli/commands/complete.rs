use crate::cli::commands::{open_pool, resolve_user};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::completion::complete_check;
use crate::errors::AppResult;
use crate::ui::messages::{info, success};
use crate::utils::time::{format_hhmm, resolve_now};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Complete {
        event_id,
        index,
        user,
        now,
    } = cmd
    {
        let user = resolve_user(user, cfg)?;
        let now = resolve_now(now.as_ref())?;
        let pool = open_pool(cfg)?;

        let receipt = complete_check(&pool.conn, cfg, *event_id, *index, &user, now)?;
        let by = receipt.record.completed_by.as_deref().unwrap_or("?");
        let at = receipt
            .record
            .completed_time
            .map(|t| format_hhmm(t.time()))
            .unwrap_or_default();

        if receipt.newly_completed {
            success(format!(
                "Check #{} of event {} completed at {} ({})",
                index,
                event_id,
                at,
                receipt.lateness()
            ));
        } else {
            info(format!(
                "Check #{} of event {} was already completed by {} at {} ({})",
                index,
                event_id,
                by,
                at,
                receipt.lateness()
            ));
        }
    }
    Ok(())
}
