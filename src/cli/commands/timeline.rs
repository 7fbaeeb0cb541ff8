use crate::cli::commands::open_pool;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::policy::CheckPolicy;
use crate::core::timeline::{get_check_timeline, outstanding};
use crate::errors::AppResult;
use crate::ui::messages::{header, info};
use crate::utils::colors::{colorize_optional, colorize_state};
use crate::utils::formatting::{lateness_label, pad_right};
use crate::utils::time::{format_hhmm, resolve_now};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Timeline {
        event_id,
        now,
        json,
    } = cmd
    {
        let now = resolve_now(now.as_ref())?;
        let policy = CheckPolicy::from_config(cfg);
        let pool = open_pool(cfg)?;
        let (event, entries) = get_check_timeline(&pool.conn, *event_id, now, &policy)?;

        if *json {
            println!("{}", serde_json::to_string_pretty(&entries)?);
            return Ok(());
        }

        header(format!(
            "Event {} · {} {} · {}",
            event.id,
            event.date_str(),
            event.span_str(),
            event.room_name
        ));

        if entries.is_empty() {
            info("No recording checks for this event.");
            return Ok(());
        }

        println!(
            "{}  {}  {}  {}  {}",
            pad_right("#", 3),
            pad_right("Time", 5),
            pad_right("State", 9),
            pad_right("By", 12),
            "Lateness"
        );
        for e in &entries {
            let by = e
                .record
                .as_ref()
                .and_then(|r| r.completed_by.clone())
                .unwrap_or_else(|| "--".into());
            let lateness = e
                .lateness_minutes
                .map(lateness_label)
                .unwrap_or_else(|| "--".into());

            println!(
                "{}  {}  {}  {}  {}",
                pad_right(&e.slot.index.to_string(), 3),
                format_hhmm(e.slot.scheduled_time.time()),
                colorize_state(e.state.label(), 9),
                colorize_optional(&pad_right(&by, 12)),
                colorize_optional(&lateness)
            );
        }

        println!("\n{} of {} checks still open", outstanding(&entries), entries.len());
    }
    Ok(())
}
