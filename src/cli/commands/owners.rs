use crate::cli::commands::open_pool;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::rooms::{expand_room, is_merged};
use crate::core::timeline::get_ownership_timeline;
use crate::errors::AppResult;
use crate::ui::messages::{header, info, warning};
use crate::utils::table::Table;
use crate::utils::time::format_hhmm;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Owners { event_id, json } = cmd {
        let pool = open_pool(cfg)?;
        let (event, timeline) = get_ownership_timeline(&pool.conn, *event_id, cfg)?;

        if *json {
            println!("{}", serde_json::to_string_pretty(&timeline)?);
            return Ok(());
        }

        header(format!(
            "Owners of event {} · {} {} · {}",
            event.id,
            event.date_str(),
            event.span_str(),
            event.room_name
        ));

        if is_merged(&event.room_name) {
            info(format!(
                "Merged room covers: {}",
                expand_room(&event.room_name).join(" + ")
            ));
        }

        if timeline.is_empty() {
            warning("Nobody owns this event.");
            return Ok(());
        }

        let mut table = Table::new(vec!["Owner", "From", "To", "Minutes"]);
        for entry in &timeline {
            table.add_row(vec![
                entry.owner_id.clone(),
                format_hhmm(entry.effective_from.time()),
                format_hhmm(entry.effective_to.time()),
                entry.duration_minutes().to_string(),
            ]);
        }
        print!("{}", table.render());
    }
    Ok(())
}
