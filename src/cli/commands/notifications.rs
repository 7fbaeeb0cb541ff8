use crate::cli::commands::{open_pool, resolve_user};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::checks::{load_notifications, mark_notifications_read};
use crate::errors::AppResult;
use crate::ui::messages::{info, success};
use crate::utils::table::Table;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Notifications {
        user,
        unread,
        mark_read,
    } = cmd
    {
        let user = resolve_user(user, cfg)?;
        let pool = open_pool(cfg)?;
        let list = load_notifications(&pool.conn, &user, *unread)?;

        if list.is_empty() {
            info(format!("No notifications for {user}."));
            return Ok(());
        }

        let mut table = Table::new(vec!["", "Event", "#", "Created", "Title"]);
        for n in &list {
            table.add_row(vec![
                if n.read { " " } else { "*" }.to_string(),
                n.event_id.to_string(),
                n.check_index.to_string(),
                n.created_at.chars().take(19).collect(),
                n.title.clone(),
            ]);
        }
        print!("{}", table.render());

        if *mark_read {
            let n = mark_notifications_read(&pool.conn, &user)?;
            success(format!("{n} notifications marked as read"));
        }
    }
    Ok(())
}
