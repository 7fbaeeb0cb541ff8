use crate::cli::commands::open_pool;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::log::load_log;
use crate::errors::AppResult;
use crate::ui::messages::info;
use ansi_term::Colour;

const OP_TARGET_MAX: usize = 60;

/// Colour of an audit operation.
fn color_for_operation(op: &str) -> Colour {
    match op {
        "complete" => Colour::Green,
        "sweep" => Colour::Red,
        "notify" => Colour::Yellow,
        "import" => Colour::Blue,
        "migration_applied" => Colour::Purple,
        "init" => Colour::RGB(255, 153, 51),
        _ => Colour::White,
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if !matches!(cmd, Commands::Log { print: true }) {
        return Ok(());
    }

    let pool = open_pool(cfg)?;
    let entries = load_log(&pool.conn)?;
    if entries.is_empty() {
        info("The internal log is empty.");
        return Ok(());
    }

    // Widths are measured on plain text; colour is applied afterwards.
    let rows: Vec<(i64, String, String, String, String)> = entries
        .into_iter()
        .map(|(id, raw_date, op, target, message)| {
            let date = chrono::DateTime::parse_from_rfc3339(&raw_date)
                .map(|dt| dt.format("%FT%T%:z").to_string())
                .unwrap_or(raw_date);
            let rest = if target.is_empty() {
                String::new()
            } else {
                truncate(&format!(" ({target})"), OP_TARGET_MAX.saturating_sub(op.len()))
            };
            (id, date, op, rest, message)
        })
        .collect();

    let id_w = rows.iter().map(|r| r.0.to_string().len()).max().unwrap_or(1);
    let date_w = rows.iter().map(|r| r.1.len()).max().unwrap_or(10);
    let op_w = rows
        .iter()
        .map(|r| r.2.chars().count() + r.3.chars().count())
        .max()
        .unwrap_or(10)
        .min(OP_TARGET_MAX);

    println!("📜 Internal log:\n");
    for (id, date, op, rest, message) in rows {
        let visible = op.chars().count() + rest.chars().count();
        let padding = " ".repeat(op_w.saturating_sub(visible));
        println!(
            "{:>id_w$}: {:<date_w$} | {}{}{} => {}",
            id,
            date,
            color_for_operation(&op).paint(op.as_str()),
            rest,
            padding,
            message,
            id_w = id_w,
            date_w = date_w
        );
    }

    Ok(())
}
