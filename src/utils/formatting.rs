//! Formatting utilities used for CLI and export outputs.

pub fn pad_right(s: &str, width: usize) -> String {
    format!("{:<width$}", s, width = width)
}

/// Render a lateness in minutes: `on time`, `15m late`, `1h 5m late`.
pub fn lateness_label(mins: i64) -> String {
    if mins <= 0 {
        return "on time".to_string();
    }

    let hours = mins / 60;
    let minutes = mins % 60;

    if hours == 0 {
        format!("{}m late", minutes)
    } else {
        format!("{}h {}m late", hours, minutes)
    }
}
