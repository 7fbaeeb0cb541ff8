/// ANSI color helper utilities for terminal output.
pub const RESET: &str = "\x1b[0m";

pub const GREY: &str = "\x1b[90m";
pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const MISSED: &str = "\x1b[41;97;1m";

/// Color for a check state label (`upcoming`, `due`, ...).
pub fn color_for_state(label: &str) -> &'static str {
    match label {
        "upcoming" => GREY,
        "due" => YELLOW,
        "overdue" => RED,
        "missed" => MISSED,
        "completed" => GREEN,
        _ => RESET,
    }
}

/// Wrap `value` in the state color, padding before coloring so that table
/// alignment is not thrown off by escape sequences.
pub fn colorize_state(label: &str, width: usize) -> String {
    format!(
        "{}{:<width$}{}",
        color_for_state(label),
        label,
        RESET,
        width = width
    )
}

/// Grey out placeholders such as `--` or `--:--`.
pub fn colorize_optional(value: &str) -> String {
    if value.trim().is_empty() || value.trim() == "--" || value.trim() == "--:--" {
        format!("{GREY}{value}{RESET}")
    } else {
        value.to_string()
    }
}
