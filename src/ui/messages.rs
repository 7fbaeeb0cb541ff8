//! Human-facing CLI feedback. Diagnostics go through `tracing`; these are
//! the lines a user is meant to read.

use ansi_term::{Colour, Style};
use std::fmt;

const ICON_INFO: &str = "ℹ️";
const ICON_OK: &str = "✅";
const ICON_WARN: &str = "⚠️";
const ICON_BELL: &str = "🔔";

fn icon(colour: Colour, icon: &str) -> String {
    Style::new().bold().fg(colour).paint(icon).to_string()
}

pub fn info<T: fmt::Display>(msg: T) {
    println!("{} {}", icon(Colour::Blue, ICON_INFO), msg);
}

pub fn success<T: fmt::Display>(msg: T) {
    println!("{} {}", icon(Colour::Green, ICON_OK), msg);
}

pub fn warning<T: fmt::Display>(msg: T) {
    println!("{} {}", icon(Colour::Yellow, ICON_WARN), msg);
}

/// A reminder delivered by the watch session.
pub fn reminder<T: fmt::Display, M: fmt::Display>(title: T, msg: M) {
    println!(
        "{} {}\n   {}",
        icon(Colour::Yellow, ICON_BELL),
        Style::new().bold().paint(title.to_string()),
        msg
    );
}

/// Section header, e.g. above a timeline table.
pub fn header<T: fmt::Display>(msg: T) {
    println!("{}\n", Colour::Blue.bold().paint(format!("== {msg}")));
}
