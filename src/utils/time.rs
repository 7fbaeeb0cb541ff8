//! Time utilities: parsing HH:MM, local "now", date-time parsing and the
//! serde adapters used by the import snapshot.

use crate::errors::{AppError, AppResult};
use chrono::{Local, NaiveDateTime, NaiveTime, Timelike};

/// Parse `HH:MM` or `HH:MM:SS`.
pub fn parse_time(t: &str) -> Option<NaiveTime> {
    let t = t.trim();
    NaiveTime::parse_from_str(t, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(t, "%H:%M:%S"))
        .ok()
}

/// Parse `YYYY-MM-DD HH:MM[:SS]` (a `T` separator is accepted too).
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim().replace('T', " ");
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&s, fmt).ok())
}

/// Resolve the `--now` override used by commands, defaulting to local wall time.
pub fn resolve_now(input: Option<&String>) -> AppResult<NaiveDateTime> {
    match input {
        Some(s) => parse_datetime(s).ok_or_else(|| AppError::InvalidTime(s.to_string())),
        None => Ok(now()),
    }
}

pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

pub fn format_hhmm(t: NaiveTime) -> String {
    t.format("%H:%M").to_string()
}

/// `HH:MM`, or `HH:MM:SS` when the seconds are not zero.
pub fn format_time(t: NaiveTime) -> String {
    if t.second() == 0 {
        format_hhmm(t)
    } else {
        t.format("%H:%M:%S").to_string()
    }
}

/// Storage form of a time of day; keeps the seconds.
pub fn format_db_time(t: NaiveTime) -> String {
    t.format("%H:%M:%S").to_string()
}

pub fn format_datetime(dt: NaiveDateTime) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Serde adapter for a required `HH:MM` field.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(t: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format_time(*t))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_time(&raw).ok_or_else(|| D::Error::custom(format!("invalid time '{raw}'")))
    }
}

/// Serde adapter for an optional `HH:MM` field. Malformed values become
/// `None`: an event without usable times simply has no checks.
pub mod opt_hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(t: &Option<NaiveTime>, s: S) -> Result<S::Ok, S::Error> {
        match t {
            Some(t) => s.serialize_str(&super::format_time(*t)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveTime>, D::Error> {
        let raw = Option::<String>::deserialize(d)?;
        Ok(raw.as_deref().and_then(|s| {
            let parsed = super::parse_time(s);
            if parsed.is_none() && !s.trim().is_empty() {
                tracing::warn!(value = s, "Ignoring malformed event time");
            }
            parsed
        }))
    }
}
