// src/export/range.rs

use crate::errors::{AppError, AppResult};
use chrono::{Datelike, NaiveDate};

fn invalid(what: &str, raw: &str) -> AppError {
    AppError::Validation(format!("{what} in --range: '{raw}'"))
}

/// Parse one side of a range into its first and last day.
///
/// - `YYYY` covers the whole year
/// - `YYYY-MM` covers the month
/// - `YYYY-MM-DD` is a single day
fn parse_period(raw: &str) -> AppResult<(NaiveDate, NaiveDate)> {
    match raw.len() {
        4 => {
            let y: i32 = raw.parse().map_err(|_| invalid("invalid year", raw))?;
            let first = NaiveDate::from_ymd_opt(y, 1, 1).ok_or_else(|| invalid("invalid year", raw))?;
            let last = NaiveDate::from_ymd_opt(y, 12, 31).ok_or_else(|| invalid("invalid year", raw))?;
            Ok((first, last))
        }
        7 => {
            let first = NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d")
                .map_err(|_| invalid("invalid month", raw))?;
            Ok((first, month_last_day(first)))
        }
        10 => {
            let d = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|_| invalid("invalid date", raw))?;
            Ok((d, d))
        }
        _ => Err(invalid("unsupported format", raw)),
    }
}

fn month_last_day(first: NaiveDate) -> NaiveDate {
    let (y, m) = if first.month() == 12 {
        (first.year() + 1, 1)
    } else {
        (first.year(), first.month() + 1)
    };
    NaiveDate::from_ymd_opt(y, m, 1)
        .and_then(|d| d.pred_opt())
        .unwrap_or(first)
}

/// Parse `--range`: a single period or `start:end` of the same shape.
pub fn parse_range(r: &str) -> AppResult<(NaiveDate, NaiveDate)> {
    let Some((start_raw, end_raw)) = r.split_once(':') else {
        return parse_period(r.trim());
    };

    let (start, end) = (start_raw.trim(), end_raw.trim());
    if start.len() != end.len() {
        return Err(invalid("start and end must have the same format", r));
    }

    let (from, _) = parse_period(start)?;
    let (_, to) = parse_period(end)?;
    if to < from {
        return Err(invalid("end before start", r));
    }
    Ok((from, to))
}
