//! Room-name normalization and merged-room expansion.
//!
//! A merged room joins two physical rooms with `&`. The part after `&` is
//! either a full room name or a short numeric suffix that replaces the same
//! number of trailing digits of the first room: `"GH 1420&30"` stands for
//! `"GH 1420"` and `"GH 1430"`.

use regex::Regex;
use std::sync::LazyLock;

static TRAILING_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*?)([0-9]+)$").expect("static regex"));

fn normalize(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Expand a room name into its normalized base rooms.
pub fn expand_room(name: &str) -> Vec<String> {
    let mut parts = name.split('&').map(str::trim).filter(|p| !p.is_empty());

    let Some(first) = parts.next() else {
        return Vec::new();
    };

    let base = normalize(first);
    let mut out = vec![base.clone()];

    let base_digits = TRAILING_DIGITS
        .captures(&base)
        .map(|c| (c[1].to_string(), c[2].to_string()));

    for part in parts {
        let part = normalize(part);
        let expanded = match &base_digits {
            Some((prefix, digits))
                if part.chars().all(|c| c.is_ascii_digit()) && part.len() <= digits.len() =>
            {
                format!("{}{}{}", prefix, &digits[..digits.len() - part.len()], part)
            }
            _ => part,
        };

        if !out.contains(&expanded) {
            out.push(expanded);
        }
    }

    out
}

pub fn is_merged(name: &str) -> bool {
    name.contains('&')
}

/// True when any of `assigned` covers at least one base room of `event_room`.
pub fn rooms_cover(event_room: &str, assigned: &[String]) -> bool {
    let wanted = expand_room(event_room);
    if wanted.is_empty() {
        return false;
    }

    assigned
        .iter()
        .flat_map(|r| expand_room(r))
        .any(|r| wanted.contains(&r))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_suffix_replaces_trailing_digits() {
        assert_eq!(expand_room("GH 1420&30"), vec!["gh 1420", "gh 1430"]);
        assert_eq!(expand_room("Lab 7&8"), vec!["lab 7", "lab 8"]);
        assert_eq!(
            expand_room("GH 1420&30&40"),
            vec!["gh 1420", "gh 1430", "gh 1440"]
        );
    }

    #[test]
    fn full_names_are_taken_verbatim() {
        assert_eq!(expand_room("Hall A & Hall B"), vec!["hall a", "hall b"]);
        assert_eq!(expand_room("GH 1420&GH 1500"), vec!["gh 1420", "gh 1500"]);
        // suffix longer than the base number is not a suffix
        assert_eq!(expand_room("GH 14&300"), vec!["gh 14", "300"]);
    }

    #[test]
    fn non_ascii_digits_are_not_a_numeric_base() {
        assert_eq!(expand_room("Aula ١٤٢٠&3"), vec!["aula ١٤٢٠", "3"]);
        assert_eq!(expand_room("Aula ٤2&3"), vec!["aula ٤2", "aula ٤3"]);
        assert!(!rooms_cover("Aula ١٤٢٠&3", &["Aula ١٤٢3".to_string()]));
    }

    #[test]
    fn plain_rooms_normalize_only() {
        assert_eq!(expand_room("  GH   1420 "), vec!["gh 1420"]);
        assert!(expand_room("").is_empty());
        assert!(!is_merged("GH 1420"));
        assert!(is_merged("GH 1420&30"));
    }

    #[test]
    fn either_base_room_covers_a_merged_event() {
        assert!(rooms_cover("GH 1420&30", &["GH 1420".to_string()]));
        assert!(rooms_cover("GH 1420&30", &["gh 1430".to_string()]));
        assert!(rooms_cover("GH 1430", &["GH 1420&30".to_string()]));
        assert!(!rooms_cover("GH 1420&30", &["GH 1440".to_string()]));
        assert!(!rooms_cover("", &["GH 1420".to_string()]));
    }
}
