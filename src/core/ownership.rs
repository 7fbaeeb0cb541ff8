//! Ownership resolution: who is responsible for an event, and when.

use crate::core::rooms::rooms_cover;
use crate::models::event::Event;
use crate::models::ownership::OwnershipEntry;
use crate::models::shift::ShiftBlock;
use chrono::NaiveDateTime;

/// Build the ownership timeline of `event` from the day's shift blocks.
///
/// Excluded event types never get an owner. A manual owner overrides shift
/// coverage for the whole window. Otherwise every assignment whose rooms
/// cover the event contributes its block interval clipped to the event;
/// same-owner pieces are merged and cross-owner overlaps go to the owner
/// whose coverage started first. Uncovered stretches stay as gaps.
pub fn resolve_ownership(
    event: &Event,
    blocks: &[ShiftBlock],
    excluded_types: &[String],
) -> Vec<OwnershipEntry> {
    if event.is_excluded_type(excluded_types) {
        return Vec::new();
    }

    let Some((ev_start, ev_end)) = event.window() else {
        return Vec::new();
    };

    if let Some(owner) = event.manual_owner.as_deref().map(str::trim)
        && !owner.is_empty()
    {
        return vec![OwnershipEntry {
            owner_id: owner.to_string(),
            effective_from: ev_start,
            effective_to: ev_end,
        }];
    }

    let mut pieces: Vec<OwnershipEntry> = Vec::new();
    for block in blocks.iter().filter(|b| b.date == event.date) {
        let Some((b_start, b_end)) = block.window() else {
            continue;
        };

        let from = b_start.max(ev_start);
        let to = b_end.min(ev_end);
        if from >= to {
            continue;
        }

        for a in &block.assignments {
            if rooms_cover(&event.room_name, &a.rooms) {
                pieces.push(OwnershipEntry {
                    owner_id: a.owner_id.clone(),
                    effective_from: from,
                    effective_to: to,
                });
            }
        }
    }

    let merged = merge_same_owner(pieces);
    let trimmed = trim_overlaps(merged);
    merge_adjacent(trimmed)
}

/// Union overlapping or touching intervals of the same owner.
fn merge_same_owner(mut pieces: Vec<OwnershipEntry>) -> Vec<OwnershipEntry> {
    pieces.sort_by(|a, b| {
        a.owner_id
            .cmp(&b.owner_id)
            .then(a.effective_from.cmp(&b.effective_from))
    });

    let mut out: Vec<OwnershipEntry> = Vec::new();
    for p in pieces {
        match out.last_mut() {
            Some(last) if last.owner_id == p.owner_id && p.effective_from <= last.effective_to => {
                last.effective_to = last.effective_to.max(p.effective_to);
            }
            _ => out.push(p),
        }
    }
    out
}

/// Make the timeline non-overlapping: an entry keeps its interval until the
/// next one, which starts no earlier than where the previous ended.
/// Ties on the start instant go to the longer coverage, then to owner id.
fn trim_overlaps(mut entries: Vec<OwnershipEntry>) -> Vec<OwnershipEntry> {
    entries.sort_by(|a, b| {
        a.effective_from
            .cmp(&b.effective_from)
            .then(b.effective_to.cmp(&a.effective_to))
            .then(a.owner_id.cmp(&b.owner_id))
    });

    let mut out: Vec<OwnershipEntry> = Vec::new();
    let mut cursor: Option<NaiveDateTime> = None;

    for mut e in entries {
        if let Some(c) = cursor
            && e.effective_from < c
        {
            e.effective_from = c;
        }
        if e.effective_from >= e.effective_to {
            continue;
        }
        cursor = Some(e.effective_to);
        out.push(e);
    }
    out
}

/// Join consecutive entries of the same owner that touch after trimming.
fn merge_adjacent(entries: Vec<OwnershipEntry>) -> Vec<OwnershipEntry> {
    let mut out: Vec<OwnershipEntry> = Vec::new();
    for e in entries {
        match out.last_mut() {
            Some(last) if last.owner_id == e.owner_id && last.effective_to == e.effective_from => {
                last.effective_to = e.effective_to;
            }
            _ => out.push(e),
        }
    }
    out
}

/// The owner responsible at `at`, if any.
pub fn owner_at(timeline: &[OwnershipEntry], at: NaiveDateTime) -> Option<&str> {
    timeline
        .iter()
        .find(|e| e.covers(at))
        .map(|e| e.owner_id.as_str())
}

pub fn is_owner_at(timeline: &[OwnershipEntry], user: &str, at: NaiveDateTime) -> bool {
    owner_at(timeline, at) == Some(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::shift::Assignment;
    use crate::utils::time::parse_datetime;
    use chrono::{NaiveDate, NaiveTime};

    fn t(s: &str) -> NaiveTime {
        NaiveTime::parse_from_str(s, "%H:%M").unwrap()
    }

    fn dt(s: &str) -> NaiveDateTime {
        parse_datetime(&format!("2025-03-10 {s}")).unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    fn event(room: &str, start: &str, end: &str) -> Event {
        Event {
            id: 1,
            date: date(),
            start_time: Some(t(start)),
            end_time: Some(t(end)),
            room_name: room.into(),
            event_type: "lecture".into(),
            requires_check: true,
            manual_owner: None,
        }
    }

    fn block(id: i64, start: &str, end: &str, owner: &str, rooms: &[&str]) -> ShiftBlock {
        ShiftBlock {
            id,
            date: date(),
            start_time: t(start),
            end_time: t(end),
            assignments: vec![Assignment {
                owner_id: owner.into(),
                rooms: rooms.iter().map(|r| r.to_string()).collect(),
            }],
        }
    }

    fn entry(owner: &str, from: &str, to: &str) -> OwnershipEntry {
        OwnershipEntry {
            owner_id: owner.into(),
            effective_from: dt(from),
            effective_to: dt(to),
        }
    }

    #[test]
    fn merged_room_is_covered_by_a_base_room_assignment() {
        let ev = event("GH 1420&30", "09:00", "11:00");
        let blocks = vec![block(1, "08:00", "12:00", "A", &["GH 1420"])];
        assert_eq!(
            resolve_ownership(&ev, &blocks, &[]),
            vec![entry("A", "09:00", "11:00")]
        );
    }

    #[test]
    fn adjacent_blocks_hand_off_at_the_boundary() {
        let ev = event("GH 1420", "09:00", "11:00");
        let blocks = vec![
            block(1, "08:00", "10:00", "A", &["GH 1420"]),
            block(2, "10:00", "12:00", "B", &["GH 1420"]),
        ];
        let tl = resolve_ownership(&ev, &blocks, &[]);
        assert_eq!(
            tl,
            vec![entry("A", "09:00", "10:00"), entry("B", "10:00", "11:00")]
        );
        assert!(is_owner_at(&tl, "A", dt("09:59")));
        assert!(is_owner_at(&tl, "B", dt("10:00")));
        assert!(!is_owner_at(&tl, "A", dt("10:00")));
    }

    #[test]
    fn same_owner_blocks_are_merged() {
        let ev = event("GH 1420", "09:00", "12:00");
        let blocks = vec![
            block(1, "08:00", "10:00", "A", &["GH 1420"]),
            block(2, "10:00", "11:00", "A", &["GH 1420"]),
            block(3, "10:30", "13:00", "A", &["GH 1420"]),
        ];
        assert_eq!(
            resolve_ownership(&ev, &blocks, &[]),
            vec![entry("A", "09:00", "12:00")]
        );
    }

    #[test]
    fn uncovered_time_is_a_gap() {
        let ev = event("GH 1420", "09:00", "12:00");
        let blocks = vec![
            block(1, "09:00", "10:00", "A", &["GH 1420"]),
            block(2, "11:00", "12:00", "B", &["GH 1420"]),
            block(3, "09:00", "12:00", "C", &["Other Room"]),
        ];
        let tl = resolve_ownership(&ev, &blocks, &[]);
        assert_eq!(
            tl,
            vec![entry("A", "09:00", "10:00"), entry("B", "11:00", "12:00")]
        );
        assert_eq!(owner_at(&tl, dt("10:30")), None);
    }

    #[test]
    fn overlapping_owners_never_overlap_in_the_timeline() {
        let ev = event("GH 1420", "09:00", "12:00");
        let blocks = vec![
            block(1, "09:00", "11:00", "A", &["GH 1420"]),
            block(2, "10:00", "12:00", "B", &["GH 1420"]),
        ];
        assert_eq!(
            resolve_ownership(&ev, &blocks, &[]),
            vec![entry("A", "09:00", "11:00"), entry("B", "11:00", "12:00")]
        );
    }

    #[test]
    fn manual_owner_overrides_and_excluded_types_are_unowned() {
        let mut ev = event("GH 1420", "09:00", "10:00");
        ev.manual_owner = Some("M".into());
        let blocks = vec![block(1, "08:00", "12:00", "A", &["GH 1420"])];
        let excluded = vec!["external".to_string()];

        assert_eq!(
            resolve_ownership(&ev, &blocks, &excluded),
            vec![entry("M", "09:00", "10:00")]
        );

        ev.event_type = "External".into();
        assert!(resolve_ownership(&ev, &blocks, &excluded).is_empty());

        ev.manual_owner = None;
        assert!(resolve_ownership(&ev, &blocks, &excluded).is_empty());
    }

    #[test]
    fn blocks_on_other_dates_are_ignored() {
        let ev = event("GH 1420", "09:00", "10:00");
        let mut b = block(1, "08:00", "12:00", "A", &["GH 1420"]);
        b.date = NaiveDate::from_ymd_opt(2025, 3, 11).unwrap();
        assert!(resolve_ownership(&ev, &[b], &[]).is_empty());
    }
}
