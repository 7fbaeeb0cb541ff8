//! Check schedule generation: one obligation every `interval` minutes from
//! the event start, as many as fit entirely in the event's duration.

use crate::models::check::CheckSlot;
use crate::models::event::Event;
use chrono::Duration;

/// Number of checks an event needs. Zero for malformed windows.
pub fn slot_count(event: &Event, interval_minutes: i64) -> u32 {
    if interval_minutes <= 0 {
        return 0;
    }
    let minutes = event.duration_minutes();
    u32::try_from(minutes / interval_minutes).unwrap_or(0)
}

/// All check slots of `event`, ordered by index.
pub fn generate_slots(event: &Event, interval_minutes: i64) -> Vec<CheckSlot> {
    let count = slot_count(event, interval_minutes);
    (1..=count)
        .filter_map(|i| slot_at(event, interval_minutes, i))
        .collect()
}

/// The slot with 1-based `index`, if the event has one.
pub fn slot_at(event: &Event, interval_minutes: i64, index: u32) -> Option<CheckSlot> {
    if index == 0 || index > slot_count(event, interval_minutes) {
        return None;
    }
    let (start, _) = event.window()?;

    Some(CheckSlot {
        event_id: event.id,
        index,
        scheduled_time: start + Duration::minutes(interval_minutes * (i64::from(index) - 1)),
    })
}
