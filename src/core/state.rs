//! Check lifecycle classification. Pure: the same inputs give the same state
//! on every client and on the server.

use crate::core::policy::CheckPolicy;
use crate::models::check::{CheckRecord, CheckSlot, CheckState, CheckStatus};
use chrono::NaiveDateTime;

/// Classify one obligation at `now`.
///
/// Persisted terminal states win over any time comparison. Without one, the
/// state follows the elapsed time since `scheduled_time`.
pub fn classify(
    slot: &CheckSlot,
    now: NaiveDateTime,
    record: Option<&CheckRecord>,
    policy: &CheckPolicy,
) -> CheckState {
    if let Some(rec) = record {
        if rec.status == CheckStatus::Missed {
            return CheckState::Missed;
        }
        if rec.completed_time.is_some() || rec.status == CheckStatus::Completed {
            return CheckState::Completed;
        }
    }

    let delta = now - slot.scheduled_time;

    if delta < chrono::Duration::zero() {
        CheckState::Upcoming
    } else if delta < policy.grace() {
        CheckState::Due
    } else if delta < policy.missed_after() {
        CheckState::Overdue
    } else {
        CheckState::Missed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::time::parse_datetime;

    fn slot() -> CheckSlot {
        CheckSlot {
            event_id: 1,
            index: 1,
            scheduled_time: parse_datetime("2025-03-10 09:00:00").unwrap(),
        }
    }

    fn at(hms: &str) -> NaiveDateTime {
        parse_datetime(&format!("2025-03-10 {hms}")).unwrap()
    }

    fn record(status: CheckStatus, completed: Option<&str>) -> CheckRecord {
        CheckRecord {
            event_id: 1,
            check_index: 1,
            status,
            completed_time: completed.map(at),
            completed_by: completed.map(|_| "alice".to_string()),
            updated_at: String::new(),
        }
    }

    #[test]
    fn thresholds_without_record() {
        let p = CheckPolicy::default();
        let s = slot();
        assert_eq!(classify(&s, at("08:59:59"), None, &p), CheckState::Upcoming);
        assert_eq!(classify(&s, at("09:00:00"), None, &p), CheckState::Due);
        assert_eq!(classify(&s, at("09:09:59"), None, &p), CheckState::Due);
        assert_eq!(classify(&s, at("09:10:00"), None, &p), CheckState::Overdue);
        assert_eq!(classify(&s, at("09:29:59"), None, &p), CheckState::Overdue);
        assert_eq!(classify(&s, at("09:30:00"), None, &p), CheckState::Missed);
    }

    #[test]
    fn terminal_records_win_over_time() {
        let p = CheckPolicy::default();
        let s = slot();

        let missed = record(CheckStatus::Missed, None);
        assert_eq!(classify(&s, at("08:00:00"), Some(&missed), &p), CheckState::Missed);

        let done = record(CheckStatus::Completed, Some("09:05:00"));
        assert_eq!(classify(&s, at("09:05:00"), Some(&done), &p), CheckState::Completed);
        assert_eq!(classify(&s, at("11:00:00"), Some(&done), &p), CheckState::Completed);
    }

    #[test]
    fn pending_record_falls_back_to_time() {
        let p = CheckPolicy::default();
        let pending = record(CheckStatus::Pending, None);
        assert_eq!(
            classify(&slot(), at("09:12:00"), Some(&pending), &p),
            CheckState::Overdue
        );
    }

    #[test]
    fn only_due_and_overdue_are_actionable() {
        assert!(CheckState::Due.is_actionable());
        assert!(CheckState::Overdue.is_actionable());
        assert!(!CheckState::Upcoming.is_actionable());
        assert!(!CheckState::Missed.is_actionable());
        assert!(!CheckState::Completed.is_actionable());
    }
}
