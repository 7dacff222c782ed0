//! Cleaning overlap validation.
//!
//! Gates every cleaning mutation (drag, resize, create, assign) against
//! double-booking. A candidate cleaning conflicts with an existing
//! cleaning when they share a cleaner or a property and their windows
//! strictly overlap.
//!
//! # Rules
//! - Only cleaning events are checked; reservations never conflict.
//! - The candidate's own ID is skipped, so an updated event is compared
//!   against everything except its previous version.
//! - Unset cleaner or property IDs never match.
//! - Windows that touch at an endpoint do not overlap.
//!
//! # Complexity
//! O(n) in the number of existing events. The result does not depend on
//! the order of the input.

use serde::{Deserialize, Serialize};

use crate::models::{ScheduleEvent, TimeWindow};

/// Why two cleanings conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictReason {
    /// Same cleaner, different property.
    SameCleaner,
    /// Same property, different (or no) cleaner.
    SameProperty,
    /// Same cleaner at the same property.
    SameCleanerAndProperty,
}

/// An existing cleaning that blocks a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    /// ID of the existing cleaning.
    pub event_id: String,
    /// Shared resource.
    pub reason: ConflictReason,
    /// Window of the existing cleaning.
    pub window: TimeWindow,
}

/// Whether two windows overlap (strict half-open semantics).
///
/// # Example
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use turnover_schedule::conflict::overlaps;
/// use turnover_schedule::models::TimeWindow;
///
/// let h = |h| Utc.with_ymd_and_hms(2024, 1, 5, h, 0, 0).unwrap();
/// assert!(!overlaps(&TimeWindow::new(h(10), h(20)), &TimeWindow::new(h(20), h(22))));
/// assert!(overlaps(&TimeWindow::new(h(10), h(21)), &TimeWindow::new(h(20), h(22))));
/// ```
#[inline]
pub fn overlaps(a: &TimeWindow, b: &TimeWindow) -> bool {
    a.overlaps(b)
}

fn shared(a: Option<&str>, b: Option<&str>) -> bool {
    matches!((a, b), (Some(x), Some(y)) if !x.is_empty() && x == y)
}

/// Lists every existing cleaning that blocks `next`.
///
/// Returns an empty list when `next` is not a cleaning.
pub fn find_conflicts(next: &ScheduleEvent, all: &[ScheduleEvent]) -> Vec<Conflict> {
    if !next.is_cleaning() {
        return Vec::new();
    }

    all.iter()
        .filter(|ev| ev.id != next.id && ev.is_cleaning())
        .filter_map(|ev| {
            let same_cleaner = shared(next.cleaner_id.as_deref(), ev.cleaner_id.as_deref());
            let same_property = shared(next.property_id.as_deref(), ev.property_id.as_deref());

            let reason = match (same_cleaner, same_property) {
                (true, true) => ConflictReason::SameCleanerAndProperty,
                (true, false) => ConflictReason::SameCleaner,
                (false, true) => ConflictReason::SameProperty,
                (false, false) => return None,
            };

            next.window.overlaps(&ev.window).then(|| Conflict {
                event_id: ev.id.clone(),
                reason,
                window: ev.window,
            })
        })
        .collect()
}

/// Decides whether `next` may be committed against `all`.
///
/// Returns `false` iff some other cleaning in `all` shares a cleaner or a
/// property with `next` and strictly overlaps it.
///
/// # Example
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use turnover_schedule::conflict::validate_no_overlap;
/// use turnover_schedule::models::{ScheduleEvent, TimeWindow};
///
/// let h = |h| Utc.with_ymd_and_hms(2024, 1, 5, h, 0, 0).unwrap();
/// let a = ScheduleEvent::cleaning("A", "p1", TimeWindow::new(h(10), h(12))).with_cleaner("c1");
/// let b = ScheduleEvent::cleaning("B", "p2", TimeWindow::new(h(11), h(13))).with_cleaner("c1");
/// assert!(!validate_no_overlap(&b, &[a]));
/// ```
pub fn validate_no_overlap(next: &ScheduleEvent, all: &[ScheduleEvent]) -> bool {
    find_conflicts(next, all).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventKind, Reservation};
    use chrono::{DateTime, TimeZone, Utc};

    fn h(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 5, hour, 0, 0).unwrap()
    }

    fn cleaning(id: &str, start: u32, end: u32, cleaner: Option<&str>, property: &str) -> ScheduleEvent {
        let ev = ScheduleEvent::cleaning(id, property, TimeWindow::new(h(start), h(end)));
        match cleaner {
            Some(c) => ev.with_cleaner(c),
            None => ev,
        }
    }

    #[test]
    fn test_overlap_symmetry_and_touching() {
        let a = TimeWindow::new(h(10), h(20));
        let b = TimeWindow::new(h(20), h(23));
        let c = TimeWindow::new(h(10), h(21));
        assert!(!overlaps(&a, &b));
        assert!(overlaps(&c, &b));
        assert_eq!(overlaps(&a, &c), overlaps(&c, &a));
    }

    #[test]
    fn test_rejects_same_cleaner() {
        let a = cleaning("A", 10, 12, Some("c1"), "p1");
        let b = cleaning("B", 11, 13, Some("c1"), "p2");
        assert!(!validate_no_overlap(&b, &[a]));
    }

    #[test]
    fn test_rejects_same_property() {
        let a = cleaning("A", 10, 12, Some("c1"), "p1");
        let b = cleaning("B", 11, 13, Some("c2"), "p1");
        let conflicts = find_conflicts(&b, &[a]);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].reason, ConflictReason::SameProperty);
    }

    #[test]
    fn test_rejects_same_property_when_unassigned() {
        let a = cleaning("A", 10, 12, None, "p1");
        let b = cleaning("B", 11, 13, None, "p1");
        assert!(!validate_no_overlap(&b, &[a]));
    }

    #[test]
    fn test_accepts_disjoint_resources() {
        let a = cleaning("A", 10, 12, Some("c1"), "p1");
        let b = cleaning("B", 11, 13, Some("c2"), "p2");
        assert!(validate_no_overlap(&b, &[a]));
    }

    #[test]
    fn test_accepts_touching_same_cleaner() {
        let a = cleaning("A", 9, 10, Some("c1"), "p1");
        let b = cleaning("B", 10, 11, Some("c1"), "p1");
        assert!(validate_no_overlap(&b, &[a]));
    }

    #[test]
    fn test_unassigned_cleaners_do_not_match() {
        let a = cleaning("A", 10, 12, None, "p1");
        let b = cleaning("B", 11, 13, None, "p2");
        assert!(validate_no_overlap(&b, &[a]));
    }

    #[test]
    fn test_empty_ids_do_not_match() {
        let a = cleaning("A", 10, 12, Some(""), "p1");
        let b = cleaning("B", 11, 13, Some(""), "p2");
        assert!(validate_no_overlap(&b, &[a]));
    }

    #[test]
    fn test_skips_own_id() {
        // Resizing A: its previous version must not block it
        let before = cleaning("A", 10, 12, Some("c1"), "p1");
        let after = cleaning("A", 10, 14, Some("c1"), "p1");
        assert!(validate_no_overlap(&after, &[before]));
    }

    #[test]
    fn test_reservations_never_conflict() {
        let stay = Reservation::new("r1", "p1", h(8), h(20));
        let stay_ev = ScheduleEvent::from_reservation(&stay, None);
        let b = cleaning("B", 10, 12, None, "p1");
        assert!(validate_no_overlap(&b, &[stay_ev.clone()]));

        // A reservation candidate is always accepted
        let a = cleaning("A", 10, 12, None, "p1");
        assert_eq!(stay_ev.kind, EventKind::Reservation);
        assert!(validate_no_overlap(&stay_ev, &[a]));
    }

    #[test]
    fn test_reports_every_conflict_with_reason() {
        let all = vec![
            cleaning("A", 10, 12, Some("c1"), "p1"),
            cleaning("B", 11, 12, Some("c9"), "p2"),
            cleaning("C", 9, 11, Some("c2"), "p3"),
            cleaning("D", 13, 14, Some("c1"), "p2"),
        ];
        let next = cleaning("N", 10, 13, Some("c1"), "p2");

        let conflicts = find_conflicts(&next, &all);
        let ids: Vec<(&str, ConflictReason)> = conflicts
            .iter()
            .map(|c| (c.event_id.as_str(), c.reason))
            .collect();
        assert_eq!(
            ids,
            vec![
                ("A", ConflictReason::SameCleaner),
                ("B", ConflictReason::SameProperty),
            ]
        );
    }

    #[test]
    fn test_same_cleaner_and_property_reason() {
        let a = cleaning("A", 10, 12, Some("c1"), "p1");
        let b = cleaning("B", 11, 13, Some("c1"), "p1");
        let conflicts = find_conflicts(&b, &[a]);
        assert_eq!(conflicts[0].reason, ConflictReason::SameCleanerAndProperty);
    }

    #[test]
    fn test_order_independent() {
        let mut all = vec![
            cleaning("A", 10, 12, Some("c1"), "p1"),
            cleaning("B", 14, 16, Some("c2"), "p2"),
            cleaning("C", 12, 13, Some("c3"), "p3"),
        ];
        let next = cleaning("N", 11, 15, Some("c2"), "p9");
        let forward = validate_no_overlap(&next, &all);
        all.reverse();
        assert_eq!(forward, validate_no_overlap(&next, &all));
        assert!(!forward);
    }
}
