//! Turnover cleaning derivation.
//!
//! A turnover is the cleaning that must happen between one guest's
//! check-out and the next guest's check-in at the same property.
//!
//! # Modes
//!
//! - **Paired**: consecutive stays `prev`, `next` give the window
//!   `[prev.end, next.start)`. No minimum duration is enforced.
//! - **Fixed**: a single stay `r` gives `[r.end, r.end + duration)`,
//!   240 minutes by default.
//!
//! # Identity
//! Derived cleanings get deterministic IDs (`turn_{prev}_{next}` and
//! `clean_{r}`), so re-deriving the same reservations never creates
//! duplicates.
//!
//! # Degenerate Windows
//! When `prev.end >= next.start` the paired window has zero or negative
//! length. [`DegenerateWindowPolicy`] decides whether such pairs are
//! rejected or clamped to a zero-length window; either way they are
//! flagged, never emitted with a negative duration.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::config::{DegenerateWindowPolicy, SchedulerConfig, DEFAULT_TURNOVER_MINUTES};
use crate::error::{ScheduleError, ScheduleResult};
use crate::models::{Cleaning, CleaningKind, Reservation, TimeWindow};

/// The raw paired window `[prev.end, next.start)`.
///
/// May be degenerate; see [`TimeWindow::is_degenerate`].
#[inline]
pub fn paired_window(prev: &Reservation, next: &Reservation) -> TimeWindow {
    TimeWindow::new(prev.window.end, next.window.start)
}

/// ID of the turnover between two stays.
pub fn turnover_id(prev_id: &str, next_id: &str) -> String {
    format!("turn_{prev_id}_{next_id}")
}

/// ID of the fixed-duration turnover after a stay.
pub fn fixed_turnover_id(reservation_id: &str) -> String {
    format!("clean_{reservation_id}")
}

/// A derived turnover cleaning.
#[derive(Debug, Clone, PartialEq)]
pub struct Turnover {
    /// The pending, unassigned cleaning.
    pub cleaning: Cleaning,
    /// Whether the window was clamped from a degenerate one.
    pub clamped: bool,
}

/// What happened to a degenerate pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagAction {
    /// No cleaning was emitted.
    Skipped,
    /// A zero-length cleaning was emitted.
    Clamped,
}

/// A consecutive pair whose turnover window was degenerate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlaggedTurnover {
    /// Property of both stays.
    pub property_id: String,
    /// Earlier stay.
    pub prev_id: String,
    /// Later stay.
    pub next_id: String,
    /// The unclamped window `[prev.end, next.start)`.
    pub window: TimeWindow,
    /// How the pair was handled.
    pub action: FlagAction,
}

/// Turnovers derived from a reservation list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TurnoverPlan {
    /// Derived cleanings, ordered by property ID then start.
    pub cleanings: Vec<Cleaning>,
    /// Degenerate pairs, in the same order.
    pub flagged: Vec<FlaggedTurnover>,
}

impl TurnoverPlan {
    /// Whether any pair was flagged.
    pub fn has_flags(&self) -> bool {
        !self.flagged.is_empty()
    }
}

enum Resolved {
    Window { window: TimeWindow, clamped: bool },
    Rejected,
}

/// Derives turnover cleanings from reservations.
///
/// Stateless apart from its settings; never mutates its inputs and never
/// assigns a cleaner.
///
/// # Example
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use turnover_schedule::models::{CleaningKind, Reservation};
/// use turnover_schedule::turnover::TurnoverDeriver;
///
/// let r1 = Reservation::new(
///     "r1", "p1",
///     Utc.with_ymd_and_hms(2024, 1, 1, 16, 0, 0).unwrap(),
///     Utc.with_ymd_and_hms(2024, 1, 5, 10, 0, 0).unwrap(),
/// );
/// let r2 = Reservation::new(
///     "r2", "p1",
///     Utc.with_ymd_and_hms(2024, 1, 8, 16, 0, 0).unwrap(),
///     Utc.with_ymd_and_hms(2024, 1, 10, 10, 0, 0).unwrap(),
/// );
///
/// let turnover = TurnoverDeriver::new().between(&r1, &r2).unwrap();
/// assert_eq!(turnover.cleaning.kind, CleaningKind::Turnover);
/// assert_eq!(turnover.cleaning.window.start, r1.window.end);
/// assert_eq!(turnover.cleaning.window.end, r2.window.start);
/// assert_eq!(turnover.cleaning.reservation_id.as_deref(), Some("r2"));
/// ```
#[derive(Debug, Clone)]
pub struct TurnoverDeriver {
    default_duration: Duration,
    policy: DegenerateWindowPolicy,
}

impl TurnoverDeriver {
    /// Creates a deriver with a 240-minute fixed duration and the
    /// `Reject` policy.
    pub fn new() -> Self {
        Self {
            default_duration: Duration::minutes(DEFAULT_TURNOVER_MINUTES),
            policy: DegenerateWindowPolicy::default(),
        }
    }

    /// Creates a deriver from configuration.
    ///
    /// # Errors
    ///
    /// [`ScheduleError::Config`] if the configured turnover length is out
    /// of range.
    pub fn from_config(config: &SchedulerConfig) -> ScheduleResult<Self> {
        Ok(Self {
            default_duration: config.turnover_duration()?,
            policy: config.degenerate_policy,
        })
    }

    /// Sets the fixed-mode duration.
    ///
    /// # Errors
    ///
    /// [`ScheduleError::Config`] if `duration` is not positive.
    pub fn with_default_duration(mut self, duration: Duration) -> ScheduleResult<Self> {
        if duration <= Duration::zero() {
            return Err(ScheduleError::Config {
                message: format!("turnover duration must be positive, got {duration}"),
            });
        }
        self.default_duration = duration;
        Ok(self)
    }

    /// Sets the degenerate window policy.
    pub fn with_policy(mut self, policy: DegenerateWindowPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Fixed-mode duration.
    pub fn default_duration(&self) -> Duration {
        self.default_duration
    }

    /// Fixed mode: a turnover of the default duration right after check-out.
    pub fn after(&self, reservation: &Reservation) -> Cleaning {
        let window = TimeWindow::starting_at(reservation.window.end, self.default_duration);
        debug!(reservation_id = %reservation.id, start = %window.start, end = %window.end, "derived fixed turnover");
        turnover_cleaning(
            fixed_turnover_id(&reservation.id),
            reservation,
            window,
        )
    }

    /// Paired mode: the turnover between two consecutive stays.
    ///
    /// # Errors
    /// - [`ScheduleError::PropertyMismatch`] if the stays are at different
    ///   properties.
    /// - [`ScheduleError::DegenerateWindow`] if `prev.end >= next.start`
    ///   under the `Reject` policy.
    pub fn between(&self, prev: &Reservation, next: &Reservation) -> ScheduleResult<Turnover> {
        if prev.property_id != next.property_id {
            return Err(ScheduleError::PropertyMismatch {
                prev_id: prev.id.clone(),
                next_id: next.id.clone(),
            });
        }

        match self.resolve(prev, next) {
            Resolved::Window { window, clamped } => {
                debug!(prev_id = %prev.id, next_id = %next.id, clamped, "derived paired turnover");
                Ok(Turnover {
                    cleaning: turnover_cleaning(turnover_id(&prev.id, &next.id), next, window),
                    clamped,
                })
            }
            Resolved::Rejected => Err(ScheduleError::DegenerateWindow {
                prev_id: prev.id.clone(),
                next_id: next.id.clone(),
                check_out: prev.window.end,
                check_in: next.window.start,
            }),
        }
    }

    /// Derives a turnover for every consecutive pair of stays per property.
    ///
    /// Cancelled stays are ignored. Within a property, stays are ordered by
    /// check-in then ID. Degenerate pairs are reported in
    /// [`TurnoverPlan::flagged`].
    pub fn derive_all(&self, reservations: &[Reservation]) -> TurnoverPlan {
        let mut by_property: BTreeMap<&str, Vec<&Reservation>> = BTreeMap::new();
        for r in reservations.iter().filter(|r| !r.is_cancelled()) {
            by_property.entry(r.property_id.as_str()).or_default().push(r);
        }

        let mut plan = TurnoverPlan::default();
        for (property_id, mut stays) in by_property {
            stays.sort_by(|a, b| {
                a.window
                    .start
                    .cmp(&b.window.start)
                    .then_with(|| a.id.cmp(&b.id))
            });

            for pair in stays.windows(2) {
                let (prev, next) = (pair[0], pair[1]);
                let raw = paired_window(prev, next);
                let flag = |action| FlaggedTurnover {
                    property_id: property_id.to_string(),
                    prev_id: prev.id.clone(),
                    next_id: next.id.clone(),
                    window: raw,
                    action,
                };

                match self.resolve(prev, next) {
                    Resolved::Window { window, clamped } => {
                        if clamped {
                            plan.flagged.push(flag(FlagAction::Clamped));
                        }
                        plan.cleanings.push(turnover_cleaning(
                            turnover_id(&prev.id, &next.id),
                            next,
                            window,
                        ));
                    }
                    Resolved::Rejected => plan.flagged.push(flag(FlagAction::Skipped)),
                }
            }
        }

        debug!(
            derived = plan.cleanings.len(),
            flagged = plan.flagged.len(),
            "derived turnover plan"
        );
        plan
    }

    fn resolve(&self, prev: &Reservation, next: &Reservation) -> Resolved {
        let window = paired_window(prev, next);
        if !window.is_degenerate() {
            return Resolved::Window {
                window,
                clamped: false,
            };
        }

        warn!(
            property_id = %prev.property_id,
            prev_id = %prev.id,
            next_id = %next.id,
            check_out = %window.start,
            check_in = %window.end,
            policy = ?self.policy,
            "degenerate turnover window"
        );
        match self.policy {
            DegenerateWindowPolicy::Reject => Resolved::Rejected,
            DegenerateWindowPolicy::Clamp => Resolved::Window {
                window: TimeWindow::new(window.start, window.start),
                clamped: true,
            },
        }
    }
}

impl Default for TurnoverDeriver {
    fn default() -> Self {
        Self::new()
    }
}

fn turnover_cleaning(id: String, trigger: &Reservation, window: TimeWindow) -> Cleaning {
    Cleaning::new(
        id,
        trigger.property_id.clone(),
        CleaningKind::Turnover,
        window.start,
        window.end,
    )
    .with_reservation(trigger.id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CleaningStatus, ReservationStatus};
    use chrono::{DateTime, TimeZone, Utc};

    fn t(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap()
    }

    fn stay(id: &str, property: &str, check_in: DateTime<Utc>, check_out: DateTime<Utc>) -> Reservation {
        Reservation::new(id, property, check_in, check_out)
    }

    #[test]
    fn test_paired_end_to_end() {
        let r1 = stay("r1", "p1", t(1, 16), t(5, 10));
        let r2 = stay("r2", "p1", t(8, 16), t(10, 10));

        let turnover = TurnoverDeriver::new().between(&r1, &r2).unwrap();
        let c = &turnover.cleaning;
        assert_eq!(c.window.start, Utc.with_ymd_and_hms(2024, 1, 5, 10, 0, 0).unwrap());
        assert_eq!(c.window.end, Utc.with_ymd_and_hms(2024, 1, 8, 16, 0, 0).unwrap());
        assert_eq!(c.kind, CleaningKind::Turnover);
        assert_eq!(c.property_id, "p1");
        assert_eq!(c.reservation_id.as_deref(), Some("r2"));
        assert_eq!(c.status, CleaningStatus::Pending);
        assert!(c.cleaner_id.is_none());
        assert!(!turnover.clamped);
    }

    #[test]
    fn test_paired_is_idempotent() {
        let r1 = stay("r1", "p1", t(1, 16), t(5, 10));
        let r2 = stay("r2", "p1", t(8, 16), t(10, 10));
        let deriver = TurnoverDeriver::new();

        let a = deriver.between(&r1, &r2).unwrap();
        let b = deriver.between(&r1, &r2).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.cleaning.id, "turn_r1_r2");
    }

    #[test]
    fn test_fixed_mode() {
        let r = stay("r1", "p1", t(1, 16), t(5, 10));
        let c = TurnoverDeriver::new().after(&r);
        assert_eq!(c.id, "clean_r1");
        assert_eq!(c.window.start, t(5, 10));
        assert_eq!(c.window.end, t(5, 14));
        assert_eq!(c.reservation_id.as_deref(), Some("r1"));
        assert_eq!(c.kind, CleaningKind::Turnover);

        let short = TurnoverDeriver::new()
            .with_default_duration(Duration::minutes(90))
            .unwrap();
        assert_eq!(short.after(&r).window.duration(), Duration::minutes(90));
    }

    #[test]
    fn test_from_config_duration() {
        let config = SchedulerConfig::default().with_turnover_minutes(120);
        let deriver = TurnoverDeriver::from_config(&config).unwrap();
        assert_eq!(deriver.default_duration(), Duration::hours(2));
    }

    #[test]
    fn test_out_of_range_duration_rejected() {
        let huge = SchedulerConfig::default().with_turnover_minutes(i64::MAX);
        assert!(matches!(
            TurnoverDeriver::from_config(&huge),
            Err(ScheduleError::Config { .. })
        ));

        for bad in [Duration::minutes(-60), Duration::zero()] {
            assert!(matches!(
                TurnoverDeriver::new().with_default_duration(bad),
                Err(ScheduleError::Config { .. })
            ));
        }

        // Stock default is always positive
        let r = stay("r1", "p1", t(1, 16), t(5, 10));
        let cleaning = TurnoverDeriver::new().after(&r);
        assert!(cleaning.window.start < cleaning.window.end);
    }

    #[test]
    fn test_property_mismatch() {
        let r1 = stay("r1", "p1", t(1, 16), t(5, 10));
        let r2 = stay("r2", "p2", t(8, 16), t(10, 10));
        assert!(matches!(
            TurnoverDeriver::new().between(&r1, &r2),
            Err(ScheduleError::PropertyMismatch { .. })
        ));
    }

    #[test]
    fn test_back_to_back_rejected() {
        let r1 = stay("r1", "p1", t(1, 16), t(5, 10));
        let r2 = stay("r2", "p1", t(5, 10), t(7, 10));
        let err = TurnoverDeriver::new().between(&r1, &r2).unwrap_err();
        assert!(matches!(err, ScheduleError::DegenerateWindow { ref prev_id, .. } if prev_id == "r1"));
    }

    #[test]
    fn test_overlapping_stays_clamped() {
        let r1 = stay("r1", "p1", t(1, 16), t(5, 10));
        let r2 = stay("r2", "p1", t(4, 16), t(7, 10));
        let deriver = TurnoverDeriver::new().with_policy(DegenerateWindowPolicy::Clamp);

        let turnover = deriver.between(&r1, &r2).unwrap();
        assert!(turnover.clamped);
        assert_eq!(turnover.cleaning.window.start, t(5, 10));
        assert_eq!(turnover.cleaning.window.end, t(5, 10));
        assert_eq!(turnover.cleaning.window.duration(), Duration::zero());
    }

    #[test]
    fn test_derive_all_groups_and_orders() {
        let reservations = vec![
            stay("b2", "p2", t(9, 16), t(11, 10)),
            stay("a2", "p1", t(8, 16), t(10, 10)),
            stay("b1", "p2", t(2, 16), t(4, 10)),
            stay("a1", "p1", t(1, 16), t(5, 10)),
            stay("a3", "p1", t(12, 16), t(14, 10)),
            stay("solo", "p3", t(1, 16), t(3, 10)),
        ];

        let plan = TurnoverDeriver::new().derive_all(&reservations);
        let ids: Vec<&str> = plan.cleanings.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["turn_a1_a2", "turn_a2_a3", "turn_b1_b2"]);
        assert!(!plan.has_flags());

        // Re-deriving yields the same plan
        assert_eq!(plan, TurnoverDeriver::new().derive_all(&reservations));
    }

    #[test]
    fn test_derive_all_skips_cancelled() {
        let reservations = vec![
            stay("r1", "p1", t(1, 16), t(3, 10)),
            stay("r2", "p1", t(4, 16), t(6, 10)).with_status(ReservationStatus::Cancelled),
            stay("r3", "p1", t(8, 16), t(10, 10)),
        ];

        let plan = TurnoverDeriver::new().derive_all(&reservations);
        assert_eq!(plan.cleanings.len(), 1);
        assert_eq!(plan.cleanings[0].id, "turn_r1_r3");
        assert_eq!(plan.cleanings[0].window, TimeWindow::new(t(3, 10), t(8, 16)));
    }

    #[test]
    fn test_derive_all_flags_degenerate_pairs() {
        let reservations = vec![
            stay("r1", "p1", t(1, 16), t(5, 10)),
            stay("r2", "p1", t(5, 10), t(7, 10)),
            stay("r3", "p1", t(8, 16), t(10, 10)),
        ];

        let rejected = TurnoverDeriver::new().derive_all(&reservations);
        assert_eq!(rejected.cleanings.len(), 1);
        assert_eq!(rejected.cleanings[0].id, "turn_r2_r3");
        assert_eq!(rejected.flagged.len(), 1);
        assert_eq!(rejected.flagged[0].action, FlagAction::Skipped);
        assert_eq!(rejected.flagged[0].prev_id, "r1");

        let clamped = TurnoverDeriver::new()
            .with_policy(DegenerateWindowPolicy::Clamp)
            .derive_all(&reservations);
        assert_eq!(clamped.cleanings.len(), 2);
        assert_eq!(clamped.flagged[0].action, FlagAction::Clamped);
        assert!(clamped.cleanings.iter().all(|c| !c.window.is_inverted()));
    }

    #[test]
    fn test_does_not_mutate_inputs() {
        let reservations = vec![
            stay("r1", "p1", t(8, 16), t(10, 10)),
            stay("r0", "p1", t(1, 16), t(5, 10)),
        ];
        let before = reservations.clone();
        let _ = TurnoverDeriver::new().derive_all(&reservations);
        assert_eq!(reservations, before);
    }
}
