//! Structural validation of schedule snapshots.
//!
//! Checks a snapshot before it is loaded into a
//! [`ScheduleStore`](crate::store::ScheduleStore). Detects:
//! - Duplicate IDs
//! - References to unknown properties, cleaners or reservations
//! - Inverted time windows
//!
//! Overlapping cleanings are not reported here; that is the job of the
//! [`conflict`](crate::conflict) validator at commit time.

use crate::models::Snapshot;
use std::collections::HashSet;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two records of the same type share an ID.
    DuplicateId,
    /// A reservation or cleaning references a property that doesn't exist.
    UnknownProperty,
    /// A cleaning references a cleaner that doesn't exist.
    UnknownCleaner,
    /// A cleaning references a reservation that doesn't exist.
    UnknownReservation,
    /// A window ends before it starts.
    InvertedWindow,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

fn collect_ids<'a>(
    kind: &str,
    ids: impl Iterator<Item = &'a str>,
    errors: &mut Vec<ValidationError>,
) -> HashSet<&'a str> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate {kind} ID: {id}"),
            ));
        }
    }
    seen
}

/// Validates a snapshot.
///
/// Checks:
/// 1. No duplicate property, cleaner, reservation or cleaning IDs
/// 2. Reservations and cleanings reference existing properties
/// 3. Assigned cleaners exist
/// 4. Linked reservations exist
/// 5. No window ends before it starts
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_snapshot(snapshot: &Snapshot) -> ValidationResult {
    let mut errors = Vec::new();

    let property_ids = collect_ids(
        "property",
        snapshot.properties.iter().map(|p| p.id.as_str()),
        &mut errors,
    );
    let cleaner_ids = collect_ids(
        "cleaner",
        snapshot.cleaners.iter().map(|c| c.id.as_str()),
        &mut errors,
    );
    let reservation_ids = collect_ids(
        "reservation",
        snapshot.reservations.iter().map(|r| r.id.as_str()),
        &mut errors,
    );
    collect_ids(
        "cleaning",
        snapshot.cleanings.iter().map(|c| c.id.as_str()),
        &mut errors,
    );

    for r in &snapshot.reservations {
        if !property_ids.contains(r.property_id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownProperty,
                format!(
                    "Reservation '{}' references unknown property '{}'",
                    r.id, r.property_id
                ),
            ));
        }
        if r.window.is_inverted() {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvertedWindow,
                format!("Reservation '{}' checks out before it checks in", r.id),
            ));
        }
    }

    for c in &snapshot.cleanings {
        if !property_ids.contains(c.property_id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownProperty,
                format!(
                    "Cleaning '{}' references unknown property '{}'",
                    c.id, c.property_id
                ),
            ));
        }
        if let Some(cleaner) = &c.cleaner_id {
            if !cleaner_ids.contains(cleaner.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownCleaner,
                    format!("Cleaning '{}' references unknown cleaner '{}'", c.id, cleaner),
                ));
            }
        }
        if let Some(reservation) = &c.reservation_id {
            if !reservation_ids.contains(reservation.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownReservation,
                    format!(
                        "Cleaning '{}' references unknown reservation '{}'",
                        c.id, reservation
                    ),
                ));
            }
        }
        if c.window.is_inverted() {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvertedWindow,
                format!("Cleaning '{}' ends before it starts", c.id),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Cleaner, Cleaning, CleaningKind, Property, Reservation};
    use chrono::{DateTime, TimeZone, Utc};

    fn d(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap()
    }

    fn valid_snapshot() -> Snapshot {
        Snapshot {
            properties: vec![Property::new("p1", "Beach House")],
            cleaners: vec![Cleaner::new("c1", "Alex")],
            reservations: vec![Reservation::new("r1", "p1", d(1, 16), d(5, 10))],
            cleanings: vec![Cleaning::new("k1", "p1", CleaningKind::Turnover, d(5, 10), d(5, 14))
                .with_cleaner("c1")
                .with_reservation("r1")],
            range: None,
        }
    }

    fn kinds(result: ValidationResult) -> Vec<ValidationErrorKind> {
        result.unwrap_err().into_iter().map(|e| e.kind).collect()
    }

    #[test]
    fn test_valid_snapshot() {
        assert!(validate_snapshot(&valid_snapshot()).is_ok());
    }

    #[test]
    fn test_empty_snapshot() {
        assert!(validate_snapshot(&Snapshot::default()).is_ok());
    }

    #[test]
    fn test_duplicate_ids() {
        let mut s = valid_snapshot();
        s.properties.push(Property::new("p1", "Copy"));
        s.cleanings.push(Cleaning::new("k1", "p1", CleaningKind::Deep, d(7, 9), d(7, 12)));
        let errs = validate_snapshot(&s).unwrap_err();
        assert_eq!(errs.len(), 2);
        assert!(errs.iter().all(|e| e.kind == ValidationErrorKind::DuplicateId));
        assert!(errs[0].message.contains("property"));
    }

    #[test]
    fn test_same_id_across_types_is_allowed() {
        let mut s = valid_snapshot();
        s.cleaners.push(Cleaner::new("p1", "Named Like A Property"));
        assert!(validate_snapshot(&s).is_ok());
    }

    #[test]
    fn test_unknown_property() {
        let mut s = valid_snapshot();
        s.reservations.push(Reservation::new("r2", "p9", d(6, 16), d(8, 10)));
        assert_eq!(kinds(validate_snapshot(&s)), vec![ValidationErrorKind::UnknownProperty]);
    }

    #[test]
    fn test_unknown_cleaner_and_reservation() {
        let mut s = valid_snapshot();
        s.cleanings[0].cleaner_id = Some("c9".into());
        s.cleanings[0].reservation_id = Some("r9".into());
        assert_eq!(
            kinds(validate_snapshot(&s)),
            vec![
                ValidationErrorKind::UnknownCleaner,
                ValidationErrorKind::UnknownReservation
            ]
        );
    }

    #[test]
    fn test_inverted_windows() {
        let mut s = valid_snapshot();
        s.reservations[0] = Reservation::new("r1", "p1", d(5, 10), d(1, 16));
        s.cleanings[0].window = crate::models::TimeWindow::new(d(5, 14), d(5, 10));
        assert_eq!(
            kinds(validate_snapshot(&s)),
            vec![ValidationErrorKind::InvertedWindow, ValidationErrorKind::InvertedWindow]
        );
    }

    #[test]
    fn test_zero_length_window_is_not_inverted() {
        let mut s = valid_snapshot();
        s.cleanings[0].window = crate::models::TimeWindow::new(d(5, 10), d(5, 10));
        assert!(validate_snapshot(&s).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut s = valid_snapshot();
        s.cleaners.push(Cleaner::new("c1", "Dup"));
        s.reservations.push(Reservation::new("r2", "p9", d(8, 10), d(6, 16)));
        let errs = validate_snapshot(&s).unwrap_err();
        assert_eq!(errs.len(), 3);
    }
}
