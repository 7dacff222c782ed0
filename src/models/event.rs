//! Calendar event model.
//!
//! The scheduler surface shows reservations and cleanings side by side
//! as one list of events. Conflict checks, range queries and the store
//! all work on [`ScheduleEvent`].

use serde::{Deserialize, Serialize};

use super::{Cleaner, Cleaning, CleaningStatus, Property, Reservation, TimeWindow};

/// What an event represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A guest stay.
    Reservation,
    /// A cleaning job.
    Cleaning,
}

/// A reservation or cleaning placed on the calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEvent {
    /// Event identifier (the reservation or cleaning ID).
    pub id: String,
    /// Event category.
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// Display subject.
    pub subject: String,
    /// Occupied interval.
    #[serde(flatten)]
    pub window: TimeWindow,
    /// Property the event is anchored to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_id: Option<String>,
    /// Assigned cleaner (cleanings only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cleaner_id: Option<String>,
    /// Linked reservation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reservation_id: Option<String>,
    /// Status wire name of the underlying record.
    pub status: String,
}

impl ScheduleEvent {
    /// Builds a cleaning event directly, with a generic subject.
    ///
    /// Used for events created on the calendar before a typed record exists.
    pub fn cleaning(
        id: impl Into<String>,
        property_id: impl Into<String>,
        window: TimeWindow,
    ) -> Self {
        Self {
            id: id.into(),
            kind: EventKind::Cleaning,
            subject: String::from("Cleaning"),
            window,
            property_id: Some(property_id.into()),
            cleaner_id: None,
            reservation_id: None,
            status: CleaningStatus::Pending.as_str().to_string(),
        }
    }

    /// Maps a reservation onto a calendar event.
    ///
    /// Subject is the guest name, prefixed with `(CODE) ` when the
    /// property has a code.
    pub fn from_reservation(reservation: &Reservation, property: Option<&Property>) -> Self {
        Self {
            id: reservation.id.clone(),
            kind: EventKind::Reservation,
            subject: reservation_subject(reservation, property),
            window: reservation.window,
            property_id: Some(reservation.property_id.clone()),
            cleaner_id: None,
            reservation_id: Some(reservation.id.clone()),
            status: reservation.status.as_str().to_string(),
        }
    }

    /// Maps a cleaning onto a calendar event.
    ///
    /// Subject is the first non-blank of: job name, property address,
    /// property name, property code, `"<Kind> Clean"`.
    pub fn from_cleaning(cleaning: &Cleaning, property: Option<&Property>) -> Self {
        Self {
            id: cleaning.id.clone(),
            kind: EventKind::Cleaning,
            subject: cleaning_subject(cleaning, property),
            window: cleaning.window,
            property_id: Some(cleaning.property_id.clone()),
            cleaner_id: cleaning.cleaner_id.clone(),
            reservation_id: cleaning.reservation_id.clone(),
            status: cleaning.status.as_str().to_string(),
        }
    }

    /// Sets the assigned cleaner.
    pub fn with_cleaner(mut self, cleaner_id: impl Into<String>) -> Self {
        self.cleaner_id = Some(cleaner_id.into());
        self
    }

    /// Sets the subject.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// Whether this is a cleaning event.
    #[inline]
    pub fn is_cleaning(&self) -> bool {
        self.kind == EventKind::Cleaning
    }

    /// Parsed cleaning status. `None` for reservations or unknown values.
    pub fn cleaning_status(&self) -> Option<CleaningStatus> {
        if self.is_cleaning() {
            CleaningStatus::parse(&self.status)
        } else {
            None
        }
    }
}

fn code_prefix(property: Option<&Property>) -> String {
    match property.and_then(|p| p.code.as_deref()) {
        Some(code) if !code.is_empty() => format!("({code}) "),
        _ => String::new(),
    }
}

/// Subject line for a reservation, e.g. `(P-001) Smith`.
pub fn reservation_subject(reservation: &Reservation, property: Option<&Property>) -> String {
    format!("{}{}", code_prefix(property), reservation.guest_name)
        .trim()
        .to_string()
}

/// Label for a cleaning in lists, e.g. `(P-001) Turnover Clean • Alex`.
pub fn cleaning_label(
    cleaning: &Cleaning,
    property: Option<&Property>,
    cleaner: Option<&Cleaner>,
) -> String {
    let who = cleaner
        .map(|c| format!(" • {}", c.name))
        .unwrap_or_default();
    format!(
        "{}{} Clean{}",
        code_prefix(property),
        cleaning.kind.label(),
        who
    )
    .trim()
    .to_string()
}

fn cleaning_subject(cleaning: &Cleaning, property: Option<&Property>) -> String {
    let non_blank = |s: Option<&str>| s.map(str::trim).filter(|s| !s.is_empty()).map(String::from);

    non_blank(cleaning.job_name.as_deref())
        .or_else(|| non_blank(property.and_then(|p| p.address.as_deref())))
        .or_else(|| non_blank(property.map(|p| p.name.as_str())))
        .or_else(|| non_blank(property.and_then(|p| p.code.as_deref())))
        .unwrap_or_else(|| format!("{} Clean", cleaning.kind.label()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CleaningKind;
    use chrono::{TimeZone, Utc};

    fn reservation() -> Reservation {
        Reservation::new(
            "r1",
            "p1",
            Utc.with_ymd_and_hms(2024, 1, 1, 16, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 5, 10, 0, 0).unwrap(),
        )
        .with_guest("Smith")
    }

    fn cleaning() -> Cleaning {
        Cleaning::new(
            "clean_r1",
            "p1",
            CleaningKind::Turnover,
            Utc.with_ymd_and_hms(2024, 1, 5, 10, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 5, 14, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_reservation_event() {
        let p = Property::new("p1", "Beach House").with_code("P-001");
        let ev = ScheduleEvent::from_reservation(&reservation(), Some(&p));

        assert_eq!(ev.kind, EventKind::Reservation);
        assert_eq!(ev.subject, "(P-001) Smith");
        assert_eq!(ev.property_id.as_deref(), Some("p1"));
        assert_eq!(ev.reservation_id.as_deref(), Some("r1"));
        assert_eq!(ev.status, "confirmed");
        assert!(!ev.is_cleaning());
    }

    #[test]
    fn test_reservation_subject_without_code() {
        let ev = ScheduleEvent::from_reservation(&reservation(), None);
        assert_eq!(ev.subject, "Smith");
    }

    #[test]
    fn test_cleaning_subject_fallbacks() {
        let full = Property::new("p1", "Beach House")
            .with_code("P-001")
            .with_address("1 Ocean Dr");

        let named = cleaning().with_job_name("  Deep scrub  ");
        assert_eq!(ScheduleEvent::from_cleaning(&named, Some(&full)).subject, "Deep scrub");

        assert_eq!(ScheduleEvent::from_cleaning(&cleaning(), Some(&full)).subject, "1 Ocean Dr");

        let no_addr = Property::new("p1", "Beach House").with_code("P-001");
        assert_eq!(ScheduleEvent::from_cleaning(&cleaning(), Some(&no_addr)).subject, "Beach House");

        let code_only = Property::new("p1", "").with_code("P-001");
        assert_eq!(ScheduleEvent::from_cleaning(&cleaning(), Some(&code_only)).subject, "P-001");

        assert_eq!(ScheduleEvent::from_cleaning(&cleaning(), None).subject, "Turnover Clean");
    }

    #[test]
    fn test_cleaning_event_fields() {
        let c = cleaning().with_cleaner("c1").with_reservation("r2");
        let ev = ScheduleEvent::from_cleaning(&c, None);

        assert!(ev.is_cleaning());
        assert_eq!(ev.cleaner_id.as_deref(), Some("c1"));
        assert_eq!(ev.reservation_id.as_deref(), Some("r2"));
        assert_eq!(ev.cleaning_status(), Some(CleaningStatus::Pending));
    }

    #[test]
    fn test_cleaning_label() {
        let p = Property::new("p1", "Beach House").with_code("P-001");
        let alex = Cleaner::new("c1", "Alex");
        assert_eq!(
            cleaning_label(&cleaning(), Some(&p), Some(&alex)),
            "(P-001) Turnover Clean • Alex"
        );
        assert_eq!(cleaning_label(&cleaning(), None, None), "Turnover Clean");
    }
}
