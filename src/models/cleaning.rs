//! Cleaning (job) model.
//!
//! A cleaning is a unit of work at a property, optionally assigned to a
//! cleaner. Turnover cleanings link to the reservation they precede.
//!
//! # Status Lifecycle
//!
//! ```text
//! pending → assigned → in_progress → done
//!    ↑__________|____________|________|   (any state may return to pending)
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::TimeWindow;

/// A cleaning job at a property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cleaning {
    /// Unique cleaning identifier.
    pub id: String,
    /// Property being cleaned.
    pub property_id: String,
    /// Assigned cleaner. `None` until an operator assigns one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cleaner_id: Option<String>,
    /// Cleaning category.
    #[serde(rename = "type")]
    pub kind: CleaningKind,
    /// Job interval.
    #[serde(flatten)]
    pub window: TimeWindow,
    /// Progress status.
    #[serde(default)]
    pub status: CleaningStatus,
    /// Reservation this cleaning prepares the property for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reservation_id: Option<String>,
    /// Free-form operator notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Display name of the job.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_name: Option<String>,
}

/// Cleaning category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleaningKind {
    /// Between a check-out and the next check-in.
    #[default]
    Turnover,
    /// During a stay.
    Midstay,
    /// Scheduled deep clean.
    Deep,
}

impl CleaningKind {
    /// Parses a kind name, case-insensitively.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "turnover" => Some(Self::Turnover),
            "midstay" => Some(Self::Midstay),
            "deep" => Some(Self::Deep),
            _ => None,
        }
    }

    /// Capitalized label, e.g. `Turnover`.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Turnover => "Turnover",
            Self::Midstay => "Midstay",
            Self::Deep => "Deep",
        }
    }
}

/// Progress status of a cleaning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleaningStatus {
    /// Not yet assigned.
    #[default]
    Pending,
    /// A cleaner has been assigned.
    Assigned,
    /// Work has started.
    InProgress,
    /// Work is finished.
    Done,
}

impl CleaningStatus {
    /// Parses a status name, case-insensitively.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "assigned" => Some(Self::Assigned),
            "in_progress" => Some(Self::InProgress),
            "done" => Some(Self::Done),
            _ => None,
        }
    }

    /// Lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Assigned => "assigned",
            Self::InProgress => "in_progress",
            Self::Done => "done",
        }
    }

    /// Whether moving from `self` to `next` follows the lifecycle.
    ///
    /// Forward moves go one step at a time; any state may fall back to
    /// `Pending`. Staying in place is allowed.
    pub fn can_transition_to(&self, next: CleaningStatus) -> bool {
        use CleaningStatus::*;
        matches!(
            (*self, next),
            (_, Pending)
                | (Pending, Assigned)
                | (Assigned, Assigned)
                | (Assigned, InProgress)
                | (InProgress, InProgress)
                | (InProgress, Done)
                | (Done, Done)
        )
    }
}

impl Cleaning {
    /// Creates a pending, unassigned cleaning.
    pub fn new(
        id: impl Into<String>,
        property_id: impl Into<String>,
        kind: CleaningKind,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            property_id: property_id.into(),
            cleaner_id: None,
            kind,
            window: TimeWindow::new(start, end),
            status: CleaningStatus::Pending,
            reservation_id: None,
            notes: None,
            job_name: None,
        }
    }

    /// Sets the assigned cleaner.
    pub fn with_cleaner(mut self, cleaner_id: impl Into<String>) -> Self {
        self.cleaner_id = Some(cleaner_id.into());
        self
    }

    /// Sets the status.
    pub fn with_status(mut self, status: CleaningStatus) -> Self {
        self.status = status;
        self
    }

    /// Links the cleaning to a reservation.
    pub fn with_reservation(mut self, reservation_id: impl Into<String>) -> Self {
        self.reservation_id = Some(reservation_id.into());
        self
    }

    /// Sets operator notes.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Sets the job display name.
    pub fn with_job_name(mut self, job_name: impl Into<String>) -> Self {
        self.job_name = Some(job_name.into());
        self
    }

    /// Whether a cleaner is assigned.
    pub fn is_assigned(&self) -> bool {
        self.cleaner_id.is_some()
    }
}
