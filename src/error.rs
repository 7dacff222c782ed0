//! Error types for schedule derivation and mutation.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::conflict::Conflict;
use crate::models::CleaningStatus;

/// Errors raised by the turnover deriver and the schedule store.
///
/// The overlap validator itself never errors; a rejected commit surfaces
/// here as [`ScheduleError::Conflict`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScheduleError {
    #[error("Degenerate turnover window between '{prev_id}' (check-out {check_out}) and '{next_id}' (check-in {check_in})")]
    DegenerateWindow {
        prev_id: String,
        next_id: String,
        check_out: DateTime<Utc>,
        check_in: DateTime<Utc>,
    },

    #[error("Reservations '{prev_id}' and '{next_id}' belong to different properties")]
    PropertyMismatch { prev_id: String, next_id: String },

    #[error("Cleaning conflict: '{event_id}' overlaps {} existing assignment(s)", .conflicts.len())]
    Conflict {
        event_id: String,
        conflicts: Vec<Conflict>,
    },

    #[error("Unknown event: {event_id}")]
    UnknownEvent { event_id: String },

    #[error("Event already exists: {event_id}")]
    DuplicateEvent { event_id: String },

    #[error("Unknown property: {property_id}")]
    UnknownProperty { property_id: String },

    #[error("Unknown cleaner: {cleaner_id}")]
    UnknownCleaner { cleaner_id: String },

    #[error("Cleaner '{cleaner_id}' is inactive")]
    CleanerUnavailable { cleaner_id: String },

    #[error("Event '{event_id}' ends before it starts")]
    InvalidWindow { event_id: String },

    #[error("Event '{event_id}' is not a cleaning")]
    NotACleaning { event_id: String },

    #[error("Invalid status transition for '{event_id}': {from:?} -> {to:?}")]
    InvalidTransition {
        event_id: String,
        from: CleaningStatus,
        to: CleaningStatus,
    },

    #[error("Invalid configuration: {message}")]
    Config { message: String },
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
