//! Reservation (stay) model.
//!
//! Reservations come from the booking system and are read-only here.
//! Consecutive stays at one property bound the turnover window.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::TimeWindow;

/// A guest stay at a property over [check-in, check-out).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    /// Unique reservation identifier.
    pub id: String,
    /// Property the stay is booked at.
    pub property_id: String,
    /// Guest display name.
    pub guest_name: String,
    /// Stay interval: start = check-in, end = check-out.
    #[serde(flatten)]
    pub window: TimeWindow,
    /// Booking status.
    #[serde(default)]
    pub status: ReservationStatus,
    /// Booking channel (OTA name, direct).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Booking status of a reservation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    /// Booked and expected to arrive.
    #[default]
    Confirmed,
    /// Cancelled; occupies no time.
    Cancelled,
    /// Held but not yet confirmed.
    Hold,
}

impl ReservationStatus {
    /// Maps a backend status string onto a reservation status.
    ///
    /// Case-insensitive. Anything other than a cancel or hold marker
    /// (including `NEW` and unknown values) reads as confirmed.
    pub fn from_backend(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "CANCELLED" | "CANCELED" => Self::Cancelled,
            "HOLD" | "ON_HOLD" => Self::Hold,
            _ => Self::Confirmed,
        }
    }

    /// Lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Hold => "hold",
        }
    }
}

impl Reservation {
    /// Creates a confirmed reservation.
    pub fn new(
        id: impl Into<String>,
        property_id: impl Into<String>,
        check_in: DateTime<Utc>,
        check_out: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            property_id: property_id.into(),
            guest_name: String::new(),
            window: TimeWindow::new(check_in, check_out),
            status: ReservationStatus::Confirmed,
            source: None,
        }
    }

    /// Sets the guest name.
    pub fn with_guest(mut self, guest_name: impl Into<String>) -> Self {
        self.guest_name = guest_name.into();
        self
    }

    /// Sets the status.
    pub fn with_status(mut self, status: ReservationStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the booking source.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Check-in time.
    #[inline]
    pub fn check_in(&self) -> DateTime<Utc> {
        self.window.start
    }

    /// Check-out time.
    #[inline]
    pub fn check_out(&self) -> DateTime<Utc> {
        self.window.end
    }

    /// Whether the stay is cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.status == ReservationStatus::Cancelled
    }
}
