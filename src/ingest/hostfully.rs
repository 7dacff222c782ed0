//! Hostfully record mappers.
//!
//! Typed views of the property, reservation and housekeeping records the
//! Hostfully API returns, with conversions into the crate's models.
//!
//! | Hostfully        | Model                        |
//! |------------------|------------------------------|
//! | `uid`            | `id`                         |
//! | `propertyUid`    | `property_id`                |
//! | `timeZoneName`   | `timezone`                   |
//! | `startDate`      | `window.start`               |
//! | `endDate`        | `window.end`                 |
//! | `cleanerUid`     | `cleaner_id`                 |
//! | `reservationUid` | `reservation_id`             |
//!
//! A reservation without a status is confirmed and a cleaning without one
//! is pending. Housekeeping types outside turnover, midstay and deep are
//! read as turnovers.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, warn};

use super::{parse_timestamp, IngestError, IngestErrorKind, IngestResult};
use crate::models::{
    Cleaning, CleaningKind, CleaningStatus, Property, Reservation, ReservationStatus, Snapshot,
};

/// A Hostfully property.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostfullyProperty {
    pub uid: String,
    pub name: String,
    pub code: Option<String>,
    pub time_zone_name: Option<String>,
    pub address: Option<String>,
}

/// A Hostfully reservation. Dates are ISO 8601 strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostfullyReservation {
    pub uid: String,
    pub property_uid: String,
    pub guest_name: String,
    pub start_date: String,
    pub end_date: String,
    pub status: Option<String>,
    pub source: Option<String>,
}

/// A Hostfully housekeeping job.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostfullyCleaning {
    pub uid: String,
    pub property_uid: String,
    pub cleaner_uid: Option<String>,
    /// e.g. `TURNOVER`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub start_date: String,
    pub end_date: String,
    pub status: Option<String>,
    pub notes: Option<String>,
    pub reservation_uid: Option<String>,
}

/// A batch of Hostfully records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HostfullyPayload {
    pub properties: Vec<HostfullyProperty>,
    pub reservations: Vec<HostfullyReservation>,
    pub cleanings: Vec<HostfullyCleaning>,
}

impl From<HostfullyProperty> for Property {
    fn from(p: HostfullyProperty) -> Self {
        let mut property = Property::new(p.uid, p.name);
        property.code = p.code;
        property.timezone = p.time_zone_name;
        property.address = p.address;
        property
    }
}

impl TryFrom<HostfullyReservation> for Reservation {
    type Error = IngestError;

    fn try_from(r: HostfullyReservation) -> Result<Self, Self::Error> {
        let start = timestamp(&r.uid, "startDate", &r.start_date)?;
        let end = timestamp(&r.uid, "endDate", &r.end_date)?;
        let status = r
            .status
            .as_deref()
            .map(ReservationStatus::from_backend)
            .unwrap_or(ReservationStatus::Confirmed);

        let mut reservation = Reservation::new(r.uid, r.property_uid, start, end)
            .with_guest(r.guest_name)
            .with_status(status);
        reservation.source = r.source;
        Ok(reservation)
    }
}

impl TryFrom<HostfullyCleaning> for Cleaning {
    type Error = IngestError;

    fn try_from(c: HostfullyCleaning) -> Result<Self, Self::Error> {
        let start = timestamp(&c.uid, "startDate", &c.start_date)?;
        let end = timestamp(&c.uid, "endDate", &c.end_date)?;
        let kind = c
            .kind
            .as_deref()
            .and_then(CleaningKind::parse)
            .unwrap_or(CleaningKind::Turnover);
        let status = match c.status.as_deref() {
            None => CleaningStatus::Pending,
            Some(raw) => CleaningStatus::parse(raw).ok_or_else(|| {
                IngestError::new(
                    IngestErrorKind::UnknownStatus,
                    format!("{}: unknown status '{raw}'", c.uid),
                )
            })?,
        };

        let mut cleaning = Cleaning::new(c.uid, c.property_uid, kind, start, end).with_status(status);
        cleaning.cleaner_id = c.cleaner_uid;
        cleaning.reservation_id = c.reservation_uid;
        cleaning.notes = c.notes;
        Ok(cleaning)
    }
}

impl HostfullyPayload {
    /// Maps every record, collecting failures with their position.
    ///
    /// Properties referenced but not listed are synthesized, as in
    /// [`super::parse_payload`].
    pub fn into_snapshot(self) -> IngestResult {
        let mut errors = Vec::new();
        let properties = self.properties.into_iter().map(Property::from).collect();
        let reservations = convert("reservations", self.reservations, &mut errors);
        let cleanings = convert("cleanings", self.cleanings, &mut errors);

        if !errors.is_empty() {
            warn!(errors = errors.len(), "rejected Hostfully payload");
            return Err(errors);
        }

        let mut snapshot = Snapshot {
            properties,
            reservations,
            cleanings,
            ..Snapshot::default()
        };
        let synthesized = snapshot.fill_missing_properties();
        debug!(
            properties = snapshot.properties.len(),
            synthesized,
            reservations = snapshot.reservations.len(),
            cleanings = snapshot.cleanings.len(),
            "ingested Hostfully payload"
        );
        Ok(snapshot)
    }
}

/// Parses a Hostfully JSON document.
///
/// # Errors
/// A single [`IngestErrorKind::MalformedPayload`] if the text does not
/// have the Hostfully shape, otherwise the per-record errors of
/// [`HostfullyPayload::into_snapshot`].
///
/// # Example
///
/// ```
/// use turnover_schedule::ingest::hostfully::parse_hostfully_str;
/// use turnover_schedule::models::CleaningKind;
///
/// let snapshot = parse_hostfully_str(r#"{
///     "cleanings": [{
///         "uid": "hk-1",
///         "propertyUid": "p1",
///         "type": "TURNOVER",
///         "startDate": "2024-01-05T10:00:00Z",
///         "endDate": "2024-01-05T14:00:00Z"
///     }]
/// }"#).unwrap();
///
/// assert_eq!(snapshot.cleanings[0].kind, CleaningKind::Turnover);
/// assert_eq!(snapshot.properties[0].id, "p1");
/// ```
pub fn parse_hostfully_str(raw: &str) -> IngestResult {
    let payload: HostfullyPayload = serde_json::from_str(raw).map_err(|e| {
        vec![IngestError::new(
            IngestErrorKind::MalformedPayload,
            format!("Not a Hostfully payload: {e}"),
        )]
    })?;
    payload.into_snapshot()
}

fn timestamp(uid: &str, field: &str, raw: &str) -> Result<DateTime<Utc>, IngestError> {
    parse_timestamp(raw).ok_or_else(|| {
        IngestError::new(
            IngestErrorKind::InvalidTimestamp,
            format!("{uid}: cannot parse {field} '{raw}'"),
        )
    })
}

fn convert<S, T>(collection: &str, records: Vec<S>, errors: &mut Vec<IngestError>) -> Vec<T>
where
    T: TryFrom<S, Error = IngestError>,
{
    records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match T::try_from(record) {
            Ok(item) => Some(item),
            Err(e) => {
                errors.push(IngestError::new(e.kind, format!("{collection}[{index}] {}", e.message)));
                None
            }
        })
        .collect()
}
