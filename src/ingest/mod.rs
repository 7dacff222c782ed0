//! Backend payload ingest.
//!
//! Turns the loosely-typed JSON the property backend returns into a
//! [`Snapshot`]. The backend is inconsistent about field names, id types
//! and timestamp formats, so every field is read through a list of
//! aliases and every timestamp is normalized to UTC.
//!
//! # Payload shape
//! ```json
//! {
//!   "data": {
//!     "properties":   [ ... ] | { ... },
//!     "reservations": [ ... ] | { ... },
//!     "cleanings":    [ ... ] | { ... },
//!     "cleaners":     [ ... ] | { ... },
//!     "range": { "from": "2024-01-01 00:00:00", "to": "2024-01-31 00:00:00" }
//!   }
//! }
//! ```
//! The `data` wrapper is optional and so is every collection.
//!
//! # Errors
//! Problems are collected per record rather than stopping at the first
//! one. Missing or unparsable timestamps are errors; they never fall back
//! to the current time.
//!
//! # Hostfully
//! Records taken straight from the Hostfully API have a fixed shape and
//! are read by the typed mappers in [`hostfully`] instead.

pub mod hostfully;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;
use tracing::{debug, warn};

use crate::models::{
    Cleaner, CleanerStatus, Cleaning, CleaningKind, CleaningStatus, Property, Reservation,
    ReservationStatus, Snapshot, TimeWindow,
};

/// Ingest result.
pub type IngestResult = Result<Snapshot, Vec<IngestError>>;

/// A problem with one record of the payload.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestError {
    /// Error category.
    pub kind: IngestErrorKind,
    /// Human-readable description, naming the offending record.
    pub message: String,
}

/// Categories of ingest errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestErrorKind {
    /// The payload is not JSON, or a record is not an object.
    MalformedPayload,
    /// A required field is absent under every alias.
    MissingField,
    /// A timestamp is neither RFC 3339 nor `YYYY-MM-DD HH:MM:SS`.
    InvalidTimestamp,
    /// A field has the wrong type or an out-of-range value.
    InvalidField,
    /// A cleaning type is not turnover, midstay or deep.
    UnknownKind,
    /// A cleaning or cleaner status is not recognized.
    UnknownStatus,
}

impl IngestError {
    fn new(kind: IngestErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parses a backend timestamp into UTC.
///
/// Accepts RFC 3339 (any offset) and `YYYY-MM-DD HH:MM:SS`, the latter
/// read as UTC. A `T` separator without an offset is also read as UTC.
///
/// # Example
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use turnover_schedule::ingest::parse_timestamp;
///
/// let expected = Utc.with_ymd_and_hms(2024, 1, 5, 10, 0, 0).unwrap();
/// assert_eq!(parse_timestamp("2024-01-05 10:00:00"), Some(expected));
/// assert_eq!(parse_timestamp("2024-01-05T12:00:00+02:00"), Some(expected));
/// assert_eq!(parse_timestamp("next tuesday"), None);
/// ```
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Parses a JSON document.
///
/// # Errors
/// A single [`IngestErrorKind::MalformedPayload`] if the text is not JSON,
/// otherwise whatever [`parse_payload`] reports.
pub fn parse_payload_str(raw: &str) -> IngestResult {
    let value: Value = serde_json::from_str(raw).map_err(|e| {
        vec![IngestError::new(
            IngestErrorKind::MalformedPayload,
            format!("Payload is not valid JSON: {e}"),
        )]
    })?;
    parse_payload(&value)
}

/// Parses a backend payload into a snapshot.
///
/// Properties referenced by reservations or cleanings but missing from
/// the payload are synthesized with the ID as name.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use turnover_schedule::ingest::parse_payload;
///
/// let payload = json!({
///     "data": {
///         "reservations": {
///             "reservationId": 42,
///             "property_id": "p1",
///             "start": "2024-01-01 16:00:00",
///             "end": "2024-01-05 10:00:00",
///             "status": "ON_HOLD"
///         }
///     }
/// });
///
/// let snapshot = parse_payload(&payload).unwrap();
/// assert_eq!(snapshot.reservations[0].id, "42");
/// assert_eq!(snapshot.properties[0].name, "p1");
/// ```
pub fn parse_payload(payload: &Value) -> IngestResult {
    let root = match payload.get("data") {
        Some(data) if !data.is_null() => data,
        _ => payload,
    };
    if !root.is_object() {
        return Err(vec![IngestError::new(
            IngestErrorKind::MalformedPayload,
            "Payload root is not an object",
        )]);
    }

    let mut errors = Vec::new();
    let mut snapshot = Snapshot {
        properties: collect(root, "properties", &mut errors, parse_property),
        reservations: collect(root, "reservations", &mut errors, parse_reservation),
        cleanings: collect(root, "cleanings", &mut errors, parse_cleaning),
        cleaners: collect(root, "cleaners", &mut errors, parse_cleaner),
        range: parse_range(root.get("range"), &mut errors),
    };

    if !errors.is_empty() {
        warn!(errors = errors.len(), "rejected backend payload");
        return Err(errors);
    }

    let synthesized = snapshot.fill_missing_properties();
    debug!(
        properties = snapshot.properties.len(),
        synthesized,
        reservations = snapshot.reservations.len(),
        cleanings = snapshot.cleanings.len(),
        cleaners = snapshot.cleaners.len(),
        "ingested backend payload"
    );
    Ok(snapshot)
}

/// One record of a collection, with its position for error messages.
struct Record<'a> {
    collection: &'static str,
    index: usize,
    value: &'a Value,
}

impl<'a> Record<'a> {
    fn context(&self) -> String {
        format!("{}[{}]", self.collection, self.index)
    }

    fn error(&self, kind: IngestErrorKind, detail: impl std::fmt::Display) -> IngestError {
        IngestError::new(kind, format!("{}: {detail}", self.context()))
    }

    /// First non-null value under any of `keys`.
    fn field(&self, keys: &[&str]) -> Option<&'a Value> {
        keys.iter()
            .filter_map(|k| self.value.get(*k))
            .find(|v| !v.is_null())
    }

    /// First non-null scalar under any of `keys`, as a string.
    fn text(&self, keys: &[&str]) -> Option<String> {
        self.field(keys).and_then(scalar_to_string)
    }

    fn required_text(&self, keys: &[&str], errors: &mut Vec<IngestError>) -> Option<String> {
        match self.text(keys) {
            Some(s) if !s.is_empty() => Some(s),
            _ => {
                errors.push(self.error(
                    IngestErrorKind::MissingField,
                    format!("missing {}", keys.join("/")),
                ));
                None
            }
        }
    }

    fn timestamp(&self, key: &str, errors: &mut Vec<IngestError>) -> Option<DateTime<Utc>> {
        let Some(raw) = self.text(&[key]) else {
            errors.push(self.error(IngestErrorKind::MissingField, format!("missing {key}")));
            return None;
        };
        let parsed = parse_timestamp(&raw);
        if parsed.is_none() {
            errors.push(self.error(
                IngestErrorKind::InvalidTimestamp,
                format!("cannot parse {key} '{raw}'"),
            ));
        }
        parsed
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Reads a collection that may be an array, a single object, or absent.
fn collect<T>(
    root: &Value,
    key: &'static str,
    errors: &mut Vec<IngestError>,
    parse: fn(&Record<'_>, &mut Vec<IngestError>) -> Option<T>,
) -> Vec<T> {
    let items: Vec<&Value> = match root.get(key) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().collect(),
        Some(single) => vec![single],
    };

    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| {
            let record = Record {
                collection: key,
                index,
                value,
            };
            if !value.is_object() {
                errors.push(record.error(IngestErrorKind::MalformedPayload, "not an object"));
                return None;
            }
            parse(&record, errors)
        })
        .collect()
}

fn parse_property(rec: &Record<'_>, errors: &mut Vec<IngestError>) -> Option<Property> {
    let id = rec.required_text(&["id", "propertyId"], errors)?;
    let name = rec.text(&["name", "title", "code"]).unwrap_or_else(|| id.clone());

    let mut property = Property::new(id, name);
    property.code = rec.text(&["code"]);
    property.timezone = rec.text(&["timezone", "tz"]);
    property.color = rec.text(&["color"]);
    property.address = rec.text(&["address"]);
    Some(property)
}

fn parse_reservation(rec: &Record<'_>, errors: &mut Vec<IngestError>) -> Option<Reservation> {
    let id = rec.required_text(&["id", "reservationId"], errors);
    let property_id = rec.required_text(&["propertyId", "property_id"], errors);
    let start = rec.timestamp("start", errors);
    let end = rec.timestamp("end", errors);

    let mut reservation = Reservation::new(id?, property_id?, start?, end?)
        .with_status(ReservationStatus::from_backend(
            &rec.text(&["status"]).unwrap_or_default(),
        ));
    if let Some(guest) = rec.text(&["guestName", "guest_name", "guest"]) {
        reservation = reservation.with_guest(guest);
    }
    reservation.source = rec.text(&["source"]);
    Some(reservation)
}

fn parse_cleaning(rec: &Record<'_>, errors: &mut Vec<IngestError>) -> Option<Cleaning> {
    let id = rec.required_text(&["id"], errors);
    let property_id = rec.required_text(&["propertyId", "property_id"], errors);
    let start = rec.timestamp("start", errors);
    let end = rec.timestamp("end", errors);

    let kind = match rec.text(&["type"]) {
        None => Some(CleaningKind::Turnover),
        Some(raw) => {
            let kind = CleaningKind::parse(&raw);
            if kind.is_none() {
                errors.push(rec.error(IngestErrorKind::UnknownKind, format!("unknown type '{raw}'")));
            }
            kind
        }
    };
    let status = match rec.text(&["status"]) {
        None => Some(CleaningStatus::Pending),
        Some(raw) => {
            let status = CleaningStatus::parse(&raw);
            if status.is_none() {
                errors.push(rec.error(IngestErrorKind::UnknownStatus, format!("unknown status '{raw}'")));
            }
            status
        }
    };

    let mut cleaning = Cleaning::new(id?, property_id?, kind?, start?, end?).with_status(status?);
    cleaning.cleaner_id = rec.text(&["cleanerId", "cleaner_id"]);
    cleaning.reservation_id = rec.text(&["reservationId", "reservation_id"]);
    cleaning.notes = rec.text(&["notes"]);
    cleaning.job_name = rec.text(&["jobName", "name", "title", "job_name"]);
    Some(cleaning)
}

fn parse_cleaner(rec: &Record<'_>, errors: &mut Vec<IngestError>) -> Option<Cleaner> {
    let id = rec.required_text(&["email", "id"], errors)?;
    let name = rec
        .text(&["name", "fullName", "initials"])
        .unwrap_or_else(|| id.clone());

    let capacity = match rec.field(&["capacity"]) {
        None => None,
        Some(v) => match v.as_u64().and_then(|n| u32::try_from(n).ok()) {
            Some(n) => Some(n),
            None => {
                errors.push(rec.error(IngestErrorKind::InvalidField, format!("invalid capacity {v}")));
                return None;
            }
        },
    };
    let status = match rec.text(&["status"]) {
        None => CleanerStatus::Active,
        Some(raw) => match CleanerStatus::parse(&raw) {
            Some(s) => s,
            None => {
                errors.push(rec.error(IngestErrorKind::UnknownStatus, format!("unknown status '{raw}'")));
                return None;
            }
        },
    };

    let mut cleaner = Cleaner::new(id, name).with_status(status);
    cleaner.color = rec.text(&["color"]);
    cleaner.capacity = capacity;
    Some(cleaner)
}

fn parse_range(value: Option<&Value>, errors: &mut Vec<IngestError>) -> Option<TimeWindow> {
    let value = value.filter(|v| !v.is_null())?;
    let rec = Record {
        collection: "range",
        index: 0,
        value,
    };
    let from = rec.text(&["from", "start"]);
    let to = rec.text(&["to", "end"]);

    // A one-sided range carries no midpoint.
    let (from, to) = (from?, to?);
    let mut parse = |raw: &str| {
        let parsed = parse_timestamp(raw);
        if parsed.is_none() {
            errors.push(IngestError::new(
                IngestErrorKind::InvalidTimestamp,
                format!("range: cannot parse '{raw}'"),
            ));
        }
        parsed
    };
    let from = parse(&from);
    let to = parse(&to);
    Some(TimeWindow::new(from?, to?))
}
