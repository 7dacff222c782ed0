//! Schedule snapshot model.
//!
//! A snapshot is the full set of reference and schedule data for one edit
//! session, as fetched from the backend or produced by the mock generator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};

use super::{Cleaner, Cleaning, Property, Reservation, ScheduleEvent, TimeWindow};

/// Properties, reservations, cleanings and cleaners for one session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Rental properties.
    #[serde(default)]
    pub properties: Vec<Property>,
    /// Guest stays.
    #[serde(default)]
    pub reservations: Vec<Reservation>,
    /// Cleaning jobs.
    #[serde(default)]
    pub cleanings: Vec<Cleaning>,
    /// Cleaners.
    #[serde(default)]
    pub cleaners: Vec<Cleaner>,
    /// Date range the backend selected, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<TimeWindow>,
}

impl Snapshot {
    /// Creates an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Finds a property by ID.
    pub fn property(&self, id: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.id == id)
    }

    /// Finds a cleaner by ID.
    pub fn cleaner(&self, id: &str) -> Option<&Cleaner> {
        self.cleaners.iter().find(|c| c.id == id)
    }

    /// Finds a reservation by ID.
    pub fn reservation(&self, id: &str) -> Option<&Reservation> {
        self.reservations.iter().find(|r| r.id == id)
    }

    /// Calendar events: all reservations, then all cleanings.
    pub fn events(&self) -> Vec<ScheduleEvent> {
        let by_id: HashMap<&str, &Property> =
            self.properties.iter().map(|p| (p.id.as_str(), p)).collect();

        let reservations = self.reservations.iter().map(|r| {
            ScheduleEvent::from_reservation(r, by_id.get(r.property_id.as_str()).copied())
        });
        let cleanings = self.cleanings.iter().map(|c| {
            ScheduleEvent::from_cleaning(c, by_id.get(c.property_id.as_str()).copied())
        });

        reservations.chain(cleanings).collect()
    }

    /// Adds placeholder properties for every referenced but missing ID.
    ///
    /// Returns the number of properties added. Placeholders are appended
    /// in ID order.
    pub fn fill_missing_properties(&mut self) -> usize {
        let known: HashSet<&str> = self.properties.iter().map(|p| p.id.as_str()).collect();
        let missing: BTreeSet<String> = self
            .reservations
            .iter()
            .map(|r| r.property_id.as_str())
            .chain(self.cleanings.iter().map(|c| c.property_id.as_str()))
            .filter(|id| !id.is_empty() && !known.contains(id))
            .map(String::from)
            .collect();

        let added = missing.len();
        self.properties
            .extend(missing.into_iter().map(Property::placeholder));
        added
    }

    /// Time the calendar should open on.
    ///
    /// Midpoint of the backend range if present, else the first
    /// reservation's check-in, else the first cleaning's start.
    pub fn focus_time(&self) -> Option<DateTime<Utc>> {
        if let Some(range) = &self.range {
            return Some(range.start + range.duration() / 2);
        }
        self.reservations
            .first()
            .map(|r| r.window.start)
            .or_else(|| self.cleanings.first().map(|c| c.window.start))
    }
}
