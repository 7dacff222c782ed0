//! Operator reports.
//!
//! Read-only views over a schedule: the per-reservation assignments table
//! and per-cleaner workload.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Job count | Cleanings assigned to the cleaner |
//! | Busy time | Sum of assigned cleaning durations |
//! | Peak concurrency | Most assigned cleanings in progress at one instant |
//! | Capacity exceeded | Peak concurrency above the advisory capacity |

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;

use crate::models::{
    Cleaner, Cleaning, CleaningStatus, Property, Reservation, ReservationStatus, TimeWindow,
};

/// One row of the assignments table: a reservation and its linked cleaning.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRow {
    pub property_id: String,
    /// Property name, or the ID when the property is unknown.
    pub property_name: String,
    pub reservation_id: String,
    pub guest_name: String,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    pub status: ReservationStatus,
    /// Cleaning whose `reservation_id` points at this reservation.
    pub cleaning_id: Option<String>,
    pub cleaning_window: Option<TimeWindow>,
    pub cleaner_id: Option<String>,
    pub cleaning_status: Option<CleaningStatus>,
}

/// Builds the assignments table.
///
/// One row per reservation, sorted by property ID then check-in. When
/// several cleanings link to the same reservation the first one wins.
pub fn assignments_table(
    properties: &[Property],
    reservations: &[Reservation],
    cleanings: &[Cleaning],
) -> Vec<AssignmentRow> {
    let names: HashMap<&str, &str> = properties
        .iter()
        .map(|p| (p.id.as_str(), p.name.as_str()))
        .collect();

    let mut linked: HashMap<&str, &Cleaning> = HashMap::new();
    for c in cleanings {
        if let Some(rid) = c.reservation_id.as_deref() {
            linked.entry(rid).or_insert(c);
        }
    }

    let mut sorted: Vec<&Reservation> = reservations.iter().collect();
    sorted.sort_by(|a, b| {
        a.property_id
            .cmp(&b.property_id)
            .then(a.window.start.cmp(&b.window.start))
    });

    sorted
        .into_iter()
        .map(|r| {
            let cleaning = linked.get(r.id.as_str()).copied();
            AssignmentRow {
                property_id: r.property_id.clone(),
                property_name: names
                    .get(r.property_id.as_str())
                    .map_or_else(|| r.property_id.clone(), |n| n.to_string()),
                reservation_id: r.id.clone(),
                guest_name: r.guest_name.clone(),
                check_in: r.check_in(),
                check_out: r.check_out(),
                status: r.status,
                cleaning_id: cleaning.map(|c| c.id.clone()),
                cleaning_window: cleaning.map(|c| c.window),
                cleaner_id: cleaning.and_then(|c| c.cleaner_id.clone()),
                cleaning_status: cleaning.map(|c| c.status),
            }
        })
        .collect()
}

/// Workload of one cleaner.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanerLoad {
    pub cleaner_id: String,
    /// Number of assigned cleanings.
    pub job_count: usize,
    /// Sum of assigned cleaning durations.
    pub busy: Duration,
    /// Most assigned cleanings in progress at one instant.
    pub peak_concurrency: usize,
    /// Advisory concurrent-job limit, if the cleaner has one.
    pub capacity: Option<u32>,
}

impl CleanerLoad {
    /// Computes the load of every cleaner, in the order given.
    ///
    /// Cleanings assigned to unknown cleaners are ignored. Jobs that only
    /// touch at an endpoint are not concurrent; zero-length jobs count
    /// toward the job total but never toward concurrency.
    pub fn calculate(cleaners: &[Cleaner], cleanings: &[Cleaning]) -> Vec<Self> {
        let mut by_cleaner: HashMap<&str, Vec<&TimeWindow>> = HashMap::new();
        for c in cleanings {
            if let Some(cid) = c.cleaner_id.as_deref() {
                by_cleaner.entry(cid).or_default().push(&c.window);
            }
        }

        cleaners
            .iter()
            .map(|cleaner| {
                let windows = by_cleaner
                    .get(cleaner.id.as_str())
                    .map(Vec::as_slice)
                    .unwrap_or_default();
                Self {
                    cleaner_id: cleaner.id.clone(),
                    job_count: windows.len(),
                    busy: windows
                        .iter()
                        .fold(Duration::zero(), |acc, w| acc + w.duration()),
                    peak_concurrency: peak_concurrency(windows),
                    capacity: cleaner.capacity,
                }
            })
            .collect()
    }

    /// Whether peak concurrency is above the advisory capacity.
    pub fn capacity_exceeded(&self) -> bool {
        self.capacity
            .is_some_and(|cap| self.peak_concurrency > cap as usize)
    }
}

/// Endpoint sweep. Ends sort before starts at the same instant.
fn peak_concurrency(windows: &[&TimeWindow]) -> usize {
    let mut points: Vec<(DateTime<Utc>, i32)> = windows
        .iter()
        .filter(|w| !w.is_degenerate())
        .flat_map(|w| [(w.start, 1), (w.end, -1)])
        .collect();
    points.sort();

    let mut current: i32 = 0;
    let mut peak: i32 = 0;
    for (_, delta) in points {
        current += delta;
        peak = peak.max(current);
    }
    peak as usize
}
