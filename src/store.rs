//! Validated schedule store.
//!
//! Holds the authoritative schedule for one edit session. Every mutation
//! goes through [`ScheduleStore::commit`], which re-validates against the
//! current state before applying. A rejected change leaves the store
//! untouched.
//!
//! # Concurrency
//! Commits take `&mut self`, so edits within a process are serialized.
//! Edits from several operators in different processes are not
//! coordinated; [`ScheduleStore::revision`] is exposed so a caller can
//! layer optimistic concurrency on top.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::config::{AssignmentPolicy, SchedulerConfig};
use crate::conflict::{find_conflicts, Conflict};
use crate::error::{ScheduleError, ScheduleResult};
use crate::models::{
    Cleaner, Cleaning, CleaningStatus, Property, Reservation, ScheduleEvent, Snapshot, TimeWindow,
};
use crate::turnover::{FlaggedTurnover, TurnoverDeriver};

/// A requested change to the schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ScheduleChange {
    /// Add a new cleaning.
    Create { cleaning: Cleaning },
    /// Replace an existing cleaning, matched by ID.
    Update { cleaning: Cleaning },
    /// Move or resize an existing cleaning.
    Reschedule { event_id: String, window: TimeWindow },
    /// Assign a cleaner.
    Assign { event_id: String, cleaner_id: String },
    /// Remove the assigned cleaner.
    Unassign { event_id: String },
    /// Move a cleaning along its status lifecycle.
    SetStatus {
        event_id: String,
        status: CleaningStatus,
    },
}

impl ScheduleChange {
    /// ID of the cleaning the change targets.
    pub fn event_id(&self) -> &str {
        match self {
            Self::Create { cleaning } | Self::Update { cleaning } => &cleaning.id,
            Self::Reschedule { event_id, .. }
            | Self::Assign { event_id, .. }
            | Self::Unassign { event_id }
            | Self::SetStatus { event_id, .. } => event_id,
        }
    }
}

/// Result of syncing derived turnovers into the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TurnoverSync {
    /// IDs of turnovers added by this sync.
    pub created: Vec<String>,
    /// Derived turnovers already present in the store.
    pub existing: usize,
    /// Derived turnovers that would conflict with existing cleanings.
    pub conflicted: Vec<(String, Vec<Conflict>)>,
    /// Degenerate pairs reported by the deriver.
    pub flagged: Vec<FlaggedTurnover>,
}

/// In-memory schedule with a single validated commit path.
///
/// # Example
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use turnover_schedule::models::{Cleaner, Cleaning, CleaningKind, Snapshot};
/// use turnover_schedule::store::{ScheduleChange, ScheduleStore};
/// use turnover_schedule::config::SchedulerConfig;
///
/// let h = |h| Utc.with_ymd_and_hms(2024, 1, 5, h, 0, 0).unwrap();
/// let snapshot = Snapshot {
///     cleaners: vec![Cleaner::new("c1", "Alex")],
///     cleanings: vec![
///         Cleaning::new("A", "p1", CleaningKind::Turnover, h(10), h(12)).with_cleaner("c1"),
///         Cleaning::new("B", "p2", CleaningKind::Turnover, h(11), h(13)),
///     ],
///     ..Snapshot::default()
/// };
///
/// let mut store = ScheduleStore::from_snapshot(snapshot, SchedulerConfig::default());
/// let rejected = store.commit(ScheduleChange::Assign {
///     event_id: "B".into(),
///     cleaner_id: "c1".into(),
/// });
/// assert!(rejected.is_err());
/// assert!(store.cleaning("B").unwrap().cleaner_id.is_none());
/// ```
#[derive(Debug, Clone)]
pub struct ScheduleStore {
    config: SchedulerConfig,
    properties: Vec<Property>,
    cleaners: Vec<Cleaner>,
    reservations: Vec<Reservation>,
    cleanings: Vec<Cleaning>,
    revision: u64,
}

impl ScheduleStore {
    /// Creates an empty store.
    pub fn new(config: SchedulerConfig) -> Self {
        Self::from_snapshot(Snapshot::default(), config)
    }

    /// Loads a snapshot as the starting state.
    ///
    /// Properties referenced by reservations or cleanings but not listed
    /// are added as placeholders. Otherwise the snapshot is taken as-is;
    /// run [`validate_snapshot`](crate::validation::validate_snapshot)
    /// first if it comes from an untrusted source.
    pub fn from_snapshot(mut snapshot: Snapshot, config: SchedulerConfig) -> Self {
        snapshot.fill_missing_properties();
        debug!(
            properties = snapshot.properties.len(),
            reservations = snapshot.reservations.len(),
            cleanings = snapshot.cleanings.len(),
            cleaners = snapshot.cleaners.len(),
            "loaded schedule snapshot"
        );
        Self {
            config,
            properties: snapshot.properties,
            cleaners: snapshot.cleaners,
            reservations: snapshot.reservations,
            cleanings: snapshot.cleanings,
            revision: 0,
        }
    }

    /// Exports the current state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            properties: self.properties.clone(),
            reservations: self.reservations.clone(),
            cleanings: self.cleanings.clone(),
            cleaners: self.cleaners.clone(),
            range: None,
        }
    }

    /// Number of accepted commits since load.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Active configuration.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// All properties.
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// All cleaners.
    pub fn cleaners(&self) -> &[Cleaner] {
        &self.cleaners
    }

    /// All reservations.
    pub fn reservations(&self) -> &[Reservation] {
        &self.reservations
    }

    /// All cleanings.
    pub fn cleanings(&self) -> &[Cleaning] {
        &self.cleanings
    }

    /// Finds a cleaning by ID.
    pub fn cleaning(&self, id: &str) -> Option<&Cleaning> {
        self.cleanings.iter().find(|c| c.id == id)
    }

    /// Finds a cleaner by ID.
    pub fn cleaner(&self, id: &str) -> Option<&Cleaner> {
        self.cleaners.iter().find(|c| c.id == id)
    }

    fn property_index(&self) -> HashMap<&str, &Property> {
        self.properties.iter().map(|p| (p.id.as_str(), p)).collect()
    }

    /// Calendar events: reservations, then cleanings.
    pub fn events(&self) -> Vec<ScheduleEvent> {
        let props = self.property_index();
        let mut events: Vec<ScheduleEvent> = self
            .reservations
            .iter()
            .map(|r| ScheduleEvent::from_reservation(r, props.get(r.property_id.as_str()).copied()))
            .collect();
        events.extend(
            self.cleanings
                .iter()
                .map(|c| ScheduleEvent::from_cleaning(c, props.get(c.property_id.as_str()).copied())),
        );
        events
    }

    /// Finds the calendar event for a reservation or cleaning ID.
    pub fn event(&self, id: &str) -> Option<ScheduleEvent> {
        let props = self.property_index();
        if let Some(c) = self.cleaning(id) {
            return Some(ScheduleEvent::from_cleaning(c, props.get(c.property_id.as_str()).copied()));
        }
        self.reservations
            .iter()
            .find(|r| r.id == id)
            .map(|r| ScheduleEvent::from_reservation(r, props.get(r.property_id.as_str()).copied()))
    }

    fn cleaning_events(&self) -> Vec<ScheduleEvent> {
        let props = self.property_index();
        self.cleanings
            .iter()
            .map(|c| ScheduleEvent::from_cleaning(c, props.get(c.property_id.as_str()).copied()))
            .collect()
    }

    /// Events that strictly overlap `range`.
    pub fn events_in_range(&self, range: &TimeWindow) -> Vec<ScheduleEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.window.overlaps(range))
            .collect()
    }

    /// Cleanings assigned to a cleaner, by start time.
    pub fn cleanings_for_cleaner(&self, cleaner_id: &str) -> Vec<&Cleaning> {
        let mut out: Vec<&Cleaning> = self
            .cleanings
            .iter()
            .filter(|c| c.cleaner_id.as_deref() == Some(cleaner_id))
            .collect();
        out.sort_by_key(|c| c.window.start);
        out
    }

    /// Cleanings at a property, by start time.
    pub fn cleanings_for_property(&self, property_id: &str) -> Vec<&Cleaning> {
        let mut out: Vec<&Cleaning> = self
            .cleanings
            .iter()
            .filter(|c| c.property_id == property_id)
            .collect();
        out.sort_by_key(|c| c.window.start);
        out
    }

    /// Dry run: conflicts `candidate` would have against the current state.
    pub fn conflicts_for(&self, candidate: &Cleaning) -> Vec<Conflict> {
        let props = self.property_index();
        let next = ScheduleEvent::from_cleaning(candidate, props.get(candidate.property_id.as_str()).copied());
        find_conflicts(&next, &self.cleaning_events())
    }

    /// Applies a change if it passes validation.
    ///
    /// Returns the new revision. On error the store is unchanged.
    ///
    /// # Errors
    /// - [`ScheduleError::Conflict`] if the change would double-book a
    ///   cleaner or a property.
    /// - [`ScheduleError::UnknownEvent`], [`ScheduleError::DuplicateEvent`],
    ///   [`ScheduleError::UnknownProperty`], [`ScheduleError::UnknownCleaner`],
    ///   [`ScheduleError::CleanerUnavailable`], [`ScheduleError::InvalidWindow`],
    ///   [`ScheduleError::InvalidTransition`] for malformed changes.
    pub fn commit(&mut self, change: ScheduleChange) -> ScheduleResult<u64> {
        let event_id = change.event_id().to_string();
        match self.apply(change) {
            Ok(()) => {
                self.revision += 1;
                debug!(event_id = %event_id, revision = self.revision, "committed schedule change");
                Ok(self.revision)
            }
            Err(e) => {
                warn!(event_id = %event_id, error = %e, "rejected schedule change");
                Err(e)
            }
        }
    }

    fn apply(&mut self, change: ScheduleChange) -> ScheduleResult<()> {
        match change {
            ScheduleChange::Create { cleaning } => {
                if self.cleaning(&cleaning.id).is_some()
                    || self.reservations.iter().any(|r| r.id == cleaning.id)
                {
                    return Err(ScheduleError::DuplicateEvent {
                        event_id: cleaning.id,
                    });
                }
                self.check_window(&cleaning)?;
                self.check_property(&cleaning.property_id)?;
                if let Some(cleaner_id) = &cleaning.cleaner_id {
                    self.check_cleaner(cleaner_id)?;
                }
                check_status(&cleaning, CleaningStatus::Pending)?;
                self.check_conflicts(&cleaning)?;
                self.cleanings.push(cleaning);
            }
            ScheduleChange::Update { cleaning } => {
                let idx = self.position(&cleaning.id)?;
                self.check_window(&cleaning)?;
                self.check_property(&cleaning.property_id)?;
                if let Some(cleaner_id) = &cleaning.cleaner_id {
                    if self.cleanings[idx].cleaner_id.as_ref() != Some(cleaner_id) {
                        self.check_cleaner(cleaner_id)?;
                    }
                }
                check_status(&cleaning, self.cleanings[idx].status)?;
                self.check_conflicts(&cleaning)?;
                self.cleanings[idx] = cleaning;
            }
            ScheduleChange::Reschedule { event_id, window } => {
                let idx = self.position(&event_id)?;
                let mut candidate = self.cleanings[idx].clone();
                candidate.window = window;
                self.check_window(&candidate)?;
                self.check_conflicts(&candidate)?;
                self.cleanings[idx] = candidate;
            }
            ScheduleChange::Assign {
                event_id,
                cleaner_id,
            } => {
                let idx = self.position(&event_id)?;
                self.check_cleaner(&cleaner_id)?;
                let mut candidate = self.cleanings[idx].clone();
                candidate.cleaner_id = Some(cleaner_id);
                if candidate.status == CleaningStatus::Pending {
                    candidate.status = CleaningStatus::Assigned;
                }
                match self.config.assignment_policy {
                    AssignmentPolicy::Validated => self.check_conflicts(&candidate)?,
                    AssignmentPolicy::Unchecked => {
                        let conflicts = self.conflicts_for(&candidate);
                        if !conflicts.is_empty() {
                            warn!(
                                event_id = %candidate.id,
                                conflicts = conflicts.len(),
                                "assignment committed without overlap validation"
                            );
                        }
                    }
                }
                self.cleanings[idx] = candidate;
            }
            ScheduleChange::Unassign { event_id } => {
                let idx = self.position(&event_id)?;
                let cleaning = &mut self.cleanings[idx];
                cleaning.cleaner_id = None;
                cleaning.status = CleaningStatus::Pending;
            }
            ScheduleChange::SetStatus { event_id, status } => {
                let idx = self.position(&event_id)?;
                let mut candidate = self.cleanings[idx].clone();
                let from = candidate.status;
                candidate.status = status;
                check_status(&candidate, from)?;
                self.cleanings[idx] = candidate;
            }
        }
        Ok(())
    }

    /// Derives turnovers from the stored reservations and adds the missing ones.
    ///
    /// Turnovers whose ID already exists are left alone, so repeated syncs
    /// are idempotent. Turnovers that would conflict are reported, not added.
    pub fn sync_turnovers(&mut self, deriver: &TurnoverDeriver) -> TurnoverSync {
        let plan = deriver.derive_all(&self.reservations);
        let mut sync = TurnoverSync {
            flagged: plan.flagged,
            ..TurnoverSync::default()
        };

        for cleaning in plan.cleanings {
            if self.cleaning(&cleaning.id).is_some() {
                sync.existing += 1;
                continue;
            }
            let id = cleaning.id.clone();
            match self.commit(ScheduleChange::Create { cleaning }) {
                Ok(_) => sync.created.push(id),
                Err(ScheduleError::Conflict { conflicts, .. }) => sync.conflicted.push((id, conflicts)),
                Err(e) => warn!(event_id = %id, error = %e, "skipped derived turnover"),
            }
        }
        sync
    }

    fn position(&self, id: &str) -> ScheduleResult<usize> {
        if let Some(idx) = self.cleanings.iter().position(|c| c.id == id) {
            return Ok(idx);
        }
        if self.reservations.iter().any(|r| r.id == id) {
            return Err(ScheduleError::NotACleaning {
                event_id: id.to_string(),
            });
        }
        Err(ScheduleError::UnknownEvent {
            event_id: id.to_string(),
        })
    }

    fn check_property(&self, property_id: &str) -> ScheduleResult<()> {
        if self.properties.iter().any(|p| p.id == property_id) {
            Ok(())
        } else {
            Err(ScheduleError::UnknownProperty {
                property_id: property_id.to_string(),
            })
        }
    }

    fn check_cleaner(&self, cleaner_id: &str) -> ScheduleResult<()> {
        match self.cleaner(cleaner_id) {
            None => Err(ScheduleError::UnknownCleaner {
                cleaner_id: cleaner_id.to_string(),
            }),
            Some(c) if !c.is_assignable() => Err(ScheduleError::CleanerUnavailable {
                cleaner_id: cleaner_id.to_string(),
            }),
            Some(_) => Ok(()),
        }
    }

    fn check_window(&self, cleaning: &Cleaning) -> ScheduleResult<()> {
        if cleaning.window.is_inverted() {
            return Err(ScheduleError::InvalidWindow {
                event_id: cleaning.id.clone(),
            });
        }
        Ok(())
    }

    fn check_conflicts(&self, candidate: &Cleaning) -> ScheduleResult<()> {
        let conflicts = self.conflicts_for(candidate);
        if conflicts.is_empty() {
            Ok(())
        } else {
            Err(ScheduleError::Conflict {
                event_id: candidate.id.clone(),
                conflicts,
            })
        }
    }
}

/// Lifecycle rule for a cleaning moving from `from` to its current status.
///
/// The move must follow [`CleaningStatus::can_transition_to`], and any
/// status past `Pending` needs an assigned cleaner.
fn check_status(cleaning: &Cleaning, from: CleaningStatus) -> ScheduleResult<()> {
    let to = cleaning.status;
    let needs_cleaner = to != CleaningStatus::Pending;
    if !from.can_transition_to(to) || (needs_cleaner && cleaning.cleaner_id.is_none()) {
        return Err(ScheduleError::InvalidTransition {
            event_id: cleaning.id.clone(),
            from,
            to,
        });
    }
    Ok(())
}
