//! Turnover-scheduling domain models.
//!
//! Provides the core data types for a short-term-rental cleaning
//! schedule: the reference data (properties, cleaners), the schedule
//! records (reservations, cleanings), and the calendar view over them.
//!
//! # Domain Mappings
//!
//! | turnover-schedule | Scheduling theory | Booking backend |
//! |-------------------|-------------------|-----------------|
//! | Property | Disjunctive resource | Listing |
//! | Cleaner | Disjunctive resource | Housekeeper |
//! | Cleaning | Activity | Housekeeping task |
//! | Reservation | Fixed blocking interval | Booking |
//! | Snapshot | Problem instance | API payload |

mod calendar;
mod cleaner;
mod cleaning;
mod event;
mod property;
mod reservation;
mod snapshot;

pub use calendar::TimeWindow;
pub use cleaner::{Cleaner, CleanerStatus};
pub use cleaning::{Cleaning, CleaningKind, CleaningStatus};
pub use event::{cleaning_label, reservation_subject, EventKind, ScheduleEvent};
pub use property::{Property, PLACEHOLDER_COLOR};
pub use reservation::{Reservation, ReservationStatus};
pub use snapshot::Snapshot;
