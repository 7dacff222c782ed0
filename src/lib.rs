//! Turnover-cleaning scheduling for short-term rentals.
//!
//! Derives the cleaning window between consecutive stays at a property
//! and keeps the resulting schedule free of double-booking: no cleaner
//! and no property may carry two overlapping cleanings.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Property`, `Reservation`, `Cleaning`,
//!   `Cleaner`, `TimeWindow`, `ScheduleEvent`, `Snapshot`
//! - **`turnover`**: Turnover derivation from consecutive reservations
//! - **`conflict`**: Overlap validation for cleaning mutations
//! - **`store`**: In-memory schedule with a single validated commit path
//! - **`ingest`**: Backend JSON payload normalization and Hostfully record mappers
//! - **`validation`**: Snapshot integrity checks (duplicate IDs, dangling refs)
//! - **`report`**: Assignments table and cleaner workload
//! - **`mock`**: Reproducible demo data
//! - **`config`**: TOML-backed tunables
//! - **`error`**: Crate error type
//!
//! # Time Model
//!
//! All instants are `chrono::DateTime<Utc>` and every interval is
//! half-open: windows that only touch do not overlap.
//!
//! # Logging
//!
//! Emits `tracing` events; installing a subscriber is up to the caller.

pub mod config;
pub mod conflict;
pub mod error;
pub mod ingest;
pub mod mock;
pub mod models;
pub mod report;
pub mod store;
pub mod turnover;
pub mod validation;
