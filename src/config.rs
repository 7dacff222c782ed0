//! Scheduler configuration.
//!
//! Loaded from TOML. Every field has a default, so an empty file (or no
//! file at all) yields the stock behaviour:
//!
//! ```toml
//! turnover_minutes = 240
//! degenerate_policy = "reject"   # or "clamp"
//! assignment_policy = "validated" # or "unchecked"
//! ```

use chrono::Duration;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::warn;

use crate::error::{ScheduleError, ScheduleResult};

/// What to do with a turnover window whose check-out is not before the
/// next check-in (back-to-back or overlapping stays).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DegenerateWindowPolicy {
    /// Emit no cleaning; flag the pair.
    #[default]
    Reject,
    /// Emit a zero-length cleaning at the check-out time; flag the pair.
    Clamp,
}

/// Whether the dedicated assign action goes through overlap validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentPolicy {
    /// Assignments are validated like any other mutation.
    #[default]
    Validated,
    /// Assignments skip the overlap check (legacy dashboard behaviour).
    Unchecked,
}

/// Tunables for turnover derivation and store commits.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Fixed turnover length when no next reservation is known (minutes).
    pub turnover_minutes: i64,
    /// Handling of zero/negative turnover windows.
    pub degenerate_policy: DegenerateWindowPolicy,
    /// Validation on the assign path.
    pub assignment_policy: AssignmentPolicy,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            turnover_minutes: DEFAULT_TURNOVER_MINUTES,
            degenerate_policy: DegenerateWindowPolicy::default(),
            assignment_policy: AssignmentPolicy::default(),
        }
    }
}

/// Default fixed turnover length: four hours.
pub const DEFAULT_TURNOVER_MINUTES: i64 = 240;

impl SchedulerConfig {
    /// Parses a TOML document.
    pub fn from_toml_str(content: &str) -> ScheduleResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| ScheduleError::Config {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ScheduleResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ScheduleError::Config {
            message: format!("Failed to read config file {}: {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Reads a TOML file, falling back to defaults if it is missing or invalid.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::from_file(path.as_ref()) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.as_ref().display(), error = %e, "using default scheduler config");
                Self::default()
            }
        }
    }

    /// Sets the fixed turnover length.
    pub fn with_turnover_minutes(mut self, minutes: i64) -> Self {
        self.turnover_minutes = minutes;
        self
    }

    /// Sets the degenerate window policy.
    pub fn with_degenerate_policy(mut self, policy: DegenerateWindowPolicy) -> Self {
        self.degenerate_policy = policy;
        self
    }

    /// Sets the assignment policy.
    pub fn with_assignment_policy(mut self, policy: AssignmentPolicy) -> Self {
        self.assignment_policy = policy;
        self
    }

    /// Fixed turnover length as a duration.
    ///
    /// # Errors
    ///
    /// [`ScheduleError::Config`] if `turnover_minutes` is outside
    /// `1..=10080`, which builder-set values are not checked against.
    pub fn turnover_duration(&self) -> ScheduleResult<Duration> {
        self.validate()?;
        Duration::try_minutes(self.turnover_minutes).ok_or_else(|| ScheduleError::Config {
            message: format!("turnover_minutes out of range: {}", self.turnover_minutes),
        })
    }

    fn validate(&self) -> ScheduleResult<()> {
        // At most one week.
        if self.turnover_minutes <= 0 || self.turnover_minutes > 7 * 24 * 60 {
            return Err(ScheduleError::Config {
                message: format!(
                    "turnover_minutes must be in 1..=10080, got {}",
                    self.turnover_minutes
                ),
            });
        }
        Ok(())
    }
}
