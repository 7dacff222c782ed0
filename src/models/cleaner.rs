//! Cleaner model.
//!
//! Cleaners are the resources that perform cleanings. Capacity is the
//! advisory number of concurrent jobs; it is reported, never enforced.

use serde::{Deserialize, Serialize};

/// A cleaner that can be assigned to cleanings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cleaner {
    /// Unique cleaner identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Display colour.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Maximum concurrent jobs (advisory).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    /// Availability status.
    #[serde(default)]
    pub status: CleanerStatus,
}

/// Availability status of a cleaner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleanerStatus {
    /// Working.
    #[default]
    Active,
    /// Temporarily away.
    Holiday,
    /// No longer taking jobs.
    Inactive,
}

impl CleanerStatus {
    /// Parses a status name, case-insensitively.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "active" => Some(Self::Active),
            "holiday" => Some(Self::Holiday),
            "inactive" => Some(Self::Inactive),
            _ => None,
        }
    }
}

impl Cleaner {
    /// Creates an active cleaner.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: None,
            capacity: None,
            status: CleanerStatus::Active,
        }
    }

    /// Sets the display colour.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Sets the advisory capacity.
    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Sets the status.
    pub fn with_status(mut self, status: CleanerStatus) -> Self {
        self.status = status;
        self
    }

    /// Whether the cleaner can be given new jobs.
    ///
    /// Cleaners on holiday stay assignable; the operator decides.
    pub fn is_assignable(&self) -> bool {
        self.status != CleanerStatus::Inactive
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleaner_builder() {
        let c = Cleaner::new("c1", "Alex")
            .with_color("#4f46e5")
            .with_capacity(3)
            .with_status(CleanerStatus::Holiday);

        assert_eq!(c.name, "Alex");
        assert_eq!(c.capacity, Some(3));
        assert_eq!(c.status, CleanerStatus::Holiday);
        assert!(c.is_assignable());
    }

    #[test]
    fn test_inactive_not_assignable() {
        let c = Cleaner::new("c1", "Alex").with_status(CleanerStatus::Inactive);
        assert!(!c.is_assignable());
    }

    #[test]
    fn test_status_defaults_to_active() {
        let c: Cleaner = serde_json::from_str(r#"{"id":"c1","name":"Alex"}"#).unwrap();
        assert_eq!(c.status, CleanerStatus::Active);
        assert_eq!(c.capacity, None);
    }
}
