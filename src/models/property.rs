//! Property model.
//!
//! A rentable unit. Reservations and cleanings are anchored to a property;
//! two cleanings at the same property may never overlap.

use serde::{Deserialize, Serialize};

/// Colour used for properties synthesized from dangling references.
pub const PLACEHOLDER_COLOR: &str = "#888";

/// A short-term rental property. Immutable reference data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    /// Unique property identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Short code shown in event subjects, e.g. `P-001`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// IANA time zone name, e.g. `America/New_York`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    /// Display colour.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Street address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl Property {
    /// Creates a property with the given ID and name.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            code: None,
            timezone: None,
            color: None,
            address: None,
        }
    }

    /// Creates a stand-in for a property that is referenced but unknown.
    ///
    /// The ID doubles as the name.
    pub fn placeholder(id: impl Into<String>) -> Self {
        let id = id.into();
        Self::new(id.clone(), id).with_color(PLACEHOLDER_COLOR)
    }

    /// Sets the short code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Sets the time zone.
    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }

    /// Sets the display colour.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Sets the street address.
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Label for tables: name, else code, else ID.
    pub fn label(&self) -> &str {
        if !self.name.is_empty() {
            &self.name
        } else if let Some(code) = self.code.as_deref().filter(|c| !c.is_empty()) {
            code
        } else {
            &self.id
        }
    }
}
