//! Plant record types and field validation.
//!
//! [`Plant`] is the persisted entity; [`PlantDraft`] is the caller-supplied
//! input to `add` / `update`.  A draft becomes storable only through
//! [`PlantDraft::validate`], which is the single place the record invariants
//! (non-empty name, positive interval) are enforced.

use core::fmt;

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Storage and display format for calendar dates (ISO 8601).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Repository-assigned plant identifier.  Immutable once assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlantId(pub i64);

impl fmt::Display for PlantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A persisted plant record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plant {
    pub id: PlantId,
    pub name: String,
    /// Free text, may be empty.
    pub location: String,
    /// Days between waterings, always > 0.
    pub watering_interval: u32,
    pub last_watered: NaiveDate,
    /// Reference to an externally stored photo.
    pub image_uri: Option<String>,
    /// Date of the last periodic-scan reminder for this plant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_notified: Option<NaiveDate>,
}

impl Plant {
    /// Draft carrying this record's current mutable fields, for edits.
    pub fn to_draft(&self) -> PlantDraft {
        PlantDraft {
            name: self.name.clone(),
            location: self.location.clone(),
            watering_interval: i64::from(self.watering_interval),
            last_watered: self.last_watered,
            image_uri: self.image_uri.clone(),
        }
    }
}

/// Caller input for creating or overwriting a plant.
///
/// `watering_interval` is signed so that a UI passing through whatever the
/// user typed gets a [`Error::Validation`] instead of a wrapped value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlantDraft {
    pub name: String,
    pub location: String,
    pub watering_interval: i64,
    pub last_watered: NaiveDate,
    pub image_uri: Option<String>,
}

impl PlantDraft {
    pub fn new(name: impl Into<String>, watering_interval: i64, last_watered: NaiveDate) -> Self {
        Self {
            name: name.into(),
            location: String::new(),
            watering_interval,
            last_watered,
            image_uri: None,
        }
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn image_uri(mut self, uri: impl Into<String>) -> Self {
        self.image_uri = Some(uri.into());
        self
    }

    /// Check the record invariants.  The name is stored as entered; only a
    /// blank one is rejected.
    pub(crate) fn validate(&self) -> Result<PlantFields> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation("name must not be empty"));
        }
        if self.watering_interval <= 0 {
            return Err(Error::Validation("watering interval must be a positive number of days"));
        }
        let watering_interval = u32::try_from(self.watering_interval)
            .map_err(|_| Error::Validation("watering interval is too large"))?;

        Ok(PlantFields {
            name: self.name.clone(),
            location: self.location.clone(),
            watering_interval,
            last_watered: self.last_watered,
            image_uri: self.image_uri.clone().filter(|uri| !uri.is_empty()),
        })
    }
}

/// Validated, normalised mutable fields of a plant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PlantFields {
    pub name: String,
    pub location: String,
    pub watering_interval: u32,
    pub last_watered: NaiveDate,
    pub image_uri: Option<String>,
}

/// Parse a user- or storage-supplied date.
///
/// Accepts `YYYY-MM-DD` and full RFC 3339 timestamps; a timestamp is reduced
/// to its calendar date since time of day carries no meaning here.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let input = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(input, DATE_FORMAT) {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(input)
        .map(|ts| ts.date_naive())
        .map_err(|_| Error::Validation("date must be ISO 8601 (YYYY-MM-DD)"))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
