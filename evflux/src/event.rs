//! Monitoring event model and JSON decoding.
//!
//! The types mirror the subset of the monitoring agent's event document that
//! the handler reads. Unknown keys are ignored so that full event documents
//! decode without loss of the parts we care about.
//!
//! ```json
//! {
//!   "entity": { "metadata": { "name": "web1" } },
//!   "check": {
//!     "metadata": { "name": "check-cpu" },
//!     "status": 1,
//!     "occurrences": 1,
//!     "output": "CPU at 97%",
//!     "executed": 1700000000
//!   },
//!   "metrics": {
//!     "points": [
//!       { "name": "cpu.user", "value": 97.0, "timestamp": 1700000000,
//!         "tags": [{ "name": "core", "value": "0" }] }
//!     ]
//!   }
//! }
//! ```

use std::io::Read;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{DecodeError, Result};

/// One monitoring observation: an entity, an optional check result and
/// optional metric points.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// The entity that produced the event.
    #[serde(default)]
    pub entity: Option<Entity>,
    /// The check result, if the event came from a check execution.
    #[serde(default)]
    pub check: Option<Check>,
    /// Metric points attached to the event.
    #[serde(default)]
    pub metrics: Option<Metrics>,
    /// Event creation time in seconds since epoch.
    #[serde(default)]
    pub timestamp: i64,
}

/// Object metadata shared by entities and checks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectMeta {
    /// Object name.
    #[serde(default)]
    pub name: String,
    /// Namespace the object lives in.
    #[serde(default)]
    pub namespace: String,
}

/// The monitored resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Entity metadata; `metadata.name` is the entity name.
    #[serde(default)]
    pub metadata: ObjectMeta,
}

/// A check result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Check {
    /// Check metadata; `metadata.name` is the check name.
    #[serde(default)]
    pub metadata: ObjectMeta,
    /// Exit status of the check (0 = OK).
    #[serde(default)]
    pub status: u32,
    /// Number of consecutive executions with the current status.
    #[serde(default)]
    pub occurrences: i64,
    /// Output produced by the check.
    #[serde(default)]
    pub output: String,
    /// Execution time in seconds since epoch.
    #[serde(default)]
    pub executed: i64,
}

impl Check {
    /// Returns the check name.
    pub fn name(&self) -> &str {
        &self.metadata.name
    }
}

/// Metric points attached to an event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// The measurements, in the order they were produced.
    #[serde(default, deserialize_with = "null_as_default")]
    pub points: Vec<Point>,
}

/// One numeric measurement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Dotted or underscored metric name.
    pub name: String,
    /// The measured value.
    pub value: f64,
    /// Timestamp in seconds, milliseconds, microseconds or nanoseconds since epoch.
    #[serde(default)]
    pub timestamp: i64,
    /// Point tags.
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<Tag>,
}

/// A name/value tag pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Tag name.
    pub name: String,
    /// Tag value.
    #[serde(default)]
    pub value: String,
}

impl Tag {
    /// Creates a tag.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl Point {
    /// Creates a point with no tags.
    pub fn new(name: impl Into<String>, value: f64, timestamp: i64) -> Self {
        Self {
            name: name.into(),
            value,
            timestamp,
            tags: Vec::new(),
        }
    }

    /// Adds a tag.
    #[must_use]
    pub fn with_tag(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push(Tag::new(name, value));
        self
    }
}

impl Event {
    /// Decodes and validates a single event from a reader.
    ///
    /// # Errors
    ///
    /// Returns `DecodeError` if the input cannot be read, is not a valid event
    /// document, or fails [`Event::validate`].
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut buf = String::new();
        reader
            .read_to_string(&mut buf)
            .map_err(DecodeError::from)?;
        Self::from_json(&buf)
    }

    /// Decodes and validates a single event from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns `DecodeError` if the input is not a valid event document or
    /// fails [`Event::validate`].
    pub fn from_json(json: &str) -> Result<Self> {
        let event: Self = serde_json::from_str(json).map_err(DecodeError::from)?;
        event.validate()?;
        Ok(event)
    }

    /// Checks that the event carries something to forward.
    ///
    /// # Errors
    ///
    /// Returns `DecodeError::Empty` if the event has neither a check nor
    /// metrics, and `DecodeError::EmptyPointName` if a point has no name.
    pub fn validate(&self) -> Result<()> {
        if self.check.is_none() && self.metrics.is_none() {
            return Err(DecodeError::Empty.into());
        }
        if let Some(index) = self.points().iter().position(|p| p.name.is_empty()) {
            return Err(DecodeError::EmptyPointName { index }.into());
        }
        Ok(())
    }

    /// Returns the entity name, or an empty string when there is no entity.
    pub fn entity_name(&self) -> &str {
        self.entity.as_ref().map_or("", |e| e.metadata.name.as_str())
    }

    /// Returns the metric points, or an empty slice when there are none.
    pub fn points(&self) -> &[Point] {
        self.metrics.as_ref().map_or(&[], |m| m.points.as_slice())
    }
}

/// Treats an explicit JSON `null` like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
