//! Line protocol encoder.
//!
//! Line protocol format:
//! ```text
//! measurement,tag1=val1,tag2=val2 field1=val1,field2=val2 timestamp
//! ```
//!
//! Tags and fields are kept in ordered maps, so a record always serializes
//! with keys in ascending order. Two records built from the same inputs encode
//! to byte-identical lines.
//!
//! See: <https://docs.influxdata.com/influxdb/v1/write_protocols/line_protocol_reference/>

use std::collections::BTreeMap;
use std::fmt::{self, Write as _};

use crate::config::Precision;
use crate::error::{EncodeError, Result};

/// A value that can be stored in a line-protocol field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// 64-bit floating point.
    Float(f64),
    /// 64-bit signed integer.
    Integer(i64),
    /// UTF-8 string.
    String(String),
    /// Boolean value.
    Boolean(bool),
}

impl FieldValue {
    /// Appends this value in line-protocol form.
    ///
    /// - Float: decimal (e.g., `3.14`, `42`)
    /// - Integer: suffixed with `i` (e.g., `42i`)
    /// - String: double-quoted, inner quotes and backslashes escaped
    /// - Boolean: `true` or `false`
    fn write_to(&self, out: &mut String) {
        match self {
            // Writing to a String cannot fail.
            FieldValue::Float(v) => {
                let _ = write!(out, "{v}");
            }
            FieldValue::Integer(v) => {
                let _ = write!(out, "{v}i");
            }
            FieldValue::String(v) => {
                out.push('"');
                for c in v.chars() {
                    if c == '"' || c == '\\' {
                        out.push('\\');
                    }
                    out.push(c);
                }
                out.push('"');
            }
            FieldValue::Boolean(v) => out.push_str(if *v { "true" } else { "false" }),
        }
    }

    /// Formats this value for line protocol.
    pub fn to_line_protocol(&self) -> String {
        let mut out = String::new();
        self.write_to(&mut out);
        out
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_line_protocol())
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Integer(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::String(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::String(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Boolean(v)
    }
}

/// One line-protocol record.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    /// Measurement name.
    pub measurement: String,
    /// Tag set, keyed by tag name.
    pub tags: BTreeMap<String, String>,
    /// Field set, keyed by field name. Must not be empty when encoded.
    pub fields: BTreeMap<String, FieldValue>,
    /// Timestamp in nanoseconds since epoch; the backend assigns one when `None`.
    pub timestamp: Option<i64>,
}

impl Record {
    /// Creates a record with no tags, fields, or timestamp.
    pub fn new(measurement: impl Into<String>) -> Self {
        Self {
            measurement: measurement.into(),
            ..Self::default()
        }
    }

    /// Adds or replaces a tag.
    #[must_use]
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Replaces the whole tag set.
    #[must_use]
    pub fn with_tags(mut self, tags: BTreeMap<String, String>) -> Self {
        self.tags = tags;
        self
    }

    /// Adds or replaces a field.
    #[must_use]
    pub fn field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Sets the timestamp in nanoseconds.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp_ns: Option<i64>) -> Self {
        self.timestamp = timestamp_ns;
        self
    }

    /// Checks that the record can be represented in line protocol.
    ///
    /// Tags with an empty value are not checked, since [`Record::encode`]
    /// leaves them out.
    ///
    /// # Errors
    ///
    /// - `EncodeError::NoFields` if the record has no fields
    /// - `EncodeError::EmptyTagKey` / `EncodeError::EmptyFieldKey` for an
    ///   empty key
    /// - `EncodeError::TrailingBackslash` if the measurement, a key or a tag
    ///   value ends in `\`, which would escape the delimiter after it
    /// - `EncodeError::NonFiniteFloat` if a float field is NaN or infinite
    pub fn validate(&self) -> Result<()> {
        if self.fields.is_empty() {
            return Err(EncodeError::NoFields {
                measurement: self.measurement.clone(),
            }
            .into());
        }
        self.check_trailing_backslash(&self.measurement)?;

        for (key, value) in self.tags.iter().filter(|(_, v)| !v.is_empty()) {
            if key.is_empty() {
                return Err(EncodeError::EmptyTagKey {
                    measurement: self.measurement.clone(),
                }
                .into());
            }
            self.check_trailing_backslash(key)?;
            self.check_trailing_backslash(value)?;
        }

        for (key, value) in &self.fields {
            if key.is_empty() {
                return Err(EncodeError::EmptyFieldKey {
                    measurement: self.measurement.clone(),
                }
                .into());
            }
            self.check_trailing_backslash(key)?;
            if let FieldValue::Float(v) = value
                && !v.is_finite()
            {
                return Err(EncodeError::NonFiniteFloat {
                    measurement: self.measurement.clone(),
                    field: key.clone(),
                    value: *v,
                }
                .into());
            }
        }
        Ok(())
    }

    fn check_trailing_backslash(&self, text: &str) -> Result<()> {
        if text.ends_with('\\') {
            return Err(EncodeError::TrailingBackslash {
                measurement: self.measurement.clone(),
                text: text.to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Encodes the record as a single line (without trailing newline).
    ///
    /// Tags with an empty value are left out, since line protocol cannot
    /// carry them. The record is not checked here; a record that fails
    /// [`Record::validate`] encodes to a line the backend will reject.
    pub fn encode(&self, precision: Precision) -> String {
        let mut line = String::with_capacity(64);
        escape_into(&mut line, &self.measurement, &[',', ' ']);

        for (key, value) in &self.tags {
            if value.is_empty() {
                continue;
            }
            line.push(',');
            escape_into(&mut line, key, &[',', '=', ' ']);
            line.push('=');
            escape_into(&mut line, value, &[',', '=', ' ']);
        }

        line.push(' ');

        for (i, (key, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                line.push(',');
            }
            escape_into(&mut line, key, &[',', '=', ' ']);
            line.push('=');
            value.write_to(&mut line);
        }

        if let Some(ts) = self.timestamp {
            let _ = write!(line, " {}", ts.div_euclid(precision.nanos_per_unit()));
        }

        line
    }
}

/// Encodes records as a newline-separated payload.
///
/// Callers validate the records first; see [`crate::translate::translate`].
pub fn encode_payload(records: &[Record], precision: Precision) -> String {
    records
        .iter()
        .map(|r| r.encode(precision))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Appends `s`, prefixing every character in `special` with a backslash.
///
/// Measurements escape commas and spaces; tag keys, tag values and field
/// keys additionally escape equals signs.
fn escape_into(out: &mut String, s: &str, special: &[char]) {
    for c in s.chars() {
        if special.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
}
