//! Event-to-records translation.
//!
//! One event yields, in order:
//!
//! 1. a check status record, when enabled and the event has a check;
//! 2. an annotation record, when the check just changed status;
//! 3. one record per metric point, in the event's order.
//!
//! Points that resolve to the same measurement and tag set are not merged.

use crate::annotation::annotation_record;
use crate::config::HandlerConfig;
use crate::error::Result;
use crate::event::{Event, Point};
use crate::line_protocol::{FieldValue, Record, encode_payload};
use crate::resolve::{normalize_timestamp, resolve_metric, resolve_tags};

/// Field key of the check status record.
pub const STATUS_FIELD: &str = "status";

/// Builds the `<check> status=<n>i` record, if enabled and the event has a check.
pub fn status_record(event: &Event, config: &HandlerConfig) -> Option<Record> {
    if !config.check_status_metric {
        return None;
    }
    let check = event.check.as_ref()?;

    Some(
        Record::new(check.name())
            .with_tags(resolve_tags(event.entity_name(), &[], config))
            .field(STATUS_FIELD, i64::from(check.status))
            .with_timestamp(normalize_timestamp(check.executed)),
    )
}

/// Builds the record for a single metric point.
pub fn metric_record(entity_name: &str, point: &Point, config: &HandlerConfig) -> Record {
    let identity = resolve_metric(entity_name, point, config);

    Record::new(identity.name)
        .with_tags(identity.tags)
        .field(identity.field_key, FieldValue::Float(point.value))
        .with_timestamp(normalize_timestamp(point.timestamp))
}

/// Translates an event into the records to write.
///
/// Returns at most `points + 2` records. A record that could not be
/// encoded rejects the whole event before anything is sent.
///
/// # Errors
///
/// Returns `EncodeError` if any produced record cannot be represented in
/// line protocol.
pub fn translate(event: &Event, config: &HandlerConfig) -> Result<Vec<Record>> {
    let entity_name = event.entity_name();
    let points = event.points();

    let mut records = Vec::with_capacity(points.len() + 2);
    records.extend(status_record(event, config));
    records.extend(annotation_record(event));
    records.extend(points.iter().map(|p| metric_record(entity_name, p, config)));

    for record in &records {
        record.validate()?;
    }

    tracing::debug!(
        entity = entity_name,
        records = records.len(),
        points = points.len(),
        "translated event"
    );

    Ok(records)
}

/// Translates an event and encodes it as a newline-separated payload.
///
/// # Errors
///
/// Returns `EncodeError` if any produced record cannot be represented in
/// line protocol.
pub fn render(event: &Event, config: &HandlerConfig) -> Result<String> {
    let records = translate(event, config)?;
    Ok(encode_payload(&records, config.precision))
}
