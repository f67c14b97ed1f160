//! Status-change annotations.
//!
//! An annotation is a human-readable record marking the moment a check
//! changed status. Dashboards overlay it on the metric graphs of the same
//! entity.

use crate::event::{Check, Event};
use crate::line_protocol::Record;
use crate::resolve::normalize_timestamp;

/// Measurement name of annotation records.
pub const ANNOTATION_MEASUREMENT: &str = "sensu_event";

/// Title carried by every annotation.
const ANNOTATION_TITLE: &str = "\"Sensu Event\"";

/// Returns `true` when the event marks a status transition.
///
/// A check's occurrence counter restarts at 1 whenever its status changes,
/// so the first occurrence of any status (including OK) is a transition.
/// Events without a check never need one.
pub fn needs_annotation(event: &Event) -> bool {
    event.check.as_ref().is_some_and(|c| c.occurrences == 1)
}

/// Builds the annotation record for an event, if it needs one.
///
/// The record is tagged with the check and entity names and carries a quoted
/// title and description plus the raw status and occurrence count.
pub fn annotation_record(event: &Event) -> Option<Record> {
    if !needs_annotation(event) {
        return None;
    }
    let check = event.check.as_ref()?;
    let entity = event.entity_name();

    tracing::debug!(entity, check = check.name(), status = check.status, "emitting annotation");

    Some(
        Record::new(ANNOTATION_MEASUREMENT)
            .tag("check", check.name())
            .tag("entity", entity)
            .field("title", ANNOTATION_TITLE)
            .field("description", describe(entity, check))
            .field("status", i64::from(check.status))
            .field("occurrences", check.occurrences)
            .with_timestamp(normalize_timestamp(check.executed)),
    )
}

/// Formats the quoted annotation description.
fn describe(entity: &str, check: &Check) -> String {
    format!("\"ALERT - {entity}/{} : {}\"", check.name(), check.output)
}
