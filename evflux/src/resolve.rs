//! Measurement name and tag set resolution for metric points.
//!
//! # Naming
//!
//! With legacy naming off, a dotted metric name is split at its first dot:
//! the left side becomes the measurement and the right side the field key.
//! `ram.total.memory` is written as measurement `ram` with field
//! `total.memory`. Names without a dot keep the whole name as measurement and
//! use the field key `value`.
//!
//! With legacy naming on, the whole name is the measurement and the field key
//! is always `value`.
//!
//! Host stripping removes a leading `<entity>.` from the metric name before
//! either rule runs, so `web1.cpu.user` reported by `web1` becomes `cpu` with
//! field `user`.
//!
//! # Tags
//!
//! Every point carries its own tags plus an identity tag naming the entity:
//! `sensu_entity_name` normally, `host` in legacy mode. The identity tag is
//! owned by the resolver and replaces a point tag of the same name. An empty
//! entity name produces no identity tag.

use std::collections::BTreeMap;

use crate::config::HandlerConfig;
use crate::event::{Point, Tag};

/// Identity tag key used with legacy naming off.
pub const ENTITY_TAG: &str = "sensu_entity_name";

/// Identity tag key used with legacy naming on.
pub const LEGACY_ENTITY_TAG: &str = "host";

/// Field key used when the metric name yields none.
pub const DEFAULT_FIELD_KEY: &str = "value";

/// Resolved identity of a metric point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricIdentity {
    /// Measurement name.
    pub name: String,
    /// Key of the single field carrying the point's value.
    pub field_key: String,
    /// Tag set, including the entity identity tag.
    pub tags: BTreeMap<String, String>,
}

/// Returns the tag key that identifies the entity.
pub fn identity_key(legacy: bool) -> &'static str {
    if legacy { LEGACY_ENTITY_TAG } else { ENTITY_TAG }
}

/// Builds the tag set for a record produced on behalf of `entity_name`.
///
/// Point tags are inserted in order (a later duplicate replaces an earlier
/// one), then the identity tag is added when the entity name is non-empty.
pub fn resolve_tags(
    entity_name: &str,
    tags: &[Tag],
    config: &HandlerConfig,
) -> BTreeMap<String, String> {
    let mut resolved: BTreeMap<String, String> = tags
        .iter()
        .map(|t| (t.name.clone(), t.value.clone()))
        .collect();

    if !entity_name.is_empty() {
        let key = identity_key(config.legacy);
        if let Some(previous) = resolved.insert(key.to_string(), entity_name.to_string())
            && previous != entity_name
        {
            tracing::warn!(
                tag = key,
                dropped = %previous,
                entity = entity_name,
                "point tag collides with entity identity tag; keeping entity name"
            );
        }
    }

    resolved
}

/// Derives the measurement name from a metric name.
///
/// Legacy naming keeps the name unchanged; otherwise only the part before
/// the first dot is kept. Applying this to its own output is a no-op.
pub fn set_name<'a>(point_name: &'a str, config: &HandlerConfig) -> &'a str {
    if config.legacy {
        return point_name;
    }
    match point_name.find('.') {
        Some(idx) => &point_name[..idx],
        None => point_name,
    }
}

/// Removes a leading `<entity>.` from `point_name` when host stripping is on.
///
/// An empty entity name strips a single leading dot.
pub fn strip_host<'a>(point_name: &'a str, entity_name: &str, config: &HandlerConfig) -> &'a str {
    if !config.strip_host {
        return point_name;
    }
    point_name
        .strip_prefix(entity_name)
        .and_then(|rest| rest.strip_prefix('.'))
        .unwrap_or(point_name)
}

/// Splits a metric name into measurement name and field key.
pub fn split_name(
    point_name: &str,
    entity_name: &str,
    config: &HandlerConfig,
) -> (String, String) {
    let stripped = strip_host(point_name, entity_name, config);
    let name = set_name(stripped, config);

    let field_key = if config.legacy {
        DEFAULT_FIELD_KEY
    } else {
        match stripped.get(name.len() + 1..) {
            Some(rest) if !rest.is_empty() => rest,
            _ => DEFAULT_FIELD_KEY,
        }
    };

    (name.to_string(), field_key.to_string())
}

/// Resolves the measurement name, field key and tags of a metric point.
pub fn resolve_metric(entity_name: &str, point: &Point, config: &HandlerConfig) -> MetricIdentity {
    let (name, field_key) = split_name(&point.name, entity_name, config);
    let tags = resolve_tags(entity_name, &point.tags, config);

    tracing::debug!(
        metric = %point.name,
        measurement = %name,
        field = %field_key,
        "resolved metric identity"
    );

    MetricIdentity {
        name,
        field_key,
        tags,
    }
}

/// Normalizes a timestamp of unknown unit to nanoseconds since epoch.
///
/// The unit is inferred from magnitude: values below 10^11 are seconds,
/// below 10^14 milliseconds, below 10^17 microseconds, anything larger
/// nanoseconds. Zero means the producer sent no timestamp.
pub fn normalize_timestamp(timestamp: i64) -> Option<i64> {
    const SECONDS_MAX: u64 = 100_000_000_000;
    const MILLIS_MAX: u64 = 100_000_000_000_000;
    const MICROS_MAX: u64 = 100_000_000_000_000_000;

    if timestamp == 0 {
        return None;
    }

    let magnitude = timestamp.unsigned_abs();
    let nanos = if magnitude < SECONDS_MAX {
        timestamp.saturating_mul(1_000_000_000)
    } else if magnitude < MILLIS_MAX {
        timestamp.saturating_mul(1_000_000)
    } else if magnitude < MICROS_MAX {
        timestamp.saturating_mul(1_000)
    } else {
        timestamp
    };
    Some(nanos)
}
