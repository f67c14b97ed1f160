//! # evflux
//!
//! Translate monitoring check events into line-protocol records and forward
//! them over HTTP.
//!
//! A handler invocation reads one event (an entity, an optional check result
//! and optional metric points), turns it into line-protocol records and
//! writes them to a time-series backend in a single request. Nothing is
//! buffered, batched, retried or persisted.
//!
//! ## Quick Start
//!
//! ```rust
//! use evflux::{Event, HandlerConfig, render};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let event = Event::from_json(r#"{
//!     "entity": { "metadata": { "name": "web1" } },
//!     "metrics": { "points": [
//!         { "name": "web1.cpu.user", "value": 12.5, "timestamp": 1700000000,
//!           "tags": [{ "name": "core", "value": "0" }] }
//!     ] }
//! }"#)?;
//!
//! let config = HandlerConfig::new().with_strip_host(true);
//! let payload = render(&event, &config)?;
//! assert_eq!(payload, "cpu,core=0,sensu_entity_name=web1 user=12.5 1700000000");
//! # Ok(())
//! # }
//! ```
//!
//! ## Records
//!
//! For each event the translator emits, in order:
//!
//! - a `<check> status=<n>i` record when the check status metric is enabled;
//! - a `sensu_event` annotation record when the check just changed status;
//! - one record per metric point.
//!
//! ## Modules
//!
//! - [`event`] - Event model and JSON decoding
//! - [`config`] - Handler and write configuration
//! - [`line_protocol`] - Record type and line-protocol encoder
//! - [`resolve`] - Measurement name and tag resolution
//! - [`annotation`] - Status-change annotations
//! - [`translate`] - Event-to-records translation
//! - [`write`] - HTTP forwarding
//! - [`error`] - Error types

pub mod annotation;
pub mod config;
pub mod error;
pub mod event;
pub mod line_protocol;
pub mod resolve;
pub mod translate;
pub mod write;

// Re-export primary API types at crate root for convenience.
pub use config::{HandlerConfig, Precision, WriteConfig};
pub use error::{EvfluxError, Result};
pub use event::{Event, Point, Tag};
pub use line_protocol::{FieldValue, Record};
pub use translate::{render, translate};
pub use write::{handle, push};
