//! Handler and transport configuration.
//!
//! Configuration is built once at startup and passed by reference to every
//! function that needs it. Nothing in the crate reads process-wide state.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Timestamp precision used on the wire.
///
/// Records always carry nanosecond timestamps internally; the precision only
/// decides how they are written and which `precision` query parameter is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Precision {
    /// Nanoseconds (`ns`).
    Nanoseconds,
    /// Microseconds (`u`).
    Microseconds,
    /// Milliseconds (`ms`).
    Milliseconds,
    /// Seconds (`s`).
    #[default]
    Seconds,
}

impl Precision {
    /// Returns the query parameter value the backend expects.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Nanoseconds => "ns",
            Self::Microseconds => "u",
            Self::Milliseconds => "ms",
            Self::Seconds => "s",
        }
    }

    /// Number of nanoseconds in one unit of this precision.
    pub fn nanos_per_unit(self) -> i64 {
        match self {
            Self::Nanoseconds => 1,
            Self::Microseconds => 1_000,
            Self::Milliseconds => 1_000_000,
            Self::Seconds => 1_000_000_000,
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Precision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "ns" | "n" => Ok(Self::Nanoseconds),
            "u" | "us" | "µs" => Ok(Self::Microseconds),
            "ms" => Ok(Self::Milliseconds),
            "s" => Ok(Self::Seconds),
            other => Err(format!("unknown precision '{other}': use ns, u, ms, or s")),
        }
    }
}

/// Options that shape how an event becomes records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandlerConfig {
    /// Keep metric names whole and tag the entity as `host`.
    pub legacy: bool,
    /// Remove a leading `<entity>.` prefix from metric names.
    pub strip_host: bool,
    /// Emit a `<check> status=<n>i` record for every check result.
    pub check_status_metric: bool,
    /// Precision timestamps are written with.
    pub precision: Precision,
}

impl HandlerConfig {
    /// Creates a config with every option off and second precision.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables legacy naming.
    #[must_use]
    pub fn with_legacy(mut self, legacy: bool) -> Self {
        self.legacy = legacy;
        self
    }

    /// Enables or disables host-prefix stripping.
    #[must_use]
    pub fn with_strip_host(mut self, strip_host: bool) -> Self {
        self.strip_host = strip_host;
        self
    }

    /// Enables or disables the check status record.
    #[must_use]
    pub fn with_check_status_metric(mut self, check_status_metric: bool) -> Self {
        self.check_status_metric = check_status_metric;
        self
    }

    /// Sets the timestamp precision.
    #[must_use]
    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }
}

/// Default backend address.
pub const DEFAULT_ADDR: &str = "http://localhost:8086";

/// Default target database.
pub const DEFAULT_DATABASE: &str = "sensu";

/// Configuration for the backend write endpoint.
#[derive(Debug, Clone)]
pub struct WriteConfig {
    /// Backend base URL (e.g., `http://localhost:8086`).
    pub addr: String,
    /// Target database or bucket name.
    pub database: String,
    /// Basic-auth username; no credentials are sent when `None`.
    pub username: Option<String>,
    /// Basic-auth password.
    pub password: Option<String>,
    /// HTTP timeout for the write request.
    pub timeout: Duration,
    /// Skip TLS certificate verification.
    pub insecure_skip_verify: bool,
}

impl WriteConfig {
    /// Creates a new config with sensible defaults.
    ///
    /// Defaults: database `sensu`, no credentials, 10s timeout, TLS
    /// verification on.
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            database: DEFAULT_DATABASE.to_string(),
            username: None,
            password: None,
            timeout: Duration::from_secs(10),
            insecure_skip_verify: false,
        }
    }

    /// Sets the target database.
    #[must_use]
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// Sets basic-auth credentials.
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Sets the HTTP timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Disables TLS certificate verification.
    #[must_use]
    pub fn with_insecure_skip_verify(mut self, insecure: bool) -> Self {
        self.insecure_skip_verify = insecure;
        self
    }
}

impl Default for WriteConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ADDR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precision_parse() {
        assert_eq!("ns".parse::<Precision>().unwrap(), Precision::Nanoseconds);
        assert_eq!("u".parse::<Precision>().unwrap(), Precision::Microseconds);
        assert_eq!("us".parse::<Precision>().unwrap(), Precision::Microseconds);
        assert_eq!("ms".parse::<Precision>().unwrap(), Precision::Milliseconds);
        assert_eq!(" s ".parse::<Precision>().unwrap(), Precision::Seconds);
        assert!("h".parse::<Precision>().is_err());
    }

    #[test]
    fn test_precision_query_value() {
        assert_eq!(Precision::Microseconds.to_string(), "u");
        assert_eq!(Precision::default(), Precision::Seconds);
        assert_eq!(Precision::Milliseconds.nanos_per_unit(), 1_000_000);
    }

    #[test]
    fn test_handler_config_builder() {
        let config = HandlerConfig::new()
            .with_legacy(true)
            .with_strip_host(true)
            .with_check_status_metric(true)
            .with_precision(Precision::Nanoseconds);

        assert!(config.legacy);
        assert!(config.strip_host);
        assert!(config.check_status_metric);
        assert_eq!(config.precision, Precision::Nanoseconds);
        assert_eq!(HandlerConfig::default(), HandlerConfig::new());
    }

    #[test]
    fn test_write_config_builder() {
        let config = WriteConfig::new("http://example.com:8086")
            .with_database("metrics")
            .with_credentials("bar", "baz")
            .with_timeout(Duration::from_secs(3))
            .with_insecure_skip_verify(true);

        assert_eq!(config.addr, "http://example.com:8086");
        assert_eq!(config.database, "metrics");
        assert_eq!(config.username.as_deref(), Some("bar"));
        assert_eq!(config.password.as_deref(), Some("baz"));
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert!(config.insecure_skip_verify);
    }

    #[test]
    fn test_write_config_defaults() {
        let config = WriteConfig::default();
        assert_eq!(config.addr, DEFAULT_ADDR);
        assert_eq!(config.database, DEFAULT_DATABASE);
        assert!(config.username.is_none());
        assert!(!config.insecure_skip_verify);
    }
}
