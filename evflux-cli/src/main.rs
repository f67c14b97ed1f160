//! CLI handler for evflux.
//!
//! Reads one monitoring event as JSON from stdin, translates it into
//! line-protocol records and writes them to the configured backend.
//! Exits 0 when the write succeeds and 1 on any failure.

use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use evflux::config::{DEFAULT_ADDR, DEFAULT_DATABASE, HandlerConfig, Precision, WriteConfig};
use evflux::event::Event;

/// evflux: forward a monitoring event to a line-protocol backend.
#[derive(Parser, Debug)]
#[command(name = "evflux", version, about)]
struct Cli {
    /// Backend base URL.
    #[arg(short = 'a', long, env = "INFLUXDB_ADDR", default_value = DEFAULT_ADDR)]
    addr: String,

    /// Target database name.
    #[arg(short = 'd', long, env = "INFLUXDB_DB", default_value = DEFAULT_DATABASE)]
    db_name: String,

    /// Basic-auth username.
    #[arg(short = 'u', long, env = "INFLUXDB_USER")]
    username: Option<String>,

    /// Basic-auth password.
    #[arg(short = 'p', long, env = "INFLUXDB_PASS", hide_env_values = true)]
    password: Option<String>,

    /// Timestamp precision (ns, u, ms, s).
    #[arg(short = 'r', long, env = "INFLUXDB_PRECISION", default_value = "s")]
    precision: Precision,

    /// Skip TLS certificate verification.
    #[arg(short = 'i', long)]
    insecure_skip_verify: bool,

    /// Keep metric names whole and tag the entity as `host`.
    #[arg(short = 'l', long)]
    legacy: bool,

    /// Strip the entity name from the front of metric names.
    #[arg(short = 's', long)]
    strip_host: bool,

    /// Emit a `<check> status=<n>i` record for every check result.
    #[arg(short = 'c', long)]
    check_status_metric: bool,

    /// HTTP timeout in seconds.
    #[arg(long, default_value = "10")]
    timeout: u64,
}

impl Cli {
    fn handler_config(&self) -> HandlerConfig {
        HandlerConfig::new()
            .with_legacy(self.legacy)
            .with_strip_host(self.strip_host)
            .with_check_status_metric(self.check_status_metric)
            .with_precision(self.precision)
    }

    fn write_config(&self) -> WriteConfig {
        let mut config = WriteConfig::new(&self.addr)
            .with_database(&self.db_name)
            .with_timeout(Duration::from_secs(self.timeout))
            .with_insecure_skip_verify(self.insecure_skip_verify);
        if let Some(username) = &self.username {
            config = config.with_credentials(username, self.password.as_deref().unwrap_or_default());
        }
        config
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        tracing::error!("handler failed: {e}");
        std::process::exit(1);
    }
}

/// Reads the event from stdin and forwards it.
fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let event = Event::from_reader(std::io::stdin().lock())?;
    tracing::debug!(
        entity = event.entity_name(),
        points = event.points().len(),
        has_check = event.check.is_some(),
        "event decoded"
    );

    let lines = evflux::handle(&event, &cli.handler_config(), &cli.write_config())?;
    tracing::info!(lines, addr = %cli.addr, "event forwarded");
    Ok(())
}
