//! HTTP write client for forwarding line-protocol payloads.
//!
//! Posts the encoded payload to the backend's `/write` endpoint in a single
//! request. There is no batching and no retry: a failed write fails the
//! invocation and the caller decides whether to run it again.
//!
//! # Example
//!
//! ```rust,no_run
//! use evflux::config::{HandlerConfig, WriteConfig};
//! use evflux::event::Event;
//! use evflux::write::handle;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let event = Event::from_reader(std::io::stdin())?;
//! let handler = HandlerConfig::new().with_strip_host(true);
//! let write = WriteConfig::new("http://localhost:8086")
//!     .with_database("metrics")
//!     .with_credentials("user", "secret");
//!
//! let lines = handle(&event, &handler, &write)?;
//! println!("wrote {lines} lines");
//! # Ok(())
//! # }
//! ```

use reqwest::Url;
use reqwest::header::CONTENT_TYPE;

use crate::config::{HandlerConfig, Precision, WriteConfig};
use crate::error::{Result, TransportError};
use crate::event::Event;
use crate::translate::render;

/// Builds the write endpoint URL: `<addr>/write?db=<database>&precision=<p>`.
///
/// # Errors
///
/// Returns `TransportError::InvalidAddr` if the address is not an absolute
/// `http` or `https` URL.
pub fn write_url(config: &WriteConfig, precision: Precision) -> Result<Url> {
    let invalid = |reason: String| TransportError::InvalidAddr {
        addr: config.addr.clone(),
        reason,
    };

    let mut url = Url::parse(&config.addr).map_err(|e| invalid(e.to_string()))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("expected an http or https URL".to_string()).into());
    }

    let path = format!("{}/write", url.path().trim_end_matches('/'));
    url.set_path(&path);
    url.query_pairs_mut()
        .append_pair("db", &config.database)
        .append_pair("precision", precision.as_str());

    Ok(url)
}

/// Posts an encoded payload to the backend.
///
/// Returns the number of lines written. An empty payload is not sent.
///
/// # Errors
///
/// Returns `TransportError` if the address is invalid, the request cannot be
/// completed, or the server answers with a non-2xx status.
pub fn push(config: &WriteConfig, payload: &str, precision: Precision) -> Result<usize> {
    if payload.is_empty() {
        tracing::debug!("empty payload, nothing to write");
        return Ok(0);
    }

    let url = write_url(config, precision)?;
    let lines = payload.lines().count();

    tracing::debug!(
        host = url.host_str().unwrap_or_default(),
        db = %config.database,
        lines,
        "writing payload"
    );
    send(config, url, payload)?;
    tracing::info!(lines, db = %config.database, "payload written");

    Ok(lines)
}

/// Translates an event and forwards the resulting payload.
///
/// Returns the number of lines written.
///
/// # Errors
///
/// Returns `EncodeError` if the event cannot be rendered, or
/// `TransportError` if the write fails. Nothing is sent when rendering fails.
pub fn handle(event: &Event, handler: &HandlerConfig, write: &WriteConfig) -> Result<usize> {
    let payload = render(event, handler)?;
    push(write, &payload, handler.precision)
}

/// Sends a single POST request.
fn send(config: &WriteConfig, url: Url, body: &str) -> Result<()> {
    let client = reqwest::blocking::Client::builder()
        .timeout(config.timeout)
        .danger_accept_invalid_certs(config.insecure_skip_verify)
        .build()
        .map_err(|e| TransportError::ClientCreate { source: e })?;

    let mut request = client
        .post(url)
        .header(CONTENT_TYPE, "text/plain; charset=utf-8")
        .body(body.to_string());

    if let Some(username) = &config.username {
        request = request.basic_auth(username, config.password.as_ref());
    }

    let resp = request
        .send()
        .map_err(|e| TransportError::RequestFailed { source: e })?;

    if resp.status().is_success() {
        return Ok(());
    }

    let status = resp.status().as_u16();
    let body = resp.text().unwrap_or_default();
    tracing::warn!(status, "backend rejected write");
    Err(TransportError::HttpStatus { status, body }.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EvfluxError;

    #[test]
    fn test_write_url() {
        let config = WriteConfig::new("http://localhost:8086").with_database("foo");
        let url = write_url(&config, Precision::Seconds).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8086/write?db=foo&precision=s");
    }

    #[test]
    fn test_write_url_keeps_base_path() {
        let config = WriteConfig::new("https://proxy.example.com/influx/");
        let url = write_url(&config, Precision::Milliseconds).unwrap();
        assert_eq!(
            url.as_str(),
            "https://proxy.example.com/influx/write?db=sensu&precision=ms"
        );
    }

    #[test]
    fn test_write_url_encodes_database() {
        let config = WriteConfig::new("http://localhost:8086").with_database("my db&x");
        let url = write_url(&config, Precision::Nanoseconds).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8086/write?db=my+db%26x&precision=ns"
        );
    }

    #[test]
    fn test_write_url_rejects_invalid_addr() {
        for addr in ["not a url", "localhost:8086", "ftp://example.com"] {
            let err = write_url(&WriteConfig::new(addr), Precision::Seconds).unwrap_err();
            assert!(
                matches!(
                    err,
                    EvfluxError::Transport(TransportError::InvalidAddr { .. })
                ),
                "expected InvalidAddr for {addr}"
            );
        }
    }

    #[test]
    fn test_push_empty_payload() {
        // Unroutable address: would fail if a request were attempted.
        let config = WriteConfig::new("http://127.0.0.1:9");
        let count = push(&config, "", Precision::Seconds).unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_push_connection_refused() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let config = WriteConfig::new(format!("http://{addr}"));
        let err = push(&config, "answer value=42", Precision::Seconds).unwrap_err();
        assert!(matches!(
            err,
            EvfluxError::Transport(TransportError::RequestFailed { .. })
        ));
    }
}
