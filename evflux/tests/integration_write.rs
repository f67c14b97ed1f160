//! Integration tests for forwarding payloads to an HTTP backend.
//!
//! The backend is a one-shot stub on an ephemeral port that records the
//! request it receives and answers with a fixed status.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use evflux::config::{HandlerConfig, Precision, WriteConfig};
use evflux::error::{EncodeError, EvfluxError, TransportError};
use evflux::event::Event;
use evflux::write::{handle, push};

/// A request captured by the stub backend.
struct CapturedRequest {
    request_line: String,
    headers: Vec<(String, String)>,
    body: String,
}

impl CapturedRequest {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Starts a stub backend that accepts one request and answers with `status`.
///
/// Returns the base URL and a receiver yielding the captured request.
fn stub_backend(status: u16, response_body: &'static str) -> (String, mpsc::Receiver<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        stream
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        let mut reader = BufReader::new(&stream);

        let mut request_line = String::new();
        reader.read_line(&mut request_line).unwrap();

        let mut headers = Vec::new();
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            let line = line.trim_end();
            if line.is_empty() {
                break;
            }
            if let Some((k, v)) = line.split_once(':') {
                headers.push((k.trim().to_string(), v.trim().to_string()));
            }
        }

        let length = headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
            .map_or(0, |(_, v)| v.parse::<usize>().unwrap());
        let mut body = vec![0u8; length];
        reader.read_exact(&mut body).unwrap();

        let reason = if status < 300 { "OK" } else { "Error" };
        let response = format!(
            "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{response_body}",
            response_body.len()
        );
        (&stream).write_all(response.as_bytes()).unwrap();

        tx.send(CapturedRequest {
            request_line: request_line.trim_end().to_string(),
            headers,
            body: String::from_utf8(body).unwrap(),
        })
        .unwrap();
    });

    (format!("http://{addr}"), rx)
}

fn metrics_event() -> Event {
    Event::from_json(
        r#"{
            "entity": { "metadata": { "name": "entity1" } },
            "metrics": { "points": [
                { "name": "answer", "value": 42, "timestamp": 1700000000,
                  "tags": [{ "name": "foo", "value": "bar" }] }
            ] }
        }"#,
    )
    .unwrap()
}

#[test]
fn test_handle_posts_payload() {
    let (url, rx) = stub_backend(204, "");
    let write = WriteConfig::new(url).with_database("foo");

    let lines = handle(&metrics_event(), &HandlerConfig::new(), &write).unwrap();
    assert_eq!(lines, 1);

    let request = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(request.request_line, "POST /write?db=foo&precision=s HTTP/1.1");
    assert_eq!(
        request.body,
        "answer,foo=bar,sensu_entity_name=entity1 value=42 1700000000"
    );
    assert_eq!(
        request.header("content-type"),
        Some("text/plain; charset=utf-8")
    );
    assert!(request.header("authorization").is_none());
}

#[test]
fn test_basic_auth_credentials_sent() {
    let (url, rx) = stub_backend(200, r#"{"ok": true}"#);
    let write = WriteConfig::new(url)
        .with_database("foo")
        .with_credentials("bar", "baz");

    push(&write, "answer value=42", Precision::Seconds).unwrap();

    let request = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    // base64("bar:baz")
    assert_eq!(request.header("authorization"), Some("Basic YmFyOmJheg=="));
}

#[test]
fn test_precision_sent_as_query_parameter() {
    let (url, rx) = stub_backend(204, "");
    let handler = HandlerConfig::new().with_precision(Precision::Nanoseconds);

    handle(&metrics_event(), &handler, &WriteConfig::new(url)).unwrap();

    let request = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(request.request_line.contains("precision=ns"));
    assert!(request.body.ends_with(" 1700000000000000000"));
}

#[test]
fn test_server_error_surfaces_status_and_body() {
    let (url, _rx) = stub_backend(500, r#"{"error":"database not found"}"#);

    let err = push(&WriteConfig::new(url), "answer value=42", Precision::Seconds).unwrap_err();
    match err {
        EvfluxError::Transport(TransportError::HttpStatus { status, body }) => {
            assert_eq!(status, 500);
            assert!(body.contains("database not found"));
        }
        other => panic!("expected HttpStatus, got {other:?}"),
    }
}

#[test]
fn test_encode_failure_sends_nothing() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    listener.set_nonblocking(true).unwrap();

    let mut bad = metrics_event();
    bad.metrics.as_mut().unwrap().points[0].value = f64::INFINITY;

    let write = WriteConfig::new(format!("http://{addr}"));
    let err = handle(&bad, &HandlerConfig::new(), &write).unwrap_err();
    assert!(matches!(err, EvfluxError::Encode(_)));
    assert!(listener.accept().is_err(), "no connection expected");
}

#[test]
fn test_empty_tag_key_sends_nothing() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    listener.set_nonblocking(true).unwrap();

    let event = Event::from_json(
        r#"{
            "entity": { "metadata": { "name": "e1" } },
            "metrics": { "points": [
                { "name": "answer", "value": 42, "timestamp": 0,
                  "tags": [{ "name": "", "value": "x" }] }
            ] }
        }"#,
    )
    .unwrap();

    let write = WriteConfig::new(format!("http://{addr}"));
    let err = handle(&event, &HandlerConfig::new(), &write).unwrap_err();
    assert!(matches!(
        err,
        EvfluxError::Encode(EncodeError::EmptyTagKey { .. })
    ));
    assert!(listener.accept().is_err(), "no connection expected");
}
