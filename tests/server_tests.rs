//! Integration tests for the dump listener and its lifecycle
//!
//! # Test Coverage
//!
//! - `POST /` decoding and delivery to the value callback
//! - `GET /clear` delivery to the clear callback
//! - Unconditional `200 OK` for unknown routes, bad bodies, failing and panicking handlers
//! - Requests with many headers and unparseable request heads
//! - Close, repeated close, restart on the same port, port 0, bind conflicts
//!
//! # Test Fixtures
//!
//! `ListenerFixture` starts a [`DumpServer`] on a free port with recording
//! callbacks and closes it on drop.

use dumppad::server::{BindError, DumpServer};
use serde_json::json;
use std::net::{SocketAddr, TcpListener};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

mod common;
use common::http::{get, parse_response, post_dump, send_request};
use common::recording::Recorder;
use common::test_server::{free_port, setup_may_runtime};

/// Test fixture with automatic setup and teardown using RAII
struct ListenerFixture {
    server: DumpServer,
    recorder: Recorder,
    addr: SocketAddr,
}

impl ListenerFixture {
    fn new() -> Self {
        setup_may_runtime();
        let recorder = Recorder::default();
        let mut server = DumpServer::new("127.0.0.1");
        let addr = server
            .start(free_port(), recorder.on_value(), recorder.on_clear())
            .unwrap();
        Self {
            server,
            recorder,
            addr,
        }
    }
}

impl Drop for ListenerFixture {
    fn drop(&mut self) {
        self.server.close(|| ());
    }
}

#[test]
fn test_post_delivers_decoded_value() {
    let fixture = ListenerFixture::new();
    let body = r#"{"$type": "Foo.Bar, Baz", "Name": "x", "Items": [1, 2]}"#;

    let (status, resp_body) = parse_response(&post_dump(&fixture.addr, body));
    assert_eq!(status, 200);
    assert!(resp_body.is_empty());
    assert_eq!(
        fixture.recorder.values(),
        vec![json!({"$type": "Foo.Bar, Baz", "Name": "x", "Items": [1, 2]})]
    );
    assert_eq!(fixture.recorder.clear_count(), 0);
}

#[test]
fn test_scalar_and_null_bodies_are_values() {
    let fixture = ListenerFixture::new();
    post_dump(&fixture.addr, "42");
    post_dump(&fixture.addr, "null");
    assert_eq!(fixture.recorder.values(), vec![json!(42), json!(null)]);
}

#[test]
fn test_undecodable_body_is_acknowledged() {
    let fixture = ListenerFixture::new();
    let (status, _) = parse_response(&post_dump(&fixture.addr, "{not json"));
    assert_eq!(status, 200);

    let (status, _) = parse_response(&post_dump(&fixture.addr, ""));
    assert_eq!(status, 200);
    assert!(fixture.recorder.values().is_empty());
}

#[test]
fn test_request_with_many_headers_is_acknowledged() {
    let fixture = ListenerFixture::new();
    let mut req = String::from("POST / HTTP/1.1\r\nHost: localhost\r\nContent-Length: 2\r\n");
    for i in 0..20 {
        req.push_str(&format!("X-H{i}: {i}\r\n"));
    }
    req.push_str("\r\n{}");

    let resp = send_request(&fixture.addr, &req);
    assert!(resp.starts_with("HTTP/1.1 200"), "unexpected response: {resp:?}");
    assert_eq!(fixture.recorder.values(), vec![json!({})]);
}

#[test]
fn test_malformed_request_is_acknowledged() {
    let fixture = ListenerFixture::new();
    let resp = send_request(&fixture.addr, "THIS IS NOT HTTP\r\n\r\n");
    assert_eq!(parse_response(&resp).0, 200);
    assert!(fixture.recorder.values().is_empty());
}

#[test]
fn test_port_zero_reports_bound_port() {
    setup_may_runtime();
    let recorder = Recorder::default();
    let mut server = DumpServer::new("127.0.0.1");
    let addr = server
        .start(0, recorder.on_value(), recorder.on_clear())
        .unwrap();
    assert_ne!(addr.port(), 0);
    assert_eq!(parse_response(&post_dump(&addr, "7")).0, 200);
    assert_eq!(recorder.values(), vec![json!(7)]);
    server.close(|| ());
}

#[test]
fn test_clear_route() {
    let fixture = ListenerFixture::new();
    let (status, _) = parse_response(&get(&fixture.addr, "/clear"));
    assert_eq!(status, 200);
    assert_eq!(fixture.recorder.clear_count(), 1);
    assert!(fixture.recorder.values().is_empty());
}

#[test]
fn test_unknown_routes_are_acknowledged_without_effect() {
    let fixture = ListenerFixture::new();
    for resp in [
        get(&fixture.addr, "/"),
        get(&fixture.addr, "/nothing"),
        get(&fixture.addr, "/clear?now=1"),
        send_request(
            &fixture.addr,
            "POST /clear HTTP/1.1\r\nHost: localhost\r\nContent-Length: 2\r\n\r\n{}",
        ),
        send_request(
            &fixture.addr,
            "DELETE / HTTP/1.1\r\nHost: localhost\r\n\r\n",
        ),
    ] {
        assert_eq!(parse_response(&resp).0, 200);
    }
    assert!(fixture.recorder.values().is_empty());
    assert_eq!(fixture.recorder.clear_count(), 0);
}

#[test]
fn test_failing_and_panicking_handlers_still_acknowledge() {
    setup_may_runtime();
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_clone = Arc::clone(&calls);
    let mut server = DumpServer::new("127.0.0.1");
    let addr = server
        .start(
            free_port(),
            Arc::new(move |_| {
                calls_clone.fetch_add(1, Ordering::SeqCst);
                anyhow::bail!("sink unavailable")
            }),
            Arc::new(|| -> anyhow::Result<()> { panic!("clear exploded") }),
        )
        .unwrap();

    assert_eq!(parse_response(&post_dump(&addr, "{}")).0, 200);
    assert_eq!(parse_response(&get(&addr, "/clear")).0, 200);
    // the listener survives and keeps serving
    assert_eq!(parse_response(&post_dump(&addr, "[]")).0, 200);
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    server.close(|| ());
}

#[test]
fn test_close_releases_port_and_is_repeatable() {
    let mut fixture = ListenerFixture::new();
    let port = fixture.addr.port();

    let mut done = 0;
    fixture.server.close(|| done += 1);
    assert!(!fixture.server.is_listening());
    assert!(fixture.server.local_addr().is_none());
    fixture.server.close(|| done += 1);
    assert_eq!(done, 2);

    // the port is free again once close has returned
    let listener = TcpListener::bind(("127.0.0.1", port)).unwrap();
    drop(listener);
}

#[test]
fn test_restart_on_same_port() {
    let mut fixture = ListenerFixture::new();
    let port = fixture.addr.port();
    post_dump(&fixture.addr, "1");

    let recorder = Recorder::default();
    let addr = fixture
        .server
        .restart(port, recorder.on_value(), recorder.on_clear())
        .unwrap();
    assert_eq!(addr.port(), port);

    post_dump(&addr, "2");
    assert_eq!(fixture.recorder.values(), vec![json!(1)]);
    assert_eq!(recorder.values(), vec![json!(2)]);
}

#[test]
fn test_start_while_listening_replaces_instance() {
    let mut fixture = ListenerFixture::new();
    let old_port = fixture.addr.port();
    let new_port = free_port();

    let addr = fixture
        .server
        .start(new_port, fixture.recorder.on_value(), fixture.recorder.on_clear())
        .unwrap();
    assert_eq!(addr.port(), new_port);
    assert_eq!(fixture.server.local_addr(), Some(addr));

    // the previous instance released its port
    drop(TcpListener::bind(("127.0.0.1", old_port)).unwrap());
}

#[test]
fn test_bind_conflict_is_reported() {
    setup_may_runtime();
    let occupied = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = occupied.local_addr().unwrap().port();
    let recorder = Recorder::default();

    let mut server = DumpServer::new("127.0.0.1");
    let err: BindError = server
        .start(port, recorder.on_value(), recorder.on_clear())
        .unwrap_err();
    assert_eq!(err.addr, format!("127.0.0.1:{port}"));
    assert!(err.to_string().contains("couldn't start dump listener"));
    assert!(!server.is_listening());

    // the controller is usable after a failed start
    drop(occupied);
    let addr = server
        .start(port, recorder.on_value(), recorder.on_clear())
        .unwrap();
    assert_eq!(parse_response(&post_dump(&addr, "true")).0, 200);
    assert_eq!(recorder.values(), vec![json!(true)]);
    server.close(|| ());
}
