//! End-to-end checks of the public `RouteTrace` API.

use routetrace::config::{Config, Limits};
use routetrace::context::RouteTrace;
use routetrace::sink::CaptureSink;
use routetrace::subject::{RegistryError, SubjectId};
use routetrace::trace_log::{TraceLog, LIST_BORDER, LIST_HEADER};

fn run() -> (RouteTrace, CaptureSink) {
    let capture = CaptureSink::new();
    let mut rt = RouteTrace::with_sink(Config::default(), capture.clone());
    rt.set_up();
    (rt, capture)
}

fn record_all(rt: &mut RouteTrace, messages: &[&str]) {
    for message in messages {
        rt.record_trace(message);
    }
}

fn declare(rt: &mut RouteTrace, routes: &[&str]) -> SubjectId {
    let id = rt.create_subject("greek", "letters").unwrap();
    for route in routes {
        rt.add_route(id, route).unwrap();
    }
    id
}

#[test]
fn display_preserves_recording_order_and_duplicates() {
    let (mut rt, capture) = run();
    let messages = ["b", "a", "b", "c", "a"];
    record_all(&mut rt, &messages);
    capture.clear();

    rt.display_traces();
    let lines = capture.lines();
    assert_eq!(lines.first().map(String::as_str), Some(LIST_BORDER));
    assert_eq!(lines.get(1).map(String::as_str), Some(LIST_HEADER));
    assert_eq!(lines.last().map(String::as_str), Some(LIST_BORDER));
    assert_eq!(&lines[2..lines.len() - 1], &messages);
}

#[test]
fn empty_log_fails_every_subject() {
    let (mut rt, _capture) = run();
    let with_routes = declare(&mut rt, &["alpha", "beta"]);
    let without_routes = declare(&mut rt, &[]);
    assert!(!rt.verify_subject(with_routes));
    assert!(!rt.verify_subject(without_routes));
}

#[test]
fn zero_routes_pass_on_non_empty_log() {
    let (mut rt, _capture) = run();
    rt.record_trace("anything");
    let id = declare(&mut rt, &[]);
    assert!(rt.verify_subject(id));
}

#[test]
fn unmatched_single_route_reports_not_found() {
    let (mut rt, capture) = run();
    record_all(&mut rt, &["alpha enter"]);
    let id = declare(&mut rt, &["delta"]);

    assert!(!rt.verify_subject(id));
    assert!(capture.contains("Route 'delta' was not found."));
}

#[test]
fn greek_letters_in_order() {
    let (mut rt, _capture) = run();
    record_all(&mut rt, &["alpha enter", "beta enter", "gamma enter"]);

    let forward = declare(&mut rt, &["alpha", "beta", "gamma"]);
    let reversed = declare(&mut rt, &["gamma", "beta", "alpha"]);
    assert!(rt.verify_subject(forward));
    assert!(!rt.verify_subject(reversed));
}

#[test]
fn repeated_first_call_still_passes() {
    let (mut rt, _capture) = run();
    record_all(&mut rt, &["alpha enter", "alpha enter", "beta enter"]);
    let id = declare(&mut rt, &["alpha", "beta"]);

    assert!(rt.verify_subject(id));
    assert_eq!(rt.verify_subject_report(id).resolved, vec![0, 2]);
}

#[test]
fn route_cap_holds_at_sixty_four() {
    let (mut rt, _capture) = run();
    let id = rt.create_subject("mod", "fn").unwrap();
    for i in 0..64 {
        rt.add_route(id, &format!("r{}", i)).unwrap();
    }
    assert_eq!(
        rt.add_route(id, "r64"),
        Err(RegistryError::CapacityExceeded { limit: 64 })
    );
    assert_eq!(rt.subject(id).unwrap().routes().len(), 64);
}

#[test]
fn unbounded_config_lifts_route_cap() {
    let capture = CaptureSink::new();
    let mut rt = RouteTrace::with_sink(
        Config::default().with_limits(Limits::unbounded()),
        capture,
    );
    let id = rt.create_subject("mod", "fn").unwrap();
    for i in 0..100 {
        rt.add_route(id, &format!("r{}", i)).unwrap();
    }
    assert_eq!(rt.subject(id).unwrap().routes().len(), 100);
}

#[test]
fn double_tear_down_is_harmless() {
    let (mut rt, _capture) = run();
    record_all(&mut rt, &["alpha enter"]);
    declare(&mut rt, &["alpha"]);

    rt.tear_down();
    rt.tear_down();
    assert!(rt.log().is_empty());
    assert!(rt.registry().is_empty());

    rt.set_up();
    record_all(&mut rt, &["alpha enter"]);
    let id = declare(&mut rt, &["alpha"]);
    assert!(rt.verify_subject(id));
}

#[test]
fn saved_trace_verifies_in_a_fresh_context() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trace.json");

    let (mut recording, _capture) = run();
    record_all(&mut recording, &["app::load", "app::parse", "app::emit"]);
    recording.log().save(&path).unwrap();

    let (mut replay, _capture) = run();
    replay.import_log(TraceLog::load(&path).unwrap());
    let id = declare(&mut replay, &["load", "parse", "emit"]);
    assert!(replay.verify_subject(id));
}
