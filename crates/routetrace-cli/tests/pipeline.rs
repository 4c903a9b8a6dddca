//! The demo pipeline traced end to end.

use routetrace::config::Config;
use routetrace::context::RouteTrace;
use routetrace::sink::CaptureSink;
use routetrace::trace_log::TraceLog;
use routetrace_cli::app::{self, Outcome};
use routetrace_cli::workhorse::PHASES;

fn traced_run(contents: &str) -> (RouteTrace, CaptureSink, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.txt");
    std::fs::write(&input, contents).unwrap();

    let capture = CaptureSink::new();
    let mut rt = RouteTrace::with_sink(Config::default(), capture.clone());
    rt.set_up();
    assert_eq!(app::run(&mut rt, &input).unwrap(), Outcome::Completed);
    (rt, capture, dir)
}

#[test]
fn every_step_is_echoed_as_it_happens() {
    let (rt, capture, _dir) = traced_run("data");
    let lines = capture.lines();
    assert_eq!(lines.len(), rt.log().len());
    assert!(lines.iter().all(|l| l.starts_with("TRACE: ")));
    assert!(lines[0].ends_with("app::run"));
    assert!(lines.last().unwrap().ends_with("Workhorse::and_lastly_this"));
}

#[test]
fn phases_follow_construction() {
    let (mut rt, _capture, _dir) = traced_run("data");
    let subject = rt.create_subject("Workhorse", "lifecycle").unwrap();
    rt.add_route(subject, "Workhorse::new").unwrap();
    for phase in PHASES {
        rt.add_route(subject, phase).unwrap();
    }
    assert!(rt.verify_subject(subject));
}

#[test]
fn saved_run_verifies_after_reload() {
    let (rt, _capture, dir) = traced_run("data");
    let path = dir.path().join("trace.json");
    rt.log().save(&path).unwrap();

    let mut replay = RouteTrace::with_sink(Config::default(), CaptureSink::new());
    replay.import_log(TraceLog::load(&path).unwrap());
    let (run_subject, workhorse_subject) = app::declare_expected_subjects(&mut replay).unwrap();
    assert!(replay.verify_subject(run_subject));
    assert!(replay.verify_subject(workhorse_subject));
}

#[test]
fn runs_do_not_share_traces() {
    let (first, _a, _dir_a) = traced_run("one");
    let (mut second, _b, _dir_b) = traced_run("two");
    assert_eq!(first.log().len(), second.log().len());

    second.tear_down();
    assert!(second.log().is_empty());
    assert!(!first.log().is_empty());
}
