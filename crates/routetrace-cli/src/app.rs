//! Load an input file and hand it to the [`Workhorse`].
//!
//! Every step records itself, so the whole run can be checked with
//! [`declare_expected_subjects`].

use crate::workhorse::{Workhorse, PHASES, SUBJECT_MODULE, SUBJECT_ROUTINE};
use crate::DemoError;
use log::{info, warn};
use routetrace::context::RouteTrace;
use routetrace::rt_trace;
use routetrace::subject::{RegistryError, SubjectId};
use std::path::Path;

/// How a run ended, when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The workhorse ran every phase.
    Completed,
    /// Nothing to do (missing or empty input).
    NoAction,
}

/// Module name of the run-level subject.
pub const RUN_MODULE: &str = "app";
/// Routine of the run-level subject.
pub const RUN_ROUTINE: &str = "run";
/// What [`run`] is expected to call, in order.
pub const RUN_ROUTES: [&str; 5] = [
    "load_file",
    "file_size",
    "launch_workhorse",
    "Workhorse::new",
    "do_some_stuff",
];

/// Load `path` and run the workhorse over its contents.
pub fn run(rt: &mut RouteTrace, path: &Path) -> Result<Outcome, DemoError> {
    rt_trace!(rt);

    match load_file(rt, path)? {
        Some(contents) => {
            launch_workhorse(rt, contents)?;
            Ok(Outcome::Completed)
        }
        None => Ok(Outcome::NoAction),
    }
}

/// Read the whole file. `None` when it is missing or empty.
pub fn load_file(rt: &mut RouteTrace, path: &Path) -> Result<Option<Vec<u8>>, DemoError> {
    rt_trace!(rt);

    let size = file_size(rt, path);
    if size == 0 {
        warn!("size for '{}' is 0; probably file not found", path.display());
        return Ok(None);
    }

    let contents = std::fs::read(path).map_err(|source| DemoError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Loaded {} bytes from {}", contents.len(), path.display());
    Ok(Some(contents))
}

/// Size of the file in bytes, 0 if it cannot be inspected.
pub fn file_size(rt: &mut RouteTrace, path: &Path) -> u64 {
    rt_trace!(rt);

    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

fn launch_workhorse(rt: &mut RouteTrace, contents: Vec<u8>) -> Result<(), DemoError> {
    rt_trace!(rt);

    let workhorse = Workhorse::new(rt, contents)?;
    workhorse.do_some_stuff(rt)
}

/// Declare what a completed run must have traced.
///
/// Returns the run-level subject and the workhorse subject.
pub fn declare_expected_subjects(rt: &mut RouteTrace) -> Result<(SubjectId, SubjectId), RegistryError> {
    let run_subject = rt.create_subject(RUN_MODULE, RUN_ROUTINE)?;
    for route in RUN_ROUTES {
        rt.add_route(run_subject, route)?;
    }

    let workhorse_subject = rt.create_subject(SUBJECT_MODULE, SUBJECT_ROUTINE)?;
    for phase in PHASES {
        rt.add_route(workhorse_subject, phase)?;
    }

    Ok((run_subject, workhorse_subject))
}

#[cfg(test)]
mod tests {
    use super::*;
    use routetrace::config::Config;
    use routetrace::sink::CaptureSink;

    fn captured() -> (RouteTrace, CaptureSink) {
        let capture = CaptureSink::new();
        let mut rt = RouteTrace::with_sink(Config::default(), capture.clone());
        rt.set_up();
        (rt, capture)
    }

    #[test]
    fn completed_run_satisfies_both_subjects() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input.txt");
        std::fs::write(&input, "some input").unwrap();

        let (mut rt, capture) = captured();
        assert_eq!(run(&mut rt, &input).unwrap(), Outcome::Completed);

        let (run_subject, workhorse_subject) = declare_expected_subjects(&mut rt).unwrap();
        assert!(rt.verify_subject(run_subject));
        assert!(rt.verify_subject(workhorse_subject));
        assert!(!capture.contains("RouteTrace test failed"));
    }

    #[test]
    fn missing_file_is_no_action() {
        let dir = tempfile::tempdir().unwrap();
        let (mut rt, capture) = captured();

        let outcome = run(&mut rt, &dir.path().join("absent.txt")).unwrap();
        assert_eq!(outcome, Outcome::NoAction);

        let (run_subject, workhorse_subject) = declare_expected_subjects(&mut rt).unwrap();
        assert!(!rt.verify_subject(run_subject));
        assert!(!rt.verify_subject(workhorse_subject));
        assert!(capture.contains("Route 'launch_workhorse' was not found."));
        assert!(capture.contains("Route 'do_this_first' was not found."));
    }

    #[test]
    fn empty_file_is_no_action() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("empty.txt");
        std::fs::write(&input, "").unwrap();

        let (mut rt, _capture) = captured();
        assert_eq!(run(&mut rt, &input).unwrap(), Outcome::NoAction);
        assert!(rt.log().find_first_index("Workhorse::new").is_none());
    }
}
