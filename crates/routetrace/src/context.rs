//! The [`RouteTrace`] context: one test run's log, subjects and sink.
//!
//! Instead of process-wide state, every run owns a `RouteTrace` and passes
//! it (by `&mut`) to the instrumented code and to the assertions. Two
//! contexts never share anything, so independent runs can coexist.
//!
//! ```
//! use routetrace::config::Config;
//! use routetrace::context::RouteTrace;
//! use routetrace::sink::CaptureSink;
//!
//! let capture = CaptureSink::new();
//! let mut rt = RouteTrace::with_sink(Config::default(), capture.clone());
//! rt.set_up();
//!
//! rt.record_trace("app::load");
//! rt.record_trace("app::parse");
//!
//! let subject = rt.create_subject("app", "run").unwrap();
//! rt.add_route(subject, "load").unwrap();
//! rt.add_route(subject, "parse").unwrap();
//! assert!(rt.verify_subject(subject));
//!
//! rt.tear_down();
//! assert!(capture.contains("TRACE: app::load"));
//! ```

use crate::config::Config;
use crate::sink::DisplaySink;
use crate::subject::{Registry, RegistryError, Subject, SubjectId};
use crate::trace_log::{TraceLog, TRACE_PREFIX};
use crate::verifier::{OrderVerifier, VerificationResult};
use log::debug;

pub struct RouteTrace {
    config: Config,
    log: TraceLog,
    registry: Registry,
    sink: Box<dyn DisplaySink>,
}

impl RouteTrace {
    /// Create a context writing to the sink `config` describes.
    pub fn new(config: Config) -> Self {
        let sink = config.build_sink();
        Self::from_parts(config, sink)
    }

    /// Create a context writing to an explicit sink.
    pub fn with_sink(config: Config, sink: impl DisplaySink + 'static) -> Self {
        Self::from_parts(config, Box::new(sink))
    }

    fn from_parts(config: Config, sink: Box<dyn DisplaySink>) -> Self {
        let registry = Registry::new(config.limits);
        Self {
            config,
            log: TraceLog::new(),
            registry,
            sink,
        }
    }

    // ── Lifecycle ───────────────────────────────────────────────

    /// Start a run with an empty log and no subjects.
    pub fn set_up(&mut self) {
        self.reset();
        debug!("RouteTrace set up");
    }

    /// End a run, releasing every entry, subject and route.
    ///
    /// Idempotent: tearing down an already empty context is a no-op
    /// apart from invalidating stale subject handles.
    pub fn tear_down(&mut self) {
        debug!(
            "RouteTrace tear down: {} entries, {} subjects",
            self.log.len(),
            self.registry.len()
        );
        self.reset();
    }

    fn reset(&mut self) {
        self.log.clear();
        self.registry.clear();
    }

    // ── Trace log ───────────────────────────────────────────────

    /// Record one trace entry and echo it to the sink.
    ///
    /// Empty messages are ignored.
    pub fn record_trace(&mut self, message: &str) {
        if self.log.record(message).is_some() {
            self.sink.write_line(&format!("{} {}", TRACE_PREFIX, message));
        }
    }

    /// Write every recorded entry to the sink, framed.
    pub fn display_traces(&mut self) {
        self.log.display_all(&mut self.sink);
    }

    /// Replace the log with a previously saved one.
    pub fn import_log(&mut self, log: TraceLog) {
        debug!("Imported trace log with {} entries", log.len());
        self.log = log;
    }

    pub fn log(&self) -> &TraceLog {
        &self.log
    }

    // ── Subjects ────────────────────────────────────────────────

    /// Declare a unit under test.
    pub fn create_subject(&mut self, module: &str, routine: &str) -> Result<SubjectId, RegistryError> {
        self.registry.create_subject(module, routine)
    }

    /// Append an expected callee to a subject's route.
    ///
    /// On error nothing changes; callers may ignore the result.
    pub fn add_route(&mut self, subject: SubjectId, routine: &str) -> Result<(), RegistryError> {
        self.registry.add_route(subject, routine)
    }

    pub fn subject(&self, id: SubjectId) -> Option<&Subject> {
        self.registry.get(id)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    // ── Verification ────────────────────────────────────────────

    /// Whether the log is consistent with the subject's routes.
    ///
    /// On a route-level failure the reason is written to the sink.
    pub fn verify_subject(&mut self, subject: SubjectId) -> bool {
        let result = self.verify_subject_report(subject);
        if let Some(ref failure) = result.failure {
            if failure.is_diagnostic() {
                self.sink.write_line(&failure.to_string());
            } else {
                debug!("Verification of {} failed: {}", subject, failure);
            }
        }
        result.passed
    }

    /// Verify a subject and return the full result, without writing to
    /// the sink.
    pub fn verify_subject_report(&self, subject: SubjectId) -> VerificationResult {
        OrderVerifier::verify(&self.log, self.registry.get(subject), self.config.match_rule)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl Default for RouteTrace {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
