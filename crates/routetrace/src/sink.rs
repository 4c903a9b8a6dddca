//! Display sinks: where trace lines and verification diagnostics go.
//!
//! A sink accepts one line of text at a time. The concrete sink is chosen
//! when a [`RouteTrace`](crate::context::RouteTrace) is composed, not by
//! branching at the call site:
//!
//! | Sink            | Destination                                        |
//! |-----------------|----------------------------------------------------|
//! | [`ConsoleSink`] | stdout, newline appended when missing              |
//! | [`LogSink`]     | the `log` facade at info level, target `routetrace`|
//! | [`TeeSink`]     | every inner sink, in order                         |
//! | [`CaptureSink`] | an in-memory buffer, for asserting on diagnostics  |
//! | [`NullSink`]    | nowhere                                            |
//!
//! Writes are best-effort. A sink never reports failure to its caller.

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

/// Log target used by [`LogSink`].
pub const LOG_TARGET: &str = "routetrace";

/// Accepts one line of text.
pub trait DisplaySink {
    /// Write a single line. Implementations must not fail loudly.
    fn write_line(&mut self, line: &str);
}

impl<S: DisplaySink + ?Sized> DisplaySink for Box<S> {
    fn write_line(&mut self, line: &str) {
        (**self).write_line(line);
    }
}

impl<S: DisplaySink + ?Sized> DisplaySink for &mut S {
    fn write_line(&mut self, line: &str) {
        (**self).write_line(line);
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Console
// ═══════════════════════════════════════════════════════════════════════

/// Writes lines to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl DisplaySink for ConsoleSink {
    fn write_line(&mut self, line: &str) {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        let _ = if line.ends_with('\n') {
            out.write_all(line.as_bytes())
        } else {
            writeln!(out, "{}", line)
        };
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  log facade
// ═══════════════════════════════════════════════════════════════════════

/// Forwards lines to the `log` facade.
///
/// Whatever logger the host installed (`env_logger`, a syslog bridge, ...)
/// decides where the line ends up.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DisplaySink for LogSink {
    fn write_line(&mut self, line: &str) {
        log::info!(target: LOG_TARGET, "{}", line.trim_end_matches('\n'));
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Composition
// ═══════════════════════════════════════════════════════════════════════

/// Fans every line out to several sinks.
#[derive(Default)]
pub struct TeeSink {
    sinks: Vec<Box<dyn DisplaySink>>,
}

impl TeeSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sink to the end of the fan-out list.
    pub fn with(mut self, sink: impl DisplaySink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl DisplaySink for TeeSink {
    fn write_line(&mut self, line: &str) {
        for sink in &mut self.sinks {
            sink.write_line(line);
        }
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DisplaySink for NullSink {
    fn write_line(&mut self, _line: &str) {}
}

// ═══════════════════════════════════════════════════════════════════════
//  Capture
// ═══════════════════════════════════════════════════════════════════════

/// Buffers lines in memory.
///
/// Clones share the same buffer, so a test can hand one clone to a
/// [`RouteTrace`](crate::context::RouteTrace) and keep the other to read
/// back what was written.
///
/// ```
/// use routetrace::sink::{CaptureSink, DisplaySink};
///
/// let capture = CaptureSink::new();
/// let mut writer = capture.clone();
/// writer.write_line("hello");
/// assert_eq!(capture.lines(), vec!["hello".to_string()]);
/// ```
#[derive(Debug, Default, Clone)]
pub struct CaptureSink {
    lines: Rc<RefCell<Vec<String>>>,
}

impl CaptureSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every line written so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    /// Whether any captured line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.borrow().iter().any(|l| l.contains(needle))
    }

    pub fn clear(&self) {
        self.lines.borrow_mut().clear();
    }
}

impl DisplaySink for CaptureSink {
    fn write_line(&mut self, line: &str) {
        self.lines
            .borrow_mut()
            .push(line.trim_end_matches('\n').to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_clones_share_buffer() {
        let capture = CaptureSink::new();
        let mut writer = capture.clone();
        writer.write_line("one");
        writer.write_line("two\n");
        assert_eq!(capture.lines(), vec!["one", "two"]);
        assert!(capture.contains("tw"));

        capture.clear();
        assert!(capture.lines().is_empty());
    }

    #[test]
    fn tee_writes_to_every_sink_in_order() {
        let first = CaptureSink::new();
        let second = CaptureSink::new();
        let mut tee = TeeSink::new().with(first.clone()).with(second.clone());
        assert_eq!(tee.len(), 2);

        tee.write_line("line");
        assert_eq!(first.lines(), vec!["line"]);
        assert_eq!(second.lines(), vec!["line"]);
    }

    #[test]
    fn boxed_and_borrowed_sinks_forward() {
        let capture = CaptureSink::new();
        let mut boxed: Box<dyn DisplaySink> = Box::new(capture.clone());
        boxed.write_line("boxed");

        fn write_via<S: DisplaySink>(mut sink: S, line: &str) {
            sink.write_line(line);
        }
        let mut inner = capture.clone();
        write_via(&mut inner, "borrowed");

        assert_eq!(capture.lines(), vec!["boxed", "borrowed"]);
    }

    #[test]
    fn null_and_log_sinks_accept_anything() {
        NullSink.write_line("dropped");
        LogSink.write_line("forwarded\n");
        TeeSink::new().write_line("no sinks");
    }
}
