//! The trace log: an append-only, ordered record of trace entries.
//!
//! Instrumented code appends one entry per function entry (usually the
//! function's path, see [`rt_trace!`](crate::rt_trace)). An entry's
//! position in the log is its only identity; there are no timestamps.
//!
//! The log is only ever appended to or cleared as a whole.

use crate::sink::DisplaySink;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Prefix written to the sink for every recorded entry.
pub const TRACE_PREFIX: &str = "TRACE:";
/// Header line of [`TraceLog::display_all`].
pub const LIST_HEADER: &str = "TRACE LIST:";
/// Border line framing [`TraceLog::display_all`].
pub const LIST_BORDER: &str = "--------------------";

// ═══════════════════════════════════════════════════════════════════════
//  Error type
// ═══════════════════════════════════════════════════════════════════════

#[derive(Error, Debug)]
pub enum TraceLogError {
    #[error("Trace file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Trace file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

// ═══════════════════════════════════════════════════════════════════════
//  Match rule
// ═══════════════════════════════════════════════════════════════════════

/// How a route's routine name is matched against entry text.
///
/// [`MatchRule::Substring`] is the default: instrumented text is usually
/// decorated (`my_crate::pipeline::Loader::load_file`) while routes name
/// the short routine (`load_file`). It is also ambiguous: a route `run`
/// matches an entry `rerun_all`, and the first such entry wins. Pick
/// [`MatchRule::Exact`] when routes are written as full entry text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchRule {
    #[default]
    Substring,
    Exact,
}

impl MatchRule {
    /// Whether `text` satisfies `routine` under this rule.
    ///
    /// Delegates to [`crate::verified::order::routine_matches`].
    pub fn matches(self, routine: &str, text: &str) -> bool {
        crate::verified::order::routine_matches(self, routine, text)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Substring => "substring",
            Self::Exact => "exact",
        }
    }
}

impl fmt::Display for MatchRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Entries
// ═══════════════════════════════════════════════════════════════════════

/// One recorded event. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraceEntry(String);

impl TraceEntry {
    pub fn text(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TraceEntry {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TraceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Trace log
// ═══════════════════════════════════════════════════════════════════════

/// A recorded trace: every entry in the order it was recorded.
///
/// Serializes as `{"entries": ["...", ...]}` so a run can be saved and
/// verified later.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceLog {
    entries: Vec<TraceEntry>,
}

impl TraceLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a log from already-recorded messages. Empty messages are
    /// skipped, exactly as [`record`](Self::record) would.
    pub fn from_messages<I, S>(messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut log = Self::new();
        for message in messages {
            log.record(message.as_ref());
        }
        log
    }

    /// Append a copy of `message`.
    ///
    /// Returns the new entry's position, or `None` (and records nothing)
    /// when `message` is empty.
    pub fn record(&mut self, message: &str) -> Option<usize> {
        if message.is_empty() {
            return None;
        }
        self.entries.push(TraceEntry(message.to_string()));
        Some(self.entries.len() - 1)
    }

    /// Position of the first entry, scanning from the start, whose text
    /// contains `name`. `None` if `name` is empty or nothing matches.
    pub fn find_first_index(&self, name: &str) -> Option<usize> {
        self.find_first_index_with(name, MatchRule::Substring)
    }

    /// Like [`find_first_index`](Self::find_first_index) under an explicit
    /// match rule.
    pub fn find_first_index_with(&self, name: &str, rule: MatchRule) -> Option<usize> {
        crate::verified::order::first_match(&self.entries, name, rule)
    }

    /// Write a framed dump of every entry, in recorded order.
    pub fn display_all(&self, sink: &mut dyn DisplaySink) {
        sink.write_line(LIST_BORDER);
        sink.write_line(LIST_HEADER);
        for entry in &self.entries {
            sink.write_line(entry.text());
        }
        sink.write_line(LIST_BORDER);
    }

    /// Release every entry. Safe to call on an empty log.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&TraceEntry> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TraceEntry> {
        self.entries.iter()
    }

    /// Number of entries in the log.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// How many times each distinct entry text was recorded.
    pub fn summary(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for entry in &self.entries {
            *counts.entry(entry.text().to_string()).or_insert(0) += 1;
        }
        counts
    }

    /// Save the log to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), TraceLogError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load a log from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TraceLogError> {
        let json = std::fs::read_to_string(path)?;
        let raw: TraceLog = serde_json::from_str(&json)?;
        // Re-record so a hand-edited file cannot smuggle in empty entries.
        Ok(Self::from_messages(raw.entries))
    }
}

impl<'a> IntoIterator for &'a TraceLog {
    type Item = &'a TraceEntry;
    type IntoIter = std::slice::Iter<'a, TraceEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
