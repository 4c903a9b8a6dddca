//! Configuration for a [`RouteTrace`](crate::context::RouteTrace) run.
//!
//! Everything here is chosen when the context is composed. Defaults match
//! the classic behaviour: 64 subjects, 64 routes per subject, substring
//! matching, and sink output forwarded to the `log` facade as well as the
//! console.
//!
//! A config can be loaded from JSON; missing fields take their defaults:
//!
//! ```json
//! { "limits": { "max_subjects": null, "max_routes": 128 }, "match_rule": "exact" }
//! ```

use crate::sink::{ConsoleSink, DisplaySink, LogSink, TeeSink};
use crate::trace_log::MatchRule;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Default cap on live subjects.
pub const DEFAULT_MAX_SUBJECTS: usize = 64;
/// Default cap on routes per subject.
pub const DEFAULT_MAX_ROUTES: usize = 64;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Capacity limits. `None` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub max_subjects: Option<usize>,
    pub max_routes: Option<usize>,
}

impl Limits {
    /// No caps on subjects or routes.
    pub fn unbounded() -> Self {
        Self {
            max_subjects: None,
            max_routes: None,
        }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_subjects: Some(DEFAULT_MAX_SUBJECTS),
            max_routes: Some(DEFAULT_MAX_ROUTES),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub limits: Limits,
    /// How routes are matched against trace entries.
    pub match_rule: MatchRule,
    /// Also forward sink lines to the `log` facade.
    pub forward_to_log: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            limits: Limits::default(),
            match_rule: MatchRule::Substring,
            forward_to_log: true,
        }
    }
}

impl Config {
    /// Load a config from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_match_rule(mut self, rule: MatchRule) -> Self {
        self.match_rule = rule;
        self
    }

    pub fn with_forward_to_log(mut self, forward: bool) -> Self {
        self.forward_to_log = forward;
        self
    }

    /// The sink this config describes: the console, teed into the `log`
    /// facade when [`forward_to_log`](Self::forward_to_log) is set.
    pub fn build_sink(&self) -> Box<dyn DisplaySink> {
        if self.forward_to_log {
            Box::new(TeeSink::new().with(ConsoleSink).with(LogSink))
        } else {
            Box::new(ConsoleSink)
        }
    }
}
