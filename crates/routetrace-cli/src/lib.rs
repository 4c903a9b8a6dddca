//! Demo pipeline and trace tooling for RouteTrace.
//!
//! [`app::run`] loads a file and feeds it through an instrumented
//! [`workhorse::Workhorse`]; the `routetrace-cli` binary drives it, prints the
//! trace, and verifies the expected call order. The binary can also save
//! a trace to JSON and verify or display a saved trace later.

pub mod app;
pub mod workhorse;

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DemoError {
    #[error("Input data is empty")]
    EmptyInput,

    #[error("Could not read '{}': {}", .path.display(), .source)]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
