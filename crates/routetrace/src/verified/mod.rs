//! Verified pure functions for RouteTrace.
//!
//! The resolution and order-check core of the verifier lives here as
//! small functions with **no I/O, no logging, and no external state
//! mutation**. The effectful shell ([`crate::verifier`],
//! [`crate::trace_log`]) delegates to them.
//!
//! Keeping the core separate gives:
//!
//! 1. A clear boundary between *checked logic* and the sink/registry shell.
//! 2. Functions that can be tested exhaustively with plain `#[test]`s.
//! 3. Pre- and postconditions stated as `debug_assert!`s next to the code.

pub mod order;
