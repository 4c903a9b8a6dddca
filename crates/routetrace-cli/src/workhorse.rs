//! The instrumented demo pipeline.
//!
//! A [`Workhorse`] holds some input and runs three phases in a fixed
//! order. Every method records itself on entry, so a test can check the
//! phases ran in order without looking inside them.

use crate::DemoError;
use routetrace::context::RouteTrace;
use routetrace::rt_trace;

/// Module name the workhorse subject is declared under.
pub const SUBJECT_MODULE: &str = "Workhorse";
/// Routine the workhorse subject is declared for.
pub const SUBJECT_ROUTINE: &str = "do_some_stuff";
/// The phases [`Workhorse::do_some_stuff`] runs, in order.
pub const PHASES: [&str; 3] = ["do_this_first", "then_that", "and_lastly_this"];

#[derive(Debug)]
pub struct Workhorse {
    data: Vec<u8>,
}

impl Workhorse {
    pub fn new(rt: &mut RouteTrace, data: Vec<u8>) -> Result<Self, DemoError> {
        rt_trace!(rt);

        if data.is_empty() {
            return Err(DemoError::EmptyInput);
        }
        Ok(Self { data })
    }

    /// Run every phase in order, stopping at the first failure.
    pub fn do_some_stuff(&self, rt: &mut RouteTrace) -> Result<(), DemoError> {
        rt_trace!(rt);

        if self.data.is_empty() {
            return Err(DemoError::EmptyInput);
        }

        self.do_this_first(rt)?;
        self.then_that(rt)?;
        self.and_lastly_this(rt)
    }

    fn do_this_first(&self, rt: &mut RouteTrace) -> Result<(), DemoError> {
        rt_trace!(rt);
        Ok(())
    }

    fn then_that(&self, rt: &mut RouteTrace) -> Result<(), DemoError> {
        rt_trace!(rt);
        Ok(())
    }

    fn and_lastly_this(&self, rt: &mut RouteTrace) -> Result<(), DemoError> {
        rt_trace!(rt);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
