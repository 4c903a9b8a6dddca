//! Call-order instrumentation and verification for unit tests.
//!
//! Instrumented code records a trace entry when a function is entered;
//! test code declares, for a unit under test, the callees it expects to
//! see and in which order; the verifier checks the recorded trace against
//! that expectation. No mocking and no call interception is involved.
//!
//! # Architecture
//!
//! ```text
//! instrumented code          test setup                 test assertion
//! ─────────────────          ──────────                 ──────────────
//! rt_trace!(rt)  ──→ TraceLog      Registry ←── create_subject / add_route
//!                        │            │
//!                        └─────┬──────┘
//!                              ▼
//!                        OrderVerifier ──→ bool + diagnostic ──→ DisplaySink
//! ```
//!
//! Everything lives in a [`RouteTrace`](context::RouteTrace) context that
//! the test owns and passes around.
//!
//! # Usage
//!
//! ```
//! use routetrace::context::RouteTrace;
//! use routetrace::config::Config;
//! use routetrace::sink::NullSink;
//! use routetrace::rt_trace;
//!
//! struct Pipeline;
//!
//! impl Pipeline {
//!     fn run(&self, rt: &mut RouteTrace) {
//!         rt_trace!(rt);
//!         self.load(rt);
//!         self.store(rt);
//!     }
//!     fn load(&self, rt: &mut RouteTrace) {
//!         rt_trace!(rt);
//!     }
//!     fn store(&self, rt: &mut RouteTrace) {
//!         rt_trace!(rt);
//!     }
//! }
//!
//! let mut rt = RouteTrace::with_sink(Config::default(), NullSink);
//! rt.set_up();
//! Pipeline.run(&mut rt);
//!
//! let subject = rt.create_subject("Pipeline", "run").unwrap();
//! rt.add_route(subject, "load").unwrap();
//! rt.add_route(subject, "store").unwrap();
//! assert!(rt.verify_subject(subject));
//! rt.tear_down();
//! ```

pub mod config;
pub mod context;
pub mod sink;
pub mod subject;
pub mod trace_log;
pub mod verified;
pub mod verifier;

/// Path of the enclosing function, e.g. `my_crate::pipeline::Loader::load`.
///
/// Closures contribute a trailing `{{closure}}` segment.
#[macro_export]
macro_rules! function_name {
    () => {{
        fn __routetrace_here() {}
        fn type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        let name = type_name_of(__routetrace_here);
        name.strip_suffix("::__routetrace_here").unwrap_or(name)
    }};
}

/// Record the enclosing function's path in a [`RouteTrace`](context::RouteTrace).
///
/// `rt_trace!(rt)` records [`function_name!`]; `rt_trace!(rt, "text")`
/// records custom text.
#[macro_export]
macro_rules! rt_trace {
    ($rt:expr) => {
        $rt.record_trace($crate::function_name!())
    };
    ($rt:expr, $message:expr) => {
        $rt.record_trace($message)
    };
}
