//! Call-order verification of a subject against a trace log.
//!
//! The [`OrderVerifier`] resolves every route of a [`Subject`] to the
//! first matching entry of a [`TraceLog`] and checks that the resolved
//! positions are consistently ordered:
//!
//! 1. **Resolution.** Each route is searched for independently, from the
//!    start of the log. The first route with no match fails verification
//!    and later routes are not evaluated.
//! 2. **Order check.** Route `r` is out of order when its position lies
//!    before route `r - 1`'s or strictly after route `r + 1`'s. Equal
//!    positions are fine.
//!
//! The check is a heuristic for "A happened no later than B". Repeated
//! names in the log can make it pass on traces where the calls did not
//! happen in the expected order.

use crate::subject::Subject;
use crate::trace_log::{MatchRule, TraceLog};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ═══════════════════════════════════════════════════════════════════════
//  Failure
// ═══════════════════════════════════════════════════════════════════════

/// Why a subject failed verification.
///
/// The `Display` text of [`NotFound`](Self::NotFound) and
/// [`OrderViolation`](Self::OrderViolation) is the diagnostic line written
/// to the display sink.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerifyFailure {
    #[error("RouteTrace test failed: no such subject.")]
    NoSubject,

    #[error("RouteTrace test failed: the trace log is empty.")]
    EmptyTrace,

    #[error("RouteTrace test failed: Route '{route}' was not found.")]
    NotFound { route: String, position: usize },

    #[error("RouteTrace test failed: Route '{route}' is not in the correct order.")]
    OrderViolation { route: String, position: usize },
}

impl VerifyFailure {
    /// Whether this failure is reported on the display sink.
    ///
    /// A missing subject or an empty log fails silently; only route-level
    /// failures name a culprit.
    pub fn is_diagnostic(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::OrderViolation { .. })
    }

    /// The offending route, for route-level failures.
    pub fn route(&self) -> Option<&str> {
        match self {
            Self::NotFound { route, .. } | Self::OrderViolation { route, .. } => Some(route.as_str()),
            Self::NoSubject | Self::EmptyTrace => None,
        }
    }

    /// Index of the offending route within the subject.
    pub fn position(&self) -> Option<usize> {
        match self {
            Self::NotFound { position, .. } | Self::OrderViolation { position, .. } => Some(*position),
            Self::NoSubject | Self::EmptyTrace => None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Verification result
// ═══════════════════════════════════════════════════════════════════════

/// Outcome of verifying one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    /// `module::routine` of the subject, or empty if there was none.
    pub subject: String,
    /// Whether the trace is consistent with the subject's routes.
    pub passed: bool,
    /// Number of entries in the trace that was checked.
    pub trace_len: usize,
    /// Route names in expected order.
    pub routes: Vec<String>,
    /// Resolved trace position per route. Empty if resolution failed.
    pub resolved: Vec<usize>,
    /// First failure, if any.
    pub failure: Option<VerifyFailure>,
}

impl VerificationResult {
    fn failed(subject: String, trace_len: usize, routes: Vec<String>, failure: VerifyFailure) -> Self {
        Self {
            subject,
            passed: false,
            trace_len,
            routes,
            resolved: Vec::new(),
            failure: Some(failure),
        }
    }
}

impl fmt::Display for VerificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.passed {
            writeln!(
                f,
                "✅ ORDERED: {} ({} routes over {} trace entries)",
                self.subject,
                self.routes.len(),
                self.trace_len
            )?;
        } else {
            writeln!(f, "❌ OUT OF ORDER: {}", self.subject)?;
            if let Some(ref failure) = self.failure {
                writeln!(f, "   {}", failure)?;
            }
        }

        if !self.resolved.is_empty() {
            let offender = self.failure.as_ref().and_then(VerifyFailure::position);
            writeln!(f, "\n  {:>6} {:>8}  Route", "#", "Entry")?;
            for (r, (route, index)) in self.routes.iter().zip(&self.resolved).enumerate() {
                let marker = if offender == Some(r) { " ⚠" } else { "" };
                writeln!(f, "  {:>6} {:>8}  {}{}", r, index, route, marker)?;
            }
        }

        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Verifier
// ═══════════════════════════════════════════════════════════════════════

/// Checks a subject's expected route order against a trace.
///
/// # Example
///
/// ```
/// use routetrace::subject::Subject;
/// use routetrace::trace_log::{MatchRule, TraceLog};
/// use routetrace::verifier::OrderVerifier;
///
/// let log = TraceLog::from_messages(["alpha enter", "beta enter", "gamma enter"]);
/// let mut subject = Subject::new("greek", "letters").unwrap();
/// for route in ["alpha", "beta", "gamma"] {
///     subject.push_route(route, None).unwrap();
/// }
///
/// let result = OrderVerifier::verify(&log, Some(&subject), MatchRule::Substring);
/// assert!(result.passed);
/// ```
pub struct OrderVerifier;

impl OrderVerifier {
    /// Verify `subject` against `log`.
    ///
    /// A missing subject or an empty log fails immediately, without
    /// looking at any route.
    pub fn verify(log: &TraceLog, subject: Option<&Subject>, rule: MatchRule) -> VerificationResult {
        let Some(subject) = subject else {
            return VerificationResult::failed(String::new(), log.len(), Vec::new(), VerifyFailure::NoSubject);
        };

        let name = subject.qualified_name();
        let routes: Vec<String> = subject.routes().iter().map(|r| r.routine().to_string()).collect();

        if log.is_empty() {
            return VerificationResult::failed(name, 0, routes, VerifyFailure::EmptyTrace);
        }

        let resolved = match crate::verified::order::resolve_routes(log.entries(), subject.routes(), rule) {
            Ok(resolved) => resolved,
            Err(position) => {
                let route = routes[position].clone();
                return VerificationResult::failed(
                    name,
                    log.len(),
                    routes,
                    VerifyFailure::NotFound { route, position },
                );
            }
        };

        let failure = crate::verified::order::find_order_violation(&resolved).map(|position| {
            VerifyFailure::OrderViolation {
                route: routes[position].clone(),
                position,
            }
        });

        VerificationResult {
            subject: name,
            passed: failure.is_none(),
            trace_len: log.len(),
            routes,
            resolved,
            failure,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_subject(routes: &[&str]) -> Subject {
        let mut subject = Subject::new("greek", "letters").unwrap();
        for route in routes {
            subject.push_route(route, None).unwrap();
        }
        subject
    }

    fn greek() -> TraceLog {
        TraceLog::from_messages(["alpha enter", "beta enter", "gamma enter"])
    }

    fn verify(log: &TraceLog, routes: &[&str]) -> VerificationResult {
        OrderVerifier::verify(log, Some(&make_subject(routes)), MatchRule::Substring)
    }

    #[test]
    fn expected_order_passes() {
        let result = verify(&greek(), &["alpha", "beta", "gamma"]);
        assert!(result.passed);
        assert_eq!(result.resolved, vec![0, 1, 2]);
        assert!(result.failure.is_none());
    }

    #[test]
    fn reversed_order_fails_at_second_route() {
        let result = verify(&greek(), &["gamma", "beta", "alpha"]);
        assert!(!result.passed);
        assert_eq!(
            result.failure,
            Some(VerifyFailure::OrderViolation {
                route: "beta".into(),
                position: 1
            })
        );
    }

    #[test]
    fn repeated_call_resolves_to_first_occurrence() {
        let log = TraceLog::from_messages(["alpha enter", "alpha enter", "beta enter"]);
        let result = verify(&log, &["alpha", "beta"]);
        assert!(result.passed);
        assert_eq!(result.resolved, vec![0, 2]);
    }

    #[test]
    fn empty_log_fails_before_resolution() {
        let result = verify(&TraceLog::new(), &["alpha"]);
        assert_eq!(result.failure, Some(VerifyFailure::EmptyTrace));

        let result = verify(&TraceLog::new(), &[]);
        assert!(!result.passed, "an empty log satisfies no subject");
    }

    #[test]
    fn missing_subject_fails() {
        let result = OrderVerifier::verify(&greek(), None, MatchRule::Substring);
        assert!(!result.passed);
        assert_eq!(result.failure, Some(VerifyFailure::NoSubject));
        assert!(!VerifyFailure::NoSubject.is_diagnostic());
    }

    #[test]
    fn zero_routes_pass_on_non_empty_log() {
        let result = verify(&greek(), &[]);
        assert!(result.passed);
        assert!(result.resolved.is_empty());
    }

    #[test]
    fn single_unmatched_route_is_not_found() {
        let result = verify(&greek(), &["delta"]);
        assert!(!result.passed);
        let failure = result.failure.unwrap();
        assert!(failure.is_diagnostic());
        assert_eq!(
            failure.to_string(),
            "RouteTrace test failed: Route 'delta' was not found."
        );
    }

    #[test]
    fn not_found_short_circuits_later_routes() {
        let result = verify(&greek(), &["gamma", "delta", "alpha"]);
        assert_eq!(
            result.failure,
            Some(VerifyFailure::NotFound {
                route: "delta".into(),
                position: 1
            })
        );
        assert!(result.resolved.is_empty());
    }

    #[test]
    fn exact_rule_rejects_decorated_entries() {
        let subject = make_subject(&["alpha"]);
        let result = OrderVerifier::verify(&greek(), Some(&subject), MatchRule::Exact);
        assert!(matches!(result.failure, Some(VerifyFailure::NotFound { .. })));
    }

    #[test]
    fn substring_ambiguity_is_preserved() {
        // "eta" is found inside "beta enter" before the real "eta enter".
        let log = TraceLog::from_messages(["beta enter", "zeta enter", "eta enter"]);
        let result = verify(&log, &["zeta", "eta"]);
        assert!(!result.passed);
        assert_eq!(result.resolved, vec![1, 0]);
    }

    #[test]
    fn repeated_route_passes_on_a_single_call() {
        // Both "alpha" routes resolve to entry 0; equality is tolerated.
        let log = TraceLog::from_messages(["alpha enter", "beta enter"]);
        let result = verify(&log, &["alpha", "alpha", "beta"]);
        assert!(result.passed);
        assert_eq!(result.resolved, vec![0, 0, 1]);
    }

    #[test]
    fn display_marks_the_offending_route() {
        let result = verify(&greek(), &["alpha", "gamma", "beta"]);
        let text = result.to_string();
        assert!(text.contains("OUT OF ORDER"));
        assert!(text.contains("Route 'gamma' is not in the correct order"));
        assert!(text.contains("gamma ⚠"));

        let text = verify(&greek(), &["alpha", "beta"]).to_string();
        assert!(text.contains("ORDERED: greek::letters"));
    }

    #[test]
    fn display_marks_only_the_offending_row_of_a_repeated_route() {
        let log = TraceLog::from_messages(["beta enter", "alpha enter"]);
        let result = verify(&log, &["alpha", "alpha", "beta"]);
        assert_eq!(
            result.failure,
            Some(VerifyFailure::OrderViolation {
                route: "alpha".into(),
                position: 1
            })
        );

        let text = result.to_string();
        assert_eq!(text.matches('⚠').count(), 1);
        assert!(text.lines().any(|l| l.trim_start().starts_with('1') && l.ends_with("alpha ⚠")));
    }
}
