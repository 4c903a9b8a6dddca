//! Route resolution and the neighbour-window order check, kept apart from
//! the log, the registry and the display sink.
//!
//! Nothing here writes to a sink or the logger; callers turn the plain
//! indices these functions return into diagnostics. Entries and routes
//! come in as anything `AsRef<str>`, so the checks run just as well over
//! string literals in tests as over a recorded [`TraceLog`] and a
//! [`Subject`]'s routes. Index postconditions are `debug_assert!`ed.
//!
//! [`TraceLog`]: crate::trace_log::TraceLog
//! [`Subject`]: crate::subject::Subject
//!
//! # Mapping to the effectful shell
//!
//! | Verified function         | Used by                                  |
//! |---------------------------|------------------------------------------|
//! | [`routine_matches`]       | [`MatchRule::matches`]                   |
//! | [`first_match`]           | `TraceLog::find_first_index_with()`      |
//! | [`resolve_routes`]        | `OrderVerifier::verify()` (step 1)       |
//! | [`find_order_violation`]  | `OrderVerifier::verify()` (step 2)       |

use crate::trace_log::MatchRule;

// ─── Matching ────────────────────────────────────────────────────────

/// Whether entry `text` satisfies `routine` under `rule`.
///
/// # Properties
///
/// - An empty `routine` or an empty `text` never matches.
/// - [`MatchRule::Exact`] matching implies [`MatchRule::Substring`]
///   matching.
pub fn routine_matches(rule: MatchRule, routine: &str, text: &str) -> bool {
    if routine.is_empty() || text.is_empty() {
        return false;
    }
    match rule {
        MatchRule::Substring => text.contains(routine),
        MatchRule::Exact => text == routine,
    }
}

/// Position of the first entry matching `routine`, scanning from 0.
///
/// # Properties
///
/// - `Some(i)` implies `entries[i]` matches and no `entries[j]`, `j < i`,
///   matches.
/// - `None` for an empty `routine`.
pub fn first_match<E: AsRef<str>>(entries: &[E], routine: &str, rule: MatchRule) -> Option<usize> {
    if routine.is_empty() {
        return None;
    }

    let found = entries
        .iter()
        .position(|e| routine_matches(rule, routine, e.as_ref()));

    // Postcondition: nothing before the result matches.
    debug_assert!(
        found.map_or(true, |i| {
            (0..i).all(|j| !routine_matches(rule, routine, entries[j].as_ref()))
        }),
        "first_match must return the earliest matching position"
    );

    found
}

// ─── Resolution (step 1) ─────────────────────────────────────────────

/// Resolve every route to the position of its first match in `entries`.
///
/// Each route is resolved against the whole slice independently; the
/// search does not advance past earlier routes' positions. Resolution
/// stops at the first route with no match, returning `Err(route_position)`
/// for it; later routes are not evaluated.
///
/// # Properties
///
/// - `Ok(v)` implies `v.len() == routes.len()` and every `v[r] <
///   entries.len()`.
/// - An empty `routes` slice resolves to `Ok(vec![])`.
pub fn resolve_routes<E, R>(entries: &[E], routes: &[R], rule: MatchRule) -> Result<Vec<usize>, usize>
where
    E: AsRef<str>,
    R: AsRef<str>,
{
    let mut resolved = Vec::with_capacity(routes.len());
    for (r, route) in routes.iter().enumerate() {
        match first_match(entries, route.as_ref(), rule) {
            Some(index) => resolved.push(index),
            None => return Err(r),
        }
    }

    // Postcondition: one in-bounds index per route.
    debug_assert_eq!(resolved.len(), routes.len());
    debug_assert!(
        resolved.iter().all(|&i| i < entries.len()),
        "resolved indices must point into the trace"
    );

    Ok(resolved)
}

// ─── Order check (step 2) ────────────────────────────────────────────

/// Find the first route whose resolved index is out of order.
///
/// For each route `r` from 1 onward, with `previous = indices[r - 1]`,
/// `current = indices[r]` and `next = indices[r + 1]` (or `current` for
/// the last route), route `r` violates the order when `current <
/// previous` or `current > next`. Equal neighbours are tolerated so that
/// repeated calls resolving to the same or adjacent entries pass.
///
/// This is a neighbour-window heuristic, not an ordered-subsequence test:
/// it can accept traces in which the expected order did not strictly
/// happen.
///
/// # Properties
///
/// - Fewer than two indices never violate.
/// - `Some(r)` implies `1 <= r < indices.len()`.
/// - A non-decreasing slice never violates.
pub fn find_order_violation(indices: &[usize]) -> Option<usize> {
    for r in 1..indices.len() {
        let previous = indices[r - 1];
        let current = indices[r];
        let next = if r + 1 < indices.len() {
            indices[r + 1]
        } else {
            current
        };

        if current < previous || current > next {
            // Postcondition: the reported route is in range.
            debug_assert!(r >= 1 && r < indices.len());
            return Some(r);
        }
    }

    // Postcondition: every consecutive pair that was checked held.
    debug_assert!(
        (1..indices.len()).all(|r| indices[r] >= indices[r - 1]),
        "no violation requires a non-decreasing index sequence"
    );

    None
}

// ─── Tests ───────────────────────────────────────────────────────────
