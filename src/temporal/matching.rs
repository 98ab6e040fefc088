//! Nearest-date and bracketing lookups over the vintage reference dates.

use crate::error::PatchError;
use chrono::NaiveDateTime;

/// Where a target date falls relative to the candidate reference dates.
///
/// The out-of-range cases are expected conditions (a process occurring before
/// or after all available vintages), not errors; the weight calculator turns
/// them into a degenerate single-key distribution with a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bracket {
    /// The target equals a candidate exactly.
    Exact(NaiveDateTime),
    /// The target lies strictly between the two closest candidates.
    Between {
        lower: NaiveDateTime,
        upper: NaiveDateTime,
    },
    /// The target precedes every candidate; clamped to the earliest.
    Below(NaiveDateTime),
    /// The target succeeds every candidate; clamped to the latest.
    Above(NaiveDateTime),
}

/// Returns the candidate minimizing absolute time distance to `target`.
///
/// Ties break toward the earlier candidate (stable min over the sorted list).
pub fn nearest(
    target: NaiveDateTime,
    candidates: &[NaiveDateTime],
) -> Result<NaiveDateTime, PatchError> {
    let mut sorted = candidates.to_vec();
    sorted.sort();
    sorted
        .into_iter()
        .min_by_key(|&candidate| abs_distance(target, candidate))
        .ok_or(PatchError::EmptyInput)
}

/// Returns the closest candidates strictly before and strictly after
/// `target`, as a [`Bracket`].
pub fn bracket(
    target: NaiveDateTime,
    candidates: &[NaiveDateTime],
) -> Result<Bracket, PatchError> {
    if candidates.is_empty() {
        return Err(PatchError::EmptyInput);
    }

    if candidates.contains(&target) {
        return Ok(Bracket::Exact(target));
    }

    let lower = candidates
        .iter()
        .copied()
        .filter(|&candidate| candidate < target)
        .max();
    let upper = candidates
        .iter()
        .copied()
        .filter(|&candidate| candidate > target)
        .min();

    match (lower, upper) {
        (Some(lower), Some(upper)) => Ok(Bracket::Between { lower, upper }),
        // min()/max() over the full non-empty list cannot fail below.
        (None, Some(_)) => Ok(Bracket::Below(*candidates.iter().min().unwrap())),
        (Some(_), None) => Ok(Bracket::Above(*candidates.iter().max().unwrap())),
        (None, None) => unreachable!("non-empty candidates bracket every target"),
    }
}

fn abs_distance(a: NaiveDateTime, b: NaiveDateTime) -> chrono::Duration {
    if a >= b {
        a - b
    } else {
        b - a
    }
}
