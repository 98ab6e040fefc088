//! Converts a bracketing result into a normalized weight distribution over
//! vintage years.

use super::matching::{self, Bracket};
use crate::error::PatchError;
use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};
use std::str::FromStr;
use tracing::warn;

/// How a target date between two vintages is split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationMode {
    /// Split linearly by elapsed real time between the bracketing vintages.
    Linear,
    /// Put the full weight on the closer vintage.
    Nearest,
}

impl FromStr for InterpolationMode {
    type Err = PatchError;

    fn from_str(mode: &str) -> Result<Self, Self::Err> {
        match mode {
            "linear" => Ok(InterpolationMode::Linear),
            "nearest" => Ok(InterpolationMode::Nearest),
            other => Err(PatchError::UnsupportedInterpolation {
                mode: other.to_string(),
            }),
        }
    }
}

/// A `vintage year -> weight` distribution for one timeline row.
///
/// At most two entries in practice (the bracketing pair), hence the inline
/// small-vector storage. Entries are kept sorted by year. Weights across all
/// keys sum to 1.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InterpolationWeights {
    entries: SmallVec<[(i32, f64); 2]>,
}

impl InterpolationWeights {
    /// The degenerate distribution: full weight on one year.
    pub fn single(year: i32) -> Self {
        Self {
            entries: smallvec![(year, 1.0)],
        }
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (i32, f64)>) -> Self {
        let mut entries: SmallVec<[(i32, f64); 2]> = pairs.into_iter().collect();
        entries.sort_by_key(|&(year, _)| year);
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, year: i32) -> Option<f64> {
        self.entries
            .iter()
            .find(|&&(entry_year, _)| entry_year == year)
            .map(|&(_, weight)| weight)
    }

    /// `(year, weight)` pairs in ascending year order.
    pub fn iter(&self) -> impl Iterator<Item = (i32, f64)> + '_ {
        self.entries.iter().copied()
    }

    pub fn total(&self) -> f64 {
        self.entries.iter().map(|&(_, weight)| weight).sum()
    }

    pub fn is_normalized(&self, tolerance: f64) -> bool {
        (self.total() - 1.0).abs() <= tolerance
    }
}

/// Computes the weight distribution for `target` given its [`Bracket`].
///
/// Exact matches and out-of-range clamps yield a single-key distribution
/// regardless of mode; the clamp cases emit a warning-level event since data
/// is silently taken from the boundary vintage. The linear split is computed
/// from elapsed seconds, not calendar-year differences, so sub-year precision
/// is preserved across leap years.
pub fn weights(
    target: NaiveDateTime,
    bracket: Bracket,
    mode: InterpolationMode,
) -> Result<InterpolationWeights, PatchError> {
    match bracket {
        Bracket::Exact(date) => Ok(InterpolationWeights::single(date.year())),
        Bracket::Below(first) => {
            warn!(
                target_date = %target,
                boundary = %first,
                "target precedes all vintage dates; clamping to the earliest"
            );
            Ok(InterpolationWeights::single(first.year()))
        }
        Bracket::Above(last) => {
            warn!(
                target_date = %target,
                boundary = %last,
                "target succeeds all vintage dates; clamping to the latest"
            );
            Ok(InterpolationWeights::single(last.year()))
        }
        Bracket::Between { lower, upper } => match mode {
            InterpolationMode::Linear => {
                let span = (upper - lower).num_seconds() as f64;
                let elapsed = (target - lower).num_seconds() as f64;
                // lower != upper is established by the Between variant, so
                // span is strictly positive.
                let upper_weight = elapsed / span;
                Ok(InterpolationWeights::from_pairs([
                    (lower.year(), 1.0 - upper_weight),
                    (upper.year(), upper_weight),
                ]))
            }
            InterpolationMode::Nearest => {
                let closest = matching::nearest(target, &[lower, upper])?;
                Ok(InterpolationWeights::single(closest.year()))
            }
        },
    }
}
