//! Vintage configuration: which background dataset represents which date.
//!
//! A vintage is an alternative background dataset holding the same processes
//! calibrated to a specific reference date. The full collection is built once
//! per run from caller configuration and is immutable afterwards.

use crate::error::PatchError;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One background dataset tagged with the calendar date it represents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceDate {
    pub dataset: String,
    pub date: NaiveDateTime,
}

impl ReferenceDate {
    pub fn new(dataset: impl Into<String>, date: NaiveDateTime) -> Self {
        Self {
            dataset: dataset.into(),
            date,
        }
    }

    /// A vintage pinned to January 1st of `year`.
    pub fn from_year(dataset: impl Into<String>, year: i32) -> Self {
        // Midnight Jan 1 always exists, so the unwrap cannot fire.
        let date = NaiveDate::from_ymd_opt(year, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        Self::new(dataset, date)
    }

    pub fn year(&self) -> i32 {
        use chrono::Datelike;
        self.date.year()
    }
}

/// The validated, immutable set of available vintages.
///
/// Invariants enforced at construction: non-empty, no duplicate dataset
/// identifiers, no duplicate years. Dates are kept sorted so the matcher's
/// stable-min tie-breaking is well defined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VintageSet {
    by_year: BTreeMap<i32, ReferenceDate>,
}

impl VintageSet {
    pub fn new(vintages: Vec<ReferenceDate>) -> Result<Self, PatchError> {
        if vintages.is_empty() {
            return Err(PatchError::EmptyInput);
        }
        let mut by_year = BTreeMap::new();
        let mut datasets = std::collections::HashSet::new();
        for vintage in vintages {
            if !datasets.insert(vintage.dataset.clone()) {
                return Err(PatchError::InvariantViolation {
                    reason: format!("duplicate vintage dataset '{}'", vintage.dataset),
                    context: None,
                });
            }
            let year = vintage.year();
            if by_year.insert(year, vintage).is_some() {
                return Err(PatchError::InvariantViolation {
                    reason: format!("duplicate vintage year {year}"),
                    context: None,
                });
            }
        }
        Ok(Self { by_year })
    }

    /// Builds the set from a plain `year -> dataset` map, the shape the
    /// caller configuration usually arrives in. Each vintage is pinned to
    /// January 1st of its year.
    pub fn from_year_map(config: BTreeMap<i32, String>) -> Result<Self, PatchError> {
        Self::new(
            config
                .into_iter()
                .map(|(year, dataset)| ReferenceDate::from_year(dataset, year))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.by_year.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_year.is_empty()
    }

    /// Reference dates in ascending order.
    pub fn dates(&self) -> Vec<NaiveDateTime> {
        self.by_year.values().map(|vintage| vintage.date).collect()
    }

    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.by_year.keys().copied()
    }

    pub fn dataset_for_year(&self, year: i32) -> Option<&str> {
        self.by_year.get(&year).map(|vintage| vintage.dataset.as_str())
    }

    /// Whether `dataset` is one of the known vintages. Producers living in a
    /// vintage dataset are substitutable; everything else is foreground.
    pub fn contains_dataset(&self, dataset: &str) -> bool {
        self.by_year.values().any(|vintage| vintage.dataset == dataset)
    }
}
