//! The write-ahead patch description consumed by the external solver.

use crate::store::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One elementary matrix edit at `(row, col)`.
///
/// `is_replacement = true` marks an entry that overwrites the coordinate
/// already present in the base matrix (the zero-outs); entries for newly
/// minted coordinates accumulate instead.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatchEntry {
    pub row: NodeId,
    pub col: NodeId,
    pub value: f64,
    pub is_replacement: bool,
}

/// An ordered, append-only collection of matrix edits.
///
/// The patch owns no reference to the matrix it describes; it is handed to
/// the solver after compilation and never mutated again. Duplicate
/// `(row, col)` coordinates are not pre-aggregated: the solver contract is
/// "replacement entries overwrite, insert entries sum, applied in patch
/// order", which [`MatrixPatch::net_values`] implements as the reference.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatrixPatch {
    entries: Vec<PatchEntry>,
}

impl MatrixPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[PatchEntry] {
        &self.entries
    }

    /// Appends an overwrite-to-zero entry for an existing edge.
    pub fn zero_out(&mut self, row: NodeId, col: NodeId) {
        self.entries.push(PatchEntry {
            row,
            col,
            value: 0.0,
            is_replacement: true,
        });
    }

    /// Appends a pre-built entry as-is.
    pub fn push(&mut self, entry: PatchEntry) {
        self.entries.push(entry);
    }

    /// Appends an accumulating entry for a new coordinate.
    pub fn insert(&mut self, row: NodeId, col: NodeId, value: f64) {
        self.entries.push(PatchEntry {
            row,
            col,
            value,
            is_replacement: false,
        });
    }

    /// The net value per coordinate after applying all entries in order:
    /// replacements reset the coordinate, inserts add to it.
    ///
    /// This is the reference aggregation the mass-conservation property is
    /// checked against; solvers with equivalent semantics may aggregate
    /// however they like.
    pub fn net_values(&self) -> BTreeMap<(i64, i64), f64> {
        let mut net = BTreeMap::new();
        for entry in &self.entries {
            let slot = net.entry((entry.row.raw(), entry.col.raw())).or_insert(0.0);
            if entry.is_replacement {
                *slot = entry.value;
            } else {
                *slot += entry.value;
            }
        }
        net
    }
}
