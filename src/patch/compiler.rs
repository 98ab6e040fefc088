//! Compiles an annotated timeline into a matrix patch.
//!
//! Each timeline row is turned into time-explicit matrix entries: foreground
//! producers are "exploded" into synthetic time-sliced copies, while
//! producers living in a vintage dataset are redirected to their same-named
//! counterparts in the temporally matching vintages, split by the row's
//! interpolation weights. Freshly minted node ids receive one self-identity
//! production entry at the end of the pass.

use super::entry::MatrixPatch;
use super::synthetic;
use crate::error::PatchError;
use crate::store::{NodeId, NodeStore};
use crate::timeline::{Timeline, TimelineRow};
use crate::vintage::VintageSet;
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

/// Tolerance for the weights-sum-to-one invariant.
pub const WEIGHT_TOLERANCE: f64 = 1e-9;

/// What to do when a row fails to compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Abort the whole pass on the first row error. The default, since a
    /// silently dropped row under-reports the redirected amounts.
    #[default]
    FailFast,
    /// Skip the failing row, record its error, and keep compiling.
    Collect,
}

/// The result of one compilation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Compilation {
    pub patch: MatrixPatch,
    /// Every synthetic id minted during the pass, each of which got exactly
    /// one self-identity entry.
    pub new_nodes: BTreeSet<NodeId>,
    /// Row errors collected under [`ErrorMode::Collect`]; empty in fail-fast
    /// mode.
    pub skipped: Vec<PatchError>,
}

/// One compilation pass over an annotated timeline.
///
/// Owns the in-progress patch and new-nodes set exclusively; reads the graph
/// through the explicit store handle.
pub struct PatchCompiler<'a, S: NodeStore> {
    store: &'a S,
    vintages: &'a VintageSet,
    error_mode: ErrorMode,
}

/// Entries and mints produced by a single row, committed only if the whole
/// row succeeds so a half-compiled row never leaks into the patch.
struct RowEdits {
    entries: MatrixPatch,
    minted: Vec<(NodeId, NodeId, i32)>, // (synthetic, base, year)
}

impl<'a, S: NodeStore> PatchCompiler<'a, S> {
    pub fn new(store: &'a S, vintages: &'a VintageSet) -> Self {
        Self {
            store,
            vintages,
            error_mode: ErrorMode::default(),
        }
    }

    pub fn error_mode(mut self, error_mode: ErrorMode) -> Self {
        self.error_mode = error_mode;
        self
    }

    /// Compiles the timeline into a technosphere patch.
    pub fn compile(&self, timeline: &Timeline) -> Result<Compilation, PatchError> {
        let mut patch = MatrixPatch::new();
        // synthetic id -> (base, year), for collision detection across rows
        let mut minted: BTreeMap<NodeId, (NodeId, i32)> = BTreeMap::new();
        let mut skipped = Vec::new();

        for row in timeline.iter() {
            match self.compile_row(row) {
                Ok(edits) => {
                    for &(id, base, year) in &edits.minted {
                        match minted.get(&id) {
                            Some(&existing) if existing != (base, year) => {
                                return Err(PatchError::InvariantViolation {
                                    reason: format!(
                                        "synthetic id {id} minted for ({base}, {year}) \
                                         collides with ({}, {})",
                                        existing.0, existing.1
                                    ),
                                    context: Some(row.context()),
                                });
                            }
                            _ => {
                                minted.insert(id, (base, year));
                            }
                        }
                    }
                    for &entry in edits.entries.entries() {
                        patch.push(entry);
                    }
                }
                Err(error) => match self.error_mode {
                    ErrorMode::FailFast => return Err(error),
                    ErrorMode::Collect => skipped.push(error),
                },
            }
        }

        // Self-identity production entries so synthetic nodes behave as
        // unit-producing processes in the solver's algebra. BTreeMap order
        // keeps the tail of the patch deterministic.
        for &id in minted.keys() {
            patch.insert(id, id, 1.0);
        }

        info!(
            rows = timeline.len(),
            entries = patch.len(),
            new_nodes = minted.len(),
            skipped = skipped.len(),
            "compiled timeline patch"
        );

        Ok(Compilation {
            patch,
            new_nodes: minted.keys().copied().collect(),
            skipped,
        })
    }

    fn compile_row(&self, row: &TimelineRow) -> Result<RowEdits, PatchError> {
        let weights =
            row.interpolation_weights
                .as_ref()
                .ok_or_else(|| PatchError::InvariantViolation {
                    reason: "row reached the compiler without interpolation weights".into(),
                    context: Some(row.context()),
                })?;
        if !weights.is_normalized(WEIGHT_TOLERANCE) {
            return Err(PatchError::InvariantViolation {
                reason: format!("interpolation weights sum to {}, expected 1", weights.total()),
                context: Some(row.context()),
            });
        }
        let year = row.year().ok_or(PatchError::MissingDateColumn {
            context: row.context(),
        })?;

        let previous_producer =
            self.store
                .node(row.producer)
                .ok_or_else(|| PatchError::NodeResolution {
                    reference: row.producer.to_string(),
                    context: Some(row.context()),
                })?;

        let mut edits = RowEdits {
            entries: MatrixPatch::new(),
            minted: Vec::with_capacity(2),
        };
        let synthetic_consumer = synthetic::encode(row.consumer, year);
        edits.minted.push((synthetic_consumer, row.consumer, year));

        if !self.vintages.contains_dataset(&previous_producer.dataset) {
            // Foreground producer: explode into a time-sliced copy.
            let synthetic_producer = synthetic::encode(row.producer, year);
            edits.minted.push((synthetic_producer, row.producer, year));
            edits
                .entries
                .insert(synthetic_producer, synthetic_consumer, row.amount);
            return Ok(edits);
        }

        // Vintage-resolvable producer: split the amount across the matching
        // processes in the weighted vintages.
        for (vintage_year, weight) in weights.iter() {
            let dataset = self.vintages.dataset_for_year(vintage_year).ok_or_else(|| {
                PatchError::NodeResolution {
                    reference: format!("vintage year {vintage_year}"),
                    context: Some(row.context()),
                }
            })?;
            let resolved = self
                .store
                .node_by_attrs(
                    dataset,
                    &previous_producer.name,
                    &previous_producer.reference_product,
                    &previous_producer.location,
                )
                .ok_or_else(|| PatchError::NodeResolution {
                    reference: format!(
                        "('{dataset}', '{}', '{}', '{}')",
                        previous_producer.name,
                        previous_producer.reference_product,
                        previous_producer.location
                    ),
                    context: Some(row.context()),
                })?;
            edits
                .entries
                .insert(resolved.id, synthetic_consumer, row.amount * weight);
        }
        Ok(edits)
    }

    /// Compiles the companion environmental-flow patch: every foreground
    /// producer's flow exchanges are copied onto its time-sliced copies, so
    /// the exploded processes carry the same emissions as the originals.
    ///
    /// Time-sliced stand-ins for vintage producers are skipped; they only
    /// split an amount between datasets and have no flows of their own.
    /// Always fails fast; flow copying has no per-row recovery story.
    pub fn compile_flow_patch(&self, timeline: &Timeline) -> Result<MatrixPatch, PatchError> {
        let mut pairs: BTreeSet<(NodeId, i32)> = BTreeSet::new();
        for row in timeline.iter() {
            let year = row.year().ok_or(PatchError::MissingDateColumn {
                context: row.context(),
            })?;
            pairs.insert((row.producer, year));
        }

        let mut patch = MatrixPatch::new();
        for (producer, year) in pairs {
            let record = self
                .store
                .node(producer)
                .ok_or_else(|| PatchError::NodeResolution {
                    reference: producer.to_string(),
                    context: None,
                })?;
            if self.vintages.contains_dataset(&record.dataset) {
                continue;
            }
            let synthetic_producer = synthetic::encode(producer, year);
            for flow in self.store.flow_edges(producer) {
                patch.insert(flow.flow, synthetic_producer, flow.amount);
            }
        }
        Ok(patch)
    }
}
