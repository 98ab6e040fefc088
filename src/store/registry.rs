//! The read-only node-store boundary and an in-memory reference registry.
//!
//! Production graph datastores live outside this crate; the pipeline only
//! ever reads through an explicit [`NodeStore`] handle (no ambient global
//! registry). `InMemoryStore` is the columnar reference implementation used
//! by tests and small callers.

use super::types::{EdgeRecord, FlowRecord, NodeId, NodeRecord, NodeRef};
use crate::error::PatchError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Read access to the process graph.
pub trait NodeStore {
    /// Looks up a node by its integer identity.
    fn node(&self, id: NodeId) -> Option<&NodeRecord>;

    /// Looks up a node by its `(dataset, local code)` pair.
    fn node_by_key(&self, dataset: &str, code: &str) -> Option<&NodeRecord>;

    /// Finds the process inside `dataset` matching the
    /// `(name, reference product, location)` triple. This is how the same
    /// process is located across vintages of the background data.
    fn node_by_attrs(
        &self,
        dataset: &str,
        name: &str,
        reference_product: &str,
        location: &str,
    ) -> Option<&NodeRecord>;

    /// All technosphere edges feeding `consumer`.
    fn consuming_edges(&self, consumer: NodeId) -> &[EdgeRecord];

    /// All environmental-flow exchanges of `producer`.
    fn flow_edges(&self, producer: NodeId) -> &[FlowRecord];

    /// Resolves any [`NodeRef`] variant to a canonical record.
    fn resolve<'a>(&'a self, node: NodeRef<'a>) -> Result<&'a NodeRecord, PatchError> {
        let found = match node {
            NodeRef::Record(record) => Some(record),
            NodeRef::Id(id) => self.node(id),
            NodeRef::Key(dataset, code) => self.node_by_key(dataset, code),
        };
        found.ok_or_else(|| PatchError::NodeResolution {
            reference: node.to_string(),
            context: None,
        })
    }
}

/// Columnar in-memory registry.
///
/// Nodes are stored in insertion order; edges are grouped per consumer and
/// flows per producer so the hot lookups are a single hash probe plus a slice
/// borrow. The hash indexes are ephemeral and rebuilt after deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemoryStore {
    nodes: Vec<NodeRecord>,
    edges_by_consumer: HashMap<NodeId, Vec<EdgeRecord>>,
    flows_by_producer: HashMap<NodeId, Vec<FlowRecord>>,

    // Lookup caches, rebuilt on load.
    #[serde(skip)]
    by_id: HashMap<NodeId, usize>,
    #[serde(skip)]
    by_key: HashMap<(String, String), usize>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Registers a node. The id and the `(dataset, code)` pair must both be
    /// unique.
    pub fn add_node(&mut self, record: NodeRecord) -> Result<NodeId, PatchError> {
        if self.by_id.contains_key(&record.id) {
            return Err(PatchError::InvariantViolation {
                reason: format!("duplicate node id {}", record.id),
                context: None,
            });
        }
        let key = (record.dataset.clone(), record.code.clone());
        if self.by_key.contains_key(&key) {
            return Err(PatchError::InvariantViolation {
                reason: format!("duplicate node key ('{}', '{}')", key.0, key.1),
                context: None,
            });
        }

        let id = record.id;
        let index = self.nodes.len();
        self.by_id.insert(id, index);
        self.by_key.insert(key, index);
        self.nodes.push(record);
        Ok(id)
    }

    /// Registers a technosphere edge between two known nodes.
    pub fn add_edge(&mut self, producer: NodeId, consumer: NodeId, amount: f64) {
        self.edges_by_consumer.entry(consumer).or_default().push(EdgeRecord {
            producer,
            consumer,
            amount,
        });
    }

    /// Registers an environmental-flow exchange on a producer.
    pub fn add_flow(&mut self, flow: NodeId, producer: NodeId, amount: f64) {
        self.flows_by_producer.entry(producer).or_default().push(FlowRecord {
            flow,
            producer,
            amount,
        });
    }

    /// Rebuilds the lookup caches after deserialization.
    pub fn rebuild_indexes(&mut self) {
        self.by_id = self
            .nodes
            .iter()
            .enumerate()
            .map(|(index, record)| (record.id, index))
            .collect();
        self.by_key = self
            .nodes
            .iter()
            .enumerate()
            .map(|(index, record)| ((record.dataset.clone(), record.code.clone()), index))
            .collect();
    }
}

impl NodeStore for InMemoryStore {
    fn node(&self, id: NodeId) -> Option<&NodeRecord> {
        self.by_id.get(&id).map(|&index| &self.nodes[index])
    }

    fn node_by_key(&self, dataset: &str, code: &str) -> Option<&NodeRecord> {
        self.by_key
            .get(&(dataset.to_string(), code.to_string()))
            .map(|&index| &self.nodes[index])
    }

    fn node_by_attrs(
        &self,
        dataset: &str,
        name: &str,
        reference_product: &str,
        location: &str,
    ) -> Option<&NodeRecord> {
        self.nodes.iter().find(|record| {
            record.dataset == dataset
                && record.name == name
                && record.reference_product == reference_product
                && record.location == location
        })
    }

    fn consuming_edges(&self, consumer: NodeId) -> &[EdgeRecord] {
        self.edges_by_consumer
            .get(&consumer)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn flow_edges(&self, producer: NodeId) -> &[FlowRecord] {
        self.flows_by_producer
            .get(&producer)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
