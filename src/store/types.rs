use serde::{Deserialize, Serialize};

/// A stable external identity for a node in the process graph.
///
/// This is the identity the sparse matrices are indexed by, not a dense
/// storage index. Synthetic time-sliced ids (`base * 1_000_000 + year`)
/// exceed `i32`, hence the `i64` representation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NodeId(pub i64);

impl NodeId {
    #[inline(always)]
    pub fn raw(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for NodeId {
    fn from(raw: i64) -> Self {
        NodeId(raw)
    }
}

/// The classification of a node in the process graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// A producing activity; the only valid source of a technosphere edge.
    Process,
    /// A traded product without its own production column.
    Product,
    /// An environmental flow (emission or resource), outside the square
    /// technosphere block.
    Flow,
}

/// Node attributes the patching pipeline reads: dataset membership, the
/// `(name, reference product, location)` triple used for same-process lookups
/// across vintages, and the local code used for `(dataset, code)` references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    pub kind: NodeKind,
    pub dataset: String,
    pub code: String,
    pub name: String,
    pub reference_product: String,
    pub location: String,
}

/// A directed technosphere exchange: `producer` supplies `amount` into
/// `consumer`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub producer: NodeId,
    pub consumer: NodeId,
    pub amount: f64,
}

/// An environmental-flow exchange attached to a producing process.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlowRecord {
    pub flow: NodeId,
    pub producer: NodeId,
    pub amount: f64,
}

/// The accepted ways of naming a node at the API boundary.
///
/// Callers resolve a `NodeRef` exactly once through the store; everything
/// downstream works on the canonical `NodeRecord` and never branches on the
/// variant again.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeRef<'a> {
    /// An already-resolved record handle.
    Record(&'a NodeRecord),
    /// A raw integer identity.
    Id(NodeId),
    /// A `(dataset, local code)` pair.
    Key(&'a str, &'a str),
}

impl std::fmt::Display for NodeRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeRef::Record(record) => write!(f, "{} ('{}')", record.id, record.name),
            NodeRef::Id(id) => write!(f, "{id}"),
            NodeRef::Key(dataset, code) => write!(f, "('{dataset}', '{code}')"),
        }
    }
}

impl<'a> From<&'a NodeRecord> for NodeRef<'a> {
    fn from(record: &'a NodeRecord) -> Self {
        NodeRef::Record(record)
    }
}

impl From<NodeId> for NodeRef<'_> {
    fn from(id: NodeId) -> Self {
        NodeRef::Id(id)
    }
}

impl From<i64> for NodeRef<'_> {
    fn from(raw: i64) -> Self {
        NodeRef::Id(NodeId(raw))
    }
}

impl<'a> From<(&'a str, &'a str)> for NodeRef<'a> {
    fn from((dataset, code): (&'a str, &'a str)) -> Self {
        NodeRef::Key(dataset, code)
    }
}
