//! The process-graph boundary: node identities, records, and read access.
pub mod registry;
pub mod types;

pub use registry::{InMemoryStore, NodeStore};
pub use types::{EdgeRecord, FlowRecord, NodeId, NodeKind, NodeRecord, NodeRef};
