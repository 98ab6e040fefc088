//! The atomic zero-and-replace operation on a single edge.

use super::entry::MatrixPatch;
use crate::error::PatchError;
use crate::store::{NodeKind, NodeRef, NodeStore};
use tracing::debug;

/// Replaces the `previous_producer -> consumer` edge with an edge from
/// `new_producer`, zeroing the original.
///
/// All three nodes accept any [`NodeRef`] variant. When `amount` is omitted
/// it defaults to the sum of all existing `previous_producer -> consumer`
/// edge amounts, which conserves the consumed mass. When `patch` is supplied
/// the two entries are appended to it; otherwise a fresh patch is created.
///
/// This is the building block for the compiler but stands alone for ad-hoc
/// single-edge fixes; it performs no batching.
pub fn retarget_edge<S: NodeStore>(
    store: &S,
    consumer: NodeRef<'_>,
    previous_producer: NodeRef<'_>,
    new_producer: NodeRef<'_>,
    amount: Option<f64>,
    patch: Option<MatrixPatch>,
) -> Result<MatrixPatch, PatchError> {
    let consumer = store.resolve(consumer)?;
    let previous_producer = store.resolve(previous_producer)?;
    let new_producer = store.resolve(new_producer)?;

    if new_producer.kind != NodeKind::Process {
        return Err(PatchError::InvalidProducerKind {
            reference: format!("{} ('{}')", new_producer.id, new_producer.name),
        });
    }

    let existing: f64 = store
        .consuming_edges(consumer.id)
        .iter()
        .filter(|edge| edge.producer == previous_producer.id)
        .map(|edge| edge.amount)
        .sum();
    let any_edge = store
        .consuming_edges(consumer.id)
        .iter()
        .any(|edge| edge.producer == previous_producer.id);
    if !any_edge {
        return Err(PatchError::NoSuchEdge {
            producer: previous_producer.id,
            consumer: consumer.id,
        });
    }

    let amount = amount.unwrap_or(existing);
    debug!(
        previous = %previous_producer.id,
        new = %new_producer.id,
        consumer = %consumer.id,
        amount,
        "retargeting edge"
    );

    let mut patch = patch.unwrap_or_default();
    patch.zero_out(previous_producer.id, consumer.id);
    patch.insert(new_producer.id, consumer.id, amount);
    Ok(patch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryStore, NodeId, NodeRecord};

    fn node(id: i64, kind: NodeKind, code: &str) -> NodeRecord {
        NodeRecord {
            id: NodeId(id),
            kind,
            dataset: "fg".into(),
            code: code.into(),
            name: code.into(),
            reference_product: code.into(),
            location: "GLO".into(),
        }
    }

    fn store_with_double_edge() -> InMemoryStore {
        // Consumer 3 draws 5 + 7 from producer 1; producer 2 is the stand-in.
        let mut store = InMemoryStore::new();
        store.add_node(node(1, NodeKind::Process, "p")).unwrap();
        store.add_node(node(2, NodeKind::Process, "q")).unwrap();
        store.add_node(node(3, NodeKind::Process, "c")).unwrap();
        store.add_node(node(4, NodeKind::Product, "prod")).unwrap();
        store.add_edge(NodeId(1), NodeId(3), 5.0);
        store.add_edge(NodeId(1), NodeId(3), 7.0);
        store
    }

    #[test]
    fn test_default_amount_conserves_mass() {
        // Scenario: two edges totaling 12 collapse into one replacement of 12.
        let store = store_with_double_edge();
        let patch = retarget_edge(&store, 3.into(), 1.into(), 2.into(), None, None).unwrap();

        let entries = patch.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!((entries[0].row, entries[0].col), (NodeId(1), NodeId(3)));
        assert_eq!(entries[0].value, 0.0);
        assert!(entries[0].is_replacement);
        assert_eq!((entries[1].row, entries[1].col), (NodeId(2), NodeId(3)));
        assert_eq!(entries[1].value, 12.0);
        assert!(!entries[1].is_replacement);
    }

    #[test]
    fn test_explicit_amount_overrides_sum() {
        let store = store_with_double_edge();
        let patch =
            retarget_edge(&store, 3.into(), 1.into(), 2.into(), Some(4.5), None).unwrap();
        assert_eq!(patch.entries()[1].value, 4.5);
    }

    #[test]
    fn test_appends_to_existing_patch() {
        let store = store_with_double_edge();
        let mut patch = MatrixPatch::new();
        patch.insert(NodeId(9), NodeId(9), 1.0);
        let patch =
            retarget_edge(&store, 3.into(), 1.into(), 2.into(), None, Some(patch)).unwrap();
        assert_eq!(patch.len(), 3);
    }

    #[test]
    fn test_tuple_reference_resolution() {
        let store = store_with_double_edge();
        let patch = retarget_edge(
            &store,
            ("fg", "c").into(),
            ("fg", "p").into(),
            ("fg", "q").into(),
            None,
            None,
        )
        .unwrap();
        assert_eq!(patch.entries()[1].value, 12.0);
    }

    #[test]
    fn test_non_process_replacement_rejected() {
        let store = store_with_double_edge();
        let err = retarget_edge(&store, 3.into(), 1.into(), 4.into(), None, None).unwrap_err();
        assert!(matches!(err, PatchError::InvalidProducerKind { .. }));
    }

    #[test]
    fn test_missing_edge_rejected() {
        let store = store_with_double_edge();
        let err = retarget_edge(&store, 3.into(), 2.into(), 1.into(), None, None).unwrap_err();
        assert_eq!(
            err,
            PatchError::NoSuchEdge {
                producer: NodeId(2),
                consumer: NodeId(3)
            }
        );
    }

    #[test]
    fn test_unresolvable_node_rejected() {
        let store = store_with_double_edge();
        let err = retarget_edge(&store, 3.into(), 1.into(), 99.into(), None, None).unwrap_err();
        assert!(matches!(err, PatchError::NodeResolution { .. }));
    }
}
