use sha2::{Digest, Sha256};

use crate::store::GraphStore;

/// Computes the canonical structural hash for the provided graph.
///
/// The digest covers vertex depths and every edge in creation order, so two
/// stores built from the same sequence of operations hash identically.
pub fn canonical_hash(graph: &GraphStore) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"strata:v1");
    hasher.update((graph.vertex_count() as u64).to_le_bytes());
    for vertex in graph.vertices() {
        // Vertices are dense, so the lookup cannot miss.
        let depth = graph.depth_of(vertex).unwrap_or_default();
        hasher.update(depth.to_le_bytes());
    }
    hasher.update((graph.edge_count() as u64).to_le_bytes());
    for edge in graph.edges() {
        hasher.update(edge.from.as_raw().to_le_bytes());
        hasher.update(edge.to.as_raw().to_le_bytes());
        hasher.update(edge.color.as_str().as_bytes());
        hasher.update(b";");
    }
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_tracks_structure() {
        let mut left = GraphStore::new();
        let mut right = GraphStore::new();
        for graph in [&mut left, &mut right] {
            let root = graph.add_vertex();
            let child = graph.add_vertex();
            graph.add_edge(root, child).unwrap();
        }
        assert_eq!(canonical_hash(&left), canonical_hash(&right));

        let root = strata_core::VertexId::from_raw(0);
        right.add_edge(root, root).unwrap();
        assert_ne!(canonical_hash(&left), canonical_hash(&right));
        assert_eq!(canonical_hash(&left).len(), 64);
    }
}
