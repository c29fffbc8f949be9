use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strata_core::{Depth, EdgeKind};

use crate::store::GraphStore;

/// Aggregate counts describing a generated graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSummary {
    /// Number of vertices.
    pub vertices: usize,
    /// Number of edges.
    pub edges: usize,
    /// Deepest populated layer.
    pub max_depth: Depth,
    /// Edge counts per color; every color is present, possibly with zero.
    pub colors: BTreeMap<EdgeKind, usize>,
    /// Vertex counts per populated layer.
    pub layers: BTreeMap<Depth, usize>,
}

impl GraphStore {
    /// Computes the [`GraphSummary`] of the store.
    pub fn summary(&self) -> GraphSummary {
        GraphSummary {
            vertices: self.vertex_count(),
            edges: self.edge_count(),
            max_depth: self.max_depth(),
            colors: EdgeKind::ALL
                .iter()
                .map(|kind| (*kind, self.edges_of_color(*kind).len()))
                .collect(),
            layers: self
                .layers()
                .iter()
                .map(|(depth, bucket)| (*depth, bucket.len()))
                .collect(),
        }
    }
}
