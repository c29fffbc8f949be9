use strata_core::{EdgeId, VertexId};

/// Converts a [`VertexId`] into its index within the vertex table.
pub(crate) fn vertex_index(id: VertexId) -> usize {
    id.as_raw() as usize
}

/// Converts an [`EdgeId`] into its index within the edge table.
pub(crate) fn edge_index(id: EdgeId) -> usize {
    id.as_raw() as usize
}

/// Creates a [`VertexId`] from an index.
pub(crate) fn make_vertex(index: usize) -> VertexId {
    VertexId::from_raw(index as u64)
}

/// Creates an [`EdgeId`] from an index.
pub(crate) fn make_edge(index: usize) -> EdgeId {
    EdgeId::from_raw(index as u64)
}
