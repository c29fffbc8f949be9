use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use strata_core::{Depth, EdgeId, EdgeKind, ErrorInfo, StrataError, VertexId};

use crate::classify::classify;
use crate::ids::{edge_index, make_edge, make_vertex, vertex_index};

/// Depth assigned to every freshly created vertex.
pub const BASE_DEPTH: Depth = 1;

/// Immutable description of a stored edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// Identifier of the edge.
    pub id: EdgeId,
    /// Source endpoint.
    pub from: VertexId,
    /// Destination endpoint.
    pub to: VertexId,
    /// Classification fixed at creation time.
    pub color: EdgeKind,
}

impl Edge {
    /// Returns whether the edge is a self-loop.
    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }
}

#[derive(Debug, Clone)]
struct VertexRecord {
    depth: Depth,
    incident: Vec<EdgeId>,
}

/// Layered directed multigraph with depth, adjacency and color indices.
///
/// The store only grows: vertices and edges receive dense, strictly
/// increasing identifiers and are never removed. Every [`GraphStore::add_edge`]
/// classifies the new edge against the current state and, for Grey edges,
/// moves the destination into the layer below its source.
#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    vertices: Vec<VertexRecord>,
    edges: Vec<Edge>,
    layers: BTreeMap<Depth, BTreeSet<VertexId>>,
    colors: BTreeMap<EdgeKind, Vec<EdgeId>>,
}

impl GraphStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an isolated vertex at [`BASE_DEPTH`].
    pub fn add_vertex(&mut self) -> VertexId {
        let id = make_vertex(self.vertices.len());
        self.vertices.push(VertexRecord {
            depth: BASE_DEPTH,
            incident: Vec::new(),
        });
        self.layers.entry(BASE_DEPTH).or_default().insert(id);
        id
    }

    /// Adds an edge, classifying it against the current graph state.
    ///
    /// A Grey edge also places `to` one layer below `from`. Nothing is
    /// mutated when classification fails.
    pub fn add_edge(&mut self, from: VertexId, to: VertexId) -> Result<EdgeId, StrataError> {
        self.vertex(from)?;
        self.vertex(to)?;
        let color = classify(self, from, to)?;
        if color == EdgeKind::Grey {
            let depth = self.depth_of(from)? + 1;
            self.move_to_layer(to, depth)?;
        }

        let id = make_edge(self.edges.len());
        self.edges.push(Edge {
            id,
            from,
            to,
            color,
        });
        self.vertex_mut(from)?.incident.push(id);
        if from != to {
            self.vertex_mut(to)?.incident.push(id);
        }
        self.colors.entry(color).or_default().push(id);
        Ok(id)
    }

    /// Returns the depth of the vertex.
    pub fn depth_of(&self, vertex: VertexId) -> Result<Depth, StrataError> {
        Ok(self.vertex(vertex)?.depth)
    }

    /// Returns the vertices currently at `depth`, empty when the layer does not exist.
    pub fn vertices_at_depth(&self, depth: Depth) -> BTreeSet<VertexId> {
        self.layers.get(&depth).cloned().unwrap_or_default()
    }

    /// Number of vertices currently at `depth`.
    pub fn layer_len(&self, depth: Depth) -> usize {
        self.layers.get(&depth).map_or(0, BTreeSet::len)
    }

    /// Returns the edges of the given color in creation order.
    pub fn edges_of_color(&self, kind: EdgeKind) -> &[EdgeId] {
        self.colors.get(&kind).map_or(&[], Vec::as_slice)
    }

    /// Returns the edges touching the vertex in creation order.
    pub fn incident_edges(&self, vertex: VertexId) -> Result<&[EdgeId], StrataError> {
        Ok(&self.vertex(vertex)?.incident)
    }

    /// Deepest populated layer, `0` for an empty graph.
    pub fn max_depth(&self) -> Depth {
        self.layers.keys().next_back().copied().unwrap_or(0)
    }

    /// Returns whether some edge connects `a` and `b` in either direction.
    pub fn is_adjacent(&self, a: VertexId, b: VertexId) -> Result<bool, StrataError> {
        let left = &self.vertex(a)?.incident;
        let right = &self.vertex(b)?.incident;
        let shorter = if left.len() <= right.len() { left } else { right };
        for edge_id in shorter {
            let edge = self.edge(*edge_id)?;
            if (edge.from == a && edge.to == b) || (edge.from == b && edge.to == a) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Returns the edge record.
    pub fn edge(&self, id: EdgeId) -> Result<Edge, StrataError> {
        self.edges.get(edge_index(id)).copied().ok_or_else(|| {
            StrataError::Invariant(
                ErrorInfo::new("unknown-edge", "edge does not exist").with_context("edge", id),
            )
        })
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns whether the store holds no vertex.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Iterates over vertex identifiers in creation order.
    pub fn vertices(&self) -> impl ExactSizeIterator<Item = VertexId> + '_ {
        (0..self.vertices.len()).map(make_vertex)
    }

    /// Iterates over edges in creation order.
    pub fn edges(&self) -> impl ExactSizeIterator<Item = &Edge> + '_ {
        self.edges.iter()
    }

    /// Depth buckets keyed by layer.
    pub fn layers(&self) -> &BTreeMap<Depth, BTreeSet<VertexId>> {
        &self.layers
    }

    /// Verifies the structural invariants of the store.
    ///
    /// Checks that layers partition the vertex set, that adjacency lists and
    /// the color index agree with the edge list, and that every edge color
    /// matches the depth difference of its endpoints.
    pub fn check_invariants(&self) -> Result<(), StrataError> {
        let mut seen = BTreeSet::new();
        for (depth, bucket) in &self.layers {
            if bucket.is_empty() {
                return Err(invariant("empty-layer", "empty layer kept in the depth index")
                    .with_context("depth", depth));
            }
            for vertex in bucket {
                if self.depth_of(*vertex)? != *depth {
                    return Err(invariant("layer-mismatch", "vertex filed under the wrong layer")
                        .with_context("vertex", vertex)
                        .with_context("depth", depth));
                }
                if !seen.insert(*vertex) {
                    return Err(invariant("duplicate-layer", "vertex present in two layers")
                        .with_context("vertex", vertex));
                }
            }
        }
        if seen.len() != self.vertices.len() {
            return Err(invariant("partition", "layers do not cover every vertex")
                .with_context("covered", seen.len())
                .with_context("vertices", self.vertices.len()));
        }

        let mut expected: Vec<Vec<EdgeId>> = vec![Vec::new(); self.vertices.len()];
        let mut colors: BTreeMap<EdgeKind, Vec<EdgeId>> = BTreeMap::new();
        for (index, edge) in self.edges.iter().enumerate() {
            if edge_index(edge.id) != index {
                return Err(invariant("edge-id", "edge identifiers are not dense")
                    .with_context("edge", edge.id));
            }
            let from = self.depth_of(edge.from)?;
            let to = self.depth_of(edge.to)?;
            let consistent = match edge.color {
                EdgeKind::Green => edge.is_self_loop(),
                EdgeKind::Grey | EdgeKind::Yellow => !edge.is_self_loop() && to == from + 1,
                EdgeKind::Red => to == from + 2,
            };
            if !consistent {
                return Err(invariant("color-depth", "edge color disagrees with endpoint depths")
                    .with_context("edge", edge.id)
                    .with_context("color", edge.color)
                    .with_context("from_depth", from)
                    .with_context("to_depth", to));
            }
            expected[vertex_index(edge.from)].push(edge.id);
            if !edge.is_self_loop() {
                expected[vertex_index(edge.to)].push(edge.id);
            }
            colors.entry(edge.color).or_default().push(edge.id);
        }
        for (index, record) in self.vertices.iter().enumerate() {
            if record.incident != expected[index] {
                return Err(invariant("adjacency", "adjacency list disagrees with edge list")
                    .with_context("vertex", make_vertex(index)));
            }
        }
        if colors != self.colors {
            return Err(invariant("color-index", "color index disagrees with edge list"));
        }
        Ok(())
    }

    fn move_to_layer(&mut self, vertex: VertexId, depth: Depth) -> Result<(), StrataError> {
        let previous = self.depth_of(vertex)?;
        if previous == depth {
            return Ok(());
        }
        if let Some(bucket) = self.layers.get_mut(&previous) {
            bucket.remove(&vertex);
            if bucket.is_empty() {
                self.layers.remove(&previous);
            }
        }
        self.layers.entry(depth).or_default().insert(vertex);
        self.vertex_mut(vertex)?.depth = depth;
        Ok(())
    }

    fn vertex(&self, id: VertexId) -> Result<&VertexRecord, StrataError> {
        self.vertices
            .get(vertex_index(id))
            .ok_or_else(|| unknown_vertex(id))
    }

    fn vertex_mut(&mut self, id: VertexId) -> Result<&mut VertexRecord, StrataError> {
        self.vertices
            .get_mut(vertex_index(id))
            .ok_or_else(|| unknown_vertex(id))
    }
}

fn unknown_vertex(id: VertexId) -> StrataError {
    StrataError::UnknownVertex(
        ErrorInfo::new("unknown-vertex", "vertex does not exist").with_context("vertex", id.as_raw()),
    )
}

fn invariant(check: &str, message: &str) -> StrataError {
    StrataError::Invariant(ErrorInfo::new("invariant-violated", message).with_context("check", check))
}
