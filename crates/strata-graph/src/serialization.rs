use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use strata_core::{Depth, EdgeId, EdgeKind, ErrorInfo, StrataError, VertexId};

use crate::store::GraphStore;

/// Serializes the graph to a compact binary representation using `bincode`.
pub fn graph_to_bytes(graph: &GraphStore) -> Result<Vec<u8>, StrataError> {
    let serializable = SerializableGraph::from_graph(graph)?;
    bincode::serialize(&serializable)
        .map_err(|err| StrataError::Serde(ErrorInfo::new("serialize-bytes", err.to_string())))
}

/// Restores a graph from its binary representation.
pub fn graph_from_bytes(bytes: &[u8]) -> Result<GraphStore, StrataError> {
    let serializable: SerializableGraph = bincode::deserialize(bytes)
        .map_err(|err| StrataError::Serde(ErrorInfo::new("deserialize-bytes", err.to_string())))?;
    serializable.into_graph()
}

/// Serializes the graph to a pretty-printed JSON string.
///
/// The payload has the shape
/// `{"depth", "vertices": [{"id", "edge_ids", "depth"}], "edges": [{"id", "vertex_ids", "color"}]}`
/// where `vertex_ids` lists the source then the destination.
pub fn graph_to_json(graph: &GraphStore) -> Result<String, StrataError> {
    let serializable = SerializableGraph::from_graph(graph)?;
    serde_json::to_string_pretty(&serializable)
        .map_err(|err| StrataError::Serde(ErrorInfo::new("serialize-json", err.to_string())))
}

/// Restores a graph from a JSON string.
///
/// The store is rebuilt by replaying every edge in identifier order, so a
/// payload whose recorded colors, depths or edge lists cannot be reproduced
/// is rejected.
pub fn graph_from_json(json: &str) -> Result<GraphStore, StrataError> {
    let serializable: SerializableGraph = serde_json::from_str(json)
        .map_err(|err| StrataError::Serde(ErrorInfo::new("deserialize-json", err.to_string())))?;
    serializable.into_graph()
}

/// Renders a human readable dump of the graph, layer by layer.
pub fn graph_to_text(graph: &GraphStore) -> String {
    let mut out = String::new();
    let summary = graph.summary();
    let _ = writeln!(out, "depth: {}", summary.max_depth);
    let _ = writeln!(out, "vertices: {}", summary.vertices);
    for (depth, bucket) in graph.layers() {
        let _ = writeln!(out, "  layer {depth}:");
        for vertex in bucket {
            let incident = graph
                .incident_edges(*vertex)
                .map(|edges| join(edges.iter()))
                .unwrap_or_default();
            let _ = writeln!(out, "    {vertex} edges=[{incident}]");
        }
    }
    let _ = writeln!(out, "edges: {}", summary.edges);
    for edge in graph.edges() {
        let _ = writeln!(out, "  {} {} -> {} {}", edge.id, edge.from, edge.to, edge.color);
    }
    let colors = summary
        .colors
        .iter()
        .map(|(kind, count)| format!("{kind}={count}"))
        .collect::<Vec<_>>()
        .join(" ");
    let _ = writeln!(out, "colors: {colors}");
    out
}

fn join<T: std::fmt::Display>(items: impl Iterator<Item = T>) -> String {
    items.map(|item| item.to_string()).collect::<Vec<_>>().join(", ")
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializableGraph {
    depth: Depth,
    vertices: Vec<SerializableVertex>,
    edges: Vec<SerializableEdge>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializableVertex {
    id: u64,
    edge_ids: Vec<u64>,
    depth: Depth,
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializableEdge {
    id: u64,
    vertex_ids: [u64; 2],
    color: EdgeKind,
}

impl SerializableGraph {
    fn from_graph(graph: &GraphStore) -> Result<Self, StrataError> {
        let vertices = graph
            .vertices()
            .map(|vertex| {
                Ok(SerializableVertex {
                    id: vertex.as_raw(),
                    edge_ids: graph
                        .incident_edges(vertex)?
                        .iter()
                        .map(EdgeId::as_raw)
                        .collect(),
                    depth: graph.depth_of(vertex)?,
                })
            })
            .collect::<Result<Vec<_>, StrataError>>()?;
        let edges = graph
            .edges()
            .map(|edge| SerializableEdge {
                id: edge.id.as_raw(),
                vertex_ids: [edge.from.as_raw(), edge.to.as_raw()],
                color: edge.color,
            })
            .collect();
        Ok(Self {
            depth: graph.max_depth(),
            vertices,
            edges,
        })
    }

    fn into_graph(self) -> Result<GraphStore, StrataError> {
        let mut graph = GraphStore::new();
        for (index, vertex) in self.vertices.iter().enumerate() {
            if vertex.id != index as u64 {
                return Err(decode_error("vertex identifiers must be dense and ordered")
                    .with_context("expected", index)
                    .with_context("found", vertex.id));
            }
            graph.add_vertex();
        }
        for (index, edge) in self.edges.iter().enumerate() {
            if edge.id != index as u64 {
                return Err(decode_error("edge identifiers must be dense and ordered")
                    .with_context("expected", index)
                    .with_context("found", edge.id));
            }
            let [from, to] = edge.vertex_ids;
            let id = graph
                .add_edge(VertexId::from_raw(from), VertexId::from_raw(to))
                .map_err(|err| err.with_context("edge", edge.id))?;
            let replayed = graph.edge(id)?.color;
            if replayed != edge.color {
                return Err(StrataError::Serde(
                    ErrorInfo::new("color-mismatch", "recorded color differs from replayed color")
                        .with_context("edge", edge.id)
                        .with_context("recorded", edge.color)
                        .with_context("replayed", replayed),
                ));
            }
        }
        for vertex in &self.vertices {
            let id = VertexId::from_raw(vertex.id);
            let depth = graph.depth_of(id)?;
            if depth != vertex.depth {
                return Err(decode_error("recorded depth differs from replayed depth")
                    .with_context("vertex", vertex.id)
                    .with_context("recorded", vertex.depth)
                    .with_context("replayed", depth));
            }
            let incident = graph.incident_edges(id)?;
            let recorded = vertex.edge_ids.iter().copied().map(EdgeId::from_raw);
            if !recorded.eq(incident.iter().copied()) {
                return Err(decode_error("recorded edge list differs from replayed adjacency")
                    .with_context("vertex", vertex.id)
                    .with_context("recorded", format!("{:?}", vertex.edge_ids))
                    .with_context("replayed", join(incident.iter())));
            }
        }
        if graph.max_depth() != self.depth {
            return Err(decode_error("recorded graph depth differs from replayed depth")
                .with_context("recorded", self.depth)
                .with_context("replayed", graph.max_depth()));
        }
        Ok(graph)
    }
}

fn decode_error(message: &str) -> StrataError {
    StrataError::Invariant(ErrorInfo::new("invariant-violated", message))
}
