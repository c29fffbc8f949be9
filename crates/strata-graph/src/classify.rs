//! Edge color rule.

use strata_core::{EdgeKind, ErrorInfo, StrataError, VertexId};

use crate::store::GraphStore;

/// Classifies a prospective edge `from -> to` against the current graph state.
///
/// Rules are evaluated in order:
///
/// 1. a self-loop is Green;
/// 2. an edge into a vertex without incident edges is Grey (the discovery edge);
/// 3. an edge one layer down between non-adjacent vertices is Yellow;
/// 4. an edge two layers down is Red.
///
/// Any other shape yields [`StrataError::UndeterminedColor`]. The generator
/// only requests the four shapes above, so that error always points at a
/// defect in the caller.
pub fn classify(graph: &GraphStore, from: VertexId, to: VertexId) -> Result<EdgeKind, StrataError> {
    if from == to {
        graph.depth_of(from)?;
        return Ok(EdgeKind::Green);
    }
    if graph.incident_edges(to)?.is_empty() {
        graph.depth_of(from)?;
        return Ok(EdgeKind::Grey);
    }
    let from_depth = i64::from(graph.depth_of(from)?);
    let to_depth = i64::from(graph.depth_of(to)?);
    let delta = to_depth - from_depth;
    if delta == 1 && !graph.is_adjacent(from, to)? {
        return Ok(EdgeKind::Yellow);
    }
    if delta == 2 {
        return Ok(EdgeKind::Red);
    }
    Err(StrataError::UndeterminedColor(
        ErrorInfo::new("undetermined-color", "edge shape matches no color rule")
            .with_context("from", from.as_raw())
            .with_context("to", to.as_raw())
            .with_context("from_depth", from_depth)
            .with_context("to_depth", to_depth)
            .with_hint("edges must be self-loops, discovery edges, or go one or two layers down"),
    ))
}
