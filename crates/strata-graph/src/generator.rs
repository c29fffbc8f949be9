use strata_core::{Depth, DrawSource, StrataError, VertexId};
use tracing::debug;

use crate::store::GraphStore;

/// Probability that a vertex receives a self-loop.
pub const GREEN_PROBABILITY: f64 = 0.1;

/// Probability that a vertex receives a skip-layer shortcut.
pub const RED_PROBABILITY: f64 = 1.0 / 3.0;

/// Validated parameters of a layered generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorParams {
    /// Number of layers to grow; `0` produces an empty graph.
    pub max_depth: Depth,
    /// Children attempted per vertex per layer.
    pub fan_out: u32,
}

impl GeneratorParams {
    /// Creates parameters from already validated values.
    pub const fn new(max_depth: Depth, fan_out: u32) -> Self {
        Self { max_depth, fan_out }
    }

    /// Validates raw caller input, rejecting negative or oversized values.
    pub fn try_new(max_depth: i64, fan_out: i64) -> Result<Self, StrataError> {
        let max_depth = Depth::try_from(max_depth).map_err(|_| {
            StrataError::invalid_parameter(
                "max_depth",
                max_depth,
                "depth must be a non-negative 32-bit integer",
            )
        })?;
        let fan_out = u32::try_from(fan_out).map_err(|_| {
            StrataError::invalid_parameter(
                "fan_out",
                fan_out,
                "fan-out must be a non-negative 32-bit integer",
            )
        })?;
        Ok(Self::new(max_depth, fan_out))
    }

    /// Phase 1 success probability for vertices at `depth`.
    ///
    /// Decays linearly from `1` at the root layer to `0` at the last layer.
    pub fn grey_probability(&self, depth: Depth) -> f64 {
        if self.max_depth <= 1 || depth >= self.max_depth {
            return 0.0;
        }
        f64::from(self.max_depth - depth) / f64::from(self.max_depth - 1)
    }

    /// Phase 3 success probability for vertices at `depth`.
    ///
    /// Grows linearly from `0` at the root layer to `1` at the second to last layer.
    pub fn yellow_probability(&self, depth: Depth) -> f64 {
        if self.max_depth <= 2 || depth == 0 {
            return 0.0;
        }
        (f64::from(depth - 1) / f64::from(self.max_depth - 2)).clamp(0.0, 1.0)
    }
}

/// Four-phase randomized builder of layered graphs.
///
/// Each call to [`LayeredGraphGenerator::generate`] builds a fresh
/// [`GraphStore`]: a root vertex, Grey layer growth, Green self-loops,
/// Yellow shortcuts to the next layer and Red shortcuts two layers down.
/// All decisions are drawn from the supplied [`DrawSource`].
#[derive(Debug)]
pub struct LayeredGraphGenerator<D> {
    params: GeneratorParams,
    draws: D,
}

impl<D: DrawSource> LayeredGraphGenerator<D> {
    /// Creates a generator drawing its decisions from `draws`.
    pub fn new(params: GeneratorParams, draws: D) -> Self {
        Self { params, draws }
    }

    /// Returns the generator parameters.
    pub fn params(&self) -> GeneratorParams {
        self.params
    }

    /// Consumes the generator, returning its draw source.
    pub fn into_draws(self) -> D {
        self.draws
    }

    /// Builds a new graph.
    ///
    /// Work is bounded by the layers actually grown, not by `max_depth`.
    /// Errors only surface when a phase requests an edge the classifier
    /// cannot color, in which case the partial graph is discarded.
    pub fn generate(&mut self) -> Result<GraphStore, StrataError> {
        let mut graph = GraphStore::new();
        if self.params.max_depth == 0 {
            return Ok(graph);
        }
        graph.add_vertex();

        let grey = self.grow_layers(&mut graph)?;
        let green = self.add_self_loops(&mut graph)?;
        let yellow = self.add_adjacent_shortcuts(&mut graph)?;
        let red = self.add_skip_shortcuts(&mut graph)?;
        debug!(
            max_depth = self.params.max_depth,
            fan_out = self.params.fan_out,
            vertices = graph.vertex_count(),
            grey,
            green,
            yellow,
            red,
            "generated layered graph"
        );
        Ok(graph)
    }

    fn grow_layers(&mut self, graph: &mut GraphStore) -> Result<usize, StrataError> {
        let mut added = 0;
        for depth in 1..self.params.max_depth {
            let probability = self.params.grey_probability(depth);
            if probability <= 0.0 {
                continue;
            }
            let layer = graph.vertices_at_depth(depth);
            // Layer d+1 only grows from layer d.
            if layer.is_empty() {
                break;
            }
            for parent in layer {
                for _ in 0..self.params.fan_out {
                    if self.draws.bernoulli(probability) {
                        let child = graph.add_vertex();
                        graph.add_edge(parent, child)?;
                        added += 1;
                    }
                }
            }
        }
        Ok(added)
    }

    fn add_self_loops(&mut self, graph: &mut GraphStore) -> Result<usize, StrataError> {
        let mut added = 0;
        let vertices: Vec<VertexId> = graph.vertices().collect();
        for vertex in vertices {
            if self.draws.bernoulli(GREEN_PROBABILITY) {
                graph.add_edge(vertex, vertex)?;
                added += 1;
            }
        }
        Ok(added)
    }

    fn add_adjacent_shortcuts(&mut self, graph: &mut GraphStore) -> Result<usize, StrataError> {
        let mut added = 0;
        for depth in 1..graph.max_depth() {
            let probability = self.params.yellow_probability(depth);
            if probability <= 0.0 {
                continue;
            }
            let layer = graph.vertices_at_depth(depth);
            let next = graph.vertices_at_depth(depth + 1);
            if next.is_empty() {
                continue;
            }
            for vertex in layer {
                if !self.draws.bernoulli(probability) {
                    continue;
                }
                let mut candidates = Vec::with_capacity(next.len());
                for candidate in &next {
                    if !graph.is_adjacent(vertex, *candidate)? {
                        candidates.push(*candidate);
                    }
                }
                if candidates.is_empty() {
                    continue;
                }
                let target = candidates[self.draws.pick(candidates.len())];
                graph.add_edge(vertex, target)?;
                added += 1;
            }
        }
        Ok(added)
    }

    fn add_skip_shortcuts(&mut self, graph: &mut GraphStore) -> Result<usize, StrataError> {
        let mut added = 0;
        for depth in 1..graph.max_depth().saturating_sub(1) {
            let layer = graph.vertices_at_depth(depth);
            let targets: Vec<VertexId> = graph.vertices_at_depth(depth + 2).into_iter().collect();
            if targets.is_empty() {
                continue;
            }
            for vertex in layer {
                if self.draws.bernoulli(RED_PROBABILITY) {
                    let target = targets[self.draws.pick(targets.len())];
                    graph.add_edge(vertex, target)?;
                    added += 1;
                }
            }
        }
        Ok(added)
    }
}
