#![deny(missing_docs)]
#![doc = include_str!("../docs/graph-api.md")]

//! Layered directed multigraph store and its randomized generator.

mod classify;
mod generator;
mod hash;
mod ids;
mod serialization;
mod store;
mod summary;

pub use classify::classify;
pub use generator::{GeneratorParams, LayeredGraphGenerator, GREEN_PROBABILITY, RED_PROBABILITY};
pub use hash::canonical_hash;
pub use store::{Edge, GraphStore, BASE_DEPTH};
pub use summary::GraphSummary;

/// Re-export serialization helpers for downstream crates.
pub use serialization::{graph_from_bytes, graph_from_json, graph_to_bytes, graph_to_json, graph_to_text};
