#![deny(missing_docs)]
#![doc = "Core identifiers, edge kinds, errors and randomness sources shared by the strata crates."]

use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub mod draws;
pub mod errors;
pub mod rng;

pub use draws::{DrawSource, ScriptedDraws};
pub use errors::{ErrorInfo, StrataError};
pub use rng::{derive_substream_seed, RngHandle};

/// Layer index of a vertex. The root layer is `1`; `0` only describes an empty graph.
pub type Depth = u32;

/// Identifier for a vertex within a graph store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VertexId(u64);

impl VertexId {
    /// Creates a new identifier from its raw integer representation.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw integer representation of the identifier.
    pub const fn as_raw(&self) -> u64 {
        self.0
    }
}

impl Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Identifier for an edge within a graph store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(u64);

impl EdgeId {
    /// Creates a new identifier from its raw integer representation.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw integer representation of the identifier.
    pub const fn as_raw(&self) -> u64 {
        self.0
    }
}

impl Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// Structural classification of an edge, fixed when the edge is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    /// Discovery edge that introduces a vertex and fixes its depth.
    Grey,
    /// Self-loop.
    Green,
    /// Shortcut between non-adjacent vertices one layer apart.
    Yellow,
    /// Shortcut between vertices two layers apart.
    Red,
}

impl EdgeKind {
    /// Every kind in canonical order.
    pub const ALL: [EdgeKind; 4] = [
        EdgeKind::Grey,
        EdgeKind::Green,
        EdgeKind::Yellow,
        EdgeKind::Red,
    ];

    /// Returns the lowercase name used in serialized payloads.
    pub const fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Grey => "grey",
            EdgeKind::Green => "green",
            EdgeKind::Yellow => "yellow",
            EdgeKind::Red => "red",
        }
    }
}

impl Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EdgeKind {
    type Err = StrataError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "grey" | "gray" => Ok(EdgeKind::Grey),
            "green" => Ok(EdgeKind::Green),
            "yellow" => Ok(EdgeKind::Yellow),
            "red" => Ok(EdgeKind::Red),
            other => Err(StrataError::Serde(
                ErrorInfo::new("unknown-color", "unrecognised edge color")
                    .with_context("color", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_kind_names_round_trip() {
        for kind in EdgeKind::ALL {
            assert_eq!(kind.as_str().parse::<EdgeKind>().unwrap(), kind);
        }
        assert_eq!("Gray".parse::<EdgeKind>().unwrap(), EdgeKind::Grey);
        assert!("purple".parse::<EdgeKind>().is_err());
    }

    #[test]
    fn ids_display_with_prefix() {
        assert_eq!(VertexId::from_raw(3).to_string(), "v3");
        assert_eq!(EdgeId::from_raw(7).to_string(), "e7");
    }
}
