#![deny(missing_docs)]

//! Library side of the `strata` command line tool.
//!
//! Commands are exposed as plain functions so they can be driven from tests
//! without spawning the binary.

/// Subcommand implementations.
pub mod commands;
/// Global tracing subscriber installation.
pub mod logging;
/// Output directory preparation and graph file writers.
pub mod output;
