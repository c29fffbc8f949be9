use std::fs;
use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use strata_core::{ErrorInfo, StrataError};
use strata_graph::{canonical_hash, graph_from_json, graph_to_text, GraphSummary};

/// Flags of `strata inspect`.
#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    /// Graph JSON file written by `strata generate`.
    pub path: PathBuf,
    /// Print the layer by layer text dump instead of the JSON summary.
    #[arg(long)]
    pub text: bool,
}

#[derive(Debug, Serialize)]
struct Inspection<'a> {
    path: &'a str,
    hash: String,
    summary: GraphSummary,
}

/// Decodes the graph file and renders it for stdout.
pub fn run(args: &InspectArgs) -> Result<String, StrataError> {
    let raw = fs::read_to_string(&args.path).map_err(|err| {
        StrataError::io("read-file", err).with_context("path", args.path.display())
    })?;
    let graph = graph_from_json(&raw).map_err(|err| err.with_context("path", args.path.display()))?;
    if args.text {
        return Ok(graph_to_text(&graph));
    }
    let path = args.path.display().to_string();
    let inspection = Inspection {
        path: &path,
        hash: canonical_hash(&graph),
        summary: graph.summary(),
    };
    serde_json::to_string_pretty(&inspection)
        .map_err(|err| StrataError::Serde(ErrorInfo::new("serialize-json", err.to_string())))
}
