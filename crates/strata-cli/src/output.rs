use std::fs;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strata_core::{ErrorInfo, StrataError};
use strata_graph::{canonical_hash, graph_to_json, graph_to_text, GraphStore, GraphSummary};
use tracing::debug;

/// Name of the report written after every batch.
pub const REPORT_FILE: &str = "batch_report.json";

/// File formats emitted for each generated graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `graph_<index>.json` only.
    #[default]
    Json,
    /// `graph_<index>.txt` only.
    Text,
    /// Both files.
    Both,
}

impl OutputFormat {
    fn writes_json(self) -> bool {
        matches!(self, OutputFormat::Json | OutputFormat::Both)
    }

    fn writes_text(self) -> bool {
        matches!(self, OutputFormat::Text | OutputFormat::Both)
    }
}

/// Per-graph entry of the batch report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphRecord {
    /// Job index that produced the graph.
    pub index: usize,
    /// File names written for the graph, relative to the output directory.
    pub files: Vec<String>,
    /// Hex encoded canonical hash.
    pub hash: String,
    /// Aggregate counts.
    pub summary: GraphSummary,
}

/// Default output directory, `<temp>/strata`.
pub fn default_output_dir() -> PathBuf {
    std::env::temp_dir().join("strata")
}

/// Creates `dir` if needed and removes graph files and reports left by a
/// previous batch. Other files are left untouched.
pub fn prepare_output_dir(dir: &Path) -> Result<(), StrataError> {
    fs::create_dir_all(dir)
        .map_err(|err| StrataError::io("create-dir", err).with_context("path", dir.display()))?;
    let entries = fs::read_dir(dir)
        .map_err(|err| StrataError::io("read-dir", err).with_context("path", dir.display()))?;
    for entry in entries {
        let entry = entry.map_err(|err| StrataError::io("read-dir", err))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if is_batch_artifact(name) {
            let path = entry.path();
            fs::remove_file(&path).map_err(|err| {
                StrataError::io("remove-file", err).with_context("path", path.display())
            })?;
            debug!(file = name, "removed stale output");
        }
    }
    Ok(())
}

fn is_batch_artifact(name: &str) -> bool {
    if name == REPORT_FILE {
        return true;
    }
    let Some(stem) = name.strip_prefix("graph_") else {
        return false;
    };
    let Some(index) = stem
        .strip_suffix(".json")
        .or_else(|| stem.strip_suffix(".txt"))
    else {
        return false;
    };
    !index.is_empty() && index.bytes().all(|byte| byte.is_ascii_digit())
}

/// Writes generated graphs into a directory in the configured formats.
#[derive(Debug, Clone)]
pub struct GraphWriter {
    dir: PathBuf,
    format: OutputFormat,
}

impl GraphWriter {
    /// Creates a writer targeting an already prepared directory.
    pub fn new(dir: impl Into<PathBuf>, format: OutputFormat) -> Self {
        Self {
            dir: dir.into(),
            format,
        }
    }

    /// Target directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes the files for job `index` and returns its report entry.
    pub fn write(&self, index: usize, graph: &GraphStore) -> Result<GraphRecord, StrataError> {
        let mut files = Vec::new();
        if self.format.writes_json() {
            let name = format!("graph_{index}.json");
            self.write_file(&name, graph_to_json(graph)?)?;
            files.push(name);
        }
        if self.format.writes_text() {
            let name = format!("graph_{index}.txt");
            self.write_file(&name, graph_to_text(graph))?;
            files.push(name);
        }
        Ok(GraphRecord {
            index,
            files,
            hash: canonical_hash(graph),
            summary: graph.summary(),
        })
    }

    fn write_file(&self, name: &str, contents: String) -> Result<(), StrataError> {
        let path = self.dir.join(name);
        fs::write(&path, contents)
            .map_err(|err| StrataError::io("write-file", err).with_context("path", path.display()))
    }
}

/// Writes `report` as pretty JSON to [`REPORT_FILE`] inside `dir`.
pub fn write_report<T: Serialize>(dir: &Path, report: &T) -> Result<PathBuf, StrataError> {
    let json = serde_json::to_string_pretty(report).map_err(|err| {
        StrataError::Serde(ErrorInfo::new("serialize-json", err.to_string()))
    })?;
    let path = dir.join(REPORT_FILE);
    fs::write(&path, json)
        .map_err(|err| StrataError::io("write-file", err).with_context("path", path.display()))?;
    Ok(path)
}
