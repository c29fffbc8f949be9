use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use clap::Args;
use serde::{Deserialize, Serialize};
use strata_core::{ErrorInfo, StrataError};
use strata_graph::GraphStore;
use strata_pool::{BatchConfig, GenerationController};
use tracing::{error, info, info_span};

use crate::output::{
    default_output_dir, prepare_output_dir, write_report, GraphRecord, GraphWriter, OutputFormat,
};

/// Flags of `strata generate`. Every flag overrides the matching config file value.
#[derive(Args, Debug, Clone, Default)]
pub struct GenerateArgs {
    /// YAML file with batch settings.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Number of layers per graph.
    #[arg(long, allow_negative_numbers = true)]
    pub max_depth: Option<i64>,
    /// Children attempted per vertex per layer.
    #[arg(long, allow_negative_numbers = true)]
    pub fan_out: Option<i64>,
    /// Number of graphs to generate.
    #[arg(long = "graphs", allow_negative_numbers = true)]
    pub graphs_count: Option<i64>,
    /// Number of worker threads.
    #[arg(long = "threads", allow_negative_numbers = true)]
    pub threads_count: Option<i64>,
    /// Master seed for a reproducible batch.
    #[arg(long)]
    pub seed: Option<u64>,
    /// Output directory, `<temp>/strata` by default.
    #[arg(long)]
    pub out: Option<PathBuf>,
    /// Files written per graph.
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,
}

/// Contents of a `--config` file. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenerateFile {
    /// Number of layers per graph.
    pub max_depth: Option<i64>,
    /// Children attempted per vertex per layer.
    pub fan_out: Option<i64>,
    /// Number of graphs to generate.
    pub graphs_count: Option<i64>,
    /// Number of worker threads.
    pub threads_count: Option<i64>,
    /// Master seed.
    pub seed: Option<u64>,
    /// Output directory.
    pub out: Option<PathBuf>,
    /// Files written per graph.
    pub format: Option<OutputFormat>,
}

impl GenerateFile {
    /// Loads a YAML config file. An empty file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, StrataError> {
        let raw = fs::read_to_string(path)
            .map_err(|err| StrataError::io("read-file", err).with_context("path", path.display()))?;
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&raw).map_err(|err| {
            StrataError::Serde(
                ErrorInfo::new("deserialize-yaml", err.to_string())
                    .with_context("path", path.display()),
            )
        })
    }
}

/// Settings after merging defaults, the config file and flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRun {
    /// Batch settings, not yet validated.
    pub batch: BatchConfig,
    /// Output directory.
    pub out: PathBuf,
    /// Files written per graph.
    pub format: OutputFormat,
}

/// Merges defaults, the optional config file and command line flags.
pub fn resolve(args: &GenerateArgs) -> Result<ResolvedRun, StrataError> {
    let file = match &args.config {
        Some(path) => GenerateFile::load(path)?,
        None => GenerateFile::default(),
    };
    let defaults = BatchConfig::default();
    let batch = BatchConfig {
        max_depth: args.max_depth.or(file.max_depth).unwrap_or(defaults.max_depth),
        fan_out: args.fan_out.or(file.fan_out).unwrap_or(defaults.fan_out),
        graphs_count: args
            .graphs_count
            .or(file.graphs_count)
            .unwrap_or(defaults.graphs_count),
        threads_count: args
            .threads_count
            .or(file.threads_count)
            .unwrap_or(defaults.threads_count),
        seed: args.seed.or(file.seed),
    };
    Ok(ResolvedRun {
        batch,
        out: args.out.clone().or(file.out).unwrap_or_else(default_output_dir),
        format: args.format.or(file.format).unwrap_or_default(),
    })
}

/// Contents of `batch_report.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Effective batch settings.
    pub config: BatchConfig,
    /// Files written per graph.
    pub format: OutputFormat,
    /// Number of graphs requested.
    pub requested: usize,
    /// Number of graphs written.
    pub completed: usize,
    /// One entry per graph, ordered by job index.
    pub graphs: Vec<GraphRecord>,
}

#[derive(Default)]
struct Sink {
    records: Vec<GraphRecord>,
    failure: Option<StrataError>,
}

/// Runs a batch and writes its graphs and report.
///
/// Returns the report together with the output directory it was written to.
pub fn run(args: &GenerateArgs) -> Result<(BatchSummary, PathBuf), StrataError> {
    let resolved = resolve(args)?;
    let config = resolved.batch.validate()?;
    prepare_output_dir(&resolved.out)?;

    let writer = GraphWriter::new(resolved.out.clone(), resolved.format);
    let sink = Arc::new(Mutex::new(Sink::default()));
    let span = info_span!(
        "generate",
        graphs = config.graphs_count,
        threads = config.threads_count,
        out = %resolved.out.display()
    );
    let mut controller = GenerationController::new(config)?.with_span(span);

    let finished_sink = Arc::clone(&sink);
    let report = controller.generate(
        |index| info!(index, "graph started"),
        move |index, graph: GraphStore| match writer.write(index, &graph) {
            Ok(record) => {
                info!(index, files = ?record.files, "graph written");
                lock(&finished_sink).records.push(record);
            }
            Err(err) => {
                error!(index, error = %err, "failed to write graph");
                lock(&finished_sink).failure.get_or_insert(err);
            }
        },
    )?;

    let Sink { mut records, failure } = std::mem::take(&mut *lock(&sink));
    if let Some(err) = failure {
        return Err(err);
    }
    records.sort_by_key(|record| record.index);
    let summary = BatchSummary {
        config: resolved.batch,
        format: resolved.format,
        requested: report.requested,
        completed: records.len(),
        graphs: records,
    };
    let path = write_report(&resolved.out, &summary)?;
    info!(report = %path.display(), "batch report written");
    Ok((summary, resolved.out))
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batch.yaml");
        fs::write(
            &path,
            "max_depth: 6\ngraphs_count: 9\nseed: 3\nformat: text\nout: /tmp/from-file\n",
        )
        .unwrap();
        let args = GenerateArgs {
            config: Some(path),
            graphs_count: Some(2),
            out: Some(dir.path().to_path_buf()),
            ..GenerateArgs::default()
        };

        let resolved = resolve(&args).unwrap();
        assert_eq!(resolved.batch.max_depth, 6);
        assert_eq!(resolved.batch.graphs_count, 2);
        assert_eq!(resolved.batch.fan_out, 3);
        assert_eq!(resolved.batch.seed, Some(3));
        assert_eq!(resolved.format, OutputFormat::Text);
        assert_eq!(resolved.out, dir.path());
    }

    #[test]
    fn defaults_apply_without_config() {
        let resolved = resolve(&GenerateArgs::default()).unwrap();
        assert_eq!(resolved.batch, BatchConfig::default());
        assert_eq!(resolved.format, OutputFormat::Json);
        assert_eq!(resolved.out, default_output_dir());
    }

    #[test]
    fn empty_config_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.yaml");
        fs::write(&path, "\n").unwrap();
        assert_eq!(GenerateFile::load(&path).unwrap(), GenerateFile::default());
    }

    #[test]
    fn malformed_config_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        fs::write(&path, "max_depth: [1, 2\n").unwrap();
        let err = GenerateFile::load(&path).unwrap_err();
        assert_eq!(err.code(), "deserialize-yaml");
    }

    #[test]
    fn misspelled_config_key_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("typo.yaml");
        fs::write(&path, "max_depth: 5\ngraphs: 5\n").unwrap();
        let err = GenerateFile::load(&path).unwrap_err();
        assert_eq!(err.code(), "deserialize-yaml");
        assert!(err.info().message.contains("graphs"));
    }

    #[test]
    fn missing_config_is_an_io_error() {
        let err = GenerateFile::load(Path::new("/definitely/not/here.yaml")).unwrap_err();
        assert!(matches!(err, StrataError::Io(_)));
    }
}
