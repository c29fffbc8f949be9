use serde::{Deserialize, Serialize};
use strata_core::StrataError;
use strata_graph::GeneratorParams;

/// YAML-configurable description of a generation batch.
///
/// Values are kept signed so that negative input reaches
/// [`BatchConfig::validate`] and is reported as an invalid parameter
/// rather than as a parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Number of layers per graph.
    #[serde(default = "default_max_depth")]
    pub max_depth: i64,
    /// Children attempted per vertex per layer.
    #[serde(default = "default_fan_out")]
    pub fan_out: i64,
    /// Number of graphs to generate.
    #[serde(default = "default_graphs_count")]
    pub graphs_count: i64,
    /// Number of worker threads.
    #[serde(default = "default_threads_count")]
    pub threads_count: i64,
    /// Master seed; each job derives its own substream. Entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_max_depth() -> i64 {
    4
}

fn default_fan_out() -> i64 {
    3
}

fn default_graphs_count() -> i64 {
    1
}

fn default_threads_count() -> i64 {
    1
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            fan_out: default_fan_out(),
            graphs_count: default_graphs_count(),
            threads_count: default_threads_count(),
            seed: None,
        }
    }
}

impl BatchConfig {
    /// Rejects negative counts and non-positive thread counts.
    pub fn validate(&self) -> Result<ControllerConfig, StrataError> {
        let params = GeneratorParams::try_new(self.max_depth, self.fan_out)?;
        let graphs_count = usize::try_from(self.graphs_count).map_err(|_| {
            StrataError::invalid_parameter(
                "graphs_count",
                self.graphs_count,
                "graph count must be non-negative",
            )
        })?;
        let threads_count = usize::try_from(self.threads_count).map_err(|_| {
            StrataError::invalid_parameter(
                "threads_count",
                self.threads_count,
                "thread count must be positive",
            )
        })?;
        let config = ControllerConfig::new(params, graphs_count, threads_count)?;
        Ok(match self.seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        })
    }
}

/// Validated configuration consumed by [`GenerationController`](crate::GenerationController).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Parameters handed to every generator.
    pub params: GeneratorParams,
    /// Number of graphs to generate.
    pub graphs_count: usize,
    /// Number of worker threads, at least one.
    pub threads_count: usize,
    /// Master seed for reproducible batches.
    pub seed: Option<u64>,
}

impl ControllerConfig {
    /// Creates an unseeded configuration, rejecting a zero thread count.
    pub fn new(
        params: GeneratorParams,
        graphs_count: usize,
        threads_count: usize,
    ) -> Result<Self, StrataError> {
        if threads_count == 0 {
            return Err(StrataError::invalid_parameter(
                "threads_count",
                threads_count,
                "thread count must be positive",
            ));
        }
        Ok(Self {
            params,
            graphs_count,
            threads_count,
            seed: None,
        })
    }

    /// Seeds every job from a substream of `seed`.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let config = BatchConfig::default().validate().unwrap();
        assert_eq!(config.params, GeneratorParams::new(4, 3));
        assert_eq!(config.graphs_count, 1);
        assert_eq!(config.threads_count, 1);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn yaml_fills_missing_fields() {
        let config: BatchConfig = serde_yaml::from_str("graphs_count: 5\nseed: 11\n").unwrap();
        assert_eq!(config.graphs_count, 5);
        assert_eq!(config.max_depth, 4);
        let validated = config.validate().unwrap();
        assert_eq!(validated.seed, Some(11));
    }

    #[test]
    fn negative_and_zero_values_are_rejected() {
        let cases = [
            (BatchConfig { max_depth: -1, ..BatchConfig::default() }, "max_depth"),
            (BatchConfig { fan_out: -2, ..BatchConfig::default() }, "fan_out"),
            (BatchConfig { graphs_count: -3, ..BatchConfig::default() }, "graphs_count"),
            (BatchConfig { threads_count: 0, ..BatchConfig::default() }, "threads_count"),
            (BatchConfig { threads_count: -4, ..BatchConfig::default() }, "threads_count"),
        ];
        for (config, field) in cases {
            let err = config.validate().unwrap_err();
            assert!(matches!(err, StrataError::InvalidParameter(_)));
            assert_eq!(err.info().context.get("field").map(String::as_str), Some(field));
        }
    }
}
