//! Runtime configuration
//!
//! Loaded from an optional YAML file. Every field has a default, so an empty
//! file (or no file at all) yields the stock pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportLensConfig {
    pub limits: Limits,
    pub worker: WorkerConfig,
    pub logging: LoggingConfig,
    pub output: OutputConfig,
}

/// Noise caps applied by the extraction stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub max_metrics: usize,
    pub max_footnotes: usize,
    pub max_domains: usize,
    /// Characters of text kept on each side of a metric match.
    pub context_window: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_metrics: 50,
            max_footnotes: 50,
            max_domains: 3,
            context_window: 50,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Documents processed at once by the batch runner.
    pub concurrency: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self { concurrency: 2 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive; `RUST_LOG` takes precedence.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("reportlens-out"),
        }
    }
}

impl ReportLensConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not to a mapping.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&yaml)
    }

    /// Load from `path` when given, otherwise use defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker.concurrency == 0 {
            return Err(ConfigError::Invalid(
                "worker.concurrency must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_stock_caps() {
        let config = ReportLensConfig::default();
        assert_eq!(config.limits.max_metrics, 50);
        assert_eq!(config.limits.max_footnotes, 50);
        assert_eq!(config.limits.max_domains, 3);
        assert_eq!(config.limits.context_window, 50);
        assert_eq!(config.worker.concurrency, 2);
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let config = ReportLensConfig::from_yaml("limits:\n  max_metrics: 10\n").unwrap();
        assert_eq!(config.limits.max_metrics, 10);
        assert_eq!(config.limits.max_footnotes, 50);
        assert_eq!(config.worker.concurrency, 2);
    }

    #[test]
    fn empty_yaml_is_default() {
        assert_eq!(
            ReportLensConfig::from_yaml("  \n").unwrap(),
            ReportLensConfig::default()
        );
    }

    #[test]
    fn zero_concurrency_rejected() {
        let err = ReportLensConfig::from_yaml("worker:\n  concurrency: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_yaml_is_parse_error() {
        let err = ReportLensConfig::from_yaml("limits: [unclosed").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reportlens.yaml");
        std::fs::write(&path, "output:\n  dir: /tmp/out\n").unwrap();

        let config = ReportLensConfig::load(&path).unwrap();
        assert_eq!(config.output.dir, PathBuf::from("/tmp/out"));
    }
}
