//! Configuration loading for CiliAI.
//! Reads ciliai.toml from the path given on the command line, the path in the
//! CILIAI_CONFIG env var, or the current directory, in that order.

use ciliai_miner::MinerConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub miner: MinerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when neither `--log` nor RUST_LOG is set.
    #[serde(default = "default_filter")]
    pub filter: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: default_filter(), json: false }
    }
}

fn default_filter() -> String { "ciliai=debug,info".to_string() }

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// JSON report path; stdout when unset.
    pub json_path: Option<PathBuf>,
    pub csv_path: Option<PathBuf>,
}

mod tests;

pub const DEFAULT_CONFIG_FILE: &str = "ciliai.toml";

impl Config {
    /// `explicit`, else CILIAI_CONFIG, else ./ciliai.toml.
    pub fn resolve_path(explicit: Option<&Path>, env_value: Option<String>) -> PathBuf {
        explicit
            .map(Path::to_path_buf)
            .or_else(|| env_value.filter(|v| !v.trim().is_empty()).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    /// Load configuration from `path`. `Ok(None)` when the file does not exist.
    pub fn load(path: &Path) -> anyhow::Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config {}: {}", path.display(), e))?;
        Ok(Some(config))
    }

    /// A non-empty NCBI_API_KEY replaces the configured key.
    pub fn apply_api_key(&mut self, env_key: Option<String>) {
        if let Some(key) = env_key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty()) {
            self.miner.api_key = Some(key);
        }
    }
}
