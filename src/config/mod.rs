use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::infrastructure::arxiv::{DEFAULT_ARXIV_ENDPOINT, DEFAULT_MAX_RESULTS};
use crate::infrastructure::index::{DEFAULT_EMBED_BATCH_SIZE, DEFAULT_SIMILARITY_TOP_K};

pub const DEFAULT_MODEL: &str = "llama3";
pub const DEFAULT_EMBEDDING_MODEL: &str = "nomic-embed-text";
pub const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_PERSIST_DIR: &str = "agent_dir";
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_MAX_STEPS: usize = 10;
pub const DEFAULT_CONFIG_PATH: &str = "config/research.toml";
pub const DEFAULT_CONTEXT: &str = "Purpose: The primary role of this agent is to search the web and get information about research papers";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub model: String,
    pub embedding_model: String,
    pub ollama_url: String,
    pub request_timeout_secs: u64,
    pub persist_dir: PathBuf,
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub arxiv_endpoint: String,
    pub max_results: usize,
    pub similarity_top_k: usize,
    pub max_retries: u32,
    pub max_steps: usize,
    pub embed_batch_size: usize,
    pub context: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config from {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config from {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    model: Option<String>,
    embedding_model: Option<String>,
    ollama_url: Option<String>,
    request_timeout_secs: Option<u64>,
    persist_dir: Option<String>,
    data_dir: Option<String>,
    output_dir: Option<String>,
    arxiv_endpoint: Option<String>,
    max_results: Option<usize>,
    similarity_top_k: Option<usize>,
    max_retries: Option<u32>,
    max_steps: Option<usize>,
    embed_batch_size: Option<usize>,
    context: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            persist_dir: PathBuf::from(DEFAULT_PERSIST_DIR),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            arxiv_endpoint: DEFAULT_ARXIV_ENDPOINT.to_string(),
            max_results: DEFAULT_MAX_RESULTS,
            similarity_top_k: DEFAULT_SIMILARITY_TOP_K,
            max_retries: DEFAULT_MAX_RETRIES,
            max_steps: DEFAULT_MAX_STEPS,
            embed_batch_size: DEFAULT_EMBED_BATCH_SIZE,
            context: DEFAULT_CONTEXT.to_string(),
        }
    }
}

impl AppConfig {
    /// Loads `path`, or the default location when `path` is `None`. Only a
    /// missing default file falls back to built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return read_config(path);
        }
        let default_path = Path::new(DEFAULT_CONFIG_PATH);
        match read_config(default_path) {
            Ok(config) => Ok(config),
            Err(ConfigError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                info!("Configuration file not found; using defaults");
                Ok(Self::default())
            }
            Err(other) => Err(other),
        }
    }
}

fn read_config(path: &Path) -> Result<AppConfig, ConfigError> {
    debug!(path = %path.display(), "Reading configuration file");
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: RawConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    AppConfig::try_from(parsed)
}

impl TryFrom<RawConfig> for AppConfig {
    type Error = ConfigError;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        let defaults = AppConfig::default();
        let config = AppConfig {
            model: raw.model.unwrap_or(defaults.model),
            embedding_model: raw.embedding_model.unwrap_or(defaults.embedding_model),
            ollama_url: raw.ollama_url.unwrap_or(defaults.ollama_url),
            request_timeout_secs: raw
                .request_timeout_secs
                .unwrap_or(defaults.request_timeout_secs),
            persist_dir: raw
                .persist_dir
                .map(|dir| expand_path("persist_dir", &dir))
                .transpose()?
                .unwrap_or(defaults.persist_dir),
            data_dir: raw
                .data_dir
                .map(|dir| expand_path("data_dir", &dir))
                .transpose()?
                .unwrap_or(defaults.data_dir),
            output_dir: raw
                .output_dir
                .map(|dir| expand_path("output_dir", &dir))
                .transpose()?
                .unwrap_or(defaults.output_dir),
            arxiv_endpoint: raw.arxiv_endpoint.unwrap_or(defaults.arxiv_endpoint),
            max_results: raw.max_results.unwrap_or(defaults.max_results),
            similarity_top_k: raw.similarity_top_k.unwrap_or(defaults.similarity_top_k),
            max_retries: raw.max_retries.unwrap_or(defaults.max_retries),
            max_steps: raw.max_steps.unwrap_or(defaults.max_steps),
            embed_batch_size: raw.embed_batch_size.unwrap_or(defaults.embed_batch_size),
            context: raw.context.unwrap_or(defaults.context),
        };
        config.validate()?;
        Ok(config)
    }
}

impl AppConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_retries == 0 {
            return Err(ConfigError::Invalid {
                key: "max_retries",
                reason: "at least one attempt is required".into(),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "request_timeout_secs",
                reason: "a zero timeout fails every request".into(),
            });
        }
        let counts = [
            ("max_results", self.max_results),
            ("similarity_top_k", self.similarity_top_k),
            ("max_steps", self.max_steps),
            ("embed_batch_size", self.embed_batch_size),
        ];
        if let Some((key, _)) = counts.into_iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::Invalid {
                key,
                reason: "must be greater than zero".into(),
            });
        }
        Ok(())
    }
}

fn expand_path(key: &'static str, raw: &str) -> Result<PathBuf, ConfigError> {
    shellexpand::full(raw)
        .map(|expanded| PathBuf::from(expanded.into_owned()))
        .map_err(|err| ConfigError::Invalid {
            key,
            reason: err.to_string(),
        })
}
