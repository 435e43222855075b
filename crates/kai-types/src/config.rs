//! Configuration loading for the k-ai index.
//!
//! Layered config: defaults -> config file -> env vars -> CLI flags.
//! The default config file lives at ~/.config/kai/config.toml.

use config::{Config, Environment, File};
use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::KaiError;

/// Word index settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexSettings {
    /// Shard used when a caller does not pick one
    #[serde(default)]
    pub default_shard: i32,

    /// Per-document score multiplier for batch indexing.
    /// Range: (0.0, 1.0], 1.0 keeps every document at full weight.
    #[serde(default = "default_score_dropoff")]
    pub score_dropoff: f64,
}

fn default_score_dropoff() -> f64 {
    0.98
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            default_shard: 0,
            score_dropoff: default_score_dropoff(),
        }
    }
}

/// Topic ranking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicSettings {
    /// Per-document decay of topic ranking contributions
    #[serde(default = "default_topic_decay")]
    pub score_decay: f64,

    /// Dropoff used when a saved topic is written into the word index
    #[serde(default = "default_topic_decay")]
    pub index_dropoff: f64,

    /// Namespaces that receive a copy of every saved topic's word index
    #[serde(default = "default_mirror_namespaces")]
    pub mirror_namespaces: Vec<String>,
}

fn default_topic_decay() -> f64 {
    0.98
}

fn default_mirror_namespaces() -> Vec<String> {
    vec!["global".to_string()]
}

impl Default for TopicSettings {
    fn default() -> Self {
        Self {
            score_decay: default_topic_decay(),
            index_dropoff: default_topic_decay(),
            mirror_namespaces: default_mirror_namespaces(),
        }
    }
}

/// Store write retry policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Total attempts per write, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Fixed pause between attempts (ms)
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    10
}

fn default_delay_ms() -> u64 {
    5000
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_ms: default_delay_ms(),
        }
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Path to RocksDB storage directory
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub index: IndexSettings,

    #[serde(default)]
    pub topics: TopicSettings,

    #[serde(default)]
    pub retry: RetrySettings,
}

fn default_db_path() -> String {
    ProjectDirs::from("", "", "kai")
        .map(|p| p.data_local_dir().join("db"))
        .unwrap_or_else(|| PathBuf::from("./data"))
        .to_string_lossy()
        .to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            log_level: default_log_level(),
            index: IndexSettings::default(),
            topics: TopicSettings::default(),
            retry: RetrySettings::default(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/kai/config.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (KAI_*, nested keys joined with `__`)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, KaiError> {
        let config_dir = ProjectDirs::from("", "", "kai")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");
        let defaults = IndexSettings::default();
        let topic_defaults = TopicSettings::default();
        let retry_defaults = RetrySettings::default();

        let mut builder = Config::builder()
            .set_default("db_path", default_db_path())
            .and_then(|b| b.set_default("log_level", default_log_level()))
            .and_then(|b| b.set_default("index.default_shard", defaults.default_shard as i64))
            .and_then(|b| b.set_default("index.score_dropoff", defaults.score_dropoff))
            .and_then(|b| b.set_default("topics.score_decay", topic_defaults.score_decay))
            .and_then(|b| b.set_default("topics.index_dropoff", topic_defaults.index_dropoff))
            .and_then(|b| {
                b.set_default("topics.mirror_namespaces", topic_defaults.mirror_namespaces)
            })
            .and_then(|b| b.set_default("retry.max_attempts", retry_defaults.max_attempts as i64))
            .and_then(|b| b.set_default("retry.delay_ms", retry_defaults.delay_ms as i64))
            .map_err(|e| KaiError::Config(e.to_string()))?;

        // 2. Default config file (optional, may not exist)
        builder = builder
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        // 3. CLI-specified config file (must exist if given)
        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // 4. Environment variables, e.g. KAI_DB_PATH, KAI_RETRY__MAX_ATTEMPTS
        builder = builder.add_source(
            Environment::with_prefix("KAI")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("topics.mirror_namespaces")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| KaiError::Config(e.to_string()))?;

        let settings: Settings = config
            .try_deserialize()
            .map_err(|e| KaiError::Config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), KaiError> {
        for (name, value) in [
            ("index.score_dropoff", self.index.score_dropoff),
            ("topics.score_decay", self.topics.score_decay),
            ("topics.index_dropoff", self.topics.index_dropoff),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(KaiError::Config(format!(
                    "{name} must be in (0.0, 1.0], got {value}"
                )));
            }
        }
        if self.retry.max_attempts == 0 {
            return Err(KaiError::Config("retry.max_attempts must be > 0".to_string()));
        }
        Ok(())
    }

    /// Expand ~ in db_path to the user's home directory
    pub fn expanded_db_path(&self) -> PathBuf {
        if let Some(rest) = self.db_path.strip_prefix("~/") {
            if let Some(dirs) = BaseDirs::new() {
                return dirs.home_dir().join(rest);
            }
        }
        PathBuf::from(&self.db_path)
    }
}
