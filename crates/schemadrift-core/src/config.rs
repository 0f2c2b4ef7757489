//! Configuration schema (schemadrift.toml)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Metadata source connection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Source type (snowflake, json_file)
    #[serde(rename = "type")]
    pub source_type: String,

    /// Connection settings (source-specific)
    #[serde(flatten)]
    pub settings: HashMap<String, String>,
}

impl SourceConfig {
    /// Get an optional setting
    pub fn setting(&self, key: &str) -> Option<&str> {
        self.settings.get(key).map(String::as_str)
    }

    /// Get a setting the source cannot work without
    pub fn require(&self, key: &str) -> Result<&str, ConfigError> {
        self.setting(key).ok_or_else(|| ConfigError::MissingSetting {
            source_type: self.source_type.clone(),
            key: key.to_string(),
        })
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            source_type: "snowflake".to_string(),
            settings: HashMap::new(),
        }
    }
}

/// What the capturer keeps from the metadata source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Schemas to leave out of snapshots (glob patterns, case-insensitive)
    pub exclude_schemas: Vec<String>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            exclude_schemas: vec!["INFORMATION_SCHEMA".to_string()],
        }
    }
}

impl CaptureConfig {
    /// Check if a schema is excluded from capture
    pub fn is_schema_excluded(&self, schema: &str) -> bool {
        let schema = schema.to_uppercase();
        self.exclude_schemas.iter().any(|pattern| {
            let pattern = pattern.to_uppercase();
            if pattern.contains('*') {
                glob_match(&pattern, &schema)
            } else {
                pattern == schema
            }
        })
    }
}

/// Where snapshots and the change log live
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding one `<date>.json` file per snapshot
    pub snapshot_dir: PathBuf,

    /// JSON-lines change log file
    pub changelog_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            snapshot_dir: PathBuf::from(".schemadrift/snapshots"),
            changelog_path: PathBuf::from(".schemadrift/changes_log.jsonl"),
        }
    }
}

/// Narrative service settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrativeConfig {
    /// Ask the narrative service to explain drift
    pub enabled: bool,

    /// Chat model name
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Upper bound on one narrative request, in seconds
    pub timeout_secs: u64,

    /// API base URL (defaults to the public OpenAI endpoint)
    pub base_url: Option<String>,

    /// API key; when absent the CLI falls back to `OPENAI_API_KEY`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: "gpt-4".to_string(),
            temperature: 0.3,
            timeout_secs: 30,
            base_url: None,
            api_key: None,
        }
    }
}

impl NarrativeConfig {
    /// Request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Metadata source connection
    #[serde(default)]
    pub source: Option<SourceConfig>,

    /// Capture filters
    #[serde(default)]
    pub capture: CaptureConfig,

    /// Snapshot and change log locations
    #[serde(default)]
    pub store: StoreConfig,

    /// Narrative service
    #[serde(default)]
    pub narrative: NarrativeConfig,

    /// Project root path (for resolving relative paths)
    #[serde(skip)]
    pub project_root: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: None,
            capture: CaptureConfig::default(),
            store: StoreConfig::default(),
            narrative: NarrativeConfig::default(),
            project_root: std::env::current_dir().unwrap_or_default(),
        }
    }
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        let mut config: Config = toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        // Set project root to parent of config file
        config.project_root = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => std::env::current_dir().unwrap_or_default(),
        };

        Ok(config)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        let mut config: Config = toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.project_root = std::env::current_dir().unwrap_or_default();
        Ok(config)
    }

    /// Snapshot directory resolved against the project root
    pub fn snapshot_dir(&self) -> PathBuf {
        self.resolve(&self.store.snapshot_dir)
    }

    /// Change log path resolved against the project root
    pub fn changelog_path(&self) -> PathBuf {
        self.resolve(&self.store.changelog_path)
    }

    /// Resolve a possibly relative path against the project root
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_relative() {
            self.project_root.join(path)
        } else {
            path.to_path_buf()
        }
    }
}

/// Simple glob matching (single `*` wildcard)
fn glob_match(pattern: &str, text: &str) -> bool {
    if pattern == "*" || pattern == "**" {
        return true;
    }

    if let Some(star_pos) = pattern.find('*') {
        let prefix = &pattern[..star_pos];
        let suffix = &pattern[star_pos + 1..];

        text.len() >= prefix.len() + suffix.len()
            && text.starts_with(prefix)
            && text.ends_with(suffix)
    } else {
        pattern == text
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Source '{source_type}' requires '{key}' in [source] settings")]
    MissingSetting { source_type: String, key: String },
}
