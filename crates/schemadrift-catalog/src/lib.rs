//! Warehouse metadata sources and schema capture
//!
//! This crate lists every column of a warehouse through a [`MetadataSource`]
//! and turns the listing into a dated [`schemadrift_core::Snapshot`].
//!
//! ## Features
//!
//! Enable warehouse support via Cargo features:
//! - `snowflake` - Snowflake support
//!
//! ## Example
//!
//! ```rust,ignore
//! use schemadrift_catalog::{SchemaCapturer, SnowflakeSource};
//! use std::sync::Arc;
//!
//! let source = SnowflakeSource::from_config(&source_config, &config.project_root)?;
//! let capturer = SchemaCapturer::new(Arc::new(source), config.capture.clone());
//! let snapshot = capturer.capture_today().await?;
//! ```

pub mod adapter;
pub mod capturer;
pub mod json_file;
pub mod mock;
pub mod snowflake;

pub use adapter::{FetchError, MetadataSource};
pub use capturer::{CaptureError, SchemaCapturer};
pub use json_file::JsonFileSource;
pub use mock::MockSource;
pub use snowflake::{SnowflakeSource, SnowflakeSourceBuilder};

use schemadrift_core::Config;
use std::sync::Arc;

/// Create the metadata source described by the `[source]` table
pub fn source_from_config(config: &Config) -> Result<Arc<dyn MetadataSource>, FetchError> {
    let source = config.source.as_ref().ok_or_else(|| {
        FetchError::ConfigError(
            "No source configuration found in schemadrift.toml. \
             Add a [source] section with type and connection settings."
                .to_string(),
        )
    })?;

    match source.source_type.to_lowercase().as_str() {
        "snowflake" => Ok(Arc::new(SnowflakeSource::from_config(source, &config.project_root)?)),
        "json_file" | "json" => Ok(Arc::new(JsonFileSource::from_config(source, &config.project_root)?)),
        other => Err(FetchError::ConfigError(format!(
            "Unsupported source type '{}'. Supported: snowflake, json_file",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemadrift_core::SourceConfig;
    use std::collections::HashMap;

    #[test]
    fn missing_source_section() {
        let err = source_from_config(&Config::default()).err().unwrap();
        assert!(err.to_string().contains("[source]"));
    }

    #[test]
    fn unsupported_source_type() {
        let mut config = Config::default();
        config.source = Some(SourceConfig {
            source_type: "oracle".to_string(),
            settings: HashMap::new(),
        });

        let err = source_from_config(&config).err().unwrap();
        assert!(err.to_string().contains("Unsupported source type 'oracle'"));
    }

    #[test]
    fn json_file_source_resolves_relative_path() {
        let mut settings = HashMap::new();
        settings.insert("path".to_string(), "columns.json".to_string());

        let mut config = Config::default();
        config.project_root = std::path::PathBuf::from("/srv/warehouse");
        config.source = Some(SourceConfig {
            source_type: "json_file".to_string(),
            settings,
        });

        let source = source_from_config(&config).unwrap();
        assert_eq!(source.name(), "JSON file");
    }
}
