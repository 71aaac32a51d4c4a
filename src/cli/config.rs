//! CLI configuration file
//!
//! Optional JSON file; every field has a default and a missing file means
//! all defaults. Command-line flags override file values.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::observability::Severity;
use crate::storage::{Compression, Layout, WriteOptions, DEFAULT_COMPRESSION_LEVEL};

use super::errors::{CliError, CliResult};

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Artifact layout for `convert`: "file" or "directory"
    #[serde(default = "default_layout")]
    pub layout: String,

    /// Payload compression for `convert`: "none" or "zlib"
    #[serde(default = "default_compression")]
    pub compression: String,

    /// zlib level, 0..=9
    #[serde(default = "default_compression_level")]
    pub compression_level: u32,

    /// Minimum log severity: "trace", "info", "warn" or "error"
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_layout() -> String {
    "file".to_string()
}
fn default_compression() -> String {
    "none".to_string()
}
fn default_compression_level() -> u32 {
    DEFAULT_COMPRESSION_LEVEL
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            layout: default_layout(),
            compression: default_compression(),
            compression_level: default_compression_level(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from file, or defaults if the file is absent
    pub fn load(path: &Path) -> CliResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        self.layout()?;
        self.compression()?;
        self.log_severity()?;

        if self.compression_level > 9 {
            return Err(CliError::config_error(format!(
                "Invalid compression_level: {}. Must be between 0 and 9.",
                self.compression_level
            )));
        }

        Ok(())
    }

    pub fn layout(&self) -> CliResult<Layout> {
        self.layout.parse().map_err(CliError::config_error)
    }

    pub fn compression(&self) -> CliResult<Compression> {
        self.compression.parse().map_err(CliError::config_error)
    }

    pub fn log_severity(&self) -> CliResult<Severity> {
        Severity::parse(&self.log_level).ok_or_else(|| {
            CliError::config_error(format!(
                "Invalid log_level: '{}'. Must be trace, info, warn or error.",
                self.log_level
            ))
        })
    }

    /// Writer options from the file, with command-line overrides applied
    pub fn write_options(
        &self,
        layout: Option<Layout>,
        compression: Option<Compression>,
    ) -> CliResult<WriteOptions> {
        let layout = match layout {
            Some(layout) => layout,
            None => self.layout()?,
        };
        let compression = match compression {
            Some(compression) => compression,
            None => self.compression()?,
        };

        Ok(WriteOptions::default()
            .with_layout(layout)
            .with_compression(compression)
            .with_compression_level(self.compression_level))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write_config(temp_dir: &TempDir, config: serde_json::Value) -> std::path::PathBuf {
        let path = temp_dir.path().join("colstore.json");
        fs::write(&path, config.to_string()).unwrap();
        path
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load(&temp_dir.path().join("absent.json")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.write_options(None, None).unwrap(), WriteOptions::default());
        assert_eq!(config.log_severity().unwrap(), Severity::Warn);
    }

    #[test]
    fn test_config_defaults_for_missing_fields() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(&temp_dir, json!({ "compression": "zlib" }));

        let config = Config::load(&path).unwrap();
        assert_eq!(config.layout, "file");
        assert_eq!(config.compression_level, 6);
        assert_eq!(config.compression().unwrap(), Compression::Zlib);
    }

    #[test]
    fn test_config_validates_values() {
        let temp_dir = TempDir::new().unwrap();

        for bad in [
            json!({ "layout": "tree" }),
            json!({ "compression": "lz4" }),
            json!({ "compression_level": 12 }),
            json!({ "log_level": "loud" }),
        ] {
            let path = write_config(&temp_dir, bad.clone());
            let err = Config::load(&path).unwrap_err();
            assert_eq!(err.code_str(), "COL_CLI_CONFIG_ERROR", "config {}", bad);
        }
    }

    #[test]
    fn test_invalid_json_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("colstore.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_flags_override_file() {
        let config = Config {
            layout: "directory".into(),
            compression: "zlib".into(),
            compression_level: 9,
            log_level: "info".into(),
        };

        let options = config
            .write_options(Some(Layout::File), Some(Compression::None))
            .unwrap();
        assert_eq!(options.layout, Layout::File);
        assert_eq!(options.compression, Compression::None);
        assert_eq!(options.compression_level, 9);

        let options = config.write_options(None, None).unwrap();
        assert_eq!(options.layout, Layout::Directory);
        assert_eq!(options.compression, Compression::Zlib);
    }
}
