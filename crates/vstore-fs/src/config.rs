//! Format-agnostic configuration loading

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::{Error, Result};

/// Format-agnostic configuration store.
///
/// Detects the format from the file extension.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfigStore;

impl ConfigStore {
    pub fn new() -> Self {
        Self
    }

    /// Load configuration from a file.
    ///
    /// Format is detected from file extension:
    /// - `.toml` -> TOML
    /// - `.json` -> JSON
    /// - `.yaml`, `.yml` -> YAML
    pub fn load<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        let parse_error = |format: &str, message: String| Error::ConfigParse {
            path: path.to_path_buf(),
            format: format.into(),
            message,
        };

        match extension.as_str() {
            "toml" => toml::from_str(&content).map_err(|e| parse_error("TOML", e.to_string())),
            "json" => serde_json::from_str(&content).map_err(|e| parse_error("JSON", e.to_string())),
            "yaml" | "yml" => {
                serde_yaml::from_str(&content).map_err(|e| parse_error("YAML", e.to_string()))
            }
            _ => Err(Error::UnsupportedFormat { extension }),
        }
    }
}
