//! Configuration File Loading
//!
//! Handles loading and saving configuration files from platform
//! locations, with format detection by extension and a defaults
//! fallback when nothing is found.

use std::fs;
use std::path::{Path, PathBuf};

use super::Config;
use crate::error::{Error, Result};

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML format
    Toml,
    /// JSON format
    Json,
}

/// Configuration file loader
pub struct ConfigLoader {
    /// Search paths for configuration files
    search_paths: Vec<PathBuf>,
    /// Current configuration file path (if loaded)
    current_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self {
            search_paths: Self::default_search_paths(),
            current_path: None,
        }
    }

    fn default_search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("xbpsbridge").join("config.toml"));
            paths.push(config_dir.join("xbpsbridge").join("config.json"));
        }
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".xbpsbridge.toml"));
        }
        paths
    }

    /// Load from the first existing search path, falling back to
    /// defaults when no file exists.
    pub fn load() -> Result<Config> {
        let mut loader = Self::new();

        if let Some((path, config)) = loader.find_and_load()? {
            info!("Configuration loaded from {}", path.display());
            loader.current_path = Some(path);
            config.validate()?;
            return Ok(config);
        }

        debug!("No configuration file found; using defaults");
        Ok(Config::default())
    }

    fn find_and_load(&self) -> Result<Option<(PathBuf, Config)>> {
        for path in &self.search_paths {
            if path.exists() {
                let config = Self::load_from_file(path)?;
                return Ok(Some((path.clone(), config)));
            }
        }
        Ok(None)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let contents = fs::read_to_string(path).map_err(|e| Error::ConfigLoadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        match Self::detect_format(path) {
            ConfigFormat::Toml => {
                toml::from_str(&contents).map_err(|e| Error::ConfigParseFailed {
                    format: "TOML".to_string(),
                    reason: e.to_string(),
                })
            }
            ConfigFormat::Json => {
                serde_json::from_str(&contents).map_err(|e| Error::ConfigParseFailed {
                    format: "JSON".to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Save configuration to a specific file, creating parent
    /// directories as needed.
    pub fn save_to_file(config: &Config, path: &Path) -> Result<()> {
        let contents = match Self::detect_format(path) {
            ConfigFormat::Toml => toml::to_string_pretty(config).map_err(|e| {
                Error::ConfigSerializationFailed {
                    format: "TOML".to_string(),
                    reason: e.to_string(),
                }
            })?,
            ConfigFormat::Json => serde_json::to_string_pretty(config).map_err(|e| {
                Error::ConfigSerializationFailed {
                    format: "JSON".to_string(),
                    reason: e.to_string(),
                }
            })?,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::ConfigSaveFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        }

        fs::write(path, contents).map_err(|e| Error::ConfigSaveFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    fn detect_format(path: &Path) -> ConfigFormat {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => ConfigFormat::Json,
            _ => ConfigFormat::Toml,
        }
    }

    /// Path the current configuration was loaded from, if any
    pub fn current_path(&self) -> Option<&Path> {
        self.current_path.as_deref()
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
