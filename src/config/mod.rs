//! Configuration
//!
//! TOML/JSON configuration for the bridge: parser tracing, URL
//! link-ification, the terminal emulator used for terminal-bound
//! operations, and an optional privilege-helper override.

pub mod loader;

// Re-exports for convenience
pub use loader::ConfigLoader;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Parsing pipeline options
    #[serde(default)]
    pub parser: ParserConfig,
    /// Process supervision options
    #[serde(default)]
    pub process: ProcessConfig,
}

/// Parsing pipeline options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Trace every pipeline stage's intermediate values
    #[serde(default)]
    pub debug_mode: bool,
    /// Convert bare URLs in status lines into clickable anchors
    #[serde(default = "default_treat_url_links")]
    pub treat_url_links: bool,
}

fn default_treat_url_links() -> bool {
    true
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            debug_mode: false,
            treat_url_links: true,
        }
    }
}

/// Process supervision options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessConfig {
    /// Terminal emulator used for terminal-bound operations
    #[serde(default = "default_terminal")]
    pub terminal: String,
    /// Privilege helper override ("direct", "sudo", "kdesu", "gksu");
    /// auto-detected when unset
    #[serde(default)]
    pub su_helper: Option<String>,
}

fn default_terminal() -> String {
    "xterm".to_string()
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            terminal: default_terminal(),
            su_helper: None,
        }
    }
}

impl Config {
    /// Validate field values after loading.
    pub fn validate(&self) -> Result<()> {
        if self.process.terminal.trim().is_empty() {
            return Err(Error::ConfigValidationFailed {
                field: "process.terminal".to_string(),
                reason: "terminal emulator cannot be empty".to_string(),
            });
        }

        if let Some(helper) = &self.process.su_helper {
            if crate::exec::SuHelper::from_name(helper).is_none() {
                return Err(Error::ConfigValidationFailed {
                    field: "process.su_helper".to_string(),
                    reason: format!("unknown privilege helper '{}'", helper),
                });
            }
        }

        Ok(())
    }
}
