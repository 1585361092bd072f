// opvars configuration module
//
// This module handles loading and parsing the configuration from opvars.yaml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    /// Base directory holding the host_vars/ and group_vars/ subdirectories
    #[serde(default = "default_inventory")]
    pub inventory: String,

    /// Secret CLI program, invoked as `<command> read <reference>`
    #[serde(default = "default_command")]
    pub command: String,
}

fn default_inventory() -> String {
    ".".to_string()
}

fn default_command() -> String {
    "op".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            inventory: default_inventory(),
            command: default_command(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;

        Ok(config)
    }

    /// Load configuration from opvars.yaml in the current directory
    pub fn from_current_dir() -> Result<Self> {
        Self::from_file("opvars.yaml")
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.inventory.is_empty() {
            anyhow::bail!("Inventory directory cannot be empty");
        }

        if self.command.is_empty() {
            anyhow::bail!("Secret CLI command cannot be empty");
        }

        Ok(())
    }

    /// Get the absolute path for the inventory base directory
    pub fn inventory_path(&self) -> Result<PathBuf> {
        let path = Path::new(&self.inventory);
        if path.is_absolute() {
            Ok(path.to_path_buf())
        } else {
            // Expand ~ to home directory if present
            if self.inventory.starts_with('~') {
                let home = dirs::home_dir().context("Failed to determine home directory")?;
                let home = home
                    .to_str()
                    .context("Home directory path contains invalid UTF-8")?;
                let expanded = self.inventory.replacen('~', home, 1);
                Ok(PathBuf::from(expanded))
            } else {
                std::env::current_dir()
                    .map(|dir| dir.join(&self.inventory))
                    .with_context(|| "Failed to get current directory")
            }
        }
    }
}
