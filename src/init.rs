//! Project initialization module for opvars.
//!
//! This module handles the `init` command, which scaffolds the inventory
//! layout and configuration for a new project.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Project initialization configuration
#[derive(Debug)]
pub struct InitConfig {
    /// Directory to initialize the project in
    pub project_dir: PathBuf,
    /// Whether to create an example secrets file
    pub create_example: bool,
    /// Overwrite existing files without prompting
    pub force: bool,
}

impl Default for InitConfig {
    fn default() -> Self {
        Self {
            project_dir: PathBuf::from("."),
            create_example: true,
            force: false,
        }
    }
}

/// Initialize a project: inventory skeleton, configuration, and optionally
/// an example secrets file.
pub fn init_project(config: InitConfig) -> Result<()> {
    println!("🔧 Initializing opvars project in: {}", config.project_dir.display());

    let inventory_dir = config.project_dir.join("inventory");
    create_inventory_skeleton(&inventory_dir)?;
    println!("✓ Created inventory skeleton: host_vars/, group_vars/");

    let config_path = config.project_dir.join("opvars.yaml");
    if config_path.exists() && !config.force {
        let overwrite = dialoguer::Confirm::new()
            .with_prompt(format!("{} already exists. Overwrite?", config_path.display()))
            .default(false)
            .interact()
            .context("Failed to read confirmation prompt")?;

        if !overwrite {
            println!("⊘ Keeping existing opvars.yaml");
        } else {
            create_config_file(&config_path)?;
            println!("✓ Wrote configuration: opvars.yaml");
        }
    } else {
        create_config_file(&config_path)?;
        println!("✓ Wrote configuration: opvars.yaml");
    }

    if config.create_example {
        let example_path = create_example_vars(&inventory_dir)?;
        println!("✓ Created example secrets file: {}", example_path.display());
    }

    println!("\n🎉 Project initialized!");
    println!("Next steps:");
    println!("  1. Put secret references in inventory/group_vars/all.op.yaml");
    println!("  2. Run 'opvars doctor' to verify your setup");
    println!("  3. Run 'opvars resolve <host>' to resolve variables");

    Ok(())
}

/// Create the host_vars/ and group_vars/ directories.
fn create_inventory_skeleton(inventory_dir: &Path) -> Result<()> {
    for subdir in ["host_vars", "group_vars"] {
        let dir = inventory_dir.join(subdir);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    }
    Ok(())
}

/// Write the default opvars.yaml configuration file.
fn create_config_file(config_path: &Path) -> Result<()> {
    let content = r#"# opvars configuration
# This file was auto-generated by: opvars init

# Base directory holding host_vars/ and group_vars/
inventory: ./inventory

# Secret CLI invoked as `<command> read <reference>`
command: op
"#;

    fs::write(config_path, content)
        .with_context(|| format!("Failed to write opvars.yaml to: {}", config_path.display()))
}

/// Write an example group_vars secrets file with placeholder references.
fn create_example_vars(inventory_dir: &Path) -> Result<PathBuf> {
    let example_path = inventory_dir.join("group_vars").join("all.op.yaml");

    let content = r#"# Example secrets file for the `all` group.
# Every scalar value is treated as a secret reference and resolved with
# `op read <reference>` at resolution time.

api_key: op://Infra/api/credential
db:
  password: op://Infra/database/password
"#;

    fs::write(&example_path, content)
        .with_context(|| format!("Failed to write example file to: {}", example_path.display()))?;

    Ok(example_path)
}
