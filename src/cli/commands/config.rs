//! Config Command
//!
//! Manage Hireflow configuration.
//!
//! Usage:
//!   hireflow config show [-f json|toml]
//!   hireflow config path
//!   hireflow config init [-g] [--force]

use crate::config::ConfigLoader;
use crate::types::{HireflowError, Result};

/// Show the merged effective configuration
pub fn show(format: &str) -> Result<()> {
    let as_json = match format {
        "json" => true,
        "toml" => false,
        other => {
            return Err(HireflowError::Config(format!(
                "Unknown format '{}'. Valid values: json, toml",
                other
            )));
        }
    };

    let config = ConfigLoader::load()?;
    println!("{}", ConfigLoader::render_config(&config, as_json)?);
    Ok(())
}

/// Show configuration paths
pub fn path() -> Result<()> {
    ConfigLoader::show_path();
    Ok(())
}

/// Initialize global configuration
pub fn init_global(force: bool) -> Result<()> {
    let path = ConfigLoader::init_global(force)?;
    println!("✓ Initialized global configuration");
    println!("  Config: {}", path.display());
    Ok(())
}

/// Initialize project configuration
pub fn init_project(force: bool) -> Result<()> {
    let path = ConfigLoader::init_project(force)?;
    println!("✓ Initialized project configuration");
    println!("  Config: {}", path.display());
    Ok(())
}
