//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (~/.config/hireflow/config.toml)
//! 3. Project config (.hireflow/config.toml)
//! 4. Environment variables (HIREFLOW_* prefix)

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::Config;
use crate::types::{HireflowError, Result};

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain using Figment:
    /// defaults → global → project → env vars
    pub fn load() -> Result<Config> {
        Self::load_from(
            Self::global_config_path().as_deref(),
            &Self::project_config_path(),
        )
    }

    /// Resolution chain over explicit file locations
    pub fn load_from(global: Option<&Path>, project: &Path) -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        // Merge global config
        if let Some(global_path) = global
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(global_path));
        }

        // Merge project config
        if project.exists() {
            debug!("Loading project config from: {}", project.display());
            figment = figment.merge(Toml::file(project));
        }

        // Merge environment variables; only the section separator becomes a dot
        // (HIREFLOW_INTERVIEW_MAX_WORKFLOW_STEPS -> interview.max_workflow_steps)
        figment = figment.merge(
            Env::prefixed("HIREFLOW_")
                .map(|key| key.as_str().replacen('_', ".", 1).into())
                .lowercase(true),
        );

        let config: Config = figment
            .extract()
            .map_err(|e| HireflowError::Config(format!("Configuration error: {}", e)))?;

        // Validate configuration after loading
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file only
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| HireflowError::Config(format!("Configuration error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Get path to global config directory (~/.config/hireflow/)
    pub fn global_dir() -> Option<PathBuf> {
        env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                env::var("HOME")
                    .ok()
                    .map(|home| PathBuf::from(home).join(".config"))
            })
            .map(|p| p.join("hireflow"))
    }

    /// Get path to global config file
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }

    /// Get path to project config file
    pub fn project_config_path() -> PathBuf {
        Self::project_dir().join("config.toml")
    }

    /// Get project data directory
    pub fn project_dir() -> PathBuf {
        PathBuf::from(".hireflow")
    }

    // =========================================================================
    // Config Commands
    // =========================================================================

    /// Show config file paths
    pub fn show_path() {
        println!("Configuration paths:");
        println!();

        // Global config
        if let Some(global) = Self::global_config_path() {
            let exists = if global.exists() { "✓" } else { "✗" };
            println!("  Global:  {} {}", exists, global.display());
        } else {
            println!("  Global:  (not available)");
        }

        // Project config
        let project = Self::project_config_path();
        let exists = if project.exists() { "✓" } else { "✗" };
        println!("  Project: {} {}", exists, project.display());
    }

    /// Render the effective configuration
    pub fn render_config(config: &Config, as_json: bool) -> Result<String> {
        if as_json {
            Ok(serde_json::to_string_pretty(config)?)
        } else {
            toml::to_string_pretty(config).map_err(|e| HireflowError::Config(e.to_string()))
        }
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Initialize global configuration
    pub fn init_global(force: bool) -> Result<PathBuf> {
        let global_dir = Self::global_dir().ok_or_else(|| {
            HireflowError::Config("Cannot determine global config directory".to_string())
        })?;
        Self::write_default(&global_dir.join("config.toml"), force)
    }

    /// Initialize project configuration
    pub fn init_project(force: bool) -> Result<PathBuf> {
        Self::write_default(&Self::project_config_path(), force)
    }

    /// Write the default config file unless one exists (or `force`)
    pub fn write_default(path: &Path, force: bool) -> Result<PathBuf> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        if !path.exists() || force {
            fs::write(path, Self::default_config_toml()?)?;
            info!("Created config: {}", path.display());
        } else {
            info!("Config exists: {}", path.display());
        }

        Ok(path.to_path_buf())
    }

    // =========================================================================
    // Internal
    // =========================================================================

    /// Generate default config content (TOML)
    fn default_config_toml() -> Result<String> {
        let body = toml::to_string_pretty(&Config::default())
            .map_err(|e| HireflowError::Config(e.to_string()))?;
        Ok(format!(
            "# Hireflow Configuration\n\
             # API keys are read from MISTRAL_API_KEY / OPENAI_API_KEY, never from this file.\n\n{}",
            body
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_defaults_without_files() {
        let temp_dir = TempDir::new().unwrap();
        let config =
            ConfigLoader::load_from(None, &temp_dir.path().join("missing.toml")).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.interview.max_workflow_steps, 25);
    }

    #[test]
    fn test_project_overrides_global() {
        let temp_dir = TempDir::new().unwrap();
        let global = temp_dir.path().join("global.toml");
        let project = temp_dir.path().join("project.toml");

        fs::write(
            &global,
            "[interview]\nmax_validation_attempts = 5\ncontext_messages = 6\n",
        )
        .unwrap();
        fs::write(&project, "[interview]\nmax_validation_attempts = 2\n").unwrap();

        let config = ConfigLoader::load_from(Some(&global), &project).unwrap();
        assert_eq!(config.interview.max_validation_attempts, 2);
        assert_eq!(config.interview.context_messages, 6);
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[interview]\nmax_workflow_steps = 2\n").unwrap();

        let err = ConfigLoader::load_from_file(&path).unwrap_err();
        assert!(matches!(err, HireflowError::Config(_)));
    }

    #[test]
    fn test_write_default_roundtrips() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested/config.toml");

        ConfigLoader::write_default(&path, false).unwrap();
        let config = ConfigLoader::load_from_file(&path).unwrap();
        assert_eq!(config.session.stop_phrases.len(), 2);

        fs::write(&path, "version = \"custom\"\n").unwrap();
        ConfigLoader::write_default(&path, false).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("custom"));

        ConfigLoader::write_default(&path, true).unwrap();
        assert!(!fs::read_to_string(&path).unwrap().contains("custom"));
    }

    #[test]
    fn test_env_override() {
        let temp_dir = TempDir::new().unwrap();
        // SAFETY: This test runs in isolation
        unsafe {
            std::env::set_var("HIREFLOW_INTERVIEW_CONTEXT_MESSAGES", "7");
        }
        let config =
            ConfigLoader::load_from(None, &temp_dir.path().join("missing.toml")).unwrap();
        unsafe {
            std::env::remove_var("HIREFLOW_INTERVIEW_CONTEXT_MESSAGES");
        }
        assert_eq!(config.interview.context_messages, 7);
    }

    #[test]
    fn test_render_formats() {
        let config = Config::default();
        let json = ConfigLoader::render_config(&config, true).unwrap();
        assert!(json.contains("\"max_validation_attempts\": 3"));
        let toml = ConfigLoader::render_config(&config, false).unwrap();
        assert!(toml.contains("[interview]"));
    }
}
