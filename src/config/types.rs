//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (~/.config/hireflow/) and project (.hireflow/) level configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::ai::provider::ProviderConfig;
use crate::constants::{network, session, workflow};
use crate::types::{HireflowError, Result};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// LLM provider settings
    pub llm: LlmConfig,

    /// Workflow tuning
    pub interview: InterviewConfig,

    /// Session layer settings
    pub session: SessionConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            llm: LlmConfig::default(),
            interview: InterviewConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `HireflowError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        // LLM temperature validation
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(HireflowError::Config(format!(
                "LLM temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }

        // Timeout validation
        if self.llm.timeout_secs == 0 {
            return Err(HireflowError::Config(
                "LLM timeout_secs must be greater than 0".to_string(),
            ));
        }

        if let Some(api_base) = &self.llm.api_base {
            let parsed = url::Url::parse(api_base).map_err(|e| {
                HireflowError::Config(format!("LLM api_base is not a valid URL: {}", e))
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(HireflowError::Config(format!(
                    "LLM api_base must use http or https, got {}",
                    parsed.scheme()
                )));
            }
        }

        if self.interview.max_validation_attempts == 0 {
            return Err(HireflowError::Config(
                "Interview max_validation_attempts must be greater than 0".to_string(),
            ));
        }

        if self.interview.max_workflow_steps < workflow::MIN_WORKFLOW_STEPS {
            return Err(HireflowError::Config(format!(
                "Interview max_workflow_steps must be at least {}, got {}",
                workflow::MIN_WORKFLOW_STEPS,
                self.interview.max_workflow_steps
            )));
        }

        if self.interview.context_messages == 0 {
            return Err(HireflowError::Config(
                "Interview context_messages must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

// =============================================================================
// LLM Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name: "mistral" or "openai"
    pub provider: String,

    /// Model name
    pub model: String,

    /// Custom endpoint (defaults to the provider's public API)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,

    /// Transport timeout in seconds
    pub timeout_secs: u64,

    /// Sampling temperature
    pub temperature: f32,

    /// Maximum tokens per completion
    pub max_tokens: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "mistral".to_string(),
            model: "mistral-large-latest".to_string(),
            api_base: None,
            timeout_secs: network::DEFAULT_TIMEOUT_SECS,
            temperature: 0.3,
            max_tokens: 2048,
        }
    }
}

impl LlmConfig {
    /// Provider settings; the API key is read from the environment by the provider
    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            provider: self.provider.clone(),
            model: Some(self.model.clone()),
            timeout_secs: self.timeout_secs,
            temperature: self.temperature,
            api_key: None,
            api_base: self.api_base.clone(),
            max_tokens: self.max_tokens,
        }
    }
}

// =============================================================================
// Interview Configuration
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterviewConfig {
    /// Validator invocations per turn before the reply is force-accepted
    pub max_validation_attempts: u32,

    /// Step executions per turn before the runner gives up
    pub max_workflow_steps: usize,

    /// Recent messages the Orchestrator sees
    pub context_messages: usize,
}

impl Default for InterviewConfig {
    fn default() -> Self {
        Self {
            max_validation_attempts: workflow::MAX_VALIDATION_ATTEMPTS,
            max_workflow_steps: workflow::MAX_WORKFLOW_STEPS,
            context_messages: crate::constants::context::ORCHESTRATOR_MESSAGES,
        }
    }
}

// =============================================================================
// Session Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Directory for per-session turn logs
    pub log_dir: PathBuf,

    /// Messages that end the interview (case-insensitive, trimmed)
    pub stop_phrases: Vec<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from(session::DEFAULT_LOG_DIR),
            stop_phrases: vec!["stop interview".to_string(), "стоп игра".to_string()],
        }
    }
}

impl SessionConfig {
    pub fn is_stop_phrase(&self, message: &str) -> bool {
        let normalized = message.trim().to_lowercase();
        self.stop_phrases
            .iter()
            .any(|p| p.trim().to_lowercase() == normalized)
    }
}

// =============================================================================
// Tests
// =============================================================================
