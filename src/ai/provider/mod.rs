//! LLM Provider Abstraction
//!
//! Defines the LlmProvider trait used by every agent step. Providers return
//! raw model text plus token usage and latency; turning that text into a
//! structured record is the extractor's job, not the provider's.
//!
//! ## Modules
//!
//! - `chat`: Chat Completions HTTP provider (Mistral and OpenAI-compatible)
//! - `testing`: scripted provider for engine tests

mod chat;
#[cfg(test)]
pub mod testing;

pub use chat::{ChatCompletionsProvider, ChatFlavor};

// Re-export error types from centralized location
pub use crate::types::{ErrorCategory, ErrorClassifier, LlmError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::constants::network::DEFAULT_TIMEOUT_SECS;
use crate::types::{HireflowError, Result};

// =============================================================================
// LLM Response with Usage Metrics
// =============================================================================

/// Complete LLM response including text and usage metrics
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// Raw model text
    pub text: String,
    /// Token usage metrics
    pub usage: TokenUsage,
    /// Response timing
    pub timing: ResponseTiming,
    /// Provider and model info
    pub metadata: ResponseMetadata,
}

impl LlmResponse {
    /// Create full response with all metrics
    pub fn with_metrics(
        text: String,
        usage: TokenUsage,
        timing: ResponseTiming,
        metadata: ResponseMetadata,
    ) -> Self {
        Self {
            text,
            usage,
            timing,
            metadata,
        }
    }
}

/// Token usage metrics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Input tokens (prompt)
    pub input_tokens: u32,
    /// Output tokens (completion)
    pub output_tokens: u32,
}

impl TokenUsage {
    /// Total tokens used (input + output)
    pub fn total(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }

    /// Create from OpenAI-style usage response (Mistral uses the same shape)
    pub fn from_openai(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            input_tokens: prompt_tokens,
            output_tokens: completion_tokens,
        }
    }
}

/// Response timing metrics
#[derive(Debug, Clone, Default)]
pub struct ResponseTiming {
    /// Wall-clock time of the call in milliseconds
    pub total_ms: u64,
}

impl ResponseTiming {
    pub fn from_duration(duration: std::time::Duration) -> Self {
        Self {
            total_ms: duration.as_millis() as u64,
        }
    }
}

/// Response metadata
#[derive(Debug, Clone, Default)]
pub struct ResponseMetadata {
    /// Model used
    pub model: String,
    /// Provider name
    pub provider: String,
}

/// Shared LLM provider type for concurrent access across agent steps.
pub type SharedProvider = Arc<dyn LlmProvider + Send + Sync>;

// =============================================================================
// Provider Configuration
// =============================================================================

/// Configuration for LLM providers
///
/// Note: API keys are never serialized to output and are redacted in debug
/// output. Providers convert the key to SecretString internally.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider type: "mistral", "openai"
    pub provider: String,
    /// Model name (provider-specific)
    pub model: Option<String>,
    /// Transport timeout in seconds
    pub timeout_secs: u64,
    /// Sampling temperature
    pub temperature: f32,
    /// API key; falls back to the provider's environment variable
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    /// API base URL (for custom endpoints)
    #[serde(default)]
    pub api_base: Option<String>,
    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .field("temperature", &self.temperature)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

fn default_max_tokens() -> usize {
    2048
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider: "mistral".to_string(),
            model: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            temperature: 0.3,
            api_key: None,
            api_base: None,
            max_tokens: default_max_tokens(),
        }
    }
}

// =============================================================================
// LLM Provider Trait
// =============================================================================

/// LLM Client Adapter used by the agent steps
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send one prompt with an optional system instruction.
    ///
    /// Transport and provider failures are returned as errors and are not
    /// retried here; the engine propagates them to the caller of the turn.
    async fn complete(&self, system: Option<&str>, prompt: &str) -> Result<LlmResponse>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model name currently in use
    fn model(&self) -> &str;
}

/// Create a shared provider from configuration
pub fn create_provider(config: &ProviderConfig) -> Result<SharedProvider> {
    let flavor = match config.provider.as_str() {
        "mistral" => ChatFlavor::Mistral,
        "openai" => ChatFlavor::OpenAi,
        _ => {
            return Err(HireflowError::Config(format!(
                "Unknown provider: {}. Supported: mistral, openai",
                config.provider
            )));
        }
    };
    Ok(Arc::new(ChatCompletionsProvider::new(config.clone(), flavor)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_debug_redacts_key() {
        let config = ProviderConfig {
            api_key: Some("sk-secret".to_string()),
            ..ProviderConfig::default()
        };
        let debug = format!("{:?}", config);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("sk-secret"));
    }

    #[test]
    fn test_config_never_serializes_key() {
        let config = ProviderConfig {
            api_key: Some("sk-secret".to_string()),
            ..ProviderConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("sk-secret"));
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let config = ProviderConfig {
            provider: "ollama".to_string(),
            ..ProviderConfig::default()
        };
        let err = create_provider(&config).err().unwrap();
        assert!(matches!(err, HireflowError::Config(_)));
    }

    #[test]
    fn test_create_with_explicit_key() {
        let config = ProviderConfig {
            provider: "openai".to_string(),
            api_key: Some("sk-test".to_string()),
            ..ProviderConfig::default()
        };
        let provider = create_provider(&config).unwrap();
        assert_eq!(provider.name(), "openai");
    }
}
