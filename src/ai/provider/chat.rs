//! Chat Completions Provider
//!
//! LLM provider for the Chat Completions wire format shared by Mistral and
//! OpenAI. Returns raw text with token usage and latency.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

use super::{
    ErrorClassifier, LlmProvider, LlmResponse, ProviderConfig, ResponseMetadata, ResponseTiming,
    TokenUsage,
};
use crate::types::{HireflowError, Result};

/// Which Chat Completions service to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatFlavor {
    Mistral,
    OpenAi,
}

impl ChatFlavor {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mistral => "mistral",
            Self::OpenAi => "openai",
        }
    }

    fn default_api_base(&self) -> &'static str {
        match self {
            Self::Mistral => "https://api.mistral.ai/v1",
            Self::OpenAi => "https://api.openai.com/v1",
        }
    }

    fn default_model(&self) -> &'static str {
        match self {
            Self::Mistral => "mistral-large-latest",
            Self::OpenAi => "gpt-4o-mini",
        }
    }

    pub fn api_key_env(&self) -> &'static str {
        match self {
            Self::Mistral => "MISTRAL_API_KEY",
            Self::OpenAi => "OPENAI_API_KEY",
        }
    }
}

/// Chat Completions provider with secure API key handling
pub struct ChatCompletionsProvider {
    flavor: ChatFlavor,
    /// API key stored securely - never exposed in logs or debug output
    api_key: SecretString,
    api_base: String,
    model: String,
    temperature: f32,
    max_tokens: usize,
    client: reqwest::Client,
}

impl std::fmt::Debug for ChatCompletionsProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCompletionsProvider")
            .field("flavor", &self.flavor)
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl ChatCompletionsProvider {
    pub fn new(config: ProviderConfig, flavor: ChatFlavor) -> Result<Self> {
        let api_key_str = config
            .api_key
            .or_else(|| std::env::var(flavor.api_key_env()).ok())
            .ok_or_else(|| {
                HireflowError::Config(format!(
                    "{} API key not found. Set {} env var or provide in config",
                    flavor.name(),
                    flavor.api_key_env()
                ))
            })?;

        let api_base = config
            .api_base
            .unwrap_or_else(|| flavor.default_api_base().to_string())
            .trim_end_matches('/')
            .to_string();

        let model = config
            .model
            .unwrap_or_else(|| flavor.default_model().to_string());

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| HireflowError::LlmApi(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            flavor,
            api_key: SecretString::from(api_key_str),
            api_base,
            model,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            client,
        })
    }

    fn build_request(&self, system: Option<&str>, prompt: &str) -> ChatCompletionRequest {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: system.to_string(),
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: prompt.to_string(),
        });

        ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
            max_tokens: Some(self.max_tokens),
        }
    }
}

#[async_trait]
impl LlmProvider for ChatCompletionsProvider {
    async fn complete(&self, system: Option<&str>, prompt: &str) -> Result<LlmResponse> {
        let provider = self.flavor.name();
        debug!(
            "Calling {} (model: {}, temperature: {})",
            provider, self.model, self.temperature
        );

        let start_time = Instant::now();
        let request = self.build_request(system, prompt);
        let url = format!("{}/chat/completions", self.api_base);

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| ErrorClassifier::classify(&format!("request failed: {}", e), provider))?;

        let elapsed = start_time.elapsed();

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ErrorClassifier::classify_http_status(
                status.as_u16(),
                &format!("API error ({}): {}", status, body),
                provider,
            )
            .into());
        }

        let response_body: ChatCompletionResponse = response.json().await.map_err(|e| {
            ErrorClassifier::classify(&format!("failed to decode json response: {}", e), provider)
        })?;

        let usage = response_body
            .usage
            .map(|u| TokenUsage::from_openai(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        let text = response_body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| HireflowError::LlmApi(format!("No content in {} response", provider)))?;

        debug!(
            "{} replied in {}ms (+{} prompt, +{} completion tokens)",
            provider,
            elapsed.as_millis(),
            usage.input_tokens,
            usage.output_tokens
        );

        Ok(LlmResponse::with_metrics(
            text,
            usage,
            ResponseTiming::from_duration(elapsed),
            ResponseMetadata {
                model: self.model.clone(),
                provider: provider.to_string(),
            },
        ))
    }

    fn name(&self) -> &str {
        self.flavor.name()
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    usage: Option<UsageInfo>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsageInfo {
    prompt_tokens: u32,
    completion_tokens: u32,
}
