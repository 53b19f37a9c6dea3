//! Error types for the engine and the session layer.
//!
//! Malformed model output is never an error here: the extractor recovers it
//! locally with a sentinel record. What does surface is a provider failure
//! during a turn, a missing session, bad configuration, or a runaway workflow.
//! Provider failures carry an [`ErrorCategory`] so the front-end can tell the
//! candidate whether repeating the turn makes sense.

use thiserror::Error;

/// Why a provider call failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    RateLimit,
    Auth,
    Network,
    Unavailable,
    BadRequest,
    /// Provider envelope could not be decoded
    ParseError,
    /// 5xx from the provider
    Transient,
    Unknown,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RateLimit => "rate_limit",
            Self::Auth => "auth",
            Self::Network => "network",
            Self::Unavailable => "unavailable",
            Self::BadRequest => "bad_request",
            Self::ParseError => "parse_error",
            Self::Transient => "transient",
            Self::Unknown => "unknown",
        }
    }

    /// Whether repeating the same turn may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimit | Self::Network | Self::Transient | Self::ParseError | Self::Unavailable
        )
    }

    /// Short explanation suitable for the person being interviewed
    pub fn candidate_hint(&self) -> &'static str {
        match self {
            Self::RateLimit => "The interviewer is handling too many requests. Wait a moment.",
            Self::Network => "The interviewer could not be reached.",
            Self::Transient | Self::Unavailable => "The interviewer is temporarily unavailable.",
            Self::ParseError => "The interviewer's reply was garbled in transit.",
            Self::Auth => "The interview service is not authorized. Check the API key.",
            Self::BadRequest | Self::Unknown => "The interview service rejected the request.",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of one LLM call
#[derive(Debug, Clone, Error)]
#[error("{provider} ({category}): {message}")]
pub struct LlmError {
    pub provider: String,
    pub category: ErrorCategory,
    pub message: String,
}

impl LlmError {
    pub fn new(
        provider: impl Into<String>,
        category: ErrorCategory,
        message: impl Into<String>,
    ) -> Self {
        Self {
            provider: provider.into(),
            category,
            message: message.into(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.category.is_retryable()
    }
}

/// Keyword rules for transport messages, checked in order
const MESSAGE_RULES: &[(&[&str], ErrorCategory)] = &[
    (&["rate limit", "429", "too many requests"], ErrorCategory::RateLimit),
    (&["401", "403", "api key", "unauthorized"], ErrorCategory::Auth),
    (
        &["connection", "dns", "timeout", "timed out", "unreachable"],
        ErrorCategory::Network,
    ),
    (&["502", "503", "service unavailable"], ErrorCategory::Unavailable),
    (&["decode", "json"], ErrorCategory::ParseError),
];

/// Maps provider failures onto categories
pub struct ErrorClassifier;

impl ErrorClassifier {
    /// Classify a transport-level failure by its message
    pub fn classify(message: &str, provider: &str) -> LlmError {
        let lower = message.to_lowercase();
        let category = MESSAGE_RULES
            .iter()
            .find(|(needles, _)| needles.iter().any(|n| lower.contains(n)))
            .map(|(_, category)| *category)
            .unwrap_or(ErrorCategory::Unknown);
        LlmError::new(provider, category, message)
    }

    /// Classify a non-success HTTP status
    pub fn classify_http_status(status: u16, message: &str, provider: &str) -> LlmError {
        let category = match status {
            429 => ErrorCategory::RateLimit,
            401 | 403 => ErrorCategory::Auth,
            400 | 422 => ErrorCategory::BadRequest,
            404 => ErrorCategory::Unavailable,
            500..=599 => ErrorCategory::Transient,
            _ => ErrorCategory::Unknown,
        };
        LlmError::new(provider, category, message)
    }
}

#[derive(Debug, Error)]
pub enum HireflowError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Provider misbehaved outside of any HTTP status (client setup, empty choices)
    #[error("LLM API error: {0}")]
    LlmApi(String),

    /// A turn exceeded its step budget
    #[error("Workflow error at step {step}: {message}")]
    Workflow { step: String, message: String },

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Session already exists: {0}")]
    SessionExists(String),

    /// Id cannot be used as part of a log file name
    #[error("Invalid session id: {0:?}")]
    InvalidSessionId(String),

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, HireflowError>;

impl HireflowError {
    pub fn workflow(step: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Workflow {
            step: step.into(),
            message: message.into(),
        }
    }

    fn category(&self) -> Option<ErrorCategory> {
        match self {
            Self::Llm(e) => Some(e.category),
            Self::LlmApi(msg) => Some(ErrorClassifier::classify(msg, "unknown").category),
            _ => None,
        }
    }

    /// Whether the candidate can retry the same turn
    pub fn is_recoverable(&self) -> bool {
        self.category().is_some_and(|c| c.is_retryable())
    }

    /// Message for the candidate when a provider call failed
    pub fn candidate_hint(&self) -> Option<&'static str> {
        self.category().map(|c| c.candidate_hint())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_http_status() {
        let rate_limit = ErrorClassifier::classify_http_status(429, "Rate limited", "mistral");
        assert_eq!(rate_limit.category, ErrorCategory::RateLimit);

        let auth = ErrorClassifier::classify_http_status(401, "Unauthorized", "mistral");
        assert_eq!(auth.category, ErrorCategory::Auth);
        assert!(!auth.is_retryable());

        let overloaded = ErrorClassifier::classify_http_status(529, "Overloaded", "mistral");
        assert_eq!(overloaded.category, ErrorCategory::Transient);
        assert!(overloaded.is_retryable());
    }

    #[test]
    fn test_classify_message_rules_in_order() {
        let err = ErrorClassifier::classify("Connection timed out after 30s", "mistral");
        assert_eq!(err.category, ErrorCategory::Network);

        // "429" wins over the later "json" rule
        let err = ErrorClassifier::classify("429 while reading json", "openai");
        assert_eq!(err.category, ErrorCategory::RateLimit);

        let err = ErrorClassifier::classify("something odd", "openai");
        assert_eq!(err.category, ErrorCategory::Unknown);
    }

    #[test]
    fn test_recoverable_and_hint() {
        let err: HireflowError =
            LlmError::new("mistral", ErrorCategory::Transient, "server hiccup").into();
        assert!(err.is_recoverable());
        assert_eq!(
            err.candidate_hint(),
            Some("The interviewer is temporarily unavailable.")
        );

        let missing = HireflowError::SessionNotFound("s1".into());
        assert!(!missing.is_recoverable());
        assert!(missing.candidate_hint().is_none());

        let auth: HireflowError = LlmError::new("mistral", ErrorCategory::Auth, "bad key").into();
        assert!(!auth.is_recoverable());
        assert!(auth.candidate_hint().is_some());
    }

    #[test]
    fn test_llm_error_display() {
        let err = LlmError::new("mistral", ErrorCategory::RateLimit, "Too many requests");
        assert_eq!(err.to_string(), "mistral (rate_limit): Too many requests");
    }
}
