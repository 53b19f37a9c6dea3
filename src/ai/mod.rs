//! AI Integration Layer
//!
//! LLM provider abstraction, structured-response extraction, and usage metrics.

pub mod metrics;
pub mod provider;
pub mod validation;

pub use metrics::{
    AgentMetrics, MetricsCollector, MetricsSummary, SharedMetrics, TurnMetrics,
    create_shared_metrics,
};
pub use provider::{
    ChatCompletionsProvider, ChatFlavor, ErrorCategory, ErrorClassifier, LlmError, LlmProvider,
    LlmResponse, ProviderConfig, ResponseMetadata, ResponseTiming, SharedProvider, TokenUsage,
    create_provider,
};
pub use validation::{extract_record, is_unparsed};
