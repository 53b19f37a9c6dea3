//! Interview Agents
//!
//! Each workflow step is a unit struct implementing [`AgentStep`]. Steps read
//! and update the conversation state in place; model access goes through
//! [`StepContext`] so every call is metered the same way.

pub mod experts;
pub mod finalizer;
pub mod interviewer;
pub mod observer;
pub mod orchestrator;
pub mod validator;

pub use experts::ExpertPool;
pub use finalizer::Finalizer;
pub use interviewer::Interviewer;
pub use observer::Observer;
pub use orchestrator::Orchestrator;
pub use validator::Validator;

use crate::ai::metrics::SharedMetrics;
use crate::ai::provider::{LlmResponse, SharedProvider};
use crate::ai::validation::extract_record;
use crate::config::InterviewConfig;
use crate::constants::context::LOG_PREVIEW_CHARS;
use crate::types::{Agent, ConversationState, Record, Result, truncate_chars};

/// Shared resources for the steps of one turn
#[derive(Clone)]
pub struct StepContext {
    pub provider: SharedProvider,
    pub metrics: SharedMetrics,
    pub config: InterviewConfig,
}

/// Parsed model answer together with its usage
pub struct ModelReply {
    pub record: Record,
    pub response: LlmResponse,
}

impl StepContext {
    /// One metered model call; the reply is always a record (possibly the sentinel)
    pub async fn ask(&self, agent: Agent, system: &str, prompt: &str) -> Result<ModelReply> {
        tracing::debug!(agent = %agent, "calling model");
        let response = self.provider.complete(Some(system), prompt).await?;
        self.metrics.record_call(agent, &response);
        tracing::debug!(
            agent = %agent,
            tokens = response.usage.total(),
            latency_ms = response.timing.total_ms,
            "model replied: {}",
            truncate_chars(&response.text, LOG_PREVIEW_CHARS)
        );

        Ok(ModelReply {
            record: extract_record(&response.text),
            response,
        })
    }

    /// [`ask`](Self::ask) that also folds usage into the session totals
    pub async fn ask_into(
        &self,
        state: &mut ConversationState,
        agent: Agent,
        system: &str,
        prompt: &str,
    ) -> Result<ModelReply> {
        let reply = self.ask(agent, system, prompt).await?;
        state.metrics.record_response(&reply.response);
        Ok(reply)
    }
}

/// Trait for workflow steps
#[async_trait::async_trait]
pub trait AgentStep: Send + Sync {
    /// Step name
    fn name(&self) -> &'static str;

    /// Run the step against the state
    async fn run(&self, ctx: &StepContext, state: &mut ConversationState) -> Result<()>;
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use super::StepContext;
    use crate::ai::metrics::create_shared_metrics;
    use crate::ai::provider::testing::ScriptedProvider;
    use crate::config::InterviewConfig;

    pub fn context(provider: Arc<ScriptedProvider>) -> StepContext {
        StepContext {
            provider,
            metrics: create_shared_metrics("test"),
            config: InterviewConfig::default(),
        }
    }
}
