//! Interview Engine
//!
//! Multi-agent workflow that turns one candidate message into one interviewer
//! reply (or the final report). The engine is stateless between turns: the
//! caller owns the [`ConversationState`] and hands it in for every turn.
//!
//! ## Steps
//!
//! - Orchestrator: greeting and profile extraction
//! - Expert Pool: technical, fact-check and soft-skills assessors (concurrent)
//! - Observer: hidden guidance for the interviewer
//! - Interviewer: the visible reply, one question at most
//! - Validator: lenient quality gate with a bounded retry loop
//! - Finalizer: closing report

pub mod agents;
pub mod prompts;
pub mod workflow;

pub use agents::{AgentStep, ModelReply, StepContext};
pub use workflow::{Step, TurnExit};

use crate::ai::metrics::{SharedMetrics, create_shared_metrics};
use crate::ai::provider::SharedProvider;
use crate::config::InterviewConfig;
use crate::types::{ConversationState, Result};

/// Runs turns against a provider; one instance serves all sessions
pub struct InterviewEngine {
    ctx: StepContext,
}

impl InterviewEngine {
    pub fn new(provider: SharedProvider, config: InterviewConfig) -> Self {
        Self::with_metrics(provider, config, create_shared_metrics("hireflow"))
    }

    pub fn with_metrics(
        provider: SharedProvider,
        config: InterviewConfig,
        metrics: SharedMetrics,
    ) -> Self {
        Self {
            ctx: StepContext {
                provider,
                metrics,
                config,
            },
        }
    }

    pub fn metrics(&self) -> &SharedMetrics {
        &self.ctx.metrics
    }

    pub fn config(&self) -> &InterviewConfig {
        &self.ctx.config
    }

    /// Run one turn; the input state is consumed, the updated state returned
    pub async fn run_turn(&self, state: ConversationState) -> Result<ConversationState> {
        self.run_turn_with_exit(state).await.map(|(state, _)| state)
    }

    /// [`run_turn`](Self::run_turn) that also reports how the turn ended
    pub async fn run_turn_with_exit(
        &self,
        mut state: ConversationState,
    ) -> Result<(ConversationState, TurnExit)> {
        let exit = workflow::run(&self.ctx, &mut state).await?;
        tracing::info!(
            ?exit,
            messages = state.conversation_history.len(),
            tokens = state.metrics.total_tokens,
            "Turn finished"
        );
        Ok((state, exit))
    }
}
