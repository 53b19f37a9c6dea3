//! Validator
//!
//! Lenient accept/reject gate on the Interviewer's reply. Ambiguous model
//! output counts as approval.

use super::{AgentStep, StepContext};
use crate::ai::validation::is_unparsed;
use crate::engine::prompts::{VALIDATOR_SYSTEM, validator_prompt};
use crate::types::{Agent, ConversationState, Result, json_bool};

#[derive(Default)]
pub struct Validator;

#[async_trait::async_trait]
impl AgentStep for Validator {
    fn name(&self) -> &'static str {
        "validator"
    }

    async fn run(&self, ctx: &StepContext, state: &mut ConversationState) -> Result<()> {
        state.validation_attempts += 1;

        if state.interviewer_response.trim().is_empty() {
            state.validator_approved = false;
            tracing::info!(
                "Reply rejected: empty (attempt {})",
                state.validation_attempts
            );
            return Ok(());
        }

        let prompt = validator_prompt(
            &state.interviewer_response,
            state.observer_instructions.as_ref(),
        );
        let reply = ctx
            .ask_into(state, Agent::Validator, VALIDATOR_SYSTEM, &prompt)
            .await?;

        state.validator_approved =
            is_unparsed(&reply.record) || json_bool(&reply.record, "approved", true);

        if state.validator_approved {
            tracing::debug!("Reply approved");
        } else {
            tracing::info!("Reply rejected (attempt {})", state.validation_attempts);
        }
        Ok(())
    }
}
