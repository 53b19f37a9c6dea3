//! Orchestrator
//!
//! Greets the candidate, then extracts profile facts from recent messages
//! until the profile is complete. Never overwrites known facts with blanks.

use serde_json::Value;

use super::{AgentStep, StepContext};
use crate::constants::texts::{GREETING, PROFILE_FALLBACK_QUESTION, TECHNICAL_START, TELL_ME_MORE};
use crate::engine::prompts::{ORCHESTRATOR_SYSTEM, orchestrator_prompt};
use crate::types::{Agent, ConversationState, ProfileUpdate, Record, Result, json_bool};

#[derive(Default)]
pub struct Orchestrator;

#[async_trait::async_trait]
impl AgentStep for Orchestrator {
    fn name(&self) -> &'static str {
        "orchestrator"
    }

    async fn run(&self, ctx: &StepContext, state: &mut ConversationState) -> Result<()> {
        if !state.has_user_messages() {
            state.interviewer_response = GREETING.to_string();
            state.push_assistant(GREETING);
            state.think(Agent::Orchestrator, "Interview started, greeting sent");
            return Ok(());
        }

        if state.candidate_profile.is_complete() {
            return Ok(());
        }

        let prompt = orchestrator_prompt(
            state.recent_messages(ctx.config.context_messages),
            &state.candidate_profile,
        );
        let reply = ctx
            .ask_into(state, Agent::Orchestrator, ORCHESTRATOR_SYSTEM, &prompt)
            .await?;

        state
            .candidate_profile
            .merge(ProfileUpdate::from_record(&reply.record));
        state.think(
            Agent::Orchestrator,
            format!("Profile: {}", state.candidate_profile.label()),
        );

        if state.candidate_profile.is_complete() {
            tracing::info!("Candidate profile complete: {}", state.candidate_profile.label());
            return Ok(());
        }

        let message = if json_bool(&reply.record, "ready_for_technical", false) {
            TECHNICAL_START.to_string()
        } else {
            missing_info_question(&reply.record)
        };
        state.interviewer_response = message.clone();
        state.push_assistant(message);
        Ok(())
    }
}

/// Question for the first missing fact the model listed
fn missing_info_question(record: &Record) -> String {
    match record.get("missing_info") {
        Some(Value::Array(items)) if !items.is_empty() => match &items[0] {
            Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
            _ => TELL_ME_MORE.to_string(),
        },
        Some(Value::Array(_)) | Some(Value::Null) | None => PROFILE_FALLBACK_QUESTION.to_string(),
        Some(Value::Bool(false)) => PROFILE_FALLBACK_QUESTION.to_string(),
        Some(Value::String(s)) if s.is_empty() => PROFILE_FALLBACK_QUESTION.to_string(),
        Some(_) => TELL_ME_MORE.to_string(),
    }
}
