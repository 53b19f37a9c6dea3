//! Finalizer
//!
//! Writes the closing report. Always leaves a report behind: unparseable
//! output gets a brace-scan second pass, then the deterministic fallback.

use super::{AgentStep, StepContext};
use crate::ai::validation::{extract_braced_record, is_unparsed, raw_response};
use crate::engine::prompts::{FINAL_REPORT_SYSTEM, final_report_prompt};
use crate::types::{Agent, ConversationState, FinalReport, Result};

#[derive(Default)]
pub struct Finalizer;

#[async_trait::async_trait]
impl AgentStep for Finalizer {
    fn name(&self) -> &'static str {
        "finalizer"
    }

    async fn run(&self, ctx: &StepContext, state: &mut ConversationState) -> Result<()> {
        tracing::info!("Generating final report");
        let prompt = final_report_prompt(state);
        let reply = ctx
            .ask_into(state, Agent::Finalizer, FINAL_REPORT_SYSTEM, &prompt)
            .await?;

        let record = if is_unparsed(&reply.record) {
            raw_response(&reply.record).and_then(extract_braced_record)
        } else {
            Some(reply.record)
        };

        let report = match record {
            Some(record) => FinalReport::from_record(&record),
            None => {
                tracing::warn!("Final report could not be parsed, using fallback");
                FinalReport::fallback()
            }
        };

        state.think(
            Agent::Finalizer,
            format!("Final report ready. Grade: {}", report.grade()),
        );
        state.final_report = Some(report);
        state.is_complete = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::testing::ScriptedProvider;
    use crate::engine::agents::test_support::context;
    use crate::types::{ErrorCategory, HireflowError};
    use std::sync::Arc;

    const MARKER: &str = "hiring committee";

    async fn finalize(model_reply: &str) -> ConversationState {
        let provider = Arc::new(ScriptedProvider::new().respond(MARKER, model_reply));
        let ctx = context(provider);
        let mut state = ConversationState::new();
        state.push_assistant("Hello");
        state.push_user("stop interview");
        Finalizer.run(&ctx, &mut state).await.unwrap();
        state
    }

    fn top_level_keys(state: &ConversationState) -> serde_json::Value {
        serde_json::to_value(state.final_report.as_ref().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_prose_yields_fallback_with_all_sections() {
        let state = finalize("The candidate did well overall.").await;

        assert!(state.is_complete);
        let report = state.final_report.as_ref().unwrap();
        assert!(report.is_fallback());
        let value = top_level_keys(&state);
        for key in ["decision", "skills_matrix", "knowledge_gaps", "roadmap"] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert_eq!(value["decision"]["hiring_recommendation"], "no_hire");
    }

    #[tokio::test]
    async fn test_brace_scan_second_pass() {
        // inline fence marker defeats the first pass
        let state = finalize(r#"Report: {"decision": {"grade": "Middle"}```}"#).await;

        let report = state.final_report.unwrap();
        assert!(!report.is_fallback());
        assert_eq!(report.grade(), "Middle");
    }

    #[tokio::test]
    async fn test_partial_report_is_normalized() {
        let state = finalize(r#"{"summary": "Strong async knowledge"}"#).await;

        let value = top_level_keys(&state);
        assert_eq!(value["summary"], "Strong async knowledge");
        assert!(value["knowledge_gaps"].as_array().unwrap().is_empty());
        assert!(value.get("roadmap").is_some());
    }

    #[tokio::test]
    async fn test_provider_failure_propagates() {
        let provider = Arc::new(ScriptedProvider::new().fail(MARKER, ErrorCategory::Network));
        let ctx = context(provider);
        let mut state = ConversationState::new();

        let err = Finalizer.run(&ctx, &mut state).await.unwrap_err();
        assert!(matches!(err, HireflowError::Llm(_)));
        assert!(!state.is_complete);
    }
}
