//! Observer
//!
//! Turns expert findings into hidden instructions for the Interviewer.
//! The warning flag and difficulty are derived from the experts, not the model.

use serde_json::json;

use super::{AgentStep, StepContext};
use crate::constants::scoring::DIFFICULTY_INCREASE_THRESHOLD;
use crate::engine::prompts::{OBSERVER_SYSTEM, ObserverBrief, observer_prompt};
use crate::types::{
    Agent, ConversationState, DifficultyAdjustment, ExpertAnalysis, InternalThought,
    ObserverInstructions, Record, Result,
};

#[derive(Default)]
pub struct Observer;

/// Increase only for an actual numeric score at or above the threshold
pub fn difficulty_for(analysis: &ExpertAnalysis) -> DifficultyAdjustment {
    match analysis.technical().and_then(|t| t.technical_accuracy) {
        Some(score) if score >= DIFFICULTY_INCREASE_THRESHOLD => DifficultyAdjustment::Increase,
        _ => DifficultyAdjustment::Maintain,
    }
}

#[async_trait::async_trait]
impl AgentStep for Observer {
    fn name(&self) -> &'static str {
        "observer"
    }

    async fn run(&self, ctx: &StepContext, state: &mut ConversationState) -> Result<()> {
        let analysis = &state.expert_analysis;
        let technical = analysis.technical();
        let fact_check = analysis.fact_check();
        let soft_skills = analysis.soft_skills();

        let warning = fact_check.is_some_and(|f| f.warning);
        let difficulty = difficulty_for(analysis);
        let issues: Vec<String> = fact_check
            .map(|f| f.detected_issues.clone())
            .unwrap_or_default();

        let prompt = observer_prompt(&ObserverBrief {
            technical_accuracy: technical.and_then(|t| t.technical_accuracy),
            technical_notes: technical.map_or("", |t| t.notes.as_str()),
            warning,
            issues: &issues,
            communication_score: soft_skills.and_then(|s| s.communication_score),
            observations: soft_skills.map_or("", |s| s.observations.as_str()),
            answer: state.last_user_message().unwrap_or(""),
        });

        let reply = ctx
            .ask_into(state, Agent::Observer, OBSERVER_SYSTEM, &prompt)
            .await?;
        let instructions = ObserverInstructions::from_record(&reply.record, warning, difficulty);

        let mut thought = format!(
            "[SENTIMENT: {}] {} [GUIDANCE: {}]",
            instructions.sentiment,
            instructions.hidden_instructions,
            if instructions.guidance.is_empty() {
                "none"
            } else {
                &instructions.guidance
            }
        );
        if warning {
            let shown: Vec<&str> = issues.iter().take(2).map(String::as_str).collect();
            thought.push_str(&format!(" [WARNING: {}]", shown.join(", ")));
        }

        let mut details = Record::new();
        details.insert("sentiment".into(), json!(instructions.sentiment));
        details.insert("guidance".into(), json!(instructions.guidance));
        details.insert("warning".into(), json!(warning));

        state
            .internal_thoughts
            .push(InternalThought::new(Agent::Observer, thought).with_details(details));
        state.observer_instructions = Some(instructions);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::testing::ScriptedProvider;
    use crate::engine::agents::test_support::context;
    use crate::types::{Analysis, FactCheck, TechnicalAssessment};
    use std::sync::Arc;

    fn analysis(score: Option<f64>, warning: bool) -> ExpertAnalysis {
        ExpertAnalysis {
            python_specialist: Some(Analysis::Completed {
                result: TechnicalAssessment {
                    technical_accuracy: score,
                    ..Default::default()
                },
            }),
            fact_checker: Some(Analysis::Completed {
                result: FactCheck {
                    warning,
                    detected_issues: vec!["a".into(), "b".into(), "c".into()],
                    ..Default::default()
                },
            }),
            hr_agent: None,
        }
    }

    #[test]
    fn test_difficulty_threshold() {
        assert_eq!(
            difficulty_for(&analysis(Some(8.0), false)),
            DifficultyAdjustment::Increase
        );
        assert_eq!(
            difficulty_for(&analysis(Some(7.9), false)),
            DifficultyAdjustment::Maintain
        );
        assert_eq!(
            difficulty_for(&analysis(None, false)),
            DifficultyAdjustment::Maintain
        );
        assert_eq!(
            difficulty_for(&ExpertAnalysis::default()),
            DifficultyAdjustment::Maintain
        );
    }

    #[tokio::test]
    async fn test_model_cannot_override_derived_fields() {
        let provider = Arc::new(ScriptedProvider::new().respond(
            "interview mentor",
            r#"{"sentiment": "positive", "hidden_instructions": "Go deeper", "warning_present": false, "difficulty_adjustment": "maintain"}"#,
        ));
        let ctx = context(provider);
        let mut state = ConversationState::new();
        state.push_user("asyncio uses threads");
        state.expert_analysis = analysis(Some(9.0), true);

        Observer.run(&ctx, &mut state).await.unwrap();

        let instructions = state.observer_instructions.as_ref().unwrap();
        assert!(instructions.warning_present);
        assert_eq!(
            instructions.difficulty_adjustment,
            DifficultyAdjustment::Increase
        );
        let thought = &state.internal_thoughts[0];
        assert_eq!(thought.agent, Agent::Observer);
        assert_eq!(
            thought.thought,
            "[SENTIMENT: positive] Go deeper [GUIDANCE: none] [WARNING: a, b]"
        );
        assert_eq!(thought.details["warning"], true);
    }

    #[tokio::test]
    async fn test_unparseable_reply_uses_defaults() {
        let provider = Arc::new(ScriptedProvider::new().respond("interview mentor", "hmm"));
        let ctx = context(provider);
        let mut state = ConversationState::new();
        state.push_user("answer");

        Observer.run(&ctx, &mut state).await.unwrap();

        let instructions = state.observer_instructions.unwrap();
        assert_eq!(instructions.sentiment, "neutral");
        assert!(!instructions.warning_present);
        assert_eq!(state.metrics.calls(), 1);
    }
}
