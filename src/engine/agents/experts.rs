//! Expert Pool
//!
//! Runs the three assessors concurrently against the latest answer. Each one
//! writes only its own slot of [`ExpertAnalysis`]; results and metrics are
//! merged once every call has returned.

use super::{AgentStep, StepContext};
use crate::constants::context::HR_AGENT_MESSAGES;
use crate::constants::placeholders::{NO_ANSWERS, NO_CLAIMS, NO_SOFT_SKILLS};
use crate::engine::prompts::{
    FACT_CHECKER_SYSTEM, HR_AGENT_SYSTEM, PYTHON_SPECIALIST_SYSTEM, fact_check_prompt,
    soft_skills_prompt, technical_prompt,
};
use crate::types::{
    Agent, Analysis, ConversationState, ExpertAnalysis, FactCheck, Result, SoftSkillsAssessment,
    TechnicalAssessment,
};

#[derive(Default)]
pub struct ExpertPool;

#[async_trait::async_trait]
impl AgentStep for ExpertPool {
    fn name(&self) -> &'static str {
        "expert_pool"
    }

    async fn run(&self, ctx: &StepContext, state: &mut ConversationState) -> Result<()> {
        let answer = match state.last_user_message() {
            Some(a) if !a.trim().is_empty() => a.to_string(),
            _ => {
                state.expert_analysis = ExpertAnalysis {
                    python_specialist: Some(Analysis::skipped(NO_ANSWERS)),
                    fact_checker: Some(Analysis::skipped(NO_CLAIMS)),
                    hr_agent: Some(Analysis::skipped(NO_SOFT_SKILLS)),
                };
                return Ok(());
            }
        };

        let technical = technical_prompt(&answer);
        let fact_check = fact_check_prompt(&answer);
        let soft_skills = soft_skills_prompt(state.recent_messages(HR_AGENT_MESSAGES));

        let (tech_result, fact_result, hr_result) = tokio::join!(
            ctx.ask(Agent::PythonSpecialist, PYTHON_SPECIALIST_SYSTEM, &technical),
            ctx.ask(Agent::FactChecker, FACT_CHECKER_SYSTEM, &fact_check),
            ctx.ask(Agent::HrAgent, HR_AGENT_SYSTEM, &soft_skills),
        );
        let (tech, fact, hr) = (tech_result?, fact_result?, hr_result?);

        for reply in [&tech, &fact, &hr] {
            state.metrics.record_response(&reply.response);
        }

        let technical = TechnicalAssessment::from_record(&tech.record);
        let fact_check = FactCheck::from_record(&fact.record);
        let soft_skills = SoftSkillsAssessment::from_record(&hr.record);

        tracing::debug!(
            score = ?technical.technical_accuracy,
            warning = fact_check.warning,
            communication = ?soft_skills.communication_score,
            "Expert pool complete"
        );

        state.expert_analysis = ExpertAnalysis {
            python_specialist: Some(Analysis::Completed { result: technical }),
            fact_checker: Some(Analysis::Completed { result: fact_check }),
            hr_agent: Some(Analysis::Completed {
                result: soft_skills,
            }),
        };
        Ok(())
    }
}
