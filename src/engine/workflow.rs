//! Workflow Runner
//!
//! Drives one turn through the step graph:
//!
//! ```text
//! Orchestrator ──┬─> Orchestrator            (profile incomplete, nothing said)
//!                ├─> exit                    (profile incomplete, question asked)
//!                └─> ExpertPool ─> Observer ─> Interviewer ─> Validator
//!                                                 ^              │
//!                                                 └── retry ─────┤
//!                                   exit <── accepted / forced ──┤
//!                                   Finalizer <── complete ──────┘
//! ```

use std::fmt;

use super::agents::{
    AgentStep, ExpertPool, Finalizer, Interviewer, Observer, Orchestrator, StepContext, Validator,
};
use crate::types::{ConversationState, HireflowError, Result};

/// Nodes of the step graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Orchestrator,
    ExpertPool,
    Observer,
    Interviewer,
    Validator,
    Finalizer,
}

impl Step {
    fn agent(self) -> &'static dyn AgentStep {
        match self {
            Self::Orchestrator => &Orchestrator,
            Self::ExpertPool => &ExpertPool,
            Self::Observer => &Observer,
            Self::Interviewer => &Interviewer,
            Self::Validator => &Validator,
            Self::Finalizer => &Finalizer,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.agent().name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestratorRoute {
    Loop,
    Wait,
    ExpertPool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationRoute {
    Finalize,
    Accept,
    ForceAccept,
    Retry,
}

/// How a turn ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnExit {
    /// Orchestrator asked a question and waits for the candidate
    AwaitingUser,
    ReplyAccepted,
    /// Validation limit reached; the last reply was kept anyway
    ReplyForced,
    Completed,
    /// Interview already finished; state returned untouched
    AlreadyComplete,
}

pub fn route_orchestrator(state: &ConversationState) -> OrchestratorRoute {
    if state.candidate_profile.is_complete() {
        OrchestratorRoute::ExpertPool
    } else if state.awaits_user() {
        OrchestratorRoute::Wait
    } else {
        OrchestratorRoute::Loop
    }
}

pub fn route_validation(state: &ConversationState, max: u32) -> ValidationRoute {
    if state.is_complete {
        ValidationRoute::Finalize
    } else if state.validator_approved {
        ValidationRoute::Accept
    } else if state.validation_attempts >= max {
        ValidationRoute::ForceAccept
    } else {
        ValidationRoute::Retry
    }
}

/// Run one turn to an exit
pub async fn run(ctx: &StepContext, state: &mut ConversationState) -> Result<TurnExit> {
    if state.is_complete && state.final_report.is_some() {
        return Ok(TurnExit::AlreadyComplete);
    }

    let mut step = if state.is_complete {
        Step::Finalizer
    } else {
        Step::Orchestrator
    };
    let mut executed = 0usize;
    // Attempts are counted per turn; they only grow while the turn runs
    state.validation_attempts = 0;

    loop {
        executed += 1;
        if executed > ctx.config.max_workflow_steps {
            return Err(HireflowError::workflow(
                step.to_string(),
                format!(
                    "exceeded {} steps in one turn",
                    ctx.config.max_workflow_steps
                ),
            ));
        }

        tracing::debug!(step = %step, "step started");
        step.agent().run(ctx, state).await?;
        tracing::debug!(step = %step, "step finished");

        step = match step {
            Step::Orchestrator => {
                let route = route_orchestrator(state);
                tracing::debug!(?route, "orchestrator routing");
                match route {
                    OrchestratorRoute::Loop => Step::Orchestrator,
                    OrchestratorRoute::Wait => return Ok(TurnExit::AwaitingUser),
                    OrchestratorRoute::ExpertPool => Step::ExpertPool,
                }
            }
            Step::ExpertPool => Step::Observer,
            Step::Observer => Step::Interviewer,
            Step::Interviewer => Step::Validator,
            Step::Validator => {
                let route = route_validation(state, ctx.config.max_validation_attempts);
                tracing::debug!(
                    ?route,
                    attempt = state.validation_attempts,
                    "validation routing"
                );
                match route {
                    ValidationRoute::Finalize => Step::Finalizer,
                    ValidationRoute::Retry => Step::Interviewer,
                    ValidationRoute::Accept => {
                        commit_reply(state);
                        return Ok(TurnExit::ReplyAccepted);
                    }
                    ValidationRoute::ForceAccept => {
                        tracing::warn!(
                            "Validation limit reached after {} attempts, keeping last reply",
                            state.validation_attempts
                        );
                        commit_reply(state);
                        return Ok(TurnExit::ReplyForced);
                    }
                }
            }
            Step::Finalizer => return Ok(TurnExit::Completed),
        };
    }
}

/// Append the accepted reply as the assistant message of this turn
fn commit_reply(state: &mut ConversationState) {
    let reply = state.interviewer_response.clone();
    state.push_assistant(reply);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CandidateProfile;

    fn complete_profile() -> CandidateProfile {
        CandidateProfile {
            name: "Ada".into(),
            grade: "senior".into(),
            experience: "8 years".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_route_orchestrator() {
        let mut state = ConversationState::new();
        state.push_user("hi");
        assert_eq!(route_orchestrator(&state), OrchestratorRoute::Loop);

        state.push_assistant("Your name?");
        assert_eq!(route_orchestrator(&state), OrchestratorRoute::Wait);

        state.candidate_profile = complete_profile();
        assert_eq!(route_orchestrator(&state), OrchestratorRoute::ExpertPool);
    }

    #[test]
    fn test_route_validation() {
        let mut state = ConversationState::new();
        state.validation_attempts = 1;
        assert_eq!(route_validation(&state, 3), ValidationRoute::Retry);
        state.validation_attempts = 3;
        assert_eq!(route_validation(&state, 3), ValidationRoute::ForceAccept);

        state.validator_approved = true;
        assert_eq!(route_validation(&state, 3), ValidationRoute::Accept);

        state.validation_attempts = 1;
        state.is_complete = true;
        assert_eq!(route_validation(&state, 3), ValidationRoute::Finalize);
    }

    #[test]
    fn test_step_names() {
        assert_eq!(Step::ExpertPool.to_string(), "expert_pool");
        assert_eq!(Step::Finalizer.to_string(), "finalizer");
    }
}
