//! Interviewer
//!
//! Produces the single visible reply of a turn. Whatever the model returns,
//! the stored reply and question each carry at most one question.

use regex::Regex;
use std::sync::LazyLock;

use super::{AgentStep, StepContext};
use crate::ai::validation::{is_unparsed, raw_response};
use crate::constants::context::INTERVIEWER_ANSWER_CHARS;
use crate::constants::texts::INTERVIEWER_FALLBACK;
use crate::engine::prompts::{INTERVIEWER_SYSTEM, interviewer_prompt};
use crate::types::{
    Agent, ConversationState, ObserverInstructions, Record, Result, json_bool, json_string,
    truncate_chars,
};

/// Whole words only, with plural and Russian case endings
static COMPANY_KEYWORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:compan(?:y|ies)|teams?|vacanc(?:y|ies)|roles?|компани\w*|команд\w*|ваканси\w*)\b")
        .expect("valid regex")
});

#[derive(Default)]
pub struct Interviewer;

/// Keyword check for questions about the company, team, or role
pub fn is_company_question(message: &str) -> bool {
    COMPANY_KEYWORDS.is_match(message)
}

/// Cut text with several questions down to the first one
pub fn keep_first_question(text: &str) -> String {
    if text.matches('?').count() > 1
        && let Some(end) = text.find('?')
    {
        return text[..=end].trim().to_string();
    }
    text.to_string()
}

/// Visible reply from model output
fn reply_text(record: &Record) -> String {
    if is_unparsed(record) {
        return match raw_response(record).map(str::trim) {
            Some(raw) if !raw.is_empty() && !raw.contains('{') && !raw.contains('}') => {
                raw.to_string()
            }
            _ => INTERVIEWER_FALLBACK.to_string(),
        };
    }
    json_string(record, "response").unwrap_or_else(|| INTERVIEWER_FALLBACK.to_string())
}

#[async_trait::async_trait]
impl AgentStep for Interviewer {
    fn name(&self) -> &'static str {
        "interviewer"
    }

    async fn run(&self, ctx: &StepContext, state: &mut ConversationState) -> Result<()> {
        let answer = truncate_chars(
            state.last_user_message().unwrap_or(""),
            INTERVIEWER_ANSWER_CHARS,
        )
        .to_string();
        let company_question = is_company_question(&answer);
        let instructions = state.observer_instructions.clone().unwrap_or_default();

        let prompt = interviewer_prompt(
            &state.candidate_profile,
            &instructions,
            company_question,
            &answer,
        );
        let reply = ctx
            .ask_into(state, Agent::Interviewer, INTERVIEWER_SYSTEM, &prompt)
            .await?;

        if company_question && !json_bool(&reply.record, "is_company_question", false) {
            state.think(
                Agent::HrAgent,
                "Candidate asked about the company. Answering as HR first, then back to technical questions.",
            );
        }
        let note = summary(state, &instructions);
        state.think(Agent::Interviewer, note);

        let full = reply_text(&reply.record);
        let response = keep_first_question(&full);
        if response != full {
            tracing::debug!("Several questions in reply, kept the first");
        }
        let question = json_string(&reply.record, "question")
            .map(|q| keep_first_question(&q))
            .unwrap_or_default();

        state.interviewer_response = response;
        state.current_question = question;
        Ok(())
    }
}

fn summary(state: &ConversationState, instructions: &ObserverInstructions) -> String {
    let profile = &state.candidate_profile;
    format!(
        "Reply drafted. Profile: {} ({}). Sentiment: {}, Difficulty: {}. Warning handled: {}",
        profile.name,
        profile.grade,
        instructions.sentiment,
        instructions.difficulty_adjustment,
        instructions.warning_present
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::testing::ScriptedProvider;
    use crate::engine::agents::test_support::context;
    use std::sync::Arc;

    const MARKER: &str = "friendly technical interviewer";

    #[test]
    fn test_keep_first_question() {
        assert_eq!(
            keep_first_question("What languages do you use? And how long?"),
            "What languages do you use?"
        );
        assert_eq!(keep_first_question("Nice. Why?"), "Nice. Why?");
        assert_eq!(keep_first_question("No question."), "No question.");
    }

    #[test]
    fn test_company_keywords() {
        assert!(is_company_question("What does the TEAM work on?"));
        assert!(is_company_question("Расскажите о компании"));
        assert!(!is_company_question("I used asyncio"));
        assert!(is_company_question("Which roles are open?"));
        assert!(is_company_question("Tell me about the vacancies"));
        assert!(is_company_question("Какая команда?"));
    }

    #[test]
    fn test_company_keywords_ignore_partial_words() {
        assert!(!is_company_question("I cached results on Steam"));
        assert!(!is_company_question("The parole service used Django"));
        assert!(!is_company_question("I ran a steamroller migration"));
    }

    #[tokio::test]
    async fn test_truncates_question_and_reply() {
        let provider = Arc::new(ScriptedProvider::new().respond(
            MARKER,
            r#"{"response": "Good. What languages do you use? And how long?", "question": "What languages do you use? And how long?"}"#,
        ));
        let ctx = context(provider);
        let mut state = ConversationState::new();
        state.push_user("I write code");

        Interviewer.run(&ctx, &mut state).await.unwrap();

        assert_eq!(state.current_question, "What languages do you use?");
        assert_eq!(
            state.interviewer_response,
            "Good. What languages do you use?"
        );
    }

    #[tokio::test]
    async fn test_prose_reply_is_used_verbatim() {
        let provider = Arc::new(
            ScriptedProvider::new().respond(MARKER, "Tell me about decorators in Python."),
        );
        let ctx = context(provider);
        let mut state = ConversationState::new();
        state.push_user("ok");

        Interviewer.run(&ctx, &mut state).await.unwrap();

        assert_eq!(
            state.interviewer_response,
            "Tell me about decorators in Python."
        );
        assert!(state.current_question.is_empty());
    }

    #[tokio::test]
    async fn test_broken_json_uses_fallback() {
        let provider = Arc::new(ScriptedProvider::new().respond(MARKER, "{\"response\": "));
        let ctx = context(provider);
        let mut state = ConversationState::new();
        state.push_user("ok");

        Interviewer.run(&ctx, &mut state).await.unwrap();

        assert_eq!(state.interviewer_response, INTERVIEWER_FALLBACK);
    }

    #[tokio::test]
    async fn test_company_question_adds_hr_thought() {
        let provider = Arc::new(
            ScriptedProvider::new().respond(MARKER, r#"{"response": "We build payments. Next?"}"#),
        );
        let ctx = context(provider);
        let mut state = ConversationState::new();
        state.push_user("What does your company do?");

        Interviewer.run(&ctx, &mut state).await.unwrap();

        let agents: Vec<Agent> = state.internal_thoughts.iter().map(|t| t.agent).collect();
        assert_eq!(agents, vec![Agent::HrAgent, Agent::Interviewer]);
    }
}
