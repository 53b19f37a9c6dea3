//! Agent prompts.
//!
//! System instructions are fixed per agent; user prompts are assembled from
//! the conversation state with the context limits in [`crate::constants::context`].

use crate::constants::context::{
    EXPERT_ANSWER_CHARS, HR_AGENT_MESSAGE_CHARS, OBSERVER_ANSWER_CHARS, OBSERVER_MAX_ISSUES,
    OBSERVER_NOTES_CHARS,
};
use crate::types::{
    CandidateProfile, ConversationState, Message, ObserverInstructions, compact_json,
    truncate_chars,
};

pub const ORCHESTRATOR_SYSTEM: &str = r#"<ROLE>
You are the orchestrator of a technical interview. You extract facts about the candidate from the conversation.
</ROLE>

<OUTPUT>
Respond with a single JSON object:
{"name": "", "position": "", "grade": "junior|middle|senior", "experience": "", "skills": [], "tech_stack": [],
 "ready_for_technical": false, "missing_info": ["question to ask, most important first"], "reasoning": ""}
Leave unknown fields empty. Only facts the candidate stated.
</OUTPUT>"#;

pub const PYTHON_SPECIALIST_SYSTEM: &str = r#"<ROLE>
You are a senior Python engineer assessing the technical accuracy of a candidate's answer.
</ROLE>

<OUTPUT>
Respond with a single JSON object:
{"technical_accuracy": 0-10, "notes": "", "strengths": [], "weaknesses": []}
</OUTPUT>"#;

pub const FACT_CHECKER_SYSTEM: &str = r#"<ROLE>
You are a fact checker. You detect false or invented technical claims in a candidate's answer.
</ROLE>

<OUTPUT>
Respond with a single JSON object:
{"has_hallucinations": false, "warning": false, "detected_issues": []}
Set "warning" only when the candidate should be told about an inaccuracy.
</OUTPUT>"#;

pub const HR_AGENT_SYSTEM: &str = r#"<ROLE>
You are an HR specialist assessing a candidate's soft skills from recent messages.
</ROLE>

<OUTPUT>
Respond with a single JSON object:
{"communication_score": 0-10, "observations": "", "engagement": ""}
</OUTPUT>"#;

pub const OBSERVER_SYSTEM: &str = r#"<ROLE>
You are the interview mentor. You turn expert assessments into hidden guidance for the interviewer.
The candidate never sees your output.
</ROLE>

<OUTPUT>
Respond with a single JSON object:
{"sentiment": "positive|neutral|negative", "guidance": "", "hidden_instructions": ""}
</OUTPUT>"#;

pub const INTERVIEWER_SYSTEM: &str = r#"<ROLE>
You are a friendly technical interviewer talking directly to the candidate.
</ROLE>

<RULES>
- Ask at most one question per reply.
- Keep replies short.
- If the candidate asks about the company, team, or role, answer briefly first.
- If an inaccuracy was detected, point it out politely.
</RULES>

<OUTPUT>
Respond with a single JSON object:
{"response": "the full message the candidate sees, including your question", "question": "the question alone", "is_company_question": false}
</OUTPUT>"#;

pub const VALIDATOR_SYSTEM: &str = r#"<ROLE>
You are a validator. You only check the basic quality of an interviewer reply. Be lenient.
</ROLE>

<OUTPUT>
Respond with a single JSON object: {"approved": true}
Approve when the reply is not empty and contains a question or a meaningful comment.
</OUTPUT>"#;

pub const FINAL_REPORT_SYSTEM: &str = r#"<ROLE>
You are a hiring committee writing the final interview report.
</ROLE>

<OUTPUT>
Respond with a single JSON object:
{"decision": {"grade": "", "hiring_recommendation": "hire|no_hire|strong_hire", "recommendation_reason": "", "confidence_score": 0-100},
 "skills_matrix": {"technical_skills": 0-10, "communication": 0-10, "problem_solving": 0-10, "experience": 0-10, "cultural_fit": 0-10, "confirmed_skills": []},
 "knowledge_gaps": [{"gap": "", "educational_content": ""}],
 "roadmap": {"immediate": [], "short_term": [], "long_term": []},
 "summary": ""}
</OUTPUT>"#;

fn transcript<'a>(messages: impl IntoIterator<Item = &'a Message>, max_chars: Option<usize>) -> String {
    messages
        .into_iter()
        .map(|m| {
            let content = match max_chars {
                Some(n) => truncate_chars(&m.content, n),
                None => &m.content,
            };
            format!("{}: {}", m.role, content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn orchestrator_prompt(recent: &[Message], profile: &CandidateProfile) -> String {
    format!(
        "Extract candidate information from the latest messages:\n\n{}\n\n\
         Current profile: {}\n\n\
         Extract: name, position, grade (junior/middle/senior), experience. Facts only.",
        transcript(recent, None),
        compact_json(profile)
    )
}

pub fn technical_prompt(answer: &str) -> String {
    format!(
        "Answer: {}\nAssess the technical accuracy.",
        truncate_chars(answer, EXPERT_ANSWER_CHARS)
    )
}

pub fn fact_check_prompt(answer: &str) -> String {
    format!(
        "Answer: {}\nCheck for hallucinations.",
        truncate_chars(answer, EXPERT_ANSWER_CHARS)
    )
}

pub fn soft_skills_prompt(recent: &[Message]) -> String {
    format!(
        "Messages:\n{}\nAssess soft skills.",
        transcript(recent, Some(HR_AGENT_MESSAGE_CHARS))
    )
}

/// Expert findings forwarded to the Observer
pub struct ObserverBrief<'a> {
    pub technical_accuracy: Option<f64>,
    pub technical_notes: &'a str,
    pub warning: bool,
    pub issues: &'a [String],
    pub communication_score: Option<f64>,
    pub observations: &'a str,
    pub answer: &'a str,
}

fn score(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| v.to_string())
}

pub fn observer_prompt(brief: &ObserverBrief<'_>) -> String {
    let issues: Vec<&String> = brief.issues.iter().take(OBSERVER_MAX_ISSUES).collect();
    format!(
        "Expert analysis:\n\
         Python Specialist: score={}, notes={}\n\
         Fact Checker: warning={}, issues={:?}\n\
         HR Agent: communication={}, observations={}\n\
         Candidate's last answer: {}\n\n\
         Write hidden instructions. If the score is 8 or higher, raise the difficulty. \
         If warning=true, say so.",
        score(brief.technical_accuracy),
        truncate_chars(brief.technical_notes, OBSERVER_NOTES_CHARS),
        brief.warning,
        issues,
        score(brief.communication_score),
        truncate_chars(brief.observations, OBSERVER_NOTES_CHARS),
        truncate_chars(brief.answer, OBSERVER_ANSWER_CHARS),
    )
}

pub fn interviewer_prompt(
    profile: &CandidateProfile,
    instructions: &ObserverInstructions,
    company_question: bool,
    answer: &str,
) -> String {
    let mut prompt = format!("Candidate: {}\n", profile.label());
    prompt.push_str(&format!(
        "Instructions: {}\n",
        instructions.hidden_instructions
    ));
    if instructions.warning_present {
        prompt.push_str(
            "WARNING: the fact checker found technical inaccuracies. Address them.\n",
        );
    }
    if !instructions.guidance.is_empty() {
        prompt.push_str(&format!("Guidance: {}\n", instructions.guidance));
    }
    prompt.push_str(&format!(
        "Sentiment: {}, Difficulty: {}\n",
        instructions.sentiment, instructions.difficulty_adjustment
    ));
    if company_question {
        prompt.push_str("The candidate asked about the company or the role. Answer that first.\n");
    }
    prompt.push_str(&format!("Candidate's answer: {}\n", answer));
    prompt.push_str(
        "Write the reply. If the profile is complete, ask a technical question. \
         At most one question. Be brief.",
    );
    prompt
}

pub fn validator_prompt(reply: &str, instructions: Option<&ObserverInstructions>) -> String {
    format!(
        "Reply: {}\n\nInstructions: {}\n\n\
         Check: the reply is not empty and contains a question or a comment. \
         Return only approved: true/false.",
        reply,
        instructions.map(compact_json).unwrap_or_default()
    )
}

pub fn final_report_prompt(state: &ConversationState) -> String {
    format!(
        "Interview transcript:\n{}\n\n\
         Expert analysis:\n{}\n\n\
         Internal thoughts:\n{}\n\n\
         Write the final report with the decision, knowledge gaps and roadmap.",
        transcript(&state.conversation_history, None),
        compact_json(&state.expert_analysis),
        compact_json(&state.internal_thoughts)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expert_prompts_truncate_answer() {
        let answer = "x".repeat(EXPERT_ANSWER_CHARS + 100);
        let prompt = technical_prompt(&answer);
        assert!(prompt.contains(&"x".repeat(EXPERT_ANSWER_CHARS)));
        assert!(!prompt.contains(&"x".repeat(EXPERT_ANSWER_CHARS + 1)));
    }

    #[test]
    fn test_soft_skills_prompt_truncates_each_message() {
        let messages = vec![
            Message::assistant("a".repeat(300)),
            Message::user("short answer"),
        ];
        let prompt = soft_skills_prompt(&messages);
        assert!(prompt.contains(&format!("assistant: {}", "a".repeat(HR_AGENT_MESSAGE_CHARS))));
        assert!(!prompt.contains(&"a".repeat(HR_AGENT_MESSAGE_CHARS + 1)));
        assert!(prompt.contains("user: short answer"));
    }

    #[test]
    fn test_observer_prompt_limits_issues() {
        let issues: Vec<String> = (0..5).map(|i| format!("issue-{i}")).collect();
        let brief = ObserverBrief {
            technical_accuracy: Some(9.0),
            technical_notes: "good",
            warning: true,
            issues: &issues,
            communication_score: None,
            observations: "",
            answer: "GIL is a lock",
        };
        let prompt = observer_prompt(&brief);
        assert!(prompt.contains("issue-2"));
        assert!(!prompt.contains("issue-3"));
        assert!(prompt.contains("communication=n/a"));
    }

    #[test]
    fn test_interviewer_prompt_flags() {
        let instructions = ObserverInstructions {
            warning_present: true,
            ..ObserverInstructions::default()
        };
        let prompt = interviewer_prompt(&CandidateProfile::default(), &instructions, true, "hi");
        assert!(prompt.contains("WARNING"));
        assert!(prompt.contains("asked about the company"));
        assert!(prompt.contains("Difficulty: maintain"));
    }
}
