//! Conversation State
//!
//! The single record threaded through every agent step of a turn. Owned by
//! the workflow runner while a turn is in flight, then handed back to the
//! caller for persistence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ai::metrics::TurnMetrics;
use crate::ai::validation::{is_unparsed, raw_response};
use crate::types::report::FinalReport;
use crate::types::utils::{
    Record, json_bool, json_extra, json_number, json_string, json_string_array,
};

/// Current layout of [`ConversationState`]
pub const SCHEMA_VERSION: u32 = 1;

// =============================================================================
// Conversation History
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

// =============================================================================
// Candidate Profile
// =============================================================================

/// What the interview knows about the candidate so far.
///
/// Filled in monotonically: merges overwrite scalars only with non-empty values
/// and union list fields, so nothing is cleared mid-session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateProfile {
    pub name: String,
    pub position: String,
    pub grade: String,
    pub experience: String,
    pub skills: Vec<String>,
    pub tech_stack: Vec<String>,
}

impl CandidateProfile {
    /// name + grade + (position or experience)
    pub fn is_complete(&self) -> bool {
        !self.name.is_empty()
            && !self.grade.is_empty()
            && (!self.position.is_empty() || !self.experience.is_empty())
    }

    pub fn merge(&mut self, update: ProfileUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(position) = update.position {
            self.position = position;
        }
        if let Some(grade) = update.grade {
            self.grade = grade.to_lowercase();
        }
        if let Some(experience) = update.experience {
            self.experience = experience;
        }
        union_into(&mut self.skills, update.skills);
        union_into(&mut self.tech_stack, update.tech_stack);
    }

    /// Short label used in prompts and thoughts
    pub fn label(&self) -> String {
        let name = if self.name.is_empty() {
            "unknown"
        } else {
            &self.name
        };
        format!("{}, {} ({})", name, self.position, self.grade)
    }
}

/// Order-preserving, case-insensitive set union
fn union_into(target: &mut Vec<String>, incoming: Vec<String>) {
    for item in incoming {
        let key = item.to_lowercase();
        if !target.iter().any(|t| t.to_lowercase() == key) {
            target.push(item);
        }
    }
}

/// Profile fields extracted from one model answer; `None` and empty lists mean "no news"
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub position: Option<String>,
    pub grade: Option<String>,
    pub experience: Option<String>,
    pub skills: Vec<String>,
    pub tech_stack: Vec<String>,
}

impl ProfileUpdate {
    pub fn from_record(record: &Record) -> Self {
        if is_unparsed(record) {
            return Self::default();
        }
        Self {
            name: json_string(record, "name"),
            position: json_string(record, "position"),
            grade: json_string(record, "grade"),
            experience: json_string(record, "experience"),
            skills: json_string_array(record, "skills"),
            tech_stack: json_string_array(record, "tech_stack"),
        }
    }
}

// =============================================================================
// Expert Analysis
// =============================================================================

/// Result slot of one expert for the current turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Analysis<T> {
    /// Nothing to analyze; no model call was made
    Skipped { reason: String },
    Completed { result: T },
}

impl<T> Analysis<T> {
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped {
            reason: reason.into(),
        }
    }

    pub fn result(&self) -> Option<&T> {
        match self {
            Self::Completed { result } => Some(result),
            Self::Skipped { .. } => None,
        }
    }
}

/// Technical-accuracy assessment of the latest answer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TechnicalAssessment {
    /// Only set when the model produced an actual number
    pub technical_accuracy: Option<f64>,
    pub notes: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
    #[serde(skip_serializing_if = "Record::is_empty")]
    pub details: Record,
}

impl TechnicalAssessment {
    pub fn from_record(record: &Record) -> Self {
        if is_unparsed(record) {
            return Self {
                raw_response: raw_response(record).map(String::from),
                ..Self::default()
            };
        }
        Self {
            technical_accuracy: json_number(record, "technical_accuracy"),
            notes: json_string(record, "notes").unwrap_or_default(),
            raw_response: None,
            details: json_extra(record, &["technical_accuracy", "notes"]),
        }
    }
}

/// Hallucination / fact-check assessment of the latest answer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactCheck {
    pub has_hallucinations: bool,
    /// Whether the candidate should be told about an inaccuracy
    pub warning: bool,
    pub detected_issues: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
    #[serde(skip_serializing_if = "Record::is_empty")]
    pub details: Record,
}

impl FactCheck {
    pub fn from_record(record: &Record) -> Self {
        if is_unparsed(record) {
            return Self {
                raw_response: raw_response(record).map(String::from),
                ..Self::default()
            };
        }
        Self {
            has_hallucinations: json_bool(record, "has_hallucinations", false),
            warning: json_bool(record, "warning", false),
            detected_issues: json_string_array(record, "detected_issues"),
            raw_response: None,
            details: json_extra(record, &["has_hallucinations", "warning", "detected_issues"]),
        }
    }
}

/// Soft-skills assessment over recent context
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoftSkillsAssessment {
    pub communication_score: Option<f64>,
    pub observations: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
    #[serde(skip_serializing_if = "Record::is_empty")]
    pub details: Record,
}

impl SoftSkillsAssessment {
    pub fn from_record(record: &Record) -> Self {
        if is_unparsed(record) {
            return Self {
                raw_response: raw_response(record).map(String::from),
                ..Self::default()
            };
        }
        Self {
            communication_score: json_number(record, "communication_score"),
            observations: json_string(record, "observations").unwrap_or_default(),
            raw_response: None,
            details: json_extra(record, &["communication_score", "observations"]),
        }
    }
}

/// Latest expert results, overwritten every turn
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpertAnalysis {
    pub python_specialist: Option<Analysis<TechnicalAssessment>>,
    pub fact_checker: Option<Analysis<FactCheck>>,
    pub hr_agent: Option<Analysis<SoftSkillsAssessment>>,
}

impl ExpertAnalysis {
    pub fn technical(&self) -> Option<&TechnicalAssessment> {
        self.python_specialist.as_ref().and_then(Analysis::result)
    }

    pub fn fact_check(&self) -> Option<&FactCheck> {
        self.fact_checker.as_ref().and_then(Analysis::result)
    }

    pub fn soft_skills(&self) -> Option<&SoftSkillsAssessment> {
        self.hr_agent.as_ref().and_then(Analysis::result)
    }
}

// =============================================================================
// Observer Instructions
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyAdjustment {
    Increase,
    #[default]
    Maintain,
}

impl fmt::Display for DifficultyAdjustment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Increase => write!(f, "increase"),
            Self::Maintain => write!(f, "maintain"),
        }
    }
}

/// Hidden guidance for the Interviewer of the same turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObserverInstructions {
    pub sentiment: String,
    pub guidance: String,
    pub hidden_instructions: String,
    /// Copied from the fact check, never taken from the model
    pub warning_present: bool,
    /// Computed from the technical score, never taken from the model
    pub difficulty_adjustment: DifficultyAdjustment,
    #[serde(skip_serializing_if = "Record::is_empty")]
    pub details: Record,
}

impl Default for ObserverInstructions {
    fn default() -> Self {
        Self {
            sentiment: "neutral".to_string(),
            guidance: String::new(),
            hidden_instructions: String::new(),
            warning_present: false,
            difficulty_adjustment: DifficultyAdjustment::Maintain,
            details: Record::new(),
        }
    }
}

impl ObserverInstructions {
    /// Build from model output, then apply the two deterministic fields
    pub fn from_record(
        record: &Record,
        warning_present: bool,
        difficulty_adjustment: DifficultyAdjustment,
    ) -> Self {
        let mut instructions = if is_unparsed(record) {
            Self::default()
        } else {
            Self {
                sentiment: json_string(record, "sentiment").unwrap_or_else(|| "neutral".into()),
                guidance: json_string(record, "guidance").unwrap_or_default(),
                hidden_instructions: json_string(record, "hidden_instructions")
                    .unwrap_or_default(),
                details: json_extra(
                    record,
                    &[
                        "sentiment",
                        "guidance",
                        "hidden_instructions",
                        "warning_present",
                        "difficulty_adjustment",
                    ],
                ),
                ..Self::default()
            }
        };
        instructions.warning_present = warning_present;
        instructions.difficulty_adjustment = difficulty_adjustment;
        instructions
    }
}

// =============================================================================
// Internal Thoughts
// =============================================================================

/// Agents that leave thoughts and log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Agent {
    Orchestrator,
    #[serde(rename = "PythonSpecialist")]
    PythonSpecialist,
    #[serde(rename = "FactChecker")]
    FactChecker,
    #[serde(rename = "HR Agent")]
    HrAgent,
    Observer,
    Interviewer,
    Validator,
    Finalizer,
}

impl Agent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Orchestrator => "Orchestrator",
            Self::PythonSpecialist => "PythonSpecialist",
            Self::FactChecker => "FactChecker",
            Self::HrAgent => "HR Agent",
            Self::Observer => "Observer",
            Self::Interviewer => "Interviewer",
            Self::Validator => "Validator",
            Self::Finalizer => "Finalizer",
        }
    }
}

impl fmt::Display for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Diagnostic record, cleared by the turn logger once persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InternalThought {
    pub agent: Agent,
    pub thought: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Record::is_empty")]
    pub details: Record,
}

impl InternalThought {
    pub fn new(agent: Agent, thought: impl Into<String>) -> Self {
        Self {
            agent,
            thought: thought.into(),
            timestamp: Utc::now(),
            details: Record::new(),
        }
    }

    pub fn with_details(mut self, details: Record) -> Self {
        self.details = details;
        self
    }
}

// =============================================================================
// Conversation State
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationState {
    pub schema_version: u32,
    /// Chronological, append-only within a turn
    pub conversation_history: Vec<Message>,
    pub candidate_profile: CandidateProfile,
    pub expert_analysis: ExpertAnalysis,
    pub observer_instructions: Option<ObserverInstructions>,
    pub interviewer_response: String,
    pub current_question: String,
    pub validator_approved: bool,
    /// Session-wide Validator invocation count, never decreases
    pub validation_attempts: u32,
    pub internal_thoughts: Vec<InternalThought>,
    pub metrics: TurnMetrics,
    pub is_complete: bool,
    pub final_report: Option<FinalReport>,
}

impl Default for ConversationState {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            conversation_history: Vec::new(),
            candidate_profile: CandidateProfile::default(),
            expert_analysis: ExpertAnalysis::default(),
            observer_instructions: None,
            interviewer_response: String::new(),
            current_question: String::new(),
            validator_approved: false,
            validation_attempts: 0,
            internal_thoughts: Vec::new(),
            metrics: TurnMetrics::default(),
            is_complete: false,
            final_report: None,
        }
    }
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.conversation_history.push(Message::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.conversation_history.push(Message::assistant(content));
    }

    pub fn has_user_messages(&self) -> bool {
        self.conversation_history
            .iter()
            .any(|m| m.role == Role::User)
    }

    pub fn last_user_message(&self) -> Option<&str> {
        self.last_message_by(Role::User)
    }

    pub fn last_assistant_message(&self) -> Option<&str> {
        self.last_message_by(Role::Assistant)
    }

    fn last_message_by(&self, role: Role) -> Option<&str> {
        self.conversation_history
            .iter()
            .rev()
            .find(|m| m.role == role)
            .map(|m| m.content.as_str())
    }

    /// Whether the newest history entry is an assistant reply
    pub fn awaits_user(&self) -> bool {
        self.conversation_history
            .last()
            .is_some_and(|m| m.role == Role::Assistant)
    }

    /// The last `n` messages, oldest first
    pub fn recent_messages(&self, n: usize) -> &[Message] {
        let start = self.conversation_history.len().saturating_sub(n);
        &self.conversation_history[start..]
    }

    pub fn think(&mut self, agent: Agent, thought: impl Into<String>) {
        self.internal_thoughts
            .push(InternalThought::new(agent, thought));
    }

    pub fn user_message_count(&self) -> usize {
        self.count_role(Role::User)
    }

    fn count_role(&self, role: Role) -> usize {
        self.conversation_history
            .iter()
            .filter(|m| m.role == role)
            .count()
    }
}
