pub mod error;
pub mod report;
pub mod state;
pub mod utils;

pub use error::{ErrorCategory, ErrorClassifier, HireflowError, LlmError, Result};
pub use report::{Decision, FinalReport, KnowledgeGap, Roadmap, SkillsMatrix};
pub use state::{
    Agent, Analysis, CandidateProfile, ConversationState, DifficultyAdjustment, ExpertAnalysis,
    FactCheck, InternalThought, Message, ObserverInstructions, ProfileUpdate, Role,
    SCHEMA_VERSION, SoftSkillsAssessment, TechnicalAssessment,
};
pub use utils::{
    Record, compact_json, json_bool, json_extra, json_number, json_number_lenient, json_string,
    json_string_array, json_string_or, truncate_chars,
};

// =============================================================================
// Domain Newtypes
// =============================================================================

use std::fmt;

/// Type-safe wrapper for session IDs
///
/// Prevents accidental mixing of session IDs with other string types.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh `session_<8 hex>` identifier
    pub fn generate() -> Self {
        use crate::constants::session::{SESSION_ID_HEX_LEN, SESSION_ID_PREFIX};

        let hex = uuid::Uuid::new_v4().simple().to_string();
        Self(format!("{}{}", SESSION_ID_PREFIX, &hex[..SESSION_ID_HEX_LEN]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Usable inside a file name: non-empty, no path separators
    pub fn is_path_safe(&self) -> bool {
        !self.0.is_empty() && !self.0.contains(['/', '\\', '\0'])
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
