//! Global Constants
//!
//! Centralized constants for interview tuning.
//! All magic numbers and fixed texts should be defined here with documentation.

/// Workflow runner constants
pub mod workflow {
    /// Default maximum Validator invocations per turn before forced acceptance
    pub const MAX_VALIDATION_ATTEMPTS: u32 = 3;

    /// Default maximum step executions per turn (runaway-loop guard)
    pub const MAX_WORKFLOW_STEPS: usize = 25;

    /// Smallest step budget that still lets one full turn complete
    pub const MIN_WORKFLOW_STEPS: usize = 6;
}

/// Prompt context limits (characters or message counts)
pub mod context {
    /// Recent messages the Orchestrator sends for profile extraction
    pub const ORCHESTRATOR_MESSAGES: usize = 4;

    /// Characters of the candidate answer sent to the technical and fact-check experts
    pub const EXPERT_ANSWER_CHARS: usize = 500;

    /// Recent messages the soft-skills expert sees
    pub const HR_AGENT_MESSAGES: usize = 3;

    /// Characters per message in the soft-skills expert context
    pub const HR_AGENT_MESSAGE_CHARS: usize = 200;

    /// Characters of expert notes forwarded to the Observer
    pub const OBSERVER_NOTES_CHARS: usize = 80;

    /// Characters of the candidate answer forwarded to the Observer
    pub const OBSERVER_ANSWER_CHARS: usize = 150;

    /// Fact-check issues forwarded to the Observer
    pub const OBSERVER_MAX_ISSUES: usize = 3;

    /// Characters of the candidate answer forwarded to the Interviewer
    pub const INTERVIEWER_ANSWER_CHARS: usize = 300;

    /// Characters of raw model output kept in log lines
    pub const LOG_PREVIEW_CHARS: usize = 500;
}

/// Observer scoring thresholds
pub mod scoring {
    /// Technical accuracy at or above this raises question difficulty
    pub const DIFFICULTY_INCREASE_THRESHOLD: f64 = 8.0;
}

/// Fixed interviewer texts
pub mod texts {
    /// First-turn greeting, issued without a model call
    pub const GREETING: &str = "Hello! I'm AI-HR, and I'll be running your interview today. \
        Please tell me about yourself: what is your name, which position are you applying for, \
        and what is your level?";

    /// Generic question when the Orchestrator found no specific gap
    pub const PROFILE_FALLBACK_QUESTION: &str = "Tell me about yourself: what is your name, \
        which position are you applying for, and what is your level?";

    /// Question used when the model reports gaps in an unexpected shape
    pub const TELL_ME_MORE: &str = "Tell me a bit more about yourself.";

    /// Visible reply when the Orchestrator's turn ends on a ready-but-incomplete profile
    pub const TECHNICAL_START: &str = "Great! Let's begin the technical interview.";

    /// Interviewer reply when the model produced nothing usable
    pub const INTERVIEWER_FALLBACK: &str = "Let's continue the interview.";
}

/// Expert placeholder reasons when there is no candidate answer yet
pub mod placeholders {
    pub const NO_ANSWERS: &str = "No answers to analyze";
    pub const NO_CLAIMS: &str = "No answers to fact-check";
    pub const NO_SOFT_SKILLS: &str = "No data to assess";
}

/// Session layer constants
pub mod session {
    /// Default directory for durable turn logs
    pub const DEFAULT_LOG_DIR: &str = "logs";

    /// Prefix of generated session identifiers
    pub const SESSION_ID_PREFIX: &str = "session_";

    /// Hex characters taken from a UUID for generated session identifiers
    pub const SESSION_ID_HEX_LEN: usize = 8;
}

/// Network constants
pub mod network {
    /// Default transport timeout for LLM requests (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
}
