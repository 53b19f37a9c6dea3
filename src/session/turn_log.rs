//! Turn Log
//!
//! Durable per-session interview log at `<log_dir>/interview_<session>.json`.
//! Every turn appends one record with the visible exchange and the internal
//! thoughts gathered during the turn; the thoughts are then cleared from the
//! state so the next turn starts with an empty trail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::ai::metrics::TurnMetrics;
use crate::types::{ConversationState, FinalReport, HireflowError, Result, SessionId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnRecord {
    pub turn_id: u32,
    pub user_message: String,
    pub agent_visible_message: String,
    /// `[Agent]: thought` lines
    pub internal_thoughts: String,
    pub recorded_at: DateTime<Utc>,
}

/// Contents of one session's log file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewLog {
    pub session_id: SessionId,
    pub participant_name: String,
    pub started_at: DateTime<Utc>,
    pub turns: Vec<TurnRecord>,
    /// Session totals as of the latest turn
    pub metrics: TurnMetrics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_report: Option<FinalReport>,
}

impl InterviewLog {
    fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            participant_name: String::new(),
            started_at: Utc::now(),
            turns: Vec::new(),
            metrics: TurnMetrics::default(),
            final_report: None,
        }
    }
}

pub struct TurnLogger {
    log_dir: PathBuf,
}

impl TurnLogger {
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            log_dir: log_dir.into(),
        }
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub fn log_path(&self, session_id: &SessionId) -> Result<PathBuf> {
        if !session_id.is_path_safe() {
            return Err(HireflowError::InvalidSessionId(session_id.to_string()));
        }
        Ok(self.log_dir.join(format!("interview_{}.json", session_id)))
    }

    /// Read a session's log, if one was written
    pub fn load(&self, session_id: &SessionId) -> Result<Option<InterviewLog>> {
        let path = self.log_path(session_id)?;
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Append the turn to the session log and return the state with its thoughts cleared
    pub fn record_turn(
        &self,
        session_id: &SessionId,
        mut state: ConversationState,
        turn_id: u32,
    ) -> Result<ConversationState> {
        let mut log = self
            .load(session_id)?
            .unwrap_or_else(|| InterviewLog::new(session_id.clone()));

        if !state.candidate_profile.name.is_empty() {
            log.participant_name = state.candidate_profile.name.clone();
        }

        let agent_visible_message = state
            .last_assistant_message()
            .unwrap_or(state.interviewer_response.as_str())
            .to_string();

        log.turns.push(TurnRecord {
            turn_id,
            user_message: state.last_user_message().unwrap_or_default().to_string(),
            agent_visible_message,
            internal_thoughts: format_thoughts(&state),
            recorded_at: Utc::now(),
        });
        log.metrics = state.metrics.clone();
        if state.is_complete && state.final_report.is_some() {
            log.final_report = state.final_report.clone();
        }

        self.write(&log)?;
        tracing::debug!(
            session = %session_id,
            turn = turn_id,
            thoughts = state.internal_thoughts.len(),
            "Turn logged"
        );

        state.internal_thoughts.clear();
        Ok(state)
    }

    fn write(&self, log: &InterviewLog) -> Result<()> {
        fs::create_dir_all(&self.log_dir)?;
        let path = self.log_path(&log.session_id)?;
        // Sibling temp file, then rename over the log
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(log)?)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

fn format_thoughts(state: &ConversationState) -> String {
    let mut out = String::new();
    for thought in state
        .internal_thoughts
        .iter()
        .filter(|t| !t.thought.is_empty())
    {
        out.push_str(&format!("[{}]: {}\n", thought.agent, thought.thought));
    }
    out
}
