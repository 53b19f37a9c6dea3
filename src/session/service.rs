//! Interview Service
//!
//! Composes the engine, the session store and the turn logger into the
//! operations a front-end needs. Turns of one session are serialized; turns of
//! different sessions run concurrently.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::store::{SessionRecord, SessionStore};
use super::turn_log::TurnLogger;
use crate::config::SessionConfig;
use crate::engine::InterviewEngine;
use crate::types::{ConversationState, HireflowError, Result, SessionId};

pub struct InterviewService {
    engine: InterviewEngine,
    store: Arc<dyn SessionStore>,
    logger: TurnLogger,
    config: SessionConfig,
    locks: DashMap<SessionId, Arc<Mutex<()>>>,
}

impl InterviewService {
    pub fn new(engine: InterviewEngine, store: Arc<dyn SessionStore>, config: SessionConfig) -> Self {
        let logger = TurnLogger::new(config.log_dir.clone());
        Self {
            engine,
            store,
            logger,
            config,
            locks: DashMap::new(),
        }
    }

    pub fn engine(&self) -> &InterviewEngine {
        &self.engine
    }

    pub fn logger(&self) -> &TurnLogger {
        &self.logger
    }

    fn lock_for(&self, id: &SessionId) -> Arc<Mutex<()>> {
        self.locks.entry(id.clone()).or_default().clone()
    }

    /// Open a session and run its first turn (the greeting)
    pub async fn start_interview(
        &self,
        session_id: Option<SessionId>,
    ) -> Result<(SessionId, ConversationState)> {
        let id = session_id.unwrap_or_else(SessionId::generate);
        if !id.is_path_safe() {
            return Err(HireflowError::InvalidSessionId(id.into_inner()));
        }
        let lock = self.lock_for(&id);
        let _guard = lock.lock().await;

        if self.store.exists(&id)? {
            return Err(HireflowError::SessionExists(id.into_inner()));
        }

        tracing::info!(session = %id, "Starting interview");
        let mut record = SessionRecord::new(id.clone(), ConversationState::new());
        self.store.save(record.clone())?;

        let state = self.engine.run_turn(record.state.clone()).await?;
        record.turn_counter = 1;
        let snapshot = self.commit(&mut record, state)?;
        Ok((id, snapshot))
    }

    /// Run a turn for a candidate message
    pub async fn process_message(
        &self,
        session_id: &SessionId,
        message: &str,
    ) -> Result<ConversationState> {
        let lock = self.lock_for(session_id);
        let _guard = lock.lock().await;

        let mut record = self.load(session_id)?;
        if record.state.is_complete && record.state.final_report.is_some() {
            tracing::info!(session = %session_id, "Interview already complete, message ignored");
            return Ok(record.state);
        }

        if self.config.is_stop_phrase(message) {
            tracing::info!(session = %session_id, "Stop requested");
            record.state.is_complete = true;
        }
        record.state.push_user(message);
        // The message survives a failed turn so retry_turn can pick it up
        record.touch();
        self.store.save(record.clone())?;

        let state = self.engine.run_turn(record.state.clone()).await?;
        record.turn_counter += 1;
        self.commit(&mut record, state)
    }

    /// Re-run the engine on the stored state without a new message
    pub async fn retry_turn(&self, session_id: &SessionId) -> Result<ConversationState> {
        let lock = self.lock_for(session_id);
        let _guard = lock.lock().await;

        let mut record = self.load(session_id)?;
        let pending = (record.state.has_user_messages() && !record.state.awaits_user())
            || (record.state.is_complete && record.state.final_report.is_none());
        if !pending {
            tracing::debug!(session = %session_id, "Nothing to retry");
            return Ok(record.state);
        }

        tracing::info!(session = %session_id, "Retrying turn");
        let state = self.engine.run_turn(record.state.clone()).await?;
        record.turn_counter += 1;
        self.commit(&mut record, state)
    }

    pub fn get_session(&self, session_id: &SessionId) -> Result<Option<ConversationState>> {
        Ok(self.store.get(session_id)?.map(|r| r.state))
    }

    pub fn delete_session(&self, session_id: &SessionId) -> Result<bool> {
        self.locks.remove(session_id);
        self.store.delete(session_id)
    }

    pub fn list_sessions(&self) -> Result<Vec<SessionId>> {
        self.store.list_ids()
    }

    fn load(&self, session_id: &SessionId) -> Result<SessionRecord> {
        self.store
            .get(session_id)?
            .ok_or_else(|| HireflowError::SessionNotFound(session_id.to_string()))
    }

    /// Log the turn, persist the cleared state, return the full snapshot
    fn commit(
        &self,
        record: &mut SessionRecord,
        state: ConversationState,
    ) -> Result<ConversationState> {
        let snapshot = state.clone();
        record.state = self
            .logger
            .record_turn(&record.session_id, state, record.turn_counter)?;
        record.touch();
        self.store.save(record.clone())?;
        Ok(snapshot)
    }
}
