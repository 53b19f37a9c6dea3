//! Session Store
//!
//! Keeps the conversation state of every live interview between turns.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::types::{ConversationState, Result, SessionId};

/// Stored session: the state plus bookkeeping the engine never sees
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: SessionId,
    pub state: ConversationState,
    /// Turns logged so far
    pub turn_counter: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn new(session_id: SessionId, state: ConversationState) -> Self {
        let now = Utc::now();
        Self {
            session_id,
            state,
            turn_counter: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Storage backend for session records
pub trait SessionStore: Send + Sync {
    fn get(&self, id: &SessionId) -> Result<Option<SessionRecord>>;

    /// Insert or replace
    fn save(&self, record: SessionRecord) -> Result<()>;

    /// Returns whether a record was removed
    fn delete(&self, id: &SessionId) -> Result<bool>;

    fn exists(&self, id: &SessionId) -> Result<bool> {
        Ok(self.get(id)?.is_some())
    }

    fn list_ids(&self) -> Result<Vec<SessionId>>;
}

/// Process-local store; sessions are lost on restart
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: DashMap<SessionId, SessionRecord>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, id: &SessionId) -> Result<Option<SessionRecord>> {
        Ok(self.sessions.get(id).map(|r| r.value().clone()))
    }

    fn save(&self, record: SessionRecord) -> Result<()> {
        self.sessions.insert(record.session_id.clone(), record);
        Ok(())
    }

    fn delete(&self, id: &SessionId) -> Result<bool> {
        Ok(self.sessions.remove(id).is_some())
    }

    fn exists(&self, id: &SessionId) -> Result<bool> {
        Ok(self.sessions.contains_key(id))
    }

    fn list_ids(&self) -> Result<Vec<SessionId>> {
        let mut ids: Vec<SessionId> = self.sessions.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_get_delete() {
        let store = InMemorySessionStore::new();
        let id = SessionId::new("session_abc12345");
        assert!(!store.exists(&id).unwrap());

        let mut state = ConversationState::new();
        state.push_user("hello");
        store.save(SessionRecord::new(id.clone(), state)).unwrap();

        let record = store.get(&id).unwrap().unwrap();
        assert_eq!(record.turn_counter, 0);
        assert_eq!(record.state.conversation_history.len(), 1);
        assert_eq!(store.list_ids().unwrap(), vec![id.clone()]);

        assert!(store.delete(&id).unwrap());
        assert!(!store.delete(&id).unwrap());
        assert!(store.is_empty());
    }

    #[test]
    fn test_save_replaces() {
        let store = InMemorySessionStore::new();
        let id = SessionId::generate();
        store
            .save(SessionRecord::new(id.clone(), ConversationState::new()))
            .unwrap();

        let mut record = store.get(&id).unwrap().unwrap();
        record.turn_counter = 4;
        record.touch();
        store.save(record).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&id).unwrap().unwrap().turn_counter, 4);
    }
}
