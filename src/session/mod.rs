//! Session layer: storage, turn logs, and the service that drives interviews.

mod service;
mod store;
mod turn_log;

pub use service::InterviewService;
pub use store::{InMemorySessionStore, SessionRecord, SessionStore};
pub use turn_log::{InterviewLog, TurnLogger, TurnRecord};
