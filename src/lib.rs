//! Hireflow - Multi-Agent Technical Interview Engine
//!
//! Runs a technical interview as a workflow of cooperating LLM agents: an
//! orchestrator that collects the candidate profile, three concurrent expert
//! assessors, a hidden observer, an interviewer with a validation loop, and a
//! finalizer that writes the closing report.
//!
//! ## Quick Start
//!
//! ```ignore
//! use hireflow::{ConfigLoader, InterviewEngine, ConversationState};
//! use hireflow::ai::provider::create_provider;
//!
//! let config = ConfigLoader::load()?;
//! let provider = create_provider(&config.llm.provider_config())?;
//! let engine = InterviewEngine::new(provider, config.interview.clone());
//!
//! let state = engine.run_turn(ConversationState::new()).await?;
//! println!("{}", state.interviewer_response);
//! ```
//!
//! ## Modules
//!
//! - [`ai`]: LLM provider abstraction, metrics, structured-output extraction
//! - [`engine`]: agent steps and the workflow runner
//! - [`session`]: session store, turn logs, interview service
//! - [`config`]: layered configuration
//! - [`types`]: conversation state, report, errors

pub mod ai;
pub mod cli;
pub mod config;
pub mod constants;
pub mod engine;
pub mod session;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader, InterviewConfig, LlmConfig, SessionConfig};

// Error Types
pub use types::error::{ErrorCategory, HireflowError, LlmError, Result};

// State
pub use types::{ConversationState, FinalReport, SessionId};

// =============================================================================
// Engine Re-exports
// =============================================================================

pub use engine::{InterviewEngine, TurnExit};
pub use session::{InMemorySessionStore, InterviewService, SessionStore, TurnLogger};

// =============================================================================
// AI Re-exports
// =============================================================================

pub use ai::{LlmProvider, LlmResponse, MetricsCollector, SharedMetrics, SharedProvider};
