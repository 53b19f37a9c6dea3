//! Scripted provider for engine tests.
//!
//! Replies are routed by a marker string found in the system instruction (or
//! the prompt when there is none), so concurrent expert calls get the right
//! answer regardless of scheduling order.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use super::{LlmProvider, LlmResponse, ResponseMetadata, ResponseTiming, TokenUsage};
use crate::types::{ErrorCategory, LlmError, Result};

#[derive(Debug, Clone)]
enum Reply {
    Text(String),
    Fail(ErrorCategory),
}

struct Route {
    marker: String,
    replies: VecDeque<Reply>,
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub system: Option<String>,
    pub prompt: String,
}

pub struct ScriptedProvider {
    routes: Mutex<Vec<Route>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl Default for ScriptedProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self {
            routes: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue a reply for calls whose system instruction contains `marker`.
    /// The last queued reply repeats once the queue is drained.
    pub fn respond(self, marker: &str, text: impl Into<String>) -> Self {
        self.push(marker, Reply::Text(text.into()));
        self
    }

    /// Queue a provider failure for calls matching `marker`
    pub fn fail(self, marker: &str, category: ErrorCategory) -> Self {
        self.push(marker, Reply::Fail(category));
        self
    }

    fn push(&self, marker: &str, reply: Reply) {
        let mut routes = self.routes.lock().unwrap();
        match routes.iter_mut().find(|r| r.marker == marker) {
            Some(route) => route.replies.push_back(reply),
            None => routes.push(Route {
                marker: marker.to_string(),
                replies: VecDeque::from([reply]),
            }),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Calls whose system instruction (or prompt) contained `marker`
    pub fn calls_matching(&self, marker: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.system.as_deref().unwrap_or(&c.prompt).contains(marker))
            .count()
    }

    fn next_reply(&self, haystack: &str) -> Reply {
        let mut routes = self.routes.lock().unwrap();
        if let Some(route) = routes.iter_mut().find(|r| haystack.contains(&r.marker)) {
            return if route.replies.len() > 1 {
                route.replies.pop_front().unwrap()
            } else {
                route.replies.front().cloned().unwrap()
            };
        }
        Reply::Text("{}".to_string())
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn complete(&self, system: Option<&str>, prompt: &str) -> Result<LlmResponse> {
        self.calls.lock().unwrap().push(RecordedCall {
            system: system.map(String::from),
            prompt: prompt.to_string(),
        });

        match self.next_reply(system.unwrap_or(prompt)) {
            Reply::Text(text) => Ok(LlmResponse::with_metrics(
                text,
                TokenUsage::from_openai(10, 5),
                ResponseTiming {
                    total_ms: 20,
                },
                ResponseMetadata {
                    model: "scripted".to_string(),
                    provider: "scripted".to_string(),
                },
            )),
            Reply::Fail(category) => {
                Err(LlmError::new("scripted", category, "scripted failure").into())
            }
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted"
    }
}
