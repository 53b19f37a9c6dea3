//! Interview Metrics
//!
//! Two levels of accounting for LLM usage:
//! - [`TurnMetrics`]: per-session totals stored inside the conversation state,
//!   updated after every model call.
//! - [`MetricsCollector`]: process-wide counters shared by all sessions, with a
//!   per-agent breakdown. Thread-safe for the concurrent expert fan-out.
//!
//! ## Usage
//!
//! ```ignore
//! let metrics = MetricsCollector::new("hireflow");
//! metrics.record_call(Agent::Observer, &response);
//! println!("{}", metrics.summary().display());
//! ```

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::Instant;

use crate::ai::provider::{LlmResponse, TokenUsage};
use crate::types::Agent;

// =============================================================================
// Turn Metrics
// =============================================================================

/// Token and latency totals carried in the conversation state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurnMetrics {
    pub total_tokens: u64,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    /// Milliseconds, one entry per model call
    pub latencies: Vec<f64>,
    pub avg_latency: f64,
}

impl TurnMetrics {
    pub fn record(&mut self, usage: &TokenUsage, latency_ms: f64) {
        self.prompt_tokens += usage.input_tokens as u64;
        self.completion_tokens += usage.output_tokens as u64;
        self.total_tokens += usage.total() as u64;
        self.latencies.push(latency_ms);
        self.avg_latency = self.latencies.iter().sum::<f64>() / self.latencies.len() as f64;
    }

    pub fn record_response(&mut self, response: &LlmResponse) {
        self.record(&response.usage, response.timing.total_ms as f64);
    }

    /// Number of model calls recorded
    pub fn calls(&self) -> usize {
        self.latencies.len()
    }
}

// =============================================================================
// Metrics Collector
// =============================================================================

/// Process-wide metrics collector.
///
/// Uses atomic operations for counters and a concurrent map for the per-agent
/// breakdown, so concurrent expert calls never contend on a lock.
pub struct MetricsCollector {
    /// Collector label (process or session)
    label: String,
    start_time: Instant,
    api_calls: AtomicU32,
    input_tokens: AtomicU64,
    output_tokens: AtomicU64,
    total_latency_ms: AtomicU64,
    per_agent: DashMap<Agent, AgentMetrics>,
}

/// Usage attributed to one agent
#[derive(Debug, Clone, Default)]
pub struct AgentMetrics {
    pub api_calls: u32,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_latency_ms: u64,
}

/// Summary statistics
#[derive(Debug, Clone)]
pub struct MetricsSummary {
    pub label: String,
    pub total_duration_ms: u64,
    pub api_calls: u32,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
    pub avg_latency_ms: f64,
    pub agents: Vec<(Agent, AgentMetrics)>,
}

impl MetricsCollector {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            start_time: Instant::now(),
            api_calls: AtomicU32::new(0),
            input_tokens: AtomicU64::new(0),
            output_tokens: AtomicU64::new(0),
            total_latency_ms: AtomicU64::new(0),
            per_agent: DashMap::new(),
        }
    }

    /// Record metrics from one model call made on behalf of `agent`
    pub fn record_call(&self, agent: Agent, response: &LlmResponse) {
        let input = response.usage.input_tokens as u64;
        let output = response.usage.output_tokens as u64;
        let latency = response.timing.total_ms;

        self.api_calls.fetch_add(1, Ordering::Relaxed);
        self.input_tokens.fetch_add(input, Ordering::Relaxed);
        self.output_tokens.fetch_add(output, Ordering::Relaxed);
        self.total_latency_ms.fetch_add(latency, Ordering::Relaxed);

        let mut entry = self.per_agent.entry(agent).or_default();
        entry.api_calls += 1;
        entry.input_tokens += input;
        entry.output_tokens += output;
        entry.total_latency_ms += latency;
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSummary {
        let api_calls = self.api_calls.load(Ordering::Relaxed);
        let input_tokens = self.input_tokens.load(Ordering::Relaxed);
        let output_tokens = self.output_tokens.load(Ordering::Relaxed);
        let total_latency = self.total_latency_ms.load(Ordering::Relaxed);

        let avg_latency = if api_calls > 0 {
            total_latency as f64 / api_calls as f64
        } else {
            0.0
        };

        let mut agents: Vec<(Agent, AgentMetrics)> = self
            .per_agent
            .iter()
            .map(|e| (*e.key(), e.value().clone()))
            .collect();
        agents.sort_by_key(|(agent, _)| agent.as_str());

        MetricsSummary {
            label: self.label.clone(),
            total_duration_ms: self.start_time.elapsed().as_millis() as u64,
            api_calls,
            input_tokens,
            output_tokens,
            total_tokens: input_tokens + output_tokens,
            avg_latency_ms: avg_latency,
            agents,
        }
    }

    /// Get final summary
    pub fn summary(&self) -> MetricsSummary {
        self.snapshot()
    }
}

impl MetricsSummary {
    /// Format summary for display
    pub fn display(&self) -> String {
        let mut out = format!(
            "Collector: {}\n\
             Duration: {:.1}s\n\
             API Calls: {}\n\
             Tokens: {} (prompt: {}, completion: {})\n\
             Avg Latency: {:.0}ms",
            self.label,
            self.total_duration_ms as f64 / 1000.0,
            self.api_calls,
            self.total_tokens,
            self.input_tokens,
            self.output_tokens,
            self.avg_latency_ms,
        );
        for (agent, m) in &self.agents {
            out.push_str(&format!(
                "\n  {}: {} calls, {} tokens",
                agent,
                m.api_calls,
                m.input_tokens + m.output_tokens
            ));
        }
        out
    }
}

// =============================================================================
// Shared Type
// =============================================================================

/// Shared metrics collector
pub type SharedMetrics = Arc<MetricsCollector>;

/// Create shared metrics collector
pub fn create_shared_metrics(label: impl Into<String>) -> SharedMetrics {
    Arc::new(MetricsCollector::new(label))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::{ResponseMetadata, ResponseTiming};

    fn response(input: u32, output: u32, ms: u64) -> LlmResponse {
        LlmResponse::with_metrics(
            "{}".to_string(),
            TokenUsage::from_openai(input, output),
            ResponseTiming {
                total_ms: ms,
            },
            ResponseMetadata {
                model: "mistral-large-latest".to_string(),
                provider: "mistral".to_string(),
            },
        )
    }

    #[test]
    fn test_turn_metrics_accumulate() {
        let mut metrics = TurnMetrics::default();
        metrics.record_response(&response(100, 50, 200));
        metrics.record_response(&response(10, 5, 400));

        assert_eq!(metrics.prompt_tokens, 110);
        assert_eq!(metrics.completion_tokens, 55);
        assert_eq!(metrics.total_tokens, 165);
        assert_eq!(metrics.calls(), 2);
        assert!((metrics.avg_latency - 300.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_collector_per_agent() {
        let metrics = MetricsCollector::new("test");
        metrics.record_call(Agent::PythonSpecialist, &response(100, 50, 500));
        metrics.record_call(Agent::FactChecker, &response(80, 20, 300));
        metrics.record_call(Agent::PythonSpecialist, &response(10, 10, 100));

        let summary = metrics.summary();
        assert_eq!(summary.api_calls, 3);
        assert_eq!(summary.total_tokens, 270);
        assert!((summary.avg_latency_ms - 300.0).abs() < 0.01);

        let (_, python) = summary
            .agents
            .iter()
            .find(|(a, _)| *a == Agent::PythonSpecialist)
            .unwrap();
        assert_eq!(python.api_calls, 2);
        assert!(summary.display().contains("PythonSpecialist: 2 calls"));
    }

    #[tokio::test]
    async fn test_concurrent_recording() {
        let metrics = create_shared_metrics("concurrent");
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let m = Arc::clone(&metrics);
                tokio::spawn(async move { m.record_call(Agent::HrAgent, &response(1, 1, 1)) })
            })
            .collect();
        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(metrics.snapshot().api_calls, 8);
    }
}
