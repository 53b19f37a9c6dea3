//! Interview Command
//!
//! Runs an interview in the terminal.
//!
//! Usage:
//!   hireflow interview [--session-id ID] [--show-thoughts]
//!
//! Type `/retry` to re-run a turn that failed on a provider error.

use std::io::Write;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::ai::provider::create_provider;
use crate::cli::ui::Output;
use crate::config::ConfigLoader;
use crate::engine::InterviewEngine;
use crate::session::{InMemorySessionStore, InterviewService};
use crate::types::{ConversationState, Result, SessionId, compact_json};

const RETRY_COMMAND: &str = "/retry";

pub struct InterviewOptions {
    pub session_id: Option<String>,
    pub show_thoughts: bool,
    pub quiet: bool,
}

pub async fn run(options: InterviewOptions) -> Result<()> {
    let out = Output::quiet(options.quiet);
    let config = ConfigLoader::load()?;

    let provider = create_provider(&config.llm.provider_config())?;
    out.info(&format!(
        "Provider: {} ({})",
        provider.name(),
        provider.model()
    ));

    let engine = InterviewEngine::new(provider, config.interview.clone());
    let service = InterviewService::new(
        engine,
        Arc::new(InMemorySessionStore::new()),
        config.session.clone(),
    );

    let (session_id, state) = service
        .start_interview(options.session_id.map(SessionId::from))
        .await?;
    out.info(&format!("Session: {}", session_id));
    out.info(&format!(
        "Turn log: {}",
        service.logger().log_path(&session_id)?.display()
    ));
    render_turn(&out, &state, options.show_thoughts);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut last = state;

    while !last.is_complete {
        out.prompt();
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let message = line.trim();
        if message.is_empty() {
            continue;
        }

        let result = if message == RETRY_COMMAND {
            service.retry_turn(&session_id).await
        } else {
            service.process_message(&session_id, message).await
        };

        match result {
            Ok(state) => {
                render_turn(&out, &state, options.show_thoughts);
                last = state;
            }
            Err(e) if e.is_recoverable() => {
                out.error(&format!("{}", e));
                if let Some(hint) = e.candidate_hint() {
                    out.info(hint);
                }
                out.warning(&format!(
                    "Your message was kept. Type {} to try again.",
                    RETRY_COMMAND
                ));
            }
            Err(e) => return Err(e),
        }
    }

    if let Some(report) = &last.final_report {
        out.section("Final Report");
        println!("{}", serde_json::to_string_pretty(report)?);
    }

    out.section("Metrics");
    println!("Total tokens:        {}", last.metrics.total_tokens);
    println!("Average latency:     {:.0}ms", last.metrics.avg_latency);
    println!("Validations:         {} (last turn)", last.validation_attempts);
    if !options.quiet {
        println!("\n{}", service.engine().metrics().summary().display());
    }
    Ok(())
}

fn render_turn(out: &Output, state: &ConversationState, show_thoughts: bool) {
    if show_thoughts {
        for thought in &state.internal_thoughts {
            out.thought(thought);
        }
        if state.expert_analysis != Default::default() {
            println!("  {}", compact_json(&state.expert_analysis));
        }
    }

    if !state.is_complete
        && let Some(reply) = state.last_assistant_message()
    {
        out.interviewer(reply);
    }
}
