use console::{Style, style};

use crate::types::{Agent, InternalThought};

pub struct Output {
    quiet: bool,
}

impl Output {
    pub fn new() -> Self {
        Self { quiet: false }
    }

    pub fn quiet(quiet: bool) -> Self {
        Self { quiet }
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn warning(&self, message: &str) {
        println!("{} {}", style("⚠").yellow(), message);
    }

    pub fn info(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("ℹ").blue(), message);
        }
    }

    pub fn section(&self, message: &str) {
        println!("\n{}", style(message).bold());
        println!("{}", "─".repeat(40));
    }

    /// Visible interviewer message
    pub fn interviewer(&self, message: &str) {
        println!("\n{} {}", style("Interviewer:").cyan().bold(), message);
    }

    /// Input prompt for the candidate
    pub fn prompt(&self) {
        print!("\n{} ", style("You:").green().bold());
    }

    pub fn thought(&self, thought: &InternalThought) {
        println!(
            "  {} {}",
            agent_style(thought.agent).apply_to(format!("[{}]", thought.agent)),
            style(&thought.thought).dim()
        );
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

fn agent_style(agent: Agent) -> Style {
    let s = Style::new().bold();
    match agent {
        Agent::Orchestrator | Agent::Interviewer => s.cyan(),
        Agent::PythonSpecialist => s.green(),
        Agent::FactChecker => s.yellow(),
        Agent::HrAgent => s.magenta(),
        Agent::Observer => s.blue(),
        Agent::Validator => s.red(),
        Agent::Finalizer => s.white(),
    }
}
