//! Progress reporting for pipeline runs

use std::sync::Mutex;

use crate::agent::Stage;
use crate::review::GateEvent;

use super::PipelineReport;

const HEADER: &str = "\x1b[95m";
const BLUE: &str = "\x1b[94m";
const GREEN: &str = "\x1b[92m";
const WARNING: &str = "\x1b[93m";
const BOLD: &str = "\x1b[1m";
const END: &str = "\x1b[0m";

/// Handler for pipeline progress
///
/// Methods take `&self` because stage callbacks fire from inside the review
/// gate while gate events are also being reported.
pub trait ProgressHandler: Send + Sync {
    /// Called once before the first stage
    fn on_start(&self) {}

    /// Called when a stage's request is about to be sent
    fn on_stage(&self, stage: Stage);

    /// Called for each review gate event
    fn on_gate(&self, _event: &GateEvent) {}

    /// Called when an artifact was persisted
    fn on_saved(&self, _path: &str) {}

    /// Called when the run finished
    fn on_complete(&self, _report: &PipelineReport) {}
}

/// Handler that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressHandler for NoProgress {
    fn on_stage(&self, _stage: Stage) {}
}

/// Renders a gate event as a one-line message
pub fn gate_message(event: &GateEvent) -> String {
    match event {
        GateEvent::Rejected {
            iteration,
            max_iterations,
        } => format!("Code review failed. Iteration {}/{}", iteration, max_iterations),
        GateEvent::Passed { .. } => "Code review passed!".to_string(),
        GateEvent::Exhausted { max_iterations } => format!(
            "Warning: Proceeding with code that did not pass review after {} iterations",
            max_iterations
        ),
    }
}

/// Prints progress to stdout with ANSI colors
#[derive(Debug, Default, Clone, Copy)]
pub struct PrintProgress;

impl PrintProgress {
    fn step(&self, agent: &str, message: &str) {
        println!("{}[{}]{} {}", HEADER, agent, END, message);
    }
}

impl ProgressHandler for PrintProgress {
    fn on_start(&self) {
        println!("{}{}Starting Multi-Agent Coding Pipeline{}", BOLD, BLUE, END);
    }

    fn on_stage(&self, stage: Stage) {
        self.step(stage.role().name(), stage.activity());
    }

    fn on_gate(&self, event: &GateEvent) {
        match event {
            GateEvent::Exhausted { .. } => {
                self.step("System", &format!("{}{}{}", WARNING, gate_message(event), END))
            }
            _ => self.step("System", &gate_message(event)),
        }
    }

    fn on_saved(&self, path: &str) {
        println!("{}File saved:{} {}", GREEN, END, path);
    }

    fn on_complete(&self, _report: &PipelineReport) {
        println!("{}{}Multi-Agent Coding Pipeline Completed{}", BOLD, GREEN, END);
    }
}

/// Buffers plain-text progress lines, for the web UI's system log
#[derive(Debug, Default)]
pub struct LogProgress {
    lines: Mutex<Vec<String>>,
}

impl LogProgress {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// All lines recorded so far
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    fn push(&self, line: String) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line);
        }
    }
}

impl ProgressHandler for LogProgress {
    fn on_start(&self) {
        self.push("Starting Multi-Agent Coding Pipeline".to_string());
    }

    fn on_stage(&self, stage: Stage) {
        self.push(format!("[{}] {}", stage.role().name(), stage.activity()));
    }

    fn on_gate(&self, event: &GateEvent) {
        self.push(format!("[System] {}", gate_message(event)));
    }

    fn on_saved(&self, path: &str) {
        self.push(format!("File saved: {}", path));
    }

    fn on_complete(&self, report: &PipelineReport) {
        self.push(format!(
            "Multi-Agent Coding Pipeline Completed with {}",
            report.status()
        ));
    }
}
