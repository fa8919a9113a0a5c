//! The requirement-to-code pipeline
//!
//! Stages run strictly in order, each awaiting the previous one:
//! 1. Requirement analysis
//! 2. Code development
//! 3. Review gate (review, then revise until a pass or the budget runs out)
//! 4. Documentation
//! 5. Tests
//! 6. UI code
//!
//! No state is shared between stages; each returns its output and the final
//! [`PipelineReport`] is assembled from those values.

mod progress;
mod report;

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::agent::{extract_all_code, extract_code, ChatBackend, PromptBuilder, Stage};
use crate::config::PipelineConfig;
use crate::review::{GateEvent, ReviewGate, ReviewOutcome, Reviewer, Reviser};
use crate::sink::{paths, ArtifactSink};
use crate::{Error, Result};

pub use progress::{gate_message, LogProgress, NoProgress, PrintProgress, ProgressHandler};
pub use report::PipelineReport;

/// Fence tag the generated code is extracted from
const CODE_LANG: &str = "python";

/// A configured pipeline
#[derive(Clone)]
pub struct Pipeline {
    backend: Arc<dyn ChatBackend>,
    sink: Arc<dyn ArtifactSink>,
    progress: Arc<dyn ProgressHandler>,
    gate: ReviewGate,
}

impl Pipeline {
    /// Create a pipeline with the default review gate and no progress output
    pub fn new(backend: Arc<dyn ChatBackend>, sink: Arc<dyn ArtifactSink>) -> Self {
        Self {
            backend,
            sink,
            progress: Arc::new(NoProgress),
            gate: ReviewGate::default(),
        }
    }

    /// Create a pipeline whose gate follows the configuration
    pub fn from_config(
        config: &PipelineConfig,
        backend: Arc<dyn ChatBackend>,
        sink: Arc<dyn ArtifactSink>,
    ) -> Self {
        Self::new(backend, sink).with_gate(
            ReviewGate::new(config.max_review_iterations).with_policy(config.verdict_policy),
        )
    }

    /// Set the progress handler
    pub fn with_progress(mut self, progress: Arc<dyn ProgressHandler>) -> Self {
        self.progress = progress;
        self
    }

    /// Set the review gate
    pub fn with_gate(mut self, gate: ReviewGate) -> Self {
        self.gate = gate;
        self
    }

    /// The review gate in use
    pub fn gate(&self) -> &ReviewGate {
        &self.gate
    }

    /// Send one stage's prompt as its role
    async fn ask(&self, stage: Stage, prompt: String) -> Result<String> {
        self.progress.on_stage(stage);
        let role = stage.role();
        debug!(stage = ?stage, role = %role, "Sending stage request");

        let reply = self.backend.complete(role.system_message(), &prompt).await?;
        debug!(stage = ?stage, reply_len = reply.len(), "Stage reply received");
        Ok(reply)
    }

    /// Hand an artifact to the sink off the async worker threads
    async fn save(&self, content: &str, path: &'static str) -> Result<()> {
        let sink = Arc::clone(&self.sink);
        let content = content.to_string();
        tokio::task::spawn_blocking(move || sink.save(&content, path))
            .await
            .map_err(|e| Error::Other(format!("Saving {} did not complete: {}", path, e)))??;
        self.progress.on_saved(path);
        Ok(())
    }

    /// Structure a natural-language requirement
    pub async fn analyze_requirements(&self, requirement: &str) -> Result<String> {
        let prompt = PromptBuilder::new(Stage::Analyze)
            .requirement(requirement)
            .build();
        let structured = self.ask(Stage::Analyze, prompt).await?;
        self.save(&structured, paths::STRUCTURED_REQUIREMENTS).await?;
        Ok(structured)
    }

    /// Write the first version of the code
    pub async fn develop_code(&self, structured: &str) -> Result<String> {
        let prompt = PromptBuilder::new(Stage::Develop)
            .requirements(structured)
            .build();
        let reply = self.ask(Stage::Develop, prompt).await?;
        let code = extract_code(&reply, CODE_LANG);
        self.save(&code, paths::CODE).await?;
        Ok(code)
    }

    async fn request_review(&self, code: &str, requirements: &str) -> Result<String> {
        let prompt = PromptBuilder::new(Stage::Review)
            .requirements(requirements)
            .code(code)
            .build();
        let feedback = self.ask(Stage::Review, prompt).await?;
        self.save(&feedback, paths::CODE_REVIEW).await?;
        Ok(feedback)
    }

    /// Review code once and classify the reply with the gate's policy
    pub async fn review_code(&self, code: &str, requirements: &str) -> Result<ReviewOutcome> {
        let feedback = self.request_review(code, requirements).await?;
        Ok(ReviewOutcome::from_feedback(feedback, self.gate.policy()))
    }

    /// Revise code after a failed review
    pub async fn revise_code(
        &self,
        code: &str,
        feedback: &str,
        requirements: &str,
    ) -> Result<String> {
        let prompt = PromptBuilder::new(Stage::Revise)
            .requirements(requirements)
            .code(code)
            .feedback(feedback)
            .build();
        let reply = self.ask(Stage::Revise, prompt).await?;
        let revised = extract_code(&reply, CODE_LANG);
        self.save(&revised, paths::REVISED_CODE).await?;
        Ok(revised)
    }

    /// Write Markdown documentation
    pub async fn generate_documentation(&self, code: &str, requirements: &str) -> Result<String> {
        let prompt = PromptBuilder::new(Stage::Document)
            .requirements(requirements)
            .code(code)
            .build();
        let documentation = self.ask(Stage::Document, prompt).await?;
        self.save(&documentation, paths::DOCUMENTATION).await?;
        Ok(documentation)
    }

    /// Write tests; every fenced block in the reply is kept
    pub async fn generate_tests(&self, code: &str, requirements: &str) -> Result<String> {
        let prompt = PromptBuilder::new(Stage::Test)
            .requirements(requirements)
            .code(code)
            .build();
        let reply = self.ask(Stage::Test, prompt).await?;
        let tests = extract_all_code(&reply, CODE_LANG);
        self.save(&tests, paths::TESTS).await?;
        Ok(tests)
    }

    /// Write UI code
    pub async fn generate_ui(&self, code: &str, requirements: &str) -> Result<String> {
        let prompt = PromptBuilder::new(Stage::Ui)
            .requirements(requirements)
            .code(code)
            .build();
        let reply = self.ask(Stage::Ui, prompt).await?;
        let ui_code = extract_code(&reply, CODE_LANG);
        self.save(&ui_code, paths::UI_CODE).await?;
        Ok(ui_code)
    }

    /// Run every stage for one requirement
    ///
    /// Failing the review gate is not an error; the report carries
    /// `review_passed = false` instead.
    pub async fn run(&self, requirement: &str) -> Result<PipelineReport> {
        if requirement.trim().is_empty() {
            return Err(Error::Other("Requirement is empty".to_string()));
        }

        let started = Instant::now();
        info!(requirement_len = requirement.len(), "Starting pipeline");
        self.progress.on_start();

        let structured = self.analyze_requirements(requirement).await?;
        let code = self.develop_code(&structured).await?;

        let progress = Arc::clone(&self.progress);
        let gate = self
            .gate
            .run_with(code, &structured, self, self, &mut |event: GateEvent| {
                progress.on_gate(&event)
            })
            .await?;

        let documentation = self.generate_documentation(&gate.code, &structured).await?;
        let tests = self.generate_tests(&gate.code, &structured).await?;
        let ui_code = self.generate_ui(&gate.code, &structured).await?;

        let report = PipelineReport {
            requirement: requirement.to_string(),
            structured_requirement: structured,
            code: gate.code,
            review_passed: gate.passed,
            revisions: gate.revisions,
            review_feedback: gate.last_review.map(|r| r.feedback),
            documentation,
            tests,
            ui_code,
            elapsed: started.elapsed(),
        };

        self.save(&serde_json::to_string_pretty(&report)?, paths::RUN_SUMMARY).await?;

        info!(
            passed = report.review_passed,
            revisions = report.revisions,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Pipeline completed"
        );
        self.progress.on_complete(&report);

        Ok(report)
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("backend", &self.backend.name())
            .field("gate", &self.gate)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Reviewer for Pipeline {
    async fn review(&self, code: &str, requirements: &str) -> Result<String> {
        self.request_review(code, requirements).await
    }
}

#[async_trait]
impl Reviser for Pipeline {
    async fn revise(&self, code: &str, feedback: &str, requirements: &str) -> Result<String> {
        self.revise_code(code, feedback, requirements).await
    }
}
