//! Final result of a pipeline run

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Everything a run produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    /// The natural-language requirement as given
    pub requirement: String,
    /// Structured requirements from the analysis stage
    pub structured_requirement: String,
    /// Final code after the review gate
    pub code: String,
    /// Whether the last review passed
    pub review_passed: bool,
    /// Number of revisions the gate requested
    pub revisions: u32,
    /// The last reviewer reply, if any review ran
    pub review_feedback: Option<String>,
    /// Markdown documentation
    pub documentation: String,
    /// Generated tests
    pub tests: String,
    /// Generated UI code
    pub ui_code: String,
    /// Wall-clock duration of the run
    #[serde(with = "humantime_serde")]
    pub elapsed: Duration,
}

impl PipelineReport {
    /// "success" if the code passed review, "warnings" otherwise
    pub fn status(&self) -> &'static str {
        if self.review_passed {
            "success"
        } else {
            "warnings"
        }
    }
}
