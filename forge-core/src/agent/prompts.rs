//! Stage prompt templates
//!
//! This module provides embedded prompt templates for each pipeline stage.
//! Templates use `{{VARIABLE}}` placeholders that are rendered with context.

use crate::agent::AgentRole;
use std::collections::HashMap;

/// Embedded prompt templates for each stage
const ANALYZE_PROMPT: &str = include_str!("prompts/analyze.md");
const DEVELOP_PROMPT: &str = include_str!("prompts/develop.md");
const REVIEW_PROMPT: &str = include_str!("prompts/review.md");
const REVISE_PROMPT: &str = include_str!("prompts/revise.md");
const DOCUMENT_PROMPT: &str = include_str!("prompts/document.md");
const TEST_PROMPT: &str = include_str!("prompts/test.md");
const UI_PROMPT: &str = include_str!("prompts/ui.md");

/// One request/response exchange in the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Structure the natural-language requirement
    Analyze,
    /// Write the first version of the code
    Develop,
    /// Review the current code
    Review,
    /// Revise the code after a failed review
    Revise,
    /// Write documentation
    Document,
    /// Write tests
    Test,
    /// Write UI code
    Ui,
}

impl Stage {
    /// The role that sends this stage's request
    pub fn role(&self) -> AgentRole {
        match self {
            Stage::Analyze => AgentRole::RequirementAnalyst,
            Stage::Develop | Stage::Revise => AgentRole::CodeDeveloper,
            Stage::Review => AgentRole::CodeReviewer,
            Stage::Document => AgentRole::DocumentationSpecialist,
            Stage::Test => AgentRole::TestEngineer,
            Stage::Ui => AgentRole::UiDesigner,
        }
    }

    /// Progress message shown when the stage starts
    pub fn activity(&self) -> &'static str {
        match self {
            Stage::Analyze => "Analyzing requirements...",
            Stage::Develop => "Developing code...",
            Stage::Review => "Reviewing code...",
            Stage::Revise => "Revising code based on feedback...",
            Stage::Document => "Generating documentation...",
            Stage::Test => "Generating test cases...",
            Stage::Ui => "Generating Streamlit UI...",
        }
    }
}

/// Get the raw prompt template for a stage
pub fn get_template(stage: Stage) -> &'static str {
    match stage {
        Stage::Analyze => ANALYZE_PROMPT,
        Stage::Develop => DEVELOP_PROMPT,
        Stage::Review => REVIEW_PROMPT,
        Stage::Revise => REVISE_PROMPT,
        Stage::Document => DOCUMENT_PROMPT,
        Stage::Test => TEST_PROMPT,
        Stage::Ui => UI_PROMPT,
    }
}

/// Context for rendering a prompt template
#[derive(Debug, Clone, Default)]
pub struct PromptContext {
    /// Variable substitutions
    variables: HashMap<String, String>,
}

impl PromptContext {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a variable value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    /// Set a variable value (builder pattern)
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Set the original natural-language requirement
    pub fn with_requirement(self, requirement: impl Into<String>) -> Self {
        self.with("REQUIREMENT", requirement)
    }

    /// Set the structured requirements
    pub fn with_requirements(self, structured: impl Into<String>) -> Self {
        self.with("REQUIREMENTS", structured)
    }

    /// Set the code under discussion
    pub fn with_code(self, code: impl Into<String>) -> Self {
        self.with("CODE", code)
    }

    /// Set reviewer feedback
    pub fn with_feedback(self, feedback: impl Into<String>) -> Self {
        self.with("FEEDBACK", feedback)
    }
}

/// Render a stage template with the given context
pub fn render(stage: Stage, context: &PromptContext) -> String {
    render_template(get_template(stage), context)
}

/// Render a template string with variable substitution
///
/// Substituted values are never rescanned, so code containing `{{...}}`
/// survives intact. Unset uppercase placeholders become "(not specified)";
/// anything else between braces is left as written.
fn render_template(template: &str, context: &PromptContext) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];

        let Some(end) = after.find("}}") else {
            result.push_str(&rest[start..]);
            return result;
        };

        let name = &after[..end];
        let is_placeholder =
            !name.is_empty() && name.chars().all(|c| c.is_ascii_uppercase() || c == '_');

        if is_placeholder {
            match context.variables.get(name) {
                Some(value) => result.push_str(value),
                None => result.push_str("(not specified)"),
            }
        } else {
            result.push_str(&rest[start..start + 2 + end + 2]);
        }

        rest = &after[end + 2..];
    }

    result.push_str(rest);
    result
}

/// Build a complete prompt for a stage
pub struct PromptBuilder {
    stage: Stage,
    context: PromptContext,
}

impl PromptBuilder {
    /// Create a new prompt builder for the given stage
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            context: PromptContext::new(),
        }
    }

    /// Set the original requirement
    pub fn requirement(mut self, requirement: impl Into<String>) -> Self {
        self.context = self.context.with_requirement(requirement);
        self
    }

    /// Set the structured requirements
    pub fn requirements(mut self, structured: impl Into<String>) -> Self {
        self.context = self.context.with_requirements(structured);
        self
    }

    /// Set the code
    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.context = self.context.with_code(code);
        self
    }

    /// Set the review feedback (for revisions)
    pub fn feedback(mut self, feedback: impl Into<String>) -> Self {
        self.context = self.context.with_feedback(feedback);
        self
    }

    /// Build the final prompt
    pub fn build(self) -> String {
        render(self.stage, &self.context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_template() {
        let template = get_template(Stage::Revise);
        assert!(template.contains("REVIEW FEEDBACK:"));
        assert!(template.contains("{{FEEDBACK}}"));
    }

    #[test]
    fn test_render_with_variables() {
        let prompt = PromptBuilder::new(Stage::Analyze)
            .requirement("Build a calculator")
            .build();
        assert!(prompt.contains("REQUIREMENTS:\nBuild a calculator"));
        assert!(prompt.contains("JSON format"));
    }

    #[test]
    fn test_render_empty_context() {
        let rendered = render(Stage::Develop, &PromptContext::new());
        assert!(rendered.contains("(not specified)"));
        assert!(!rendered.contains("{{"));
    }

    #[test]
    fn test_review_prompt_fences_code() {
        let prompt = PromptBuilder::new(Stage::Review)
            .requirements("{\"overview\": \"calc\"}")
            .code("print(1)")
            .build();
        assert!(prompt.contains("```python\nprint(1)\n```"));
        assert!(prompt.contains("PASSES review"));
        assert!(prompt.contains("NEEDS REVISION"));
    }

    #[test]
    fn test_substituted_values_are_not_rescanned() {
        let prompt = PromptBuilder::new(Stage::Document)
            .requirements("reqs")
            .code("template = \"{{NAME}}\"")
            .build();
        assert!(prompt.contains("template = \"{{NAME}}\""));
    }

    #[test]
    fn test_non_placeholder_braces_kept() {
        let context = PromptContext::new();
        assert_eq!(render_template("a {{lower}} b", &context), "a {{lower}} b");
        assert_eq!(render_template("open {{ only", &context), "open {{ only");
        assert_eq!(render_template("x {{Y}} z", &context), "x (not specified) z");
    }

    #[test]
    fn test_stage_roles() {
        assert_eq!(Stage::Develop.role(), AgentRole::CodeDeveloper);
        assert_eq!(Stage::Revise.role(), AgentRole::CodeDeveloper);
        assert_eq!(Stage::Review.role(), AgentRole::CodeReviewer);
        assert_eq!(Stage::Ui.role(), AgentRole::UiDesigner);
    }
}
