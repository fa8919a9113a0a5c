//! Agent role definitions for Forge
//!
//! Each pipeline stage is sent by one role, which carries the system message
//! framing the request:
//! - RequirementAnalyst: Structures natural-language requirements
//! - CodeDeveloper: Writes and revises the application code
//! - CodeReviewer: Reviews code against requirements
//! - DocumentationSpecialist: Writes Markdown documentation
//! - TestEngineer: Writes pytest test cases
//! - UiDesigner: Writes a Streamlit front end for the code

use serde::{Deserialize, Serialize};
use std::fmt;

/// The role an agent plays in the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    /// Turns free text into a structured JSON specification
    RequirementAnalyst,
    /// Writes code and revises it after review
    CodeDeveloper,
    /// Reviews code and decides PASS or NEEDS REVISION
    CodeReviewer,
    /// Writes user-facing documentation
    DocumentationSpecialist,
    /// Writes pytest test cases
    TestEngineer,
    /// Writes a Streamlit UI
    UiDesigner,
}

impl AgentRole {
    /// Get all roles in pipeline order
    pub fn all() -> &'static [AgentRole] {
        &[
            AgentRole::RequirementAnalyst,
            AgentRole::CodeDeveloper,
            AgentRole::CodeReviewer,
            AgentRole::DocumentationSpecialist,
            AgentRole::TestEngineer,
            AgentRole::UiDesigner,
        ]
    }

    /// Display name used in progress output
    pub fn name(&self) -> &'static str {
        match self {
            AgentRole::RequirementAnalyst => "RequirementAnalyst",
            AgentRole::CodeDeveloper => "CodeDeveloper",
            AgentRole::CodeReviewer => "CodeReviewer",
            AgentRole::DocumentationSpecialist => "DocumentationSpecialist",
            AgentRole::TestEngineer => "TestEngineer",
            AgentRole::UiDesigner => "StreamlitUIDesigner",
        }
    }

    /// One-line description shown in the web form
    pub fn description(&self) -> &'static str {
        match self {
            AgentRole::RequirementAnalyst => "Structures natural language requirements",
            AgentRole::CodeDeveloper => "Develops Python code based on structured requirements",
            AgentRole::CodeReviewer => "Reviews code and provides feedback",
            AgentRole::DocumentationSpecialist => "Creates comprehensive documentation",
            AgentRole::TestEngineer => "Develops test cases",
            AgentRole::UiDesigner => "Creates a user interface",
        }
    }

    /// System message sent with every request from this role
    pub fn system_message(&self) -> &'static str {
        match self {
            AgentRole::RequirementAnalyst => {
                "You are a requirement analysis expert.\n\
                 Your job is to:\n\
                 1. Take natural language requirements\n\
                 2. Structure them into clear, detailed software requirements\n\
                 3. Identify any ambiguities or missing details and resolve them\n\
                 4. Organize requirements into functional, non-functional, and technical categories\n\
                 5. Output a JSON format with the structured requirements\n\n\
                 Your response should be clear, thorough, and actionable for the coding team."
            }
            AgentRole::CodeDeveloper => {
                "You are an expert Python developer.\n\
                 Your job is to:\n\
                 1. Take structured requirements\n\
                 2. Develop clean, efficient, and modular Python code that satisfies all requirements\n\
                 3. Use best practices and design patterns\n\
                 4. Provide explanatory comments\n\
                 5. Handle edge cases and errors appropriately\n\n\
                 If your code is sent back for revision, carefully analyze the feedback and improve accordingly."
            }
            AgentRole::CodeReviewer => {
                "You are a senior code reviewer.\n\
                 Your job is to:\n\
                 1. Analyze code for bugs, inefficiencies, and security issues\n\
                 2. Check code against requirements to ensure all functionality is implemented\n\
                 3. Evaluate code readability and maintainability\n\
                 4. Provide specific, actionable feedback\n\
                 5. Make a clear PASS/REVISION NEEDED decision\n\n\
                 Be thorough but fair. Cite specific issues and suggest improvements."
            }
            AgentRole::DocumentationSpecialist => {
                "You are a documentation specialist.\n\
                 Your job is to:\n\
                 1. Create comprehensive documentation for Python code\n\
                 2. Follow standard documentation formats\n\
                 3. Include overview, installation instructions, usage examples, and API references\n\
                 4. Ensure documentation is clear for both technical and non-technical users\n\
                 5. Use Markdown format for the documentation\n\n\
                 Focus on clarity, completeness, and usability."
            }
            AgentRole::TestEngineer => {
                "You are a test engineering expert.\n\
                 Your job is to:\n\
                 1. Generate comprehensive test cases for Python code\n\
                 2. Write both unit tests and integration tests using pytest\n\
                 3. Ensure high test coverage\n\
                 4. Include edge cases and error handling tests\n\
                 5. Develop test fixtures and setup/teardown as needed\n\n\
                 Make tests thorough, maintainable, and descriptive."
            }
            AgentRole::UiDesigner => {
                "You are a Streamlit UI development expert.\n\
                 Your job is to:\n\
                 1. Create intuitive Streamlit UIs for Python applications\n\
                 2. Develop responsive, user-friendly interfaces\n\
                 3. Implement proper input validation and error handling\n\
                 4. Design consistent styling and layout\n\
                 5. Integrate the UI with the underlying application functionality\n\n\
                 Focus on usability, aesthetics, and functional completeness."
            }
        }
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
