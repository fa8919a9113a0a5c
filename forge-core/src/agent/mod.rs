//! Agent module: roles, stage prompts, chat backends and payload extraction

mod backend;
mod extract;
mod prompts;
mod types;

pub use backend::{ChatBackend, OpenAiBackend};
pub use extract::{extract_all_code, extract_code};
pub use prompts::{get_template, render, PromptBuilder, PromptContext, Stage};
pub use types::AgentRole;
