//! CLI command implementations

pub mod run;
pub mod serve;

use std::sync::Arc;

use forge_core::{ChatBackend, Config, OpenAiBackend, Secrets};

pub use run::RunArgs;
pub use serve::ServeArgs;

/// Build the chat backend from configuration and stored secrets
pub fn build_backend(config: &Config) -> anyhow::Result<Arc<dyn ChatBackend>> {
    let secrets = Secrets::load()?;
    let backend = OpenAiBackend::from_config(&config.llm, &secrets)?;
    Ok(Arc::new(backend))
}
