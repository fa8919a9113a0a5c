//! Run command - Read a requirement from stdin and run the pipeline

use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use forge_core::pipeline::PrintProgress;
use forge_core::{ArtifactSink, Config, FsSink, MemorySink, Pipeline};
use tokio::io::{AsyncRead, AsyncReadExt};

use super::build_backend;

const BOLD: &str = "\x1b[1m";
const END: &str = "\x1b[0m";

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Keep artifacts in memory instead of writing them to the output directory
    #[arg(long)]
    pub dry_run: bool,
}

impl RunArgs {
    /// Execute the run command
    pub async fn execute(&self, verbose: bool, config: &Config) -> anyhow::Result<()> {
        let backend = build_backend(config)?;

        println!("Enter your natural language requirements (press Ctrl+D when finished):");
        let requirement = read_requirement(tokio::io::stdin()).await?;

        if verbose {
            tracing::info!(
                requirement_len = requirement.len(),
                output_dir = %config.pipeline.output_dir.display(),
                dry_run = self.dry_run,
                "Starting forge run"
            );
        }

        let sink: Arc<dyn ArtifactSink> = if self.dry_run {
            Arc::new(MemorySink::new())
        } else {
            let sink = FsSink::new(&config.pipeline.output_dir);
            sink.prepare().with_context(|| {
                format!(
                    "Failed to create output directory {}",
                    config.pipeline.output_dir.display()
                )
            })?;
            Arc::new(sink)
        };

        let pipeline = Pipeline::from_config(&config.pipeline, backend, sink)
            .with_progress(Arc::new(PrintProgress));

        let report = pipeline.run(&requirement).await?;

        println!();
        println!("{}Pipeline completed with {}{}", BOLD, report.status(), END);

        Ok(())
    }
}

/// Read the whole requirement until end of stream
pub async fn read_requirement<R: AsyncRead + Unpin>(mut reader: R) -> anyhow::Result<String> {
    let mut requirement = String::new();
    reader
        .read_to_string(&mut requirement)
        .await
        .context("Failed to read requirement")?;

    if requirement.trim().is_empty() {
        anyhow::bail!("No requirement given");
    }

    Ok(requirement)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_requirement_until_eof() {
        let input: &[u8] = b"Build a calculator\nwith four operations\n";
        let requirement = read_requirement(input).await.unwrap();
        assert_eq!(requirement, "Build a calculator\nwith four operations\n");
    }

    #[tokio::test]
    async fn test_read_requirement_rejects_blank_input() {
        let input: &[u8] = b"  \n\n";
        assert!(read_requirement(input).await.is_err());
    }
}
