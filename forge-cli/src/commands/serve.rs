//! Serve command - Run the web form

use std::net::SocketAddr;

use anyhow::Context;
use clap::Args;
use forge_core::Config;

use super::build_backend;
use crate::web::{self, AppState};

/// Arguments for the serve command
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(short, long, default_value = "127.0.0.1:8501")]
    pub addr: SocketAddr,

    /// Keep artifacts in memory instead of writing them to the output directory
    #[arg(long)]
    pub dry_run: bool,
}

impl ServeArgs {
    /// Execute the serve command
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let backend = build_backend(config)?;
        let state = AppState::new(backend, config.pipeline.clone()).persist(!self.dry_run);

        let listener = tokio::net::TcpListener::bind(self.addr)
            .await
            .with_context(|| format!("Failed to bind {}", self.addr))?;

        tracing::info!(addr = %self.addr, dry_run = self.dry_run, "Serving web form");
        println!("Forge web form at http://{}", self.addr);

        axum::serve(listener, web::router(state)).await?;
        Ok(())
    }
}
