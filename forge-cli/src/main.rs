//! Forge CLI - Command line interface for Forge
//!
//! Turns a natural-language requirement into code, documentation, tests and
//! UI code through a fixed sequence of agent requests.

mod commands;
mod web;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use forge_core::{Config, Provider, Secrets};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{RunArgs, ServeArgs};

/// Forge: requirement-to-code agent pipeline
#[derive(Parser, Debug)]
#[command(name = "forge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Model to use (overrides config and env)
    #[arg(long, global = true, env = "FORGE_MODEL")]
    model: Option<String>,

    /// Directory artifacts are written to (overrides config and env)
    #[arg(short, long, global = true, env = "FORGE_OUTPUT_DIR")]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// Read a requirement from stdin and run the pipeline
    #[command(visible_alias = "r")]
    Run(RunArgs),

    /// Serve the web form
    Serve(ServeArgs),

    /// Show current configuration
    Config,

    /// Create a secrets file template for API keys
    InitSecrets,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    let config = Config::load_with_overrides(cli.model.clone(), cli.output.clone())?;

    if cli.verbose {
        tracing::info!(
            model = ?config.llm.model,
            output_dir = %config.pipeline.output_dir.display(),
            max_review_iterations = config.pipeline.max_review_iterations,
            "Configuration loaded"
        );
    }

    match cli.command {
        Some(Commands::Version) => {
            println!("forge {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Run(args)) => {
            args.execute(cli.verbose, &config).await?;
        }
        Some(Commands::Serve(args)) => {
            args.execute(&config).await?;
        }
        Some(Commands::Config) => {
            print_config(&config)?;
        }
        Some(Commands::InitSecrets) => {
            let path = Secrets::create_template()?;
            println!("Created {}", path.display());
            println!("Add your OpenAI or Groq API key, then run: forge run");
        }
        None => {
            println!("Forge - requirement-to-code agent pipeline");
            println!();
            println!("To run in CLI mode: forge run");
            println!("To run with the web interface: forge serve");
            println!();
            println!("Use --help for usage information");
        }
    }

    Ok(())
}

fn print_config(config: &Config) -> anyhow::Result<()> {
    let secrets = Secrets::load()?;
    let provider = config.llm.provider_for(&secrets);

    println!("Forge Configuration");
    println!("===================");
    println!();
    println!("LLM Settings:");
    println!("  provider: {}", provider);
    println!("  base_url: {}", config.llm.base_url_for(provider));
    println!("  model: {}", config.llm.model_for(provider));
    println!("  temperature: {}", config.llm.temperature);
    println!("  timeout: {}s", config.llm.timeout.as_secs());
    println!(
        "  api key: {}",
        if secrets.api_key(provider).is_some() {
            "(set)"
        } else {
            "(missing)"
        }
    );
    println!();
    println!("Pipeline Settings:");
    println!("  max_review_iterations: {}", config.pipeline.max_review_iterations);
    println!("  output_dir: {}", config.pipeline.output_dir.display());
    println!("  verdict_policy: {:?}", config.pipeline.verdict_policy);
    println!();
    if let Some(path) = Config::default_config_path() {
        println!("Config file: {}", path.display());
        if path.exists() {
            println!("  (exists)");
        } else {
            println!("  (not found - using defaults)");
        }
    }
    if config.llm.provider.is_none() && provider == Provider::Groq {
        println!();
        println!("Set OPENAI_API_KEY to use OpenAI instead of Groq.");
    }

    Ok(())
}
