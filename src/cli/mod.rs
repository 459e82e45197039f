//! Command-line interface for repo-diagram
//!
//! `serve` runs the HTTP API; the other subcommands drive the same pipeline
//! from a terminal.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod chat;
mod check;
mod export;
mod generate;
mod info;
mod serve;
mod shared;

/// Generate Mermaid diagrams of GitHub repositories with a language model
#[derive(Parser)]
#[command(name = "repo-diagram")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API used by the web client
    Serve(serve::ServeArgs),

    /// Generate a diagram of a given type
    Generate(generate::GenerateArgs),

    /// Generate a diagram from a free-form request
    Custom(generate::CustomArgs),

    /// Ask questions about a repository
    Chat(chat::ChatArgs),

    /// Repair and validate a Mermaid file without calling the model
    Check(check::CheckArgs),

    /// Render a Mermaid file to PNG or SVG
    Export(export::ExportArgs),

    /// Display repository information without calling the model
    Info(info::InfoArgs),
}

pub fn run() -> Result<()> {
    // A missing .env is fine; keys may come from the real environment.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // RUST_LOG in the environment always takes precedence; --verbose falls back to DEBUG.
    let level = match (&cli.command, cli.verbose) {
        (_, true) => Level::DEBUG,
        (Commands::Serve(_), false) => Level::INFO,
        _ => Level::WARN,
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::default().add_directive(level.into()));
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    match cli.command {
        Commands::Check(args) => check::run(args),
        command => {
            let runtime = tokio::runtime::Runtime::new().context("Failed to start the async runtime")?;
            runtime.block_on(dispatch(command))
        }
    }
}

async fn dispatch(command: Commands) -> Result<()> {
    match command {
        Commands::Serve(args) => serve::run(args).await,
        Commands::Generate(args) => generate::run_generate(args).await,
        Commands::Custom(args) => generate::run_custom(args).await,
        Commands::Chat(args) => chat::run(args).await,
        Commands::Export(args) => export::run(args).await,
        Commands::Info(args) => info::run(args).await,
        Commands::Check(args) => check::run(args),
    }
}
