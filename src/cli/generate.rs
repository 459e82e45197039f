//! `generate` and `custom` commands

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use std::path::PathBuf;

use super::shared::{build_engine, fetch_snapshot, http_client, spinner, RepoArgs};
use crate::domain::{DiagramArtifact, DiagramRequestKind};
use crate::engine::EngineError;
use crate::render::{render_diagram, write_markdown};

#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub repo: RepoArgs,

    /// Diagram type: sequence, component, database, flowchart, class, state, journey, gantt, mindmap
    #[arg(short = 't', long = "type", value_name = "TYPE", default_value = "component", value_parser = parse_kind)]
    pub kind: DiagramRequestKind,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug)]
pub struct CustomArgs {
    #[command(flatten)]
    pub repo: RepoArgs,

    /// What the diagram should show
    #[arg(short = 'q', long = "request", value_name = "TEXT")]
    pub request: String,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug)]
pub struct OutputArgs {
    /// Write a Markdown document instead of printing the diagram
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

fn parse_kind(value: &str) -> Result<DiagramRequestKind, String> {
    value.parse()
}

pub async fn run_generate(args: GenerateArgs) -> Result<()> {
    let config = args.repo.config.load()?;
    let http = http_client()?;
    let engine = build_engine(&config, &http)?;
    let snapshot = fetch_snapshot(&config, &args.repo, &http).await?;

    let bar = spinner(format!("Generating {} diagram", args.kind));
    let result = engine.generate_by_type(&snapshot, args.kind).await;
    bar.finish_and_clear();

    emit(explain(result)?, &args.output)
}

pub async fn run_custom(args: CustomArgs) -> Result<()> {
    let config = args.repo.config.load()?;
    let http = http_client()?;
    let engine = build_engine(&config, &http)?;
    let snapshot = fetch_snapshot(&config, &args.repo, &http).await?;

    let bar = spinner("Generating custom diagram");
    let result = engine.generate_custom(&snapshot, &args.request).await;
    bar.finish_and_clear();

    emit(explain(result)?, &args.output)
}

/// List diagnostics on stderr before failing on an invalid diagram.
fn explain(result: Result<DiagramArtifact, EngineError>) -> Result<DiagramArtifact> {
    match result {
        Err(EngineError::InvalidDiagram { diagnostics }) => {
            eprintln!("{}", style("The model did not produce a valid diagram:").red().bold());
            for diagnostic in &diagnostics {
                eprintln!("  {diagnostic}");
            }
            anyhow::bail!("Diagram generation failed after retrying")
        }
        other => other.context("Diagram generation failed"),
    }
}

fn emit(artifact: DiagramArtifact, output: &OutputArgs) -> Result<()> {
    match &output.output {
        Some(path) => {
            write_markdown(path, &render_diagram(&artifact))?;
            eprintln!(
                "{} {} diagram written to {}",
                style("✓").green(),
                artifact.tag,
                path.display()
            );
        }
        None => println!("{}", artifact.code),
    }
    Ok(())
}
