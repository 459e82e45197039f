//! `export` command: render a diagram file to PNG or SVG

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use std::path::PathBuf;

use super::shared::{http_client, read_input, spinner, ConfigArgs};
use crate::mermaid;
use crate::render::{ImageFormat, MermaidInk};

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Diagram file to render, or `-` for stdin
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Image format: png or svg
    #[arg(short, long, default_value = "png", value_parser = parse_format)]
    pub format: ImageFormat,

    /// Output file (default: diagram.<format>)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Render even if the diagram fails validation
    #[arg(long)]
    pub force: bool,

    #[command(flatten)]
    pub config: ConfigArgs,
}

fn parse_format(value: &str) -> Result<ImageFormat, String> {
    value.parse().map_err(|e: crate::render::ExportError| e.to_string())
}

pub async fn run(args: ExportArgs) -> Result<()> {
    let config = args.config.load()?;
    let text = read_input(&args.file)?;
    let diagram = mermaid::sanitize_bare(&text).diagram.unwrap_or_else(|| mermaid::repair(&text));
    if !diagram.is_valid() && !args.force {
        for diagnostic in &diagram.diagnostics {
            eprintln!("{} {diagnostic}", style("✗").red());
        }
        anyhow::bail!("Refusing to render an invalid diagram (use --force to try anyway)");
    }

    let renderer = MermaidInk::new(http_client()?, &config.render);
    let bar = spinner(format!("Rendering {}", args.format));
    let result = renderer.render(&diagram.code, args.format).await;
    bar.finish_and_clear();
    let image = result.context("Export failed")?;

    let output = args.output.unwrap_or_else(|| PathBuf::from(image.file_name()));
    std::fs::write(&output, &image.bytes).with_context(|| format!("Failed to write {}", output.display()))?;
    eprintln!("{} wrote {} ({} bytes)", style("✓").green(), output.display(), image.bytes.len());
    Ok(())
}
