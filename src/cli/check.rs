//! `check` command: repair and validate a Mermaid file offline

use anyhow::Result;
use clap::Args;
use console::style;
use std::path::PathBuf;

use super::shared::read_input;
use crate::mermaid;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Diagram file to check, or `-` for stdin. Sentinel markers and code fences are accepted.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Print the repaired diagram on stdout
    #[arg(long)]
    pub fix: bool,

    /// Print diagnostics as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: CheckArgs) -> Result<()> {
    let text = read_input(&args.file)?;
    let diagram = mermaid::sanitize_bare(&text).diagram.unwrap_or_else(|| mermaid::repair(&text));

    if args.json {
        let report = serde_json::json!({
            "valid": diagram.is_valid(),
            "diagram_type": diagram.tag(),
            "diagnostics": diagram.diagnostics,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if args.fix {
        println!("{}", diagram.code);
    }

    if diagram.is_valid() {
        if !args.json {
            eprintln!("{} valid {} diagram", style("✓").green(), diagram.tag());
        }
        return Ok(());
    }

    if !args.json {
        for diagnostic in &diagram.diagnostics {
            eprintln!("{} {diagnostic}", style("✗").red());
        }
    }
    anyhow::bail!("{} has {} problem(s)", args.file.display(), diagram.diagnostics.len())
}
