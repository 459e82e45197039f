//! repo-diagram command-line entry point.

use anyhow::Result;

fn main() -> Result<()> {
    repo_diagram::cli::run()
}
