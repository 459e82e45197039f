//! Info command implementation

use anyhow::Result;
use clap::Args;
use console::style;

use super::shared::{fetch_snapshot, http_client, RepoArgs};
use crate::domain::RepoSnapshot;
use crate::fetch::local::find_repo_root;
use crate::scan::{render_tree, ContentScanner};
use crate::utils::{categorize_components, ComponentCategory};

#[derive(Args, Debug)]
pub struct InfoArgs {
    #[command(flatten)]
    pub repo: RepoArgs,

    /// Depth of the printed directory tree
    #[arg(long, default_value_t = 3, value_name = "DEPTH")]
    pub tree_depth: usize,
}

pub async fn run(args: InfoArgs) -> Result<()> {
    let config = args.repo.config.load()?;
    let http = http_client()?;
    let snapshot = fetch_snapshot(&config, &args.repo, &http).await?;

    print_summary(&snapshot);

    if let Some(path) = &args.repo.path {
        let root = find_repo_root(&path.canonicalize()?);
        let stats = ContentScanner::from_config(root, &config.fetch).scan()?.stats;
        println!("{}", style("Statistics:").bold());
        println!("  Files seen: {}", stats.files_seen);
        println!("  Files read: {}", stats.files_read);
        println!("  Files skipped (size): {}", stats.files_skipped_size);
        println!("  Files skipped (binary): {}", stats.files_skipped_binary);
        println!("  Files skipped (limit): {}", stats.files_skipped_limit);
        println!("  Bytes read: {}", stats.bytes_read);
    }

    println!("\n{}", render_tree(&snapshot.name, &snapshot.file_structure, args.tree_depth));
    Ok(())
}

fn print_summary(snapshot: &RepoSnapshot) {
    println!("Repository: {}", style(&snapshot.name).cyan().bold());
    if !snapshot.description.is_empty() {
        println!("Description: {}", snapshot.description);
    }
    println!("Primary language: {}", snapshot.language);
    if snapshot.stars > 0 || !snapshot.topics.is_empty() {
        println!("Stars: {} | Forks: {} | Open issues: {}", snapshot.stars, snapshot.forks, snapshot.open_issues);
        if !snapshot.topics.is_empty() {
            println!("Topics: {}", snapshot.topics.join(", "));
        }
    }

    if !snapshot.languages.is_empty() {
        let mut langs: Vec<_> = snapshot.languages.iter().collect();
        langs.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        println!("Languages detected:");
        for (lang, count) in langs {
            println!("  {lang}: {count} files");
        }
    }

    let components = categorize_components(snapshot);
    println!("Components:");
    for category in ComponentCategory::ALL {
        let count = components.get(&category).map_or(0, Vec::len);
        if count > 0 {
            println!("  {category}: {count}");
        }
    }
    if !snapshot.dependencies.is_empty() {
        let managers: Vec<&str> = snapshot.dependencies.keys().map(String::as_str).collect();
        println!("Package managers: {}", managers.join(", "));
    }
    println!("Files analyzed: {}", snapshot.total_files_analyzed());
}
