//! Arguments and helpers shared by the subcommands.

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::config::load_config;
use crate::domain::{Config, RepoSnapshot};
use crate::engine::{Engine, EngineConfig};
use crate::fetch::{GitFetcher, RepoRequest, RepositoryFetcher};
use crate::llm::{LlmClient, OpenAiClient};

/// Where the repository comes from, plus config location.
#[derive(Args, Debug, Clone)]
pub struct RepoArgs {
    /// GitHub repository URL or owner/repo
    #[arg(value_name = "REPO", required_unless_present = "path", conflicts_with = "path")]
    pub repo: Option<String>,

    /// Analyze a local directory instead of cloning
    #[arg(short, long, value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// GitHub token for private repositories
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    #[command(flatten)]
    pub config: ConfigArgs,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Path to config file (repo-diagram.toml or repo-diagram.yml)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub file: Option<PathBuf>,
}

impl ConfigArgs {
    pub fn load(&self) -> Result<Config> {
        let cwd = std::env::current_dir().context("Failed to read the working directory")?;
        load_config(&cwd, self.file.as_deref())
    }
}

impl RepoArgs {
    pub fn request(&self) -> Result<RepoRequest> {
        match (&self.repo, &self.path) {
            (_, Some(path)) => Ok(RepoRequest::local(path.clone())),
            (Some(url), None) => Ok(RepoRequest::github(url, self.token.clone())?),
            (None, None) => anyhow::bail!("Either a repository URL or --path must be specified"),
        }
    }
}

pub fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("repo-diagram/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")
}

pub fn spinner(message: impl Into<String>) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg} ({elapsed})") {
        bar.set_style(style);
    }
    bar.set_message(message.into());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

/// Fetch the snapshot named by `args`, with a spinner on stderr.
pub async fn fetch_snapshot(config: &Config, args: &RepoArgs, http: &reqwest::Client) -> Result<Arc<RepoSnapshot>> {
    let request = args.request()?;
    let fetcher = GitFetcher::new(config.fetch.clone(), http.clone(), config.github_token.clone());

    let bar = spinner(format!("Fetching {}", request.display_name()));
    let result = fetcher.fetch(&request).await;
    bar.finish_and_clear();

    let snapshot = result.with_context(|| format!("Failed to fetch {}", request.display_name()))?;
    tracing::info!(
        repo = %snapshot.name,
        files = snapshot.total_files_analyzed(),
        "repository snapshot ready"
    );
    Ok(snapshot)
}

pub fn build_engine(config: &Config, http: &reqwest::Client) -> Result<Engine> {
    let llm: Arc<dyn LlmClient> = Arc::new(OpenAiClient::from_env(http.clone(), &config.llm)?);
    Ok(Engine::new(llm, EngineConfig::default()))
}

/// Read a diagram from a file, or stdin when the path is `-`.
pub fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::Read::read_to_string(&mut std::io::stdin(), &mut text).context("Failed to read stdin")?;
        return Ok(text);
    }
    crate::utils::read_file_safe(path).with_context(|| format!("Failed to read {}", path.display()))
}
