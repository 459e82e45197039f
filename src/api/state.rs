use std::sync::Arc;
use std::time::Duration;

use crate::domain::Config;
use crate::engine::{Engine, EngineConfig};
use crate::fetch::{CachingFetcher, GitFetcher, RepositoryFetcher, SnapshotCache};
use crate::llm::{LlmClient, OpenAiClient};
use crate::render::MermaidInk;

/// Shared state for all handlers. Everything here is safe to share; the only
/// mutable part is the snapshot cache inside the fetcher.
pub struct AppState {
    pub fetcher: Arc<dyn RepositoryFetcher>,
    pub engine: Engine,
    pub renderer: MermaidInk,
}

impl AppState {
    pub fn new(fetcher: Arc<dyn RepositoryFetcher>, engine: Engine, renderer: MermaidInk) -> Arc<Self> {
        Arc::new(Self { fetcher, engine, renderer })
    }

    /// Wire the live collaborators. Fails when the model API key is missing.
    pub fn from_config(config: &Config) -> anyhow::Result<Arc<Self>> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("repo-diagram/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let cache = SnapshotCache::new(config.cache.capacity, Duration::from_secs(config.cache.ttl_secs));
        let fetcher = CachingFetcher::new(
            GitFetcher::new(config.fetch.clone(), http.clone(), config.github_token.clone()),
            cache,
        );

        let llm: Arc<dyn LlmClient> = Arc::new(OpenAiClient::from_env(http.clone(), &config.llm)?);
        let engine = Engine::new(llm, EngineConfig::default());
        let renderer = MermaidInk::new(http, &config.render);

        Ok(Self::new(Arc::new(fetcher), engine, renderer))
    }
}
