//! Repository fetching (GitHub clone or local path) into cached snapshots.

use crate::domain::{FetchConfig, RepoSnapshot};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub mod cache;
pub mod context;
pub mod github;
pub mod local;
pub mod metadata;

pub use cache::SnapshotCache;
pub use context::CheckoutDir;
pub use github::{parse_github_url, GitHubRepo};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Repository not found: {0}")]
    NotFound(String),
    #[error("Access denied to repository {0}; check the GitHub token")]
    AccessDenied(String),
    #[error("Repository fetch timed out after {}s", .0.as_secs())]
    Timeout(Duration),
    #[error("Invalid repository URL '{0}'. Expected: owner/repo")]
    InvalidUrl(String),
    #[error("Transient fetch failure: {0}")]
    Transient(String),
    #[error("I/O error: {0}")]
    Io(String),
}

/// Where a snapshot comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoSource {
    GitHub(GitHubRepo),
    Local(PathBuf),
}

/// One fetch request: a source plus the credential to use for it, if any.
#[derive(Clone, PartialEq, Eq)]
pub struct RepoRequest {
    pub source: RepoSource,
    pub token: Option<String>,
}

impl std::fmt::Debug for RepoRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepoRequest")
            .field("source", &self.source)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl RepoRequest {
    /// Parse a GitHub URL (or `owner/repo`). Blank tokens are treated as absent.
    pub fn github(url: &str, token: Option<String>) -> Result<Self, FetchError> {
        let repo = parse_github_url(url)?;
        let token = token.filter(|t| !t.trim().is_empty());
        Ok(Self { source: RepoSource::GitHub(repo), token })
    }

    pub fn local(path: impl Into<PathBuf>) -> Self {
        Self { source: RepoSource::Local(path.into()), token: None }
    }

    /// Cache key: the canonical source plus a digest of the token prefix.
    pub fn cache_key(&self) -> String {
        let base = match &self.source {
            RepoSource::GitHub(repo) => repo.canonical_url(),
            RepoSource::Local(path) => format!("file://{}", path.display()),
        };
        cache::cache_key(&base, self.token.as_deref())
    }

    pub fn display_name(&self) -> String {
        match &self.source {
            RepoSource::GitHub(repo) => repo.to_string(),
            RepoSource::Local(path) => path.display().to_string(),
        }
    }
}

/// Produces immutable repository snapshots.
#[async_trait]
pub trait RepositoryFetcher: Send + Sync {
    async fn fetch(&self, request: &RepoRequest) -> Result<Arc<RepoSnapshot>, FetchError>;
}

/// Live fetcher: shallow git clone plus GitHub REST metadata, or a local scan.
pub struct GitFetcher {
    config: FetchConfig,
    http: reqwest::Client,
    default_token: Option<String>,
}

impl GitFetcher {
    pub fn new(config: FetchConfig, http: reqwest::Client, default_token: Option<String>) -> Self {
        Self { config, http, default_token }
    }

    async fn fetch_github(
        &self,
        repo: &GitHubRepo,
        token: Option<&str>,
    ) -> Result<RepoSnapshot, FetchError> {
        let timeout = Duration::from_secs(self.config.clone_timeout_secs);
        let clone = github::clone_and_scan(repo.clone(), token.map(str::to_string), self.config.clone());
        let meta = metadata::fetch_metadata(&self.http, &self.config, repo, token);

        let (snapshot, meta) = tokio::join!(
            async {
                match tokio::time::timeout(timeout + Duration::from_secs(1), clone).await {
                    Ok(result) => result,
                    Err(_) => Err(FetchError::Timeout(timeout)),
                }
            },
            meta
        );

        let mut snapshot = snapshot?;
        match meta {
            Ok(meta) => meta.apply_to(&mut snapshot),
            Err(e) => tracing::warn!("GitHub metadata unavailable for {}: {}", repo, e),
        }
        Ok(snapshot)
    }
}

#[async_trait]
impl RepositoryFetcher for GitFetcher {
    async fn fetch(&self, request: &RepoRequest) -> Result<Arc<RepoSnapshot>, FetchError> {
        let snapshot = match &request.source {
            RepoSource::GitHub(repo) => {
                let token = request.token.as_deref().or(self.default_token.as_deref());
                self.fetch_github(repo, token).await?
            }
            RepoSource::Local(path) => {
                let path = path.clone();
                let config = self.config.clone();
                tokio::task::spawn_blocking(move || local::scan_local(&path, &config))
                    .await
                    .map_err(|e| FetchError::Io(e.to_string()))??
            }
        };
        Ok(Arc::new(snapshot))
    }
}

/// Memoizes another fetcher through a bounded [`SnapshotCache`].
pub struct CachingFetcher<F> {
    inner: F,
    cache: SnapshotCache,
}

impl<F: RepositoryFetcher> CachingFetcher<F> {
    pub fn new(inner: F, cache: SnapshotCache) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &SnapshotCache {
        &self.cache
    }
}

#[async_trait]
impl<F: RepositoryFetcher> RepositoryFetcher for CachingFetcher<F> {
    async fn fetch(&self, request: &RepoRequest) -> Result<Arc<RepoSnapshot>, FetchError> {
        let key = request.cache_key();
        if let Some(snapshot) = self.cache.get(&key) {
            tracing::debug!("snapshot cache hit for {}", request.display_name());
            return Ok(snapshot);
        }

        tracing::info!("fetching {}", request.display_name());
        let snapshot = self.inner.fetch(request).await?;
        self.cache.insert(key, Arc::clone(&snapshot));
        Ok(snapshot)
    }
}
