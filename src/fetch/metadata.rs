//! GitHub REST metadata for a repository.

use crate::domain::{FetchConfig, RepoSnapshot};
use crate::fetch::{FetchError, GitHubRepo};
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

/// The subset of `GET /repos/{owner}/{repo}` the snapshot uses.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct RepoMetadata {
    pub name: Option<String>,
    pub description: Option<String>,
    pub language: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default)]
    pub open_issues_count: u64,
    #[serde(default)]
    pub topics: Vec<String>,
}

impl RepoMetadata {
    /// Remote values win over what the scan inferred, when present.
    pub fn apply_to(self, snapshot: &mut RepoSnapshot) {
        if let Some(name) = self.name.filter(|n| !n.is_empty()) {
            snapshot.name = name;
        }
        if let Some(description) = self.description {
            snapshot.description = description;
        }
        if let Some(language) = self.language.filter(|l| !l.is_empty()) {
            snapshot.language = language;
        }
        snapshot.stars = self.stargazers_count;
        snapshot.forks = self.forks_count;
        snapshot.open_issues = self.open_issues_count;
        snapshot.topics = self.topics;
    }
}

pub async fn fetch_metadata(
    http: &reqwest::Client,
    config: &FetchConfig,
    repo: &GitHubRepo,
    token: Option<&str>,
) -> Result<RepoMetadata, FetchError> {
    let url = format!(
        "{}/repos/{}/{}",
        config.github_api_url.trim_end_matches('/'),
        repo.owner,
        repo.name
    );
    let timeout = Duration::from_secs(config.metadata_timeout_secs);

    let mut request = http
        .get(&url)
        .header(reqwest::header::ACCEPT, "application/vnd.github.v3+json")
        .timeout(timeout);
    if let Some(token) = token {
        request = request.bearer_auth(token);
    }

    let response = request.send().await.map_err(|e| {
        if e.is_timeout() {
            FetchError::Timeout(timeout)
        } else {
            FetchError::Transient(e.to_string())
        }
    })?;

    match response.status() {
        status if status.is_success() => response
            .json::<RepoMetadata>()
            .await
            .map_err(|e| FetchError::Transient(format!("invalid metadata response: {e}"))),
        StatusCode::NOT_FOUND => Err(FetchError::NotFound(repo.to_string())),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Err(FetchError::AccessDenied(repo.to_string()))
        }
        status => Err(FetchError::Transient(format!("GitHub API returned {status}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_deserializes_and_applies() {
        let body = r#"{
            "name": "app",
            "description": "An app",
            "language": "Rust",
            "stargazers_count": 42,
            "forks_count": 3,
            "open_issues_count": 1,
            "topics": ["cli", "llm"],
            "private": false
        }"#;
        let meta: RepoMetadata = serde_json::from_str(body).unwrap();

        let mut snapshot = RepoSnapshot { name: "scan-name".into(), language: "Python".into(), ..Default::default() };
        meta.apply_to(&mut snapshot);
        assert_eq!(snapshot.name, "app");
        assert_eq!(snapshot.description, "An app");
        assert_eq!(snapshot.language, "Rust");
        assert_eq!(snapshot.stars, 42);
        assert_eq!(snapshot.topics, vec!["cli", "llm"]);
    }

    #[test]
    fn test_null_language_keeps_scanned_value() {
        let meta: RepoMetadata =
            serde_json::from_str(r#"{"name": "app", "description": null, "language": null}"#).unwrap();
        let mut snapshot = RepoSnapshot { language: "Go".into(), ..Default::default() };
        meta.apply_to(&mut snapshot);
        assert_eq!(snapshot.language, "Go");
        assert_eq!(snapshot.description, "");
    }
}
