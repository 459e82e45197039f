//! GitHub repository cloning

use crate::domain::{FetchConfig, RepoSnapshot};
use crate::fetch::{CheckoutDir, FetchError};
use crate::scan::build_snapshot;
use git2::{Cred, ErrorClass, ErrorCode, FetchOptions, RemoteCallbacks};
use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

const URL_PREFIXES: &[&str] = &["https://github.com/", "http://github.com/", "github.com/"];

/// `owner/name` of a GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GitHubRepo {
    pub owner: String,
    pub name: String,
}

impl GitHubRepo {
    pub fn canonical_url(&self) -> String {
        format!("https://github.com/{}/{}", self.owner, self.name)
    }

    pub fn clone_url(&self) -> String {
        format!("{}.git", self.canonical_url())
    }
}

impl fmt::Display for GitHubRepo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Parse `owner/repo` out of a GitHub URL or a bare `owner/repo` string.
///
/// Accepts `https://github.com/`, `http://github.com/` and `github.com/`
/// prefixes; a trailing `/` and `.git` suffix are ignored, as is anything
/// after the repository segment (`/tree/main/...`).
pub fn parse_github_url(repo_url: &str) -> Result<GitHubRepo, FetchError> {
    let trimmed = repo_url.trim();
    let mut rest = trimmed;
    for prefix in URL_PREFIXES {
        if let Some(stripped) = rest.strip_prefix(prefix) {
            rest = stripped;
            break;
        }
    }

    let mut parts = rest.trim_end_matches('/').split('/');
    let owner = parts.next().unwrap_or_default();
    let name = parts.next().unwrap_or_default();
    let name = name.strip_suffix(".git").unwrap_or(name);

    let valid = |s: &str| {
        !s.is_empty()
            && s.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    };
    if !valid(owner) || !valid(name) || rest.contains("://") {
        return Err(FetchError::InvalidUrl(trimmed.to_string()));
    }

    Ok(GitHubRepo { owner: owner.to_string(), name: name.to_string() })
}

/// Clone into a temporary checkout and scan it, all on a blocking thread.
/// The checkout is removed before this returns.
pub async fn clone_and_scan(
    repo: GitHubRepo,
    token: Option<String>,
    config: FetchConfig,
) -> Result<RepoSnapshot, FetchError> {
    tokio::task::spawn_blocking(move || {
        let checkout = CheckoutDir::reserve();
        let timeout = Duration::from_secs(config.clone_timeout_secs);
        tracing::info!("cloning {} into {}", repo, checkout.path().display());

        shallow_clone(&repo.clone_url(), checkout.path(), token.as_deref(), timeout)
            .map_err(|e| e.for_repo(&repo))?;

        build_snapshot(checkout.path(), &repo.name, &config)
            .map_err(|e| FetchError::Io(format!("{e:#}")))
    })
    .await
    .map_err(|e| FetchError::Io(format!("clone task failed: {e}")))?
}

/// Failure of a clone before it is tied to a repository name.
#[derive(Debug)]
pub enum CloneFailure {
    DeadlineExceeded(Duration),
    Git(git2::Error),
}

impl CloneFailure {
    fn for_repo(self, repo: &GitHubRepo) -> FetchError {
        match self {
            CloneFailure::DeadlineExceeded(limit) => FetchError::Timeout(limit),
            CloneFailure::Git(err) => map_git_error(&err, &repo.to_string()),
        }
    }
}

/// Shallow (depth 1) clone of the default branch.
///
/// The token, when present, is offered once as HTTPS credentials. Transfer
/// progress callbacks abort the clone once `timeout` has elapsed.
pub fn shallow_clone(
    url: &str,
    dest: &Path,
    token: Option<&str>,
    timeout: Duration,
) -> Result<(), CloneFailure> {
    let deadline = Instant::now() + timeout;
    let timed_out = Arc::new(AtomicBool::new(false));

    let mut callbacks = RemoteCallbacks::new();
    let mut offered = false;
    callbacks.credentials(move |_url, _username, _allowed| {
        match token {
            Some(token) if !offered => {
                offered = true;
                Cred::userpass_plaintext("x-access-token", token)
            }
            _ => Err(git2::Error::new(
                ErrorCode::Auth,
                ErrorClass::Http,
                "authentication required",
            )),
        }
    });
    let flag = Arc::clone(&timed_out);
    callbacks.transfer_progress(move |_progress| {
        if Instant::now() >= deadline {
            flag.store(true, Ordering::SeqCst);
            return false;
        }
        true
    });

    let mut fo = FetchOptions::new();
    fo.depth(1);
    fo.remote_callbacks(callbacks);

    let mut builder = git2::build::RepoBuilder::new();
    builder.fetch_options(fo);

    match builder.clone(url, dest) {
        Ok(_) => Ok(()),
        Err(_) if timed_out.load(Ordering::SeqCst) => Err(CloneFailure::DeadlineExceeded(timeout)),
        Err(e) => Err(CloneFailure::Git(e)),
    }
}

/// Translate a libgit2 error into the fetch taxonomy.
pub fn map_git_error(err: &git2::Error, repo: &str) -> FetchError {
    let message = err.message().to_ascii_lowercase();
    tracing::debug!("git error for {}: {:?} / {:?}: {}", repo, err.class(), err.code(), err.message());

    if err.code() == ErrorCode::Auth || message.contains("401") || message.contains("403") {
        FetchError::AccessDenied(repo.to_string())
    } else if err.code() == ErrorCode::NotFound
        || message.contains("404")
        || message.contains("not found")
    {
        FetchError::NotFound(repo.to_string())
    } else if matches!(err.class(), ErrorClass::Os | ErrorClass::Filesystem) {
        FetchError::Io(err.message().to_string())
    } else {
        FetchError::Transient(err.message().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(url: &str) -> (String, String) {
        let repo = parse_github_url(url).expect("valid url");
        (repo.owner, repo.name)
    }

    #[test]
    fn test_parse_accepts_all_prefixes() {
        let expected = ("octo".to_string(), "app".to_string());
        assert_eq!(parsed("https://github.com/octo/app"), expected);
        assert_eq!(parsed("http://github.com/octo/app"), expected);
        assert_eq!(parsed("github.com/octo/app"), expected);
        assert_eq!(parsed("octo/app"), expected);
    }

    #[test]
    fn test_parse_strips_suffixes() {
        let expected = ("octo".to_string(), "app".to_string());
        assert_eq!(parsed("https://github.com/octo/app.git"), expected);
        assert_eq!(parsed("https://github.com/octo/app/"), expected);
        assert_eq!(parsed("  https://github.com/octo/app/tree/main/src  "), expected);
    }

    #[test]
    fn test_parse_rejects_invalid() {
        for url in ["", "octo", "https://github.com/octo", "https://gitlab.com/octo/app", "octo/ap p"] {
            assert!(
                matches!(parse_github_url(url), Err(FetchError::InvalidUrl(_))),
                "{url:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_urls() {
        let repo = parse_github_url("octo/app").unwrap();
        assert_eq!(repo.canonical_url(), "https://github.com/octo/app");
        assert_eq!(repo.clone_url(), "https://github.com/octo/app.git");
        assert_eq!(repo.to_string(), "octo/app");
    }

    #[test]
    fn test_map_git_error() {
        let auth = git2::Error::new(ErrorCode::Auth, ErrorClass::Http, "authentication required");
        assert!(matches!(map_git_error(&auth, "o/r"), FetchError::AccessDenied(_)));

        let missing = git2::Error::new(ErrorCode::GenericError, ErrorClass::Http, "unexpected http status code: 404");
        assert!(matches!(map_git_error(&missing, "o/r"), FetchError::NotFound(_)));

        let net = git2::Error::new(ErrorCode::GenericError, ErrorClass::Net, "failed to resolve address");
        assert!(matches!(map_git_error(&net, "o/r"), FetchError::Transient(_)));
    }

    #[test]
    fn test_clone_of_missing_local_remote_fails() {
        let tmp = tempfile::TempDir::new().unwrap();
        let result = shallow_clone(
            &format!("file://{}/nope", tmp.path().display()),
            &tmp.path().join("dest"),
            None,
            Duration::from_secs(5),
        );
        assert!(matches!(result, Err(CloneFailure::Git(_))));
    }
}
