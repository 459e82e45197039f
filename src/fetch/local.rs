//! Local path snapshots

use crate::domain::{FetchConfig, RepoSnapshot};
use crate::fetch::FetchError;
use crate::scan::build_snapshot;
use std::path::{Path, PathBuf};

/// Walk up from `start` looking for a `.git` directory; `start` when none is found.
pub fn find_repo_root(start: &Path) -> PathBuf {
    let found = start.ancestors().find(|dir| dir.join(".git").exists());
    match found {
        Some(root) if root != start => {
            tracing::info!(
                "using repository root {} (detected from {})",
                root.display(),
                start.display()
            );
            root.to_path_buf()
        }
        Some(root) => root.to_path_buf(),
        None => start.to_path_buf(),
    }
}

/// Scan a directory on disk. The snapshot is named after the repository root.
pub fn scan_local(path: &Path, config: &FetchConfig) -> Result<RepoSnapshot, FetchError> {
    let canonical = path.canonicalize().map_err(|_| FetchError::NotFound(path.display().to_string()))?;
    if !canonical.is_dir() {
        return Err(FetchError::InvalidUrl(format!("{} is not a directory", path.display())));
    }

    let root = find_repo_root(&canonical);
    let name = root.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_else(|| "repository".to_string());

    build_snapshot(&root, &name, config).map_err(|e| FetchError::Io(format!("{e:#}")))
}
