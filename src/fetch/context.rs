//! Temporary checkout directories

use std::env;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// A directory holding a fresh clone, removed when dropped.
pub struct CheckoutDir {
    root_path: PathBuf,
}

impl CheckoutDir {
    /// Reserve a unique path under the system temp dir. The clone creates it.
    pub fn reserve() -> Self {
        let nanos = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_nanos()).unwrap_or(0);
        let pid = std::process::id();
        let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
        Self { root_path: env::temp_dir().join(format!("repo-diagram-{pid}-{nanos}-{seq}")) }
    }

    pub fn path(&self) -> &Path {
        &self.root_path
    }
}

impl Drop for CheckoutDir {
    fn drop(&mut self) {
        if self.root_path.exists() {
            if let Err(e) = std::fs::remove_dir_all(&self.root_path) {
                tracing::warn!("could not remove {}: {}", self.root_path.display(), e);
            }
        }
    }
}
