//! Path normalization

use std::path::Path;

/// Forward-slash form of a relative path, for stable keys across platforms.
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}

/// `rel` as a forward-slash string relative to `root`, or `None` when outside it.
pub fn relative_to(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    Some(normalize_path(&rel.to_string_lossy()))
}

/// Extension after the last dot, `none` when the name has no dot.
pub fn file_extension(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((_, ext)) => ext.to_string(),
        None => "none".to_string(),
    }
}
