//! Repository scanning: turns a checkout on disk into a `RepoSnapshot`.

use crate::domain::{FetchConfig, RepoSnapshot};
use anyhow::Result;
use std::path::Path;

pub mod scanner;
pub mod tree;

pub use scanner::{ContentScanner, ScanOutput, ScanStats};
pub use tree::{build_file_tree, render_tree, FileTree};

/// Directories never descended into.
pub const SKIPPED_DIRS: &[&str] = &[
    ".git",
    "node_modules",
    "__pycache__",
    ".next",
    "dist",
    "build",
    "coverage",
    ".venv",
    "venv",
    "env",
    ".idea",
    ".vscode",
    "target",
];

const LANGUAGE_EXTENSIONS: &[(&str, &[&str])] = &[
    ("Python", &[".py"]),
    ("JavaScript", &[".js", ".jsx"]),
    ("TypeScript", &[".ts", ".tsx"]),
    ("Java", &[".java"]),
    ("Go", &[".go"]),
    ("Rust", &[".rs"]),
    ("C++", &[".cpp", ".cc", ".cxx"]),
    ("C", &[".c", ".h"]),
    ("Ruby", &[".rb"]),
    ("PHP", &[".php"]),
    ("Swift", &[".swift"]),
    ("Kotlin", &[".kt"]),
];

pub fn is_skipped_dir(name: &str) -> bool {
    SKIPPED_DIRS.contains(&name)
}

/// Language name for a dotted extension such as `.rs`.
pub fn language_for_extension(ext: &str) -> Option<&'static str> {
    LANGUAGE_EXTENSIONS
        .iter()
        .find(|(_, exts)| exts.contains(&ext))
        .map(|(language, _)| *language)
}

/// Most frequent language, ties broken alphabetically; `Unknown` when empty.
pub fn primary_language(languages: &std::collections::BTreeMap<String, usize>) -> String {
    languages
        .iter()
        .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
        .map(|(language, _)| language.clone())
        .unwrap_or_else(|| "Unknown".to_string())
}

/// Scan `root` into a snapshot named `name`. Remote metadata is merged by the caller.
pub fn build_snapshot(root: &Path, name: &str, config: &FetchConfig) -> Result<RepoSnapshot> {
    let file_structure = build_file_tree(root, config.tree_max_depth)?;
    let ScanOutput { file_contents, languages, dependencies, readme, stats } =
        ContentScanner::from_config(root.to_path_buf(), config).scan()?;

    tracing::info!("analyzed {} files in {}", file_contents.len(), name);
    tracing::debug!(
        seen = stats.files_seen,
        skipped_size = stats.files_skipped_size,
        skipped_binary = stats.files_skipped_binary,
        skipped_limit = stats.files_skipped_limit,
        bytes = stats.bytes_read,
        "scan finished"
    );

    Ok(RepoSnapshot {
        name: name.to_string(),
        language: primary_language(&languages),
        languages,
        file_structure,
        file_contents,
        dependencies,
        readme,
        ..RepoSnapshot::default()
    })
}
