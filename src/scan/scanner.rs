//! Content scanner: reads the files that go into the model context.

use crate::domain::{FetchConfig, FileContent};
use crate::scan::{is_skipped_dir, language_for_extension};
use crate::utils::classify::DEPENDENCY_MANIFESTS;
use crate::utils::encoding::DEFAULT_SAMPLE_SIZE;
use crate::utils::{
    classify_file_purpose, file_extension, is_binary_file, read_file_safe, relative_to,
    truncate_chars,
};
use anyhow::Result;
use ignore::WalkBuilder;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Extensions whose files are read into the snapshot.
const CODE_EXTENSIONS: &[&str] = &[
    "py", "js", "jsx", "ts", "tsx", "java", "go", "rs", "cpp", "c", "h", "rb", "php", "swift", "kt",
    "scala", "sh", "yml", "yaml", "json", "xml",
];

/// Extensionless or non-code files that are read regardless of extension.
const IMPORTANT_FILES: &[&str] = &["package.json", "requirements.txt", "Dockerfile", "README.md"];

const README_NAMES: &[&str] = &["README.md", "README.txt", "README", "readme.md"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub files_seen: usize,
    pub files_read: usize,
    pub files_skipped_size: usize,
    pub files_skipped_binary: usize,
    pub files_skipped_limit: usize,
    pub bytes_read: u64,
}

/// Everything the scanner collects from disk, apart from the tree.
#[derive(Debug, Clone, Default)]
pub struct ScanOutput {
    pub file_contents: BTreeMap<String, FileContent>,
    pub languages: BTreeMap<String, usize>,
    pub dependencies: BTreeMap<String, String>,
    pub readme: String,
    pub stats: ScanStats,
}

/// Walks a checkout and gathers bounded file contents.
pub struct ContentScanner {
    root_path: PathBuf,
    max_files: usize,
    max_file_bytes: u64,
    max_content_chars: usize,
    manifest_chars: usize,
    respect_gitignore: bool,
}

impl ContentScanner {
    pub fn new(root_path: PathBuf) -> Self {
        Self::from_config(root_path, &FetchConfig::default())
    }

    pub fn from_config(root_path: PathBuf, config: &FetchConfig) -> Self {
        Self {
            root_path,
            max_files: config.max_files,
            max_file_bytes: config.max_file_bytes,
            max_content_chars: config.max_content_chars,
            manifest_chars: config.manifest_chars,
            respect_gitignore: true,
        }
    }

    pub fn max_files(mut self, max_files: usize) -> Self {
        self.max_files = max_files;
        self
    }

    pub fn max_file_bytes(mut self, max_bytes: u64) -> Self {
        self.max_file_bytes = max_bytes;
        self
    }

    pub fn respect_gitignore(mut self, respect: bool) -> Self {
        self.respect_gitignore = respect;
        self
    }

    /// Scan the checkout. Files are visited in sorted path order so the
    /// file limit always keeps the same subset.
    pub fn scan(&self) -> Result<ScanOutput> {
        if !self.root_path.is_dir() {
            anyhow::bail!("Path is not a directory: {}", self.root_path.display());
        }

        let mut output = ScanOutput::default();

        let mut builder = WalkBuilder::new(&self.root_path);
        builder
            .git_ignore(self.respect_gitignore)
            .git_global(false)
            .git_exclude(self.respect_gitignore)
            .require_git(false)
            .hidden(false)
            .parents(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(|entry| {
                let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
                !(is_dir && entry.depth() > 0 && is_skipped_dir(&entry.file_name().to_string_lossy()))
            });

        for entry in builder.build() {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::debug!("walk error: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }

            let path = entry.path();
            let Some(rel_path) = relative_to(&self.root_path, path) else { continue };
            let file_name = entry.file_name().to_string_lossy().to_string();
            output.stats.files_seen += 1;

            let dotted_ext =
                path.extension().map(|e| format!(".{}", e.to_string_lossy())).unwrap_or_default();
            if let Some(language) = language_for_extension(&dotted_ext) {
                *output.languages.entry(language.to_string()).or_insert(0) += 1;
            }

            let extension = file_extension(&file_name);
            let wanted = CODE_EXTENSIONS.contains(&extension.as_str())
                || IMPORTANT_FILES.contains(&file_name.as_str());
            if !wanted {
                continue;
            }
            if output.file_contents.len() >= self.max_files {
                output.stats.files_skipped_limit += 1;
                continue;
            }

            let size = match entry.metadata() {
                Ok(m) => m.len(),
                Err(_) => continue,
            };
            if size >= self.max_file_bytes {
                output.stats.files_skipped_size += 1;
                continue;
            }
            if is_binary_file(path, DEFAULT_SAMPLE_SIZE) {
                output.stats.files_skipped_binary += 1;
                continue;
            }

            match read_file_safe(path) {
                Ok(text) => {
                    let full_size = text.chars().count();
                    let content = truncate_chars(&text, self.max_content_chars).to_string();
                    output.stats.files_read += 1;
                    output.stats.bytes_read += size;
                    tracing::trace!("read {}", rel_path);
                    output.file_contents.insert(
                        rel_path,
                        FileContent {
                            content,
                            size,
                            extension: if extension == "none" { String::new() } else { extension },
                            purpose: classify_file_purpose(&file_name),
                            full_size,
                        },
                    );
                }
                Err(e) => tracing::debug!("failed to read {}: {:#}", rel_path, e),
            }
        }

        output.dependencies = self.read_manifests();
        output.readme = self.read_readme();

        tracing::debug!(
            files_seen = output.stats.files_seen,
            files_read = output.stats.files_read,
            "scan complete"
        );
        Ok(output)
    }

    /// Leading slice of each top-level dependency manifest, keyed by package manager.
    fn read_manifests(&self) -> BTreeMap<String, String> {
        DEPENDENCY_MANIFESTS
            .iter()
            .filter_map(|(file, manager)| {
                let text = read_root_file(&self.root_path, file)?;
                Some((manager.to_string(), truncate_chars(&text, self.manifest_chars).to_string()))
            })
            .collect()
    }

    fn read_readme(&self) -> String {
        README_NAMES
            .iter()
            .find_map(|name| read_root_file(&self.root_path, name))
            .unwrap_or_default()
    }
}

fn read_root_file(root: &Path, name: &str) -> Option<String> {
    let path = root.join(name);
    if !path.is_file() {
        return None;
    }
    read_file_safe(&path).map_err(|e| tracing::debug!("{:#}", e)).ok()
}
