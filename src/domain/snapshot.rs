//! Repository snapshot model.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// In-memory view of a fetched repository. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepoSnapshot {
    pub name: String,
    pub description: String,
    pub language: String,
    /// Language name → number of files with a matching extension.
    pub languages: BTreeMap<String, usize>,
    pub file_structure: BTreeMap<String, FileNode>,
    pub file_contents: BTreeMap<String, FileContent>,
    /// Package manager → leading slice of its manifest.
    pub dependencies: BTreeMap<String, String>,
    pub readme: String,
    pub stars: u64,
    pub forks: u64,
    pub open_issues: u64,
    pub topics: Vec<String>,
}

impl RepoSnapshot {
    pub fn total_files_analyzed(&self) -> usize {
        self.file_contents.len()
    }
}

/// A node of the nested directory tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FileNode {
    Dir {
        path: String,
        contents: BTreeMap<String, FileNode>,
    },
    File {
        path: String,
        size: u64,
        extension: String,
        purpose: FilePurpose,
    },
}

impl FileNode {
    pub fn path(&self) -> &str {
        match self {
            FileNode::Dir { path, .. } | FileNode::File { path, .. } => path,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileContent {
    pub content: String,
    pub size: u64,
    pub extension: String,
    pub purpose: FilePurpose,
    /// Character count before truncation.
    pub full_size: usize,
}

/// Closed set of heuristic file roles inferred from a file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilePurpose {
    Testing,
    Configuration,
    DataModel,
    Api,
    Ui,
    Utility,
    Service,
    Middleware,
    Dependencies,
    General,
}

impl FilePurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilePurpose::Testing => "testing",
            FilePurpose::Configuration => "configuration",
            FilePurpose::DataModel => "data_model",
            FilePurpose::Api => "api",
            FilePurpose::Ui => "ui",
            FilePurpose::Utility => "utility",
            FilePurpose::Service => "service",
            FilePurpose::Middleware => "middleware",
            FilePurpose::Dependencies => "dependencies",
            FilePurpose::General => "general",
        }
    }
}

impl fmt::Display for FilePurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
