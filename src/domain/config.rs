//! Runtime configuration with defaults for every section.

use serde::{Deserialize, Serialize};

/// Top-level configuration, loaded from `repo-diagram.toml` / `.yml` and the
/// `REPO_DIAGRAM_` environment overlay.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub fetch: FetchConfig,
    pub cache: CacheConfig,
    pub render: RenderConfig,
    /// Token used for GitHub metadata calls and clones when a request carries none.
    #[serde(skip_serializing)]
    pub github_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".to_string(), port: 8000 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    pub temperature: f32,
    /// Base URL of an OpenAI-compatible chat completions API.
    pub base_url: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub request_timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            temperature: 0.1,
            base_url: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            request_timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub clone_timeout_secs: u64,
    pub metadata_timeout_secs: u64,
    pub github_api_url: String,
    pub tree_max_depth: usize,
    pub max_files: usize,
    /// Files at or above this size are listed in the tree but never read.
    pub max_file_bytes: u64,
    pub max_content_chars: usize,
    pub manifest_chars: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            clone_timeout_secs: 60,
            metadata_timeout_secs: 10,
            github_api_url: "https://api.github.com".to_string(),
            tree_max_depth: 5,
            max_files: 100,
            max_file_bytes: 100_000,
            max_content_chars: 15_000,
            manifest_chars: 3_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub capacity: usize,
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { capacity: 64, ttl_secs: 1800 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { base_url: "https://mermaid.ink".to_string(), timeout_secs: 30 }
    }
}
