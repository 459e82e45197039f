//! Core domain types shared across fetching, generation, and the HTTP surface.

pub mod config;
pub mod conversation;
pub mod snapshot;

pub use config::{CacheConfig, Config, FetchConfig, LlmConfig, RenderConfig, ServerConfig};
pub use conversation::{ConversationTurn, DiagramArtifact, DiagramRequestKind, Role};
pub use snapshot::{FileContent, FileNode, FilePurpose, RepoSnapshot};
