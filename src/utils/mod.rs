//! Shared helpers: file classification, encoding-safe reads, path handling.

pub mod classify;
pub mod encoding;
pub mod paths;

pub use classify::{categorize_components, classify_file_purpose, ComponentCategory, Components};
pub use encoding::{is_binary_file, read_file_safe, truncate_chars};
pub use paths::{file_extension, normalize_path, relative_to};
