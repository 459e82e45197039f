//! Configuration loading
//!
//! Precedence: environment overlay > config file > defaults.

pub mod loader;

pub use loader::{apply_env_overlay, load_config, ENV_PREFIX};
