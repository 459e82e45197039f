//! repo-diagram: Mermaid diagrams of GitHub repositories, drawn by a language model
//!
//! A repository is fetched into an immutable snapshot, rendered into a prompt,
//! and the model's answer goes through the Mermaid extract / repair / validate
//! pipeline, with one correction round when validation fails.

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod engine;
pub mod fetch;
pub mod llm;
pub mod mermaid;
pub mod prompt;
pub mod render;
pub mod scan;
pub mod session;
pub mod utils;
