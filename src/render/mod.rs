//! Output rendering (images via the rendering service, Markdown)

pub mod export;
pub mod markdown;

pub use export::{encode_diagram, ExportError, Image, ImageFormat, MermaidInk};
pub use markdown::{render_diagram, render_transcript, write_markdown};
