//! Image export through a Mermaid rendering service.

use crate::domain::RenderConfig;
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Png,
    Svg,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Svg => "svg",
        }
    }

    pub fn media_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Svg => "image/svg+xml",
        }
    }

    /// Path segment of the rendering service for this format.
    fn endpoint(&self) -> &'static str {
        match self {
            ImageFormat::Png => "img",
            ImageFormat::Svg => "svg",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ImageFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(ImageFormat::Png),
            "svg" => Ok(ImageFormat::Svg),
            other => Err(ExportError::UnsupportedFormat(other.to_string())),
        }
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No mermaid code provided")]
    EmptyDiagram,
    #[error("Unsupported image format '{0}' (expected png or svg)")]
    UnsupportedFormat(String),
    #[error("Image generation timed out after {}s", .0.as_secs())]
    Timeout(Duration),
    #[error("Rendering service returned {0}")]
    Upstream(u16),
    #[error("Rendering service request failed: {0}")]
    Transport(String),
}

/// Key under which the rendering service looks up a diagram.
pub fn encode_diagram(code: &str) -> String {
    URL_SAFE.encode(code.as_bytes())
}

/// A rendered image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub format: ImageFormat,
    pub bytes: Vec<u8>,
}

impl Image {
    pub fn file_name(&self) -> String {
        format!("diagram.{}", self.format.extension())
    }
}

/// Client for a mermaid.ink-compatible service.
#[derive(Clone)]
pub struct MermaidInk {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl MermaidInk {
    pub fn new(http: reqwest::Client, config: &RenderConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    pub fn image_url(&self, code: &str, format: ImageFormat) -> String {
        format!("{}/{}/{}", self.base_url, format.endpoint(), encode_diagram(code))
    }

    pub async fn render(&self, code: &str, format: ImageFormat) -> Result<Image, ExportError> {
        if code.trim().is_empty() {
            return Err(ExportError::EmptyDiagram);
        }

        let url = self.image_url(code, format);
        tracing::info!(%format, "fetching rendered diagram");
        let response = self.http.get(&url).timeout(self.timeout).send().await.map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "rendering service rejected diagram");
            return Err(ExportError::Upstream(status.as_u16()));
        }

        let bytes = response.bytes().await.map_err(|e| self.transport_error(e))?;
        Ok(Image { format, bytes: bytes.to_vec() })
    }

    fn transport_error(&self, err: reqwest::Error) -> ExportError {
        if err.is_timeout() {
            ExportError::Timeout(self.timeout)
        } else {
            ExportError::Transport(err.to_string())
        }
    }
}
