use serde::{Deserialize, Serialize};

use crate::domain::{ConversationTurn, DiagramArtifact, DiagramRequestKind};
use crate::engine::ChatReply;

/// POST /generate-diagram request
#[derive(Debug, Deserialize)]
pub struct DiagramRequest {
    pub repo_url: String,
    pub diagram_type: String,
}

/// POST /generate-custom-diagram request
#[derive(Debug, Deserialize)]
pub struct CustomDiagramRequest {
    pub repo_url: String,
    pub user_prompt: String,
    /// Preferred diagram type, passed to the model as a hint.
    #[serde(default)]
    pub diagram_type: Option<String>,
}

impl CustomDiagramRequest {
    /// The request text sent to the model.
    pub fn request_text(&self) -> String {
        match self.diagram_type.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            Some(kind) => format!("{} (preferably as a {kind} diagram)", self.user_prompt.trim()),
            None => self.user_prompt.trim().to_string(),
        }
    }
}

/// Response for both generate endpoints
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct DiagramResponse {
    pub mermaid_code: String,
    pub diagram_type: String,
    pub repo_name: String,
}

impl From<DiagramArtifact> for DiagramResponse {
    fn from(artifact: DiagramArtifact) -> Self {
        Self { mermaid_code: artifact.code, diagram_type: artifact.tag, repo_name: artifact.repo_name }
    }
}

/// A prior turn as sent by the client.
#[derive(Debug, Deserialize)]
pub struct HistoryMessage {
    pub role: String,
    pub content: String,
}

/// POST /chat request
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub repo_url: String,
    pub question: String,
    #[serde(default)]
    pub chat_history: Vec<HistoryMessage>,
}

impl ChatRequest {
    /// Client history as conversation turns; roles other than user and
    /// assistant are dropped.
    pub fn history(&self) -> Vec<ConversationTurn> {
        self.chat_history
            .iter()
            .filter_map(|msg| match msg.role.trim().to_ascii_lowercase().as_str() {
                "user" => Some(ConversationTurn::user(msg.content.clone())),
                "assistant" => Some(ConversationTurn::assistant(msg.content.clone())),
                _ => None,
            })
            .collect()
    }
}

/// POST /chat response
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ChatResponse {
    pub answer: String,
    pub repo_name: String,
    pub has_diagram: bool,
    pub mermaid_code: Option<String>,
    pub diagram_type: Option<String>,
    pub follow_up_questions: Vec<String>,
}

impl From<ChatReply> for ChatResponse {
    fn from(reply: ChatReply) -> Self {
        let (mermaid_code, diagram_type) = match reply.diagram {
            Some(diagram) => (Some(diagram.code), Some(diagram.tag)),
            None => (None, None),
        };
        Self {
            answer: reply.answer,
            repo_name: reply.repo_name,
            has_diagram: mermaid_code.is_some(),
            mermaid_code,
            diagram_type,
            follow_up_questions: reply.follow_ups,
        }
    }
}

/// POST /export-diagram request
#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    #[serde(default)]
    pub mermaid_code: String,
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_format() -> String {
    "png".to_string()
}

/// GET /health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// GET / response
#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub message: &'static str,
    pub version: &'static str,
    pub endpoints: Vec<EndpointInfo>,
    pub diagram_types: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct EndpointInfo {
    pub path: &'static str,
    pub description: &'static str,
}

impl ServiceInfo {
    pub fn current() -> Self {
        let endpoint = |path, description| EndpointInfo { path, description };
        Self {
            message: "Repository Mermaid diagram generator",
            version: env!("CARGO_PKG_VERSION"),
            endpoints: vec![
                endpoint("/generate-diagram", "POST - Generate a diagram of a given type"),
                endpoint("/generate-custom-diagram", "POST - Generate a diagram from a free-form request"),
                endpoint("/chat", "POST - Ask questions about a repository, with diagrams"),
                endpoint("/export-diagram", "POST - Export a diagram as PNG or SVG"),
                endpoint("/health", "GET - Health check"),
            ],
            diagram_types: DiagramRequestKind::ALL.iter().map(|k| k.as_str()).collect(),
        }
    }
}
