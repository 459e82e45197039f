//! Diagram generation: prompt, call the model, validate, correct once.

pub mod follow_ups;
pub mod retry;

pub use follow_ups::follow_up_questions;
pub use retry::{Finished, Outcome, ResponseMode};

use crate::domain::{ConversationTurn, DiagramArtifact, DiagramRequestKind, RepoSnapshot};
use crate::llm::{LlmClient, LlmError};
use crate::mermaid::{CheckedDiagram, Diagnostic};
use crate::prompt;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Model requests per call, first attempt included.
    pub max_attempts: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { max_attempts: 2 }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid Mermaid syntax: {}", join_diagnostics(.diagnostics))]
    InvalidDiagram { diagnostics: Vec<Diagnostic> },
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error("{0} must not be empty")]
    EmptyInput(&'static str),
}

fn join_diagnostics(diagnostics: &[Diagnostic]) -> String {
    diagnostics.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

/// Answer to a conversational question.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatReply {
    pub answer: String,
    pub diagram: Option<DiagramArtifact>,
    pub follow_ups: Vec<String>,
    pub repo_name: String,
}

pub struct Engine {
    llm: Arc<dyn LlmClient>,
    config: EngineConfig,
}

impl Engine {
    pub fn new(llm: Arc<dyn LlmClient>, config: EngineConfig) -> Self {
        Self { llm, config }
    }

    /// Diagram of a fixed kind. The artifact is tagged with the requested
    /// kind even if the model drew a different one.
    pub async fn generate_by_type(
        &self,
        snapshot: &RepoSnapshot,
        kind: DiagramRequestKind,
    ) -> Result<DiagramArtifact, EngineError> {
        tracing::info!(repo = %snapshot.name, %kind, "generating diagram");
        let messages = prompt::diagram_messages(kind, snapshot);
        let diagram = self.require_diagram(messages).await?;
        Ok(DiagramArtifact::new(kind.as_str(), diagram.code, &snapshot.name, kind.as_str()))
    }

    /// Diagram described by a free-form request, tagged by its header.
    pub async fn generate_custom(
        &self,
        snapshot: &RepoSnapshot,
        request: &str,
    ) -> Result<DiagramArtifact, EngineError> {
        if request.trim().is_empty() {
            return Err(EngineError::EmptyInput("Diagram request"));
        }
        tracing::info!(repo = %snapshot.name, "generating custom diagram");
        let messages = prompt::custom_messages(request, snapshot);
        let diagram = self.require_diagram(messages).await?;
        let tag = diagram.tag();
        Ok(DiagramArtifact::new(tag, diagram.code, &snapshot.name, request.trim()))
    }

    /// Answer a question about the repository. A diagram that still fails
    /// validation after the correction attempt is dropped; the answer is kept.
    pub async fn converse(
        &self,
        snapshot: &RepoSnapshot,
        question: &str,
        history: &[ConversationTurn],
    ) -> Result<ChatReply, EngineError> {
        if question.trim().is_empty() {
            return Err(EngineError::EmptyInput("Question"));
        }
        let messages = prompt::conversation_messages(snapshot, history, question);
        let finished =
            retry::run(self.llm.as_ref(), messages, ResponseMode::Conversation, self.config.max_attempts)
                .await?;

        let (answer, diagram) = match finished {
            Finished::Accepted(Outcome { answer, diagram }) => {
                let artifact = diagram.map(|d| {
                    let tag = d.tag();
                    DiagramArtifact::new(tag, d.code, &snapshot.name, question.trim())
                });
                (answer, artifact)
            }
            Finished::Rejected(Outcome { answer, .. }) => {
                tracing::warn!(repo = %snapshot.name, "dropping diagram that failed validation");
                (answer, None)
            }
        };

        let follow_ups = follow_up_questions(&answer, diagram.as_ref().map(|d| d.tag.as_str()));
        Ok(ChatReply { answer, diagram, follow_ups, repo_name: snapshot.name.clone() })
    }

    async fn require_diagram(
        &self,
        messages: Vec<crate::llm::ChatMessage>,
    ) -> Result<CheckedDiagram, EngineError> {
        match retry::run(self.llm.as_ref(), messages, ResponseMode::Diagram, self.config.max_attempts).await? {
            Finished::Accepted(Outcome { diagram: Some(diagram), .. }) => Ok(diagram),
            Finished::Accepted(Outcome { diagram: None, .. }) => {
                Err(EngineError::InvalidDiagram { diagnostics: Vec::new() })
            }
            Finished::Rejected(Outcome { diagram, .. }) => Err(EngineError::InvalidDiagram {
                diagnostics: diagram.map(|d| d.diagnostics).unwrap_or_default(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::scripted::ScriptedClient;
    use crate::mermaid::DiagnosticKind;

    fn snapshot() -> RepoSnapshot {
        RepoSnapshot { name: "demo".into(), language: "Rust".into(), ..Default::default() }
    }

    fn engine(llm: &Arc<ScriptedClient>) -> Engine {
        let llm: Arc<dyn LlmClient> = llm.clone();
        Engine::new(llm, EngineConfig::default())
    }

    #[tokio::test]
    async fn test_generate_by_type_tags_with_requested_kind() {
        let llm = Arc::new(ScriptedClient::replying(&["[DIAGRAM_START]\ngraph TB\n  api --> db\n[DIAGRAM_END]"]));
        let artifact = engine(&llm).generate_by_type(&snapshot(), DiagramRequestKind::Component).await.unwrap();
        assert_eq!(artifact.tag, "component");
        assert_eq!(artifact.code, "graph TB\n  api --> db");
        assert_eq!(artifact.repo_name, "demo");
    }

    #[tokio::test]
    async fn test_generate_by_type_accepts_bare_fenced_diagram() {
        let llm = Arc::new(ScriptedClient::replying(&["```mermaid\nerDiagram\n  USER ||--o{ ORDER : places\n```"]));
        let artifact = engine(&llm).generate_by_type(&snapshot(), DiagramRequestKind::Database).await.unwrap();
        assert_eq!(artifact.code, "erDiagram\n  USER ||--o{ ORDER : places");
        assert_eq!(llm.calls(), 1);
    }

    #[tokio::test]
    async fn test_generate_by_type_fails_after_two_invalid_responses() {
        let bad = "[DIAGRAM_START]\nflowchart TD\n  A[x --> B\n[DIAGRAM_END]";
        let llm = Arc::new(ScriptedClient::replying(&[bad, bad, bad]));
        let err = engine(&llm).generate_by_type(&snapshot(), DiagramRequestKind::Flowchart).await.unwrap_err();
        assert_eq!(llm.calls(), 2);
        match err {
            EngineError::InvalidDiagram { diagnostics } => {
                assert_eq!(diagnostics[0].kind, DiagnosticKind::UnmatchedBrackets);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_generate_custom_infers_tag() {
        let llm = Arc::new(ScriptedClient::replying(&["[DIAGRAM_START]\nclassDiagram\n  class User\n[DIAGRAM_END]"]));
        let artifact = engine(&llm).generate_custom(&snapshot(), "  show the types ").await.unwrap();
        assert_eq!(artifact.tag, "class");
        assert_eq!(artifact.prompt, "show the types");
    }

    #[tokio::test]
    async fn test_generate_custom_rejects_blank_request() {
        let llm = Arc::new(ScriptedClient::replying(&[]));
        let err = engine(&llm).generate_custom(&snapshot(), "   ").await.unwrap_err();
        assert!(matches!(err, EngineError::EmptyInput(_)));
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_converse_with_valid_diagram() {
        let llm = Arc::new(ScriptedClient::replying(&[
            "Requests flow like this.\n[DIAGRAM_START]\nsequenceDiagram\n  User->>API: GET /\n[DIAGRAM_END]",
        ]));
        let reply = engine(&llm).converse(&snapshot(), "How do requests flow?", &[]).await.unwrap();
        assert_eq!(reply.answer, "Requests flow like this.");
        assert_eq!(reply.repo_name, "demo");
        let diagram = reply.diagram.expect("diagram");
        assert_eq!(diagram.tag, "sequence");
        assert_eq!(reply.follow_ups[0], "Show error handling in this sequence");
    }

    #[tokio::test]
    async fn test_converse_keeps_answer_when_diagram_stays_invalid() {
        let bad = "Here is the schema.\n[DIAGRAM_START]\ngraph TD\n  A ---> B\n  B <--- C\n[DIAGRAM_END]";
        let llm = Arc::new(ScriptedClient::replying(&[bad, bad]));
        let reply = engine(&llm).converse(&snapshot(), "Show the data model", &[]).await.unwrap();
        assert_eq!(llm.calls(), 2);
        assert_eq!(reply.answer, "Here is the schema.");
        assert!(reply.diagram.is_none());
        assert_eq!(reply.follow_ups[0], "Show complete database schema with all tables");
    }

    #[tokio::test]
    async fn test_converse_surfaces_model_failure() {
        let llm = Arc::new(ScriptedClient::new(vec![
            Err(LlmError::Transport("reset".into())),
            Err(LlmError::Transport("reset".into())),
        ]));
        let err = engine(&llm).converse(&snapshot(), "hi", &[]).await.unwrap_err();
        assert!(matches!(err, EngineError::Llm(LlmError::Transport(_))));
    }
}
