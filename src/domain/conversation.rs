//! Diagram artifacts and conversation turns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A generated diagram. Never mutated after it is returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramArtifact {
    /// Display tag, e.g. `flowchart`, `sequence`, `database`, `custom`.
    pub tag: String,
    pub code: String,
    pub repo_name: String,
    pub prompt: String,
    pub created_at: DateTime<Utc>,
}

impl DiagramArtifact {
    pub fn new(
        tag: impl Into<String>,
        code: impl Into<String>,
        repo_name: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            tag: tag.into(),
            code: code.into(),
            repo_name: repo_name.into(),
            prompt: prompt.into(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagram: Option<DiagramArtifact>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub follow_ups: Vec<String>,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into(), diagram: None, follow_ups: Vec::new() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            diagram: None,
            follow_ups: Vec::new(),
        }
    }
}

/// Diagram types a caller can request by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagramRequestKind {
    Sequence,
    Component,
    Database,
    Flowchart,
    Class,
    State,
    Journey,
    Gantt,
    Mindmap,
}

impl DiagramRequestKind {
    pub const ALL: [DiagramRequestKind; 9] = [
        DiagramRequestKind::Sequence,
        DiagramRequestKind::Component,
        DiagramRequestKind::Database,
        DiagramRequestKind::Flowchart,
        DiagramRequestKind::Class,
        DiagramRequestKind::State,
        DiagramRequestKind::Journey,
        DiagramRequestKind::Gantt,
        DiagramRequestKind::Mindmap,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DiagramRequestKind::Sequence => "sequence",
            DiagramRequestKind::Component => "component",
            DiagramRequestKind::Database => "database",
            DiagramRequestKind::Flowchart => "flowchart",
            DiagramRequestKind::Class => "class",
            DiagramRequestKind::State => "state",
            DiagramRequestKind::Journey => "journey",
            DiagramRequestKind::Gantt => "gantt",
            DiagramRequestKind::Mindmap => "mindmap",
        }
    }
}

impl fmt::Display for DiagramRequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiagramRequestKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|kind| kind.as_str() == wanted).ok_or_else(|| {
            let names = Self::ALL.iter().map(|k| k.as_str()).collect::<Vec<_>>().join(", ");
            format!("Invalid diagram type '{s}'. Expected one of: {names}")
        })
    }
}
