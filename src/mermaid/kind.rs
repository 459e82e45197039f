//! Diagram-kind classification from the header line.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Recognized Mermaid diagram categories, keyed by their header keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagramKind {
    Sequence,
    Graph,
    Flowchart,
    Class,
    EntityRelation,
    State,
    Journey,
    Gantt,
    Mindmap,
    Pie,
    GitGraph,
}

/// Tag used for diagrams whose header is not recognized.
pub const CUSTOM_TAG: &str = "custom";

impl DiagramKind {
    pub const ALL: [DiagramKind; 11] = [
        DiagramKind::Sequence,
        DiagramKind::Graph,
        DiagramKind::Flowchart,
        DiagramKind::Class,
        DiagramKind::EntityRelation,
        DiagramKind::State,
        DiagramKind::Journey,
        DiagramKind::Gantt,
        DiagramKind::Mindmap,
        DiagramKind::Pie,
        DiagramKind::GitGraph,
    ];

    /// Header keyword as it must appear on the first line.
    pub fn keyword(&self) -> &'static str {
        match self {
            DiagramKind::Sequence => "sequenceDiagram",
            DiagramKind::Graph => "graph",
            DiagramKind::Flowchart => "flowchart",
            DiagramKind::Class => "classDiagram",
            DiagramKind::EntityRelation => "erDiagram",
            DiagramKind::State => "stateDiagram",
            DiagramKind::Journey => "journey",
            DiagramKind::Gantt => "gantt",
            DiagramKind::Mindmap => "mindmap",
            DiagramKind::Pie => "pie",
            DiagramKind::GitGraph => "gitGraph",
        }
    }

    /// Label used by clients to group diagrams. `graph` and `flowchart` share one.
    pub fn tag(&self) -> &'static str {
        match self {
            DiagramKind::Sequence => "sequence",
            DiagramKind::Graph | DiagramKind::Flowchart => "flowchart",
            DiagramKind::Class => "class",
            DiagramKind::EntityRelation => "database",
            DiagramKind::State => "state",
            DiagramKind::Journey => "journey",
            DiagramKind::Gantt => "gantt",
            DiagramKind::Mindmap => "mindmap",
            DiagramKind::Pie => "pie",
            DiagramKind::GitGraph => "gitgraph",
        }
    }

    /// Whether node identifiers are free-form words joined by edges.
    pub fn has_node_identifiers(&self) -> bool {
        matches!(self, DiagramKind::Graph | DiagramKind::Flowchart)
    }

    /// Strict classification of a header line.
    ///
    /// The leading whitespace-delimited token must equal a keyword exactly
    /// (case-sensitive), or be a keyword followed by a `-` variant suffix such
    /// as `stateDiagram-v2`.
    pub fn from_header(line: &str) -> Option<DiagramKind> {
        let token = line.split_whitespace().next()?;
        Self::ALL.into_iter().find(|kind| {
            let keyword = kind.keyword();
            token == keyword
                || token
                    .strip_prefix(keyword)
                    .is_some_and(|rest| rest.starts_with('-') && rest.len() > 1)
        })
    }

    /// Strict classification of a diagram body by its first non-empty line.
    pub fn classify(code: &str) -> Option<DiagramKind> {
        code.lines().map(str::trim).find(|line| !line.is_empty()).and_then(Self::from_header)
    }
}

impl fmt::Display for DiagramKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Lenient display tag: the kind's tag, or `custom` when unrecognized.
pub fn display_tag(code: &str) -> &'static str {
    DiagramKind::classify(code).map(|kind| kind.tag()).unwrap_or(CUSTOM_TAG)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flowchart_header_classifies() {
        assert_eq!(DiagramKind::classify("flowchart TD\n  A-->B"), Some(DiagramKind::Flowchart));
        assert_eq!(DiagramKind::Flowchart.tag(), "flowchart");
    }

    #[test]
    fn test_classification_is_case_sensitive() {
        assert_eq!(DiagramKind::from_header("SequenceDiagram"), None);
        assert_eq!(DiagramKind::from_header("sequenceDiagram"), Some(DiagramKind::Sequence));
    }

    #[test]
    fn test_classification_requires_whole_token() {
        assert_eq!(DiagramKind::from_header("graphs TD"), None);
        assert_eq!(DiagramKind::from_header("bogusDiagram"), None);
        assert_eq!(DiagramKind::from_header("stateDiagram-v2"), Some(DiagramKind::State));
        assert_eq!(DiagramKind::from_header("graph-"), None);
    }

    #[test]
    fn test_classification_skips_leading_blank_lines() {
        assert_eq!(DiagramKind::classify("\n\n  erDiagram\n"), Some(DiagramKind::EntityRelation));
        assert_eq!(DiagramKind::classify(""), None);
    }

    #[test]
    fn test_display_tag_is_lenient() {
        assert_eq!(display_tag("graph TB\nA-->B"), "flowchart");
        assert_eq!(display_tag("erDiagram"), "database");
        assert_eq!(display_tag("C4Context\n"), CUSTOM_TAG);
        assert_eq!(display_tag(""), CUSTOM_TAG);
    }
}
