//! Structural validation of a Mermaid body.
//!
//! This is a heuristic check, not a grammar parser: the header must name a
//! known diagram kind, every statement line must balance its brackets, and a
//! small denylist of arrow spellings is rejected.

use crate::mermaid::kind::DiagramKind;
use crate::mermaid::rules::DISALLOWED_ARROWS;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;

/// Entity-relationship cardinality markers such as `||--o{` or `}|..|{`.
static ER_CARDINALITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\|o|\|\||\}o|\}\|)(?:--|\.\.)(?:o\||\|\||o\{|\|\{)").expect("valid regex")
});

static QUOTED: Lazy<Regex> = Lazy::new(|| Regex::new(r#""[^"]*""#).expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum DiagnosticKind {
    EmptyDiagram,
    InvalidDiagramType(String),
    UnmatchedBrackets,
    UnmatchedParentheses,
    UnmatchedBraces,
    InvalidArrow(String),
}

/// A single violation, tagged with its 1-based line number within the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub line: usize,
    #[serde(flatten)]
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    fn new(line: usize, kind: DiagnosticKind) -> Self {
        Self { line, kind }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DiagnosticKind::EmptyDiagram => write!(f, "Empty diagram code"),
            DiagnosticKind::InvalidDiagramType(header) => {
                write!(f, "Line {}: Invalid diagram type: {header}", self.line)
            }
            DiagnosticKind::UnmatchedBrackets => write!(f, "Line {}: Unmatched brackets", self.line),
            DiagnosticKind::UnmatchedParentheses => {
                write!(f, "Line {}: Unmatched parentheses", self.line)
            }
            DiagnosticKind::UnmatchedBraces => write!(f, "Line {}: Unmatched braces", self.line),
            DiagnosticKind::InvalidArrow(token) => {
                write!(f, "Line {}: Invalid arrow syntax '{token}'", self.line)
            }
        }
    }
}

/// Outcome of [`validate`]: the recognized kind (if any) and every violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub kind: Option<DiagramKind>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        self.kind.is_some() && self.diagnostics.is_empty()
    }
}

/// Validate a diagram body, collecting all violations rather than stopping at the first.
///
/// An unrecognized header fails immediately since line checks assume a known grammar.
pub fn validate(code: &str) -> Validation {
    let lines: Vec<&str> = code.lines().collect();
    let Some(header_idx) = lines.iter().position(|l| !l.trim().is_empty()) else {
        return Validation {
            kind: None,
            diagnostics: vec![Diagnostic::new(1, DiagnosticKind::EmptyDiagram)],
        };
    };

    let header = lines[header_idx].trim();
    let Some(kind) = DiagramKind::from_header(header) else {
        let shown: String = header.chars().take(50).collect();
        return Validation {
            kind: None,
            diagnostics: vec![Diagnostic::new(
                header_idx + 1,
                DiagnosticKind::InvalidDiagramType(shown),
            )],
        };
    };

    let mut diagnostics = Vec::new();
    let mut open_blocks: Vec<usize> = Vec::new();

    for (idx, raw) in lines.iter().enumerate().skip(header_idx + 1) {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with("%%") {
            continue;
        }

        let unquoted = QUOTED.replace_all(line, "\"\"");
        let structural = if kind == DiagramKind::EntityRelation {
            ER_CARDINALITY.replace_all(&unquoted, " ").into_owned()
        } else {
            unquoted.to_string()
        };

        if count(&structural, '[') != count(&structural, ']') {
            diagnostics.push(Diagnostic::new(line_no, DiagnosticKind::UnmatchedBrackets));
        }
        if count(&structural, '(') != count(&structural, ')') {
            diagnostics.push(Diagnostic::new(line_no, DiagnosticKind::UnmatchedParentheses));
        }

        let opens = count(&structural, '{');
        let closes = count(&structural, '}');
        if structural == "}" {
            // Closes a multi-line class, entity, or state block.
            if open_blocks.pop().is_none() {
                diagnostics.push(Diagnostic::new(line_no, DiagnosticKind::UnmatchedBraces));
            }
        } else if structural.ends_with('{') && opens == closes + 1 {
            open_blocks.push(line_no);
        } else if opens != closes {
            diagnostics.push(Diagnostic::new(line_no, DiagnosticKind::UnmatchedBraces));
        }

        for token in DISALLOWED_ARROWS {
            if unquoted.contains(token) {
                diagnostics.push(Diagnostic::new(
                    line_no,
                    DiagnosticKind::InvalidArrow((*token).to_string()),
                ));
            }
        }
    }

    for line_no in open_blocks {
        diagnostics.push(Diagnostic::new(line_no, DiagnosticKind::UnmatchedBraces));
    }
    diagnostics.sort_by_key(|d| d.line);

    Validation { kind: Some(kind), diagnostics }
}

fn count(text: &str, needle: char) -> usize {
    text.chars().filter(|&c| c == needle).count()
}
