//! Mermaid output pipeline: extract the diagram from a model response,
//! repair common mistakes, then validate what is left.

pub mod extract;
pub mod kind;
pub mod normalize;
pub mod rules;
pub mod validate;

pub use extract::{extract, Extraction, DIAGRAM_END, DIAGRAM_START};
pub use kind::{display_tag, DiagramKind, CUSTOM_TAG};
pub use normalize::normalize;
pub use validate::{validate, Diagnostic, DiagnosticKind, Validation};

/// A repaired diagram body together with its validation outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckedDiagram {
    pub code: String,
    pub kind: Option<DiagramKind>,
    pub diagnostics: Vec<Diagnostic>,
}

impl CheckedDiagram {
    pub fn is_valid(&self) -> bool {
        self.kind.is_some() && self.diagnostics.is_empty()
    }

    /// Lenient tag for display, `custom` when the header is unknown.
    pub fn tag(&self) -> &'static str {
        self.kind.map(|k| k.tag()).unwrap_or(CUSTOM_TAG)
    }
}

/// Prose answer plus the diagram found alongside it, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sanitized {
    pub answer: String,
    pub diagram: Option<CheckedDiagram>,
}

/// Normalize and validate a diagram body.
pub fn repair(code: &str) -> CheckedDiagram {
    let code = normalize(code);
    let Validation { kind, diagnostics } = validate(&code);
    if !diagnostics.is_empty() {
        tracing::debug!(count = diagnostics.len(), "diagram failed validation");
    }
    CheckedDiagram { code, kind, diagnostics }
}

/// Run the full pipeline on a model response that may embed a marked diagram.
pub fn sanitize(response: &str) -> Sanitized {
    let Extraction { answer, body } = extract(response);
    Sanitized { answer: answer.to_string(), diagram: body.map(repair) }
}

/// Like [`sanitize`], but also accepts a response that is nothing but a
/// diagram: without markers, the whole response is treated as the body when
/// its repaired first line is a recognized diagram header.
pub fn sanitize_bare(response: &str) -> Sanitized {
    let sanitized = sanitize(response);
    if sanitized.diagram.is_some() {
        return sanitized;
    }

    let checked = repair(response);
    if checked.kind.is_some() {
        tracing::debug!("accepted unmarked response as a bare diagram");
        return Sanitized { answer: String::new(), diagram: Some(checked) };
    }
    sanitized
}
