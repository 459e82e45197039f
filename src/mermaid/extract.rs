//! Splitting model output into a prose answer and a diagram body.

pub const DIAGRAM_START: &str = "[DIAGRAM_START]";
pub const DIAGRAM_END: &str = "[DIAGRAM_END]";

/// Result of splitting a response on the sentinel markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction<'a> {
    /// Text before the start marker, or the whole response without markers.
    pub answer: &'a str,
    /// Raw text strictly between the markers, trimmed.
    pub body: Option<&'a str>,
}

/// Locate the first start marker and the first end marker after it.
///
/// Without both markers there is no diagram and the full (trimmed) text is the answer.
pub fn extract(response: &str) -> Extraction<'_> {
    let text = response.trim();

    let Some(start) = text.find(DIAGRAM_START) else {
        return Extraction { answer: text, body: None };
    };
    let body_start = start + DIAGRAM_START.len();
    let Some(end_offset) = text[body_start..].find(DIAGRAM_END) else {
        return Extraction { answer: text, body: None };
    };

    Extraction {
        answer: text[..start].trim(),
        body: Some(text[body_start..body_start + end_offset].trim()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_without_markers_returns_full_text() {
        let out = extract("  Just prose, no diagram.  ");
        assert_eq!(out.answer, "Just prose, no diagram.");
        assert_eq!(out.body, None);
    }

    #[test]
    fn test_extract_with_only_start_marker_has_no_diagram() {
        let text = "Answer\n[DIAGRAM_START]\ngraph TD\nA-->B";
        let out = extract(text);
        assert_eq!(out.answer, text);
        assert_eq!(out.body, None);
    }

    #[test]
    fn test_extract_end_marker_before_start_is_ignored() {
        let out = extract("[DIAGRAM_END] oops [DIAGRAM_START]\nflowchart LR\n");
        assert_eq!(out.body, None);
    }

    #[test]
    fn test_extract_splits_answer_and_body() {
        let out = extract("Here you go.\n[DIAGRAM_START]\nflowchart TD\n  A-->B\n[DIAGRAM_END]");
        assert_eq!(out.answer, "Here you go.");
        assert_eq!(out.body, Some("flowchart TD\n  A-->B"));
    }

    #[test]
    fn test_extract_drops_trailing_text_from_answer() {
        let out = extract("Intro\n[DIAGRAM_START]pie\n[DIAGRAM_END]\nOutro text");
        assert_eq!(out.answer, "Intro");
        assert_eq!(out.body, Some("pie"));
    }

    #[test]
    fn test_extract_uses_first_marker_pair() {
        let out = extract(
            "A\n[DIAGRAM_START]\ngraph TD\n[DIAGRAM_END]\n[DIAGRAM_START]\npie\n[DIAGRAM_END]",
        );
        assert_eq!(out.answer, "A");
        assert_eq!(out.body, Some("graph TD"));
    }
}
