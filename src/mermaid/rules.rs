//! Line-level rewrite rules for model-written Mermaid.
//!
//! ORDER MATTERS: the arrow rules run before label quoting and semicolon
//! collapsing, and the long-arrow rule must run before the malformed-spelling
//! rules so that `---->` becomes `-->` rather than `--->`-shaped leftovers.
//! Every replacement produces text that no rule matches again, which keeps
//! normalization idempotent.

use once_cell::sync::Lazy;
use regex::Regex;

#[derive(Clone)]
pub struct RewriteRule {
    pub name: &'static str,
    pub pattern: Regex,
    pub replacement: &'static str,
    /// Only applies to `graph`/`flowchart` bodies, where brackets are node shapes.
    pub graph_only: bool,
}

impl RewriteRule {
    pub fn apply<'a>(&self, line: &'a str) -> std::borrow::Cow<'a, str> {
        self.pattern.replace_all(line, self.replacement)
    }
}

pub static REWRITE_RULES: Lazy<Vec<RewriteRule>> = Lazy::new(|| {
    vec![
        // ── Over-long arrows ─────────────────────────────────────────────────
        RewriteRule {
            name: "long_arrow",
            pattern: Regex::new(r"-{3,}>").expect("valid regex"),
            replacement: "-->",
            graph_only: false,
        },
        RewriteRule {
            name: "long_dotted_arrow",
            pattern: Regex::new(r"\.{3,}>").expect("valid regex"),
            replacement: "-..->",
            graph_only: false,
        },
        // ── Malformed spellings ──────────────────────────────────────────────
        RewriteRule {
            name: "long_thick_arrow",
            pattern: Regex::new(r"={3,}>").expect("valid regex"),
            replacement: "==>",
            graph_only: false,
        },
        RewriteRule {
            name: "dotted_arrow_tail",
            pattern: Regex::new(r"-\.-{2,}>").expect("valid regex"),
            replacement: "-.->",
            graph_only: false,
        },
        // ── Labels ───────────────────────────────────────────────────────────
        // Unquoted square-bracket labels holding statement separators or pipes.
        // Trapezoid shapes (`[/a/]`, `[\a\]`) open with a slash and are left alone.
        RewriteRule {
            name: "quote_punctuated_label",
            pattern: Regex::new(r#"\[((?:[^\[\]"()/\\][^\[\]"()]*)?[:;,|][^\[\]"()]*)\]"#).expect("valid regex"),
            replacement: "[\"${1}\"]",
            graph_only: true,
        },
        // ── Statement separators ─────────────────────────────────────────────
        RewriteRule {
            name: "repeated_semicolons",
            pattern: Regex::new(r";{2,}").expect("valid regex"),
            replacement: ";",
            graph_only: false,
        },
    ]
});

/// Arrow spellings that renderers reject. Their presence fails validation.
pub const DISALLOWED_ARROWS: &[&str] = &["--->", "....>", "-.-->", "====>", "<---"];

#[cfg(test)]
mod tests {
    use super::*;

    fn apply_all(line: &str) -> String {
        REWRITE_RULES.iter().fold(line.to_string(), |acc, rule| rule.apply(&acc).into_owned())
    }

    #[test]
    fn test_long_arrow_collapses() {
        assert_eq!(apply_all("A--->B"), "A-->B");
        assert_eq!(apply_all("A ------> B"), "A --> B");
    }

    #[test]
    fn test_long_dotted_arrow_collapses() {
        assert_eq!(apply_all("A....>B"), "A-..->B");
        assert_eq!(apply_all("A...>B"), "A-..->B");
    }

    #[test]
    fn test_malformed_spellings_are_canonicalized() {
        assert_eq!(apply_all("A ===> B"), "A ==> B");
        assert_eq!(apply_all("A ====> B"), "A ==> B");
        assert_eq!(apply_all("A -.--> B"), "A -.-> B");
    }

    #[test]
    fn test_valid_arrows_are_untouched() {
        for line in ["A-->B", "A-.->B", "A==>B", "A-..->B", "A<-->B", "Alice->>Bob: hi"] {
            assert_eq!(apply_all(line), line);
        }
    }

    #[test]
    fn test_punctuated_labels_are_quoted_once() {
        assert_eq!(apply_all("A[key: value] --> B"), "A[\"key: value\"] --> B");
        assert_eq!(apply_all("A[\"key: value\"] --> B"), "A[\"key: value\"] --> B");
        assert_eq!(apply_all("A[plain] --> B[a, b]"), "A[plain] --> B[\"a, b\"]");
        assert_eq!(apply_all("A[: lead] --> B"), "A[\": lead\"] --> B");
    }

    #[test]
    fn test_trapezoid_shapes_are_not_quoted() {
        assert_eq!(apply_all("A[/a, b/] --> B"), "A[/a, b/] --> B");
        assert_eq!(apply_all(r"A[\a: b\] --> B"), r"A[\a: b\] --> B");
    }

    #[test]
    fn test_only_label_quoting_is_graph_specific() {
        let graph_only: Vec<_> = REWRITE_RULES.iter().filter(|r| r.graph_only).map(|r| r.name).collect();
        assert_eq!(graph_only, ["quote_punctuated_label"]);
    }

    #[test]
    fn test_semicolons_collapse() {
        assert_eq!(apply_all("A-->B;;;"), "A-->B;");
    }

    #[test]
    fn test_rules_are_idempotent() {
        for line in ["A--->B;;", "X....>Y", "P[a|b] ====> Q", "M -.---> N[x:y]"] {
            let once = apply_all(line);
            assert_eq!(apply_all(&once), once, "rule output for {line:?} changed on reapply");
        }
    }

    #[test]
    fn test_disallowed_arrows_do_not_survive_rewrites_except_backward() {
        let out = apply_all("A ---> B ....> C -.--> D ====> E");
        for token in DISALLOWED_ARROWS.iter().filter(|t| **t != "<---") {
            assert!(!out.contains(token), "{token} survived in {out}");
        }
        assert!(apply_all("A <--- B").contains("<---"));
    }
}
