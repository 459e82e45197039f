//! Auto-repair of common syntax mistakes in model-written Mermaid.

use crate::mermaid::kind::DiagramKind;
use crate::mermaid::rules::REWRITE_RULES;
use fancy_regex::{Captures, Regex as FancyRegex};
use once_cell::sync::Lazy;

/// Two or more bare words directly before a node shape or an outgoing edge.
static SPACED_ID_BEFORE: Lazy<FancyRegex> = Lazy::new(|| {
    FancyRegex::new(r"\b([A-Za-z_]\w*(?:[ \t]+[A-Za-z_]\w*)+)(?=[\[(]|[ \t]*(?:-->|-\.->|==>))")
        .expect("valid regex")
});

/// Two or more bare words closing a line after an edge (optionally labelled).
static SPACED_ID_AFTER: Lazy<FancyRegex> = Lazy::new(|| {
    FancyRegex::new(
        r"((?:-->|-\.->|==>)(?:\|[^|]*\|)?[ \t]*)([A-Za-z_]\w*(?:[ \t]+[A-Za-z_]\w*)+)(?=[ \t]*;?[ \t]*$)",
    )
    .expect("valid regex")
});

/// Statement keywords whose arguments are not node identifiers.
const STATEMENT_KEYWORDS: &[&str] = &[
    "subgraph",
    "end",
    "class",
    "classDef",
    "style",
    "linkStyle",
    "click",
    "direction",
    "graph",
    "flowchart",
];

/// Link openers that start text-on-link labels (`A -- text --> B`).
const LINK_LABEL_OPENERS: &[&str] = &["--", "==", "-."];

/// Apply every repair rule to a diagram body.
///
/// Lines keep their indentation; blank and `%%` comment lines pass through.
/// Running the result through `normalize` again returns it unchanged.
pub fn normalize(code: &str) -> String {
    let lines: Vec<&str> = code.lines().filter(|line| !is_fence_line(line)).collect();
    let kind = lines
        .iter()
        .map(|l| l.trim())
        .find(|l| !l.is_empty() && !l.starts_with("%%"))
        .and_then(DiagramKind::from_header);
    let graph_body = kind.map_or(true, |k| k.has_node_identifiers());

    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    for (idx, raw) in lines.iter().enumerate() {
        let content = raw.trim();
        if content.is_empty() {
            if out.last().is_some_and(|prev| prev.is_empty()) {
                continue;
            }
            out.push(String::new());
            continue;
        }

        let indent = &raw[..raw.len() - raw.trim_start().len()];
        if content.starts_with("%%") {
            out.push(format!("{indent}{content}"));
            continue;
        }

        out.push(format!("{indent}{}", repair_line(content, idx + 1, graph_body)));
    }

    out.join("\n").trim().to_string()
}

fn repair_line(content: &str, position: usize, graph_body: bool) -> String {
    let mut line = content.to_string();
    for rule in REWRITE_RULES.iter().filter(|rule| graph_body || !rule.graph_only) {
        let rewritten = rule.apply(&line);
        if rewritten != line {
            tracing::trace!(rule = rule.name, position, "rewrote mermaid line");
            line = rewritten.into_owned();
        }
    }

    if graph_body {
        line = join_spaced_identifiers(&line);
    }

    if line == "subgraph" {
        line = format!("subgraph subgraph_{position}");
    }

    line
}

/// ```` ``` ```` or ```` ```mermaid ```` lines wrapping the diagram.
fn is_fence_line(line: &str) -> bool {
    line.trim()
        .strip_prefix("```")
        .is_some_and(|lang| lang.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'))
}

/// Replace spaces with underscores in multi-word node identifiers that sit
/// outside labels and next to shape or edge syntax.
fn join_spaced_identifiers(line: &str) -> String {
    let outside = outside_label_mask(line);
    let is_outside = |pos: usize| outside.get(pos).copied().unwrap_or(false);

    let first = replace_captures(&SPACED_ID_BEFORE, line, |caps| {
        let whole = caps.get(1)?;
        if !is_outside(whole.start())
            || starts_with_keyword(whole.as_str())
            || follows_link_opener(&line[..whole.start()])
        {
            return None;
        }
        Some(underscore_join(whole.as_str()))
    });

    let outside = outside_label_mask(&first);
    replace_captures(&SPACED_ID_AFTER, &first, |caps| {
        let edge = caps.get(1)?;
        let ident = caps.get(2)?;
        if !outside.get(edge.start()).copied().unwrap_or(false) {
            return None;
        }
        Some(format!("{}{}", edge.as_str(), underscore_join(ident.as_str())))
    })
}

fn underscore_join(words: &str) -> String {
    words.split_whitespace().collect::<Vec<_>>().join("_")
}

/// Words right after `--`, `==` or `-.` are link text, not a node. Open links
/// (`---`, `===`) are complete edges and are followed by a node.
fn follows_link_opener(before: &str) -> bool {
    let before = before.trim_end();
    LINK_LABEL_OPENERS.iter().any(|opener| before.ends_with(opener))
        && !before.ends_with("---")
        && !before.ends_with("===")
}

fn starts_with_keyword(words: &str) -> bool {
    words.split_whitespace().next().is_some_and(|w| STATEMENT_KEYWORDS.contains(&w))
}

/// Replace each match with the closure's output; `None` keeps the match as-is.
/// Falls back to the input when the backtracking engine reports an error.
fn replace_captures<F>(re: &FancyRegex, text: &str, mut replace: F) -> String
where
    F: FnMut(&Captures<'_>) -> Option<String>,
{
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in re.captures_iter(text) {
        let caps = match caps {
            Ok(c) => c,
            Err(e) => {
                tracing::debug!("identifier rewrite skipped: {e}");
                return text.to_string();
            }
        };
        let Some(whole) = caps.get(0) else { continue };
        if let Some(replacement) = replace(&caps) {
            out.push_str(&text[last..whole.start()]);
            out.push_str(&replacement);
            last = whole.end();
        }
    }
    out.push_str(&text[last..]);
    out
}

/// For every byte offset: `true` when it lies outside brackets, parentheses,
/// braces and double-quoted text.
fn outside_label_mask(line: &str) -> Vec<bool> {
    let mut mask = vec![true; line.len() + 1];
    let mut depth: usize = 0;
    let mut in_quotes = false;
    for (pos, ch) in line.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            '[' | '(' | '{' if !in_quotes => depth += 1,
            ']' | ')' | '}' if !in_quotes => depth = depth.saturating_sub(1),
            _ => {}
        }
        let inside = in_quotes || depth > 0 || matches!(ch, ']' | ')' | '}' | '"');
        for slot in mask.iter_mut().skip(pos).take(ch.len_utf8()) {
            *slot = !inside;
        }
    }
    mask
}
