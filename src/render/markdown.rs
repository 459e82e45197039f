//! Markdown output for diagrams and chat transcripts.

use crate::domain::{ConversationTurn, DiagramArtifact, Role};
use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::path::Path;

fn mermaid_block(out: &mut String, code: &str) {
    let _ = writeln!(out, "```mermaid\n{}\n```", code.trim_end());
}

/// A single diagram as a standalone Markdown document.
pub fn render_diagram(artifact: &DiagramArtifact) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {} diagram: {}\n", artifact.tag, artifact.repo_name);
    if !artifact.prompt.is_empty() && artifact.prompt != artifact.tag {
        let _ = writeln!(out, "> {}\n", artifact.prompt);
    }
    mermaid_block(&mut out, &artifact.code);
    let _ = writeln!(out, "\n_Generated {}_", artifact.created_at.format("%Y-%m-%d %H:%M UTC"));
    out
}

/// A conversation with its inline diagrams and suggested follow-ups.
pub fn render_transcript(repo_name: &str, turns: &[ConversationTurn]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Conversation: {repo_name}");

    for turn in turns {
        let speaker = match turn.role {
            Role::User => "You",
            Role::Assistant => "Assistant",
        };
        let _ = writeln!(out, "\n## {speaker}\n\n{}", turn.content.trim());
        if let Some(diagram) = &turn.diagram {
            out.push('\n');
            mermaid_block(&mut out, &diagram.code);
        }
        if !turn.follow_ups.is_empty() {
            let _ = writeln!(out, "\nFollow-up ideas:");
            for question in &turn.follow_ups {
                let _ = writeln!(out, "- {question}");
            }
        }
    }
    out
}

pub fn write_markdown(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    #[test]
    fn test_render_transcript() {
        let mut answer = ConversationTurn::assistant("It has two parts.");
        answer.diagram = Some(DiagramArtifact::new("flowchart", "flowchart TD\n  A-->B\n", "demo", "q"));
        answer.follow_ups = vec!["Show data validation steps".into()];
        let turns = vec![ConversationTurn::user("What is this?"), answer];

        let expected = "# Conversation: demo\n\n## You\n\nWhat is this?\n\n## Assistant\n\nIt has two parts.\n\n```mermaid\nflowchart TD\n  A-->B\n```\n\nFollow-up ideas:\n- Show data validation steps\n";
        assert_eq!(render_transcript("demo", &turns), expected);
    }

    #[test]
    fn test_render_diagram_skips_redundant_prompt() {
        let artifact = DiagramArtifact::new("sequence", "sequenceDiagram\n  A->>B: hi", "demo", "sequence");
        let text = render_diagram(&artifact);
        assert!(text.starts_with("# sequence diagram: demo\n\n```mermaid\nsequenceDiagram"));
        assert!(!text.contains("> sequence"));
    }

    #[test]
    fn test_write_markdown_creates_parent_dirs() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("out/nested/diagram.md");
        write_markdown(&path, "# hi\n").unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "# hi\n");
    }
}
