//! Prompt construction for the three generation flows.
//!
//! Every prompt asks the model to wrap its diagram in the sentinel markers
//! so [`crate::mermaid::extract`] can separate prose from markup.

pub mod context;

pub use context::{brief_context, format_file_contents, format_file_structure, full_context};

use crate::domain::{ConversationTurn, DiagramRequestKind, RepoSnapshot, Role};
use crate::llm::ChatMessage;
use crate::mermaid::{Diagnostic, DIAGRAM_END, DIAGRAM_START};

/// Turns of history replayed to the model.
pub const HISTORY_WINDOW: usize = 10;
/// Diagnostics quoted back in a correction request.
pub const CORRECTION_DIAGNOSTICS: usize = 3;

const SYSTEM_ROLE: &str = "You are an expert software architect who explains code bases with \
accurate Mermaid diagrams. You only reference files, modules and names that exist in the \
repository data you are given.";

/// Header line and drawing guidance for each requestable diagram.
fn guidance(kind: DiagramRequestKind) -> (&'static str, &'static str) {
    match kind {
        DiagramRequestKind::Sequence => (
            "sequenceDiagram",
            "Show the main user interaction flow with real endpoints, services and storage calls.",
        ),
        DiagramRequestKind::Component => (
            "graph TB",
            "Show the system architecture: modules grouped in subgraphs by folder, with their dependencies.",
        ),
        DiagramRequestKind::Database => (
            "erDiagram",
            "Show the data model from the actual models, schemas and migrations, with keys and relationships.",
        ),
        DiagramRequestKind::Flowchart => (
            "flowchart TD",
            "Show the main business logic flow based on real functions, decisions and error paths.",
        ),
        DiagramRequestKind::Class => (
            "classDiagram",
            "Show the real types with their key fields, methods and relationships.",
        ),
        DiagramRequestKind::State => (
            "stateDiagram-v2",
            "Show the lifecycle states of the central entity and the events that move between them.",
        ),
        DiagramRequestKind::Journey => (
            "journey",
            "Show the user journey through the application's main features, scored by experience.",
        ),
        DiagramRequestKind::Gantt => (
            "gantt",
            "Show the build, test and release phases that the repository's tooling implies.",
        ),
        DiagramRequestKind::Mindmap => (
            "mindmap",
            "Show the repository's major areas as branches, with their key files as leaves.",
        ),
    }
}

fn syntax_rules() -> String {
    format!(
        "Rules:\n\
         1. Put the diagram between {DIAGRAM_START} and {DIAGRAM_END}, with no markdown fences.\n\
         2. Node IDs use underscores, never spaces.\n\
         3. Arrows are only -->, -.-> and ==>.\n\
         4. Quote labels that contain brackets or parentheses.\n\
         5. Use actual file and component names from the repository data."
    )
}

/// Messages requesting a diagram of a fixed kind.
pub fn diagram_messages(kind: DiagramRequestKind, snapshot: &RepoSnapshot) -> Vec<ChatMessage> {
    let (header, hint) = guidance(kind);
    let user = format!(
        "Analyze this GitHub repository:\n\n{}\n\nGenerate a detailed {kind} diagram in Mermaid syntax \
         starting with `{header}`.\n{hint}\n\n{}",
        brief_context(snapshot),
        syntax_rules(),
    );
    vec![ChatMessage::system(SYSTEM_ROLE), ChatMessage::user(user)]
}

/// Messages requesting a diagram described in the user's own words. The
/// README is left out of the context so the request carries more weight.
pub fn custom_messages(request: &str, snapshot: &RepoSnapshot) -> Vec<ChatMessage> {
    let mut repo = snapshot.clone();
    repo.readme.clear();
    let user = format!(
        "Analyze this GitHub repository:\n\n{}\n\nUser's request: {}\n\n\
         Generate the Mermaid diagram that best fulfills the request, choosing the most \
         appropriate type (sequenceDiagram, flowchart TD, classDiagram, graph TB, erDiagram, \
         stateDiagram-v2). If the request is unclear, draw the most relevant architecture diagram.\n\n{}",
        brief_context(&repo),
        request.trim(),
        syntax_rules(),
    );
    vec![ChatMessage::system(SYSTEM_ROLE), ChatMessage::user(user)]
}

/// Full repository context as the system message, the last
/// [`HISTORY_WINDOW`] turns, then the question.
pub fn conversation_messages(
    snapshot: &RepoSnapshot,
    history: &[ConversationTurn],
    question: &str,
) -> Vec<ChatMessage> {
    let system = format!(
        "{SYSTEM_ROLE}\n\n{}\n\n\
         Answer questions about this repository using the real names listed above. \
         When a diagram helps, include one; organize larger diagrams with subgraphs \
         and include every relevant file, not just a few.\n\n{}",
        full_context(snapshot),
        syntax_rules(),
    );

    let start = history.len().saturating_sub(HISTORY_WINDOW);
    let mut messages = Vec::with_capacity(history.len() - start + 2);
    messages.push(ChatMessage::system(system));
    messages.extend(history[start..].iter().map(|turn| match turn.role {
        Role::User => ChatMessage::user(turn.content.clone()),
        Role::Assistant => ChatMessage::assistant(turn.content.clone()),
    }));
    messages.push(ChatMessage::user(question.trim()));
    messages
}

/// Follow-up request quoting the first diagnostics of a rejected diagram.
pub fn correction_message(diagnostics: &[Diagnostic]) -> ChatMessage {
    let errors = diagnostics
        .iter()
        .take(CORRECTION_DIAGNOSTICS)
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    ChatMessage::user(format!(
        "The diagram had syntax errors: {errors}\n\nRegenerate it.\n{}",
        syntax_rules()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MessageRole;
    use crate::mermaid::validate;

    fn snapshot() -> RepoSnapshot {
        RepoSnapshot {
            name: "demo".into(),
            description: "A demo".into(),
            language: "Rust".into(),
            readme: "# Demo readme".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_diagram_messages_name_header_and_markers() {
        let messages = diagram_messages(DiagramRequestKind::Database, &snapshot());
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::System);
        let user = &messages[1].content;
        assert!(user.contains("starting with `erDiagram`"));
        assert!(user.contains(DIAGRAM_START));
        assert!(user.contains("# Demo readme"));
    }

    #[test]
    fn test_custom_messages_omit_readme() {
        let messages = custom_messages("  show the auth flow ", &snapshot());
        let user = &messages[1].content;
        assert!(user.contains("User's request: show the auth flow\n"));
        assert!(!user.contains("# Demo readme"));
    }

    #[test]
    fn test_conversation_keeps_last_ten_turns() {
        let history: Vec<ConversationTurn> = (0..14)
            .map(|i| {
                if i % 2 == 0 {
                    ConversationTurn::user(format!("q{i}"))
                } else {
                    ConversationTurn::assistant(format!("a{i}"))
                }
            })
            .collect();
        let messages = conversation_messages(&snapshot(), &history, "latest?");
        assert_eq!(messages.len(), 12);
        assert_eq!(messages[1].content, "q4");
        assert_eq!(messages[2].role, MessageRole::Assistant);
        assert_eq!(messages[11].content, "latest?");
        assert!(messages[0].content.contains("## Components"));
    }

    #[test]
    fn test_correction_quotes_first_three_diagnostics() {
        let diagnostics = validate("graph TD\nA[\nB[\nC[\nD[").diagnostics;
        assert_eq!(diagnostics.len(), 4);
        let message = correction_message(&diagnostics);
        assert_eq!(message.role, MessageRole::User);
        insta::assert_snapshot!(message.content.lines().next().unwrap_or_default(), @"The diagram had syntax errors: Line 2: Unmatched brackets, Line 3: Unmatched brackets, Line 4: Unmatched brackets");
    }
}
