//! Per-user interactive session state.

use crate::domain::{ConversationTurn, DiagramArtifact};

/// Unique queries remembered for suggestions.
pub const QUERY_HISTORY_LIMIT: usize = 20;
/// Suggestions returned per lookup.
pub const SUGGESTION_LIMIT: usize = 5;

const DEFAULT_SUGGESTIONS: [&str; 10] = [
    "Show me a sequence diagram",
    "Create an architecture diagram",
    "Visualize the authentication flow",
    "Show database schema diagram",
    "Create a flowchart for the main process",
    "Show component diagram",
    "Explain the API structure",
    "Show class diagram with relationships",
    "Create ER diagram for database",
    "Show the deployment architecture",
];

/// Everything one user accumulates while exploring repositories. Created at
/// session start and only reset through [`Session::clear`] or a repository change.
#[derive(Debug, Default)]
pub struct Session {
    chat: Vec<ConversationTurn>,
    diagrams: Vec<DiagramArtifact>,
    queries: Vec<String>,
    repo_url: Option<String>,
    github_token: Option<String>,
}

impl Session {
    pub fn new(github_token: Option<String>) -> Self {
        Self { github_token: github_token.filter(|t| !t.trim().is_empty()), ..Self::default() }
    }

    pub fn repo_url(&self) -> Option<&str> {
        self.repo_url.as_deref()
    }

    pub fn github_token(&self) -> Option<&str> {
        self.github_token.as_deref()
    }

    /// Switch repositories. The conversation belongs to one repository, so a
    /// different URL starts a fresh chat; diagrams and queries are kept.
    pub fn set_repo(&mut self, url: &str) -> bool {
        let url = url.trim();
        if self.repo_url.as_deref() == Some(url) {
            return false;
        }
        tracing::debug!(repo = url, "session repository changed");
        self.repo_url = Some(url.to_string());
        self.chat.clear();
        true
    }

    pub fn history(&self) -> &[ConversationTurn] {
        &self.chat
    }

    pub fn push_turn(&mut self, turn: ConversationTurn) {
        if let Some(diagram) = &turn.diagram {
            self.diagrams.push(diagram.clone());
        }
        self.chat.push(turn);
    }

    pub fn diagrams(&self) -> &[DiagramArtifact] {
        &self.diagrams
    }

    pub fn record_diagram(&mut self, diagram: DiagramArtifact) {
        self.diagrams.push(diagram);
    }

    /// Remember a query for suggestions. Exact duplicates are ignored and only
    /// the most recent [`QUERY_HISTORY_LIMIT`] are kept.
    pub fn record_query(&mut self, query: &str) {
        let query = query.trim();
        if query.is_empty() || self.queries.iter().any(|q| q == query) {
            return;
        }
        self.queries.push(query.to_string());
        if self.queries.len() > QUERY_HISTORY_LIMIT {
            let excess = self.queries.len() - QUERY_HISTORY_LIMIT;
            self.queries.drain(..excess);
        }
    }

    /// Up to [`SUGGESTION_LIMIT`] completions for `partial`: matching past
    /// queries first, then the built-in ones.
    pub fn suggestions(&self, partial: &str) -> Vec<String> {
        let partial = partial.trim().to_lowercase();
        if partial.is_empty() {
            return DEFAULT_SUGGESTIONS.iter().take(SUGGESTION_LIMIT).map(|s| s.to_string()).collect();
        }

        let candidates = self.queries.iter().map(String::as_str).chain(DEFAULT_SUGGESTIONS);
        let mut seen = std::collections::HashSet::new();
        candidates
            .filter(|candidate| candidate.to_lowercase().contains(&partial))
            .filter(|candidate| seen.insert(candidate.to_lowercase()))
            .take(SUGGESTION_LIMIT)
            .map(str::to_string)
            .collect()
    }

    /// Forget the conversation and diagrams; the repository and token stay.
    pub fn clear(&mut self) {
        self.chat.clear();
        self.diagrams.clear();
    }
}
