//! Suggested next questions after a conversation reply.

const SEQUENCE: [&str; 3] = [
    "Show error handling in this sequence",
    "Add authentication steps",
    "What happens on timeout?",
];
const FLOWCHART: [&str; 3] = [
    "Add more implementation details",
    "Show data validation steps",
    "Include error handling paths",
];
const DATABASE: [&str; 3] = [
    "Show all table relationships",
    "Add indexes and constraints",
    "Include migration strategy",
];
const CLASS: [&str; 3] = [
    "Show all methods and properties",
    "Add design patterns used",
    "Include dependency injection",
];
const ANY_DIAGRAM: [&str; 3] = [
    "Add more detail to this diagram",
    "Show internal implementations",
    "Include error handling",
];

/// Keyword groups checked in order against the answer; first hit wins.
const BY_TOPIC: [(&[&str], [&str; 3]); 3] = [
    (
        &["auth", "login", "security", "token"],
        [
            "Show complete authentication flow with all steps",
            "Include session management details",
            "Add security validation points",
        ],
    ),
    (
        &["database", "data", "model", "schema"],
        [
            "Show complete database schema with all tables",
            "Include all relationships and foreign keys",
            "Add data migration and seeding",
        ],
    ),
    (
        &["api", "endpoint", "route"],
        [
            "Show all API endpoints with details",
            "Include request/response schemas",
            "Add middleware and validators",
        ],
    ),
];
const GENERAL: [&str; 3] = [
    "Show complete system architecture",
    "Include all components and connections",
    "Add deployment and infrastructure",
];

/// Three suggestions keyed by the attached diagram's tag, or by topic
/// keywords in the answer when no diagram was attached.
pub fn follow_up_questions(answer: &str, diagram_tag: Option<&str>) -> Vec<String> {
    let picked = match diagram_tag {
        Some("sequence") => SEQUENCE,
        Some("flowchart") => FLOWCHART,
        Some("database") => DATABASE,
        Some("class") => CLASS,
        Some(_) => ANY_DIAGRAM,
        None => {
            let lower = answer.to_lowercase();
            BY_TOPIC
                .iter()
                .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
                .map(|(_, questions)| *questions)
                .unwrap_or(GENERAL)
        }
    };
    picked.iter().map(|q| q.to_string()).collect()
}
