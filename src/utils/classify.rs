//! Heuristic classification of repository files.
//!
//! File purposes come from the file name alone; component categories come
//! from the full relative path and feed the conversation context.

use crate::domain::{FileNode, FilePurpose, RepoSnapshot};
use std::collections::BTreeMap;
use std::fmt;

/// Manifest file names mapped to the package manager they belong to.
pub const DEPENDENCY_MANIFESTS: &[(&str, &str)] = &[
    ("package.json", "npm"),
    ("requirements.txt", "pip"),
    ("Cargo.toml", "cargo"),
    ("go.mod", "go"),
    ("pom.xml", "maven"),
    ("build.gradle", "gradle"),
    ("composer.json", "composer"),
];

const DEPENDENCY_FILE_NAMES: &[&str] = &["package.json", "requirements.txt", "Cargo.toml", "go.mod"];

/// Keyword table checked in order; the first hit wins.
const PURPOSE_KEYWORDS: &[(FilePurpose, &[&str])] = &[
    (FilePurpose::Testing, &["test", "spec"]),
    (FilePurpose::Configuration, &["config", "setup", ".env", "settings"]),
    (FilePurpose::DataModel, &["model", "schema", "entity"]),
    (FilePurpose::Api, &["route", "endpoint", "api", "controller"]),
    (FilePurpose::Ui, &["component", "view", "page", "screen"]),
    (FilePurpose::Utility, &["util", "helper", "tool"]),
    (FilePurpose::Service, &["service", "provider", "manager"]),
    (FilePurpose::Middleware, &["middleware", "interceptor"]),
];

/// Classify a file by its (case-insensitive) name.
pub fn classify_file_purpose(file_name: &str) -> FilePurpose {
    let lower = file_name.to_lowercase();
    PURPOSE_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(purpose, _)| *purpose)
        .unwrap_or_else(|| {
            if DEPENDENCY_FILE_NAMES.contains(&file_name) {
                FilePurpose::Dependencies
            } else {
                FilePurpose::General
            }
        })
}

/// Architectural buckets used to summarize a repository for the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComponentCategory {
    Frontend,
    Backend,
    Services,
    Routes,
    Models,
    Components,
    Pages,
    Utils,
    ConfigFiles,
    DatabaseFiles,
    Folders,
    Dependencies,
}

impl ComponentCategory {
    pub const ALL: [ComponentCategory; 12] = [
        ComponentCategory::Frontend,
        ComponentCategory::Backend,
        ComponentCategory::Services,
        ComponentCategory::Routes,
        ComponentCategory::Models,
        ComponentCategory::Components,
        ComponentCategory::Pages,
        ComponentCategory::Utils,
        ComponentCategory::ConfigFiles,
        ComponentCategory::DatabaseFiles,
        ComponentCategory::Folders,
        ComponentCategory::Dependencies,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            ComponentCategory::Frontend => "Frontend Files",
            ComponentCategory::Backend => "Backend Files",
            ComponentCategory::Services => "Services",
            ComponentCategory::Routes => "Routes/API",
            ComponentCategory::Models => "Models/Schemas",
            ComponentCategory::Components => "UI Components",
            ComponentCategory::Pages => "Pages/Views",
            ComponentCategory::Utils => "Utilities",
            ComponentCategory::ConfigFiles => "Configuration Files",
            ComponentCategory::DatabaseFiles => "Database Files",
            ComponentCategory::Folders => "Folders",
            ComponentCategory::Dependencies => "Dependencies",
        }
    }

    /// Whether a file path belongs to this category. Folders and
    /// dependencies are never matched by file path.
    fn matches_file(&self, lower_path: &str) -> bool {
        let any = |keys: &[&str]| keys.iter().any(|k| lower_path.contains(k));
        match self {
            ComponentCategory::Frontend => any(&["frontend", "client"]),
            ComponentCategory::Backend => any(&["backend", "server"]),
            ComponentCategory::Services => any(&["service"]),
            ComponentCategory::Routes => any(&["route"]),
            ComponentCategory::Models => any(&["model", "schema"]),
            ComponentCategory::Components => any(&["component"]),
            ComponentCategory::Pages => any(&["page", "view"]),
            ComponentCategory::Utils => any(&["util", "helper"]),
            ComponentCategory::ConfigFiles => {
                [".json", ".yaml", ".yml", ".env", ".toml", ".ini"].iter().any(|ext| lower_path.ends_with(ext))
            }
            ComponentCategory::DatabaseFiles => {
                lower_path.contains("database")
                    || lower_path.ends_with(".sql")
                    || lower_path.split(['/', '.', '_', '-']).any(|part| part == "db")
            }
            ComponentCategory::Folders | ComponentCategory::Dependencies => false,
        }
    }
}

impl fmt::Display for ComponentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Category → members, in traversal order. A file may land in several categories.
pub type Components = BTreeMap<ComponentCategory, Vec<String>>;

/// Walk the snapshot tree and bucket every folder and file, then add
/// dependency names parsed from the captured manifests.
pub fn categorize_components(snapshot: &RepoSnapshot) -> Components {
    let mut components: Components =
        ComponentCategory::ALL.iter().map(|c| (*c, Vec::new())).collect();

    let mut stack: Vec<&FileNode> = snapshot.file_structure.values().rev().collect();
    while let Some(node) = stack.pop() {
        match node {
            FileNode::Dir { path, contents } => {
                push(&mut components, ComponentCategory::Folders, path);
                stack.extend(contents.values().rev());
            }
            FileNode::File { path, .. } => {
                let lower = path.to_lowercase();
                for category in ComponentCategory::ALL {
                    if category.matches_file(&lower) {
                        push(&mut components, category, path);
                    }
                }
            }
        }
    }

    for (manager, manifest) in &snapshot.dependencies {
        for name in parse_dependency_names(manager, manifest) {
            push(&mut components, ComponentCategory::Dependencies, &name);
        }
    }

    components
}

fn push(components: &mut Components, category: ComponentCategory, value: &str) {
    components.entry(category).or_default().push(value.to_string());
}

/// Best-effort dependency names from a (possibly truncated) manifest.
pub fn parse_dependency_names(manager: &str, manifest: &str) -> Vec<String> {
    match manager {
        "pip" => manifest
            .lines()
            .take(50)
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with('-'))
            .filter_map(|line| {
                line.split(['=', '>', '<', '~', '!', '[', ';', ' '])
                    .next()
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
            })
            .collect(),
        "npm" | "composer" => {
            let Ok(value) = serde_json::from_str::<serde_json::Value>(manifest) else {
                return Vec::new();
            };
            let sections: &[&str] = if manager == "npm" {
                &["dependencies", "devDependencies"]
            } else {
                &["require", "require-dev"]
            };
            sections
                .iter()
                .filter_map(|key| value.get(key).and_then(|v| v.as_object()))
                .flat_map(|deps| deps.keys().cloned())
                .collect()
        }
        "cargo" => {
            let Ok(value) = manifest.parse::<toml::Table>() else {
                return Vec::new();
            };
            ["dependencies", "dev-dependencies"]
                .iter()
                .filter_map(|key| value.get(*key).and_then(|v| v.as_table()))
                .flat_map(|deps| deps.keys().cloned())
                .collect()
        }
        "go" => manifest
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with("module") && !line.starts_with("go "))
            .filter_map(|line| {
                let line = line.strip_prefix("require").unwrap_or(line).trim();
                let name = line.split_whitespace().next()?;
                name.contains('/').then(|| name.to_string())
            })
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_purpose_keywords_in_priority_order() {
        assert_eq!(classify_file_purpose("user_test.py"), FilePurpose::Testing);
        assert_eq!(classify_file_purpose("test_config.py"), FilePurpose::Testing);
        assert_eq!(classify_file_purpose("settings.py"), FilePurpose::Configuration);
        assert_eq!(classify_file_purpose("UserModel.ts"), FilePurpose::DataModel);
        assert_eq!(classify_file_purpose("routes.rs"), FilePurpose::Api);
        assert_eq!(classify_file_purpose("HomePage.tsx"), FilePurpose::Ui);
        assert_eq!(classify_file_purpose("string_utils.go"), FilePurpose::Utility);
        assert_eq!(classify_file_purpose("auth_service.py"), FilePurpose::Service);
        assert_eq!(classify_file_purpose("middleware.js"), FilePurpose::Middleware);
        assert_eq!(classify_file_purpose("Cargo.toml"), FilePurpose::Dependencies);
        assert_eq!(classify_file_purpose("main.rs"), FilePurpose::General);
    }

    #[test]
    fn test_dependency_names_match_exact_file_name() {
        assert_eq!(classify_file_purpose("package.json"), FilePurpose::Dependencies);
        assert_eq!(classify_file_purpose("cargo.toml"), FilePurpose::General);
    }

    fn file(path: &str) -> FileNode {
        let name = path.rsplit('/').next().unwrap_or(path);
        FileNode::File {
            path: path.to_string(),
            size: 1,
            extension: name.rsplit('.').next().unwrap_or("none").to_string(),
            purpose: classify_file_purpose(name),
        }
    }

    #[test]
    fn test_categorize_components_walks_tree() {
        let mut snapshot = RepoSnapshot::default();
        let mut backend = BTreeMap::new();
        backend.insert("user_service.py".to_string(), file("backend/user_service.py"));
        backend.insert("db.sql".to_string(), file("backend/db.sql"));
        snapshot.file_structure.insert(
            "backend".to_string(),
            FileNode::Dir { path: "backend".to_string(), contents: backend },
        );
        snapshot.file_structure.insert("config.yml".to_string(), file("config.yml"));
        snapshot.dependencies.insert("pip".to_string(), "fastapi==0.110\n# comment\nrequests>=2\n".to_string());

        let components = categorize_components(&snapshot);
        assert_eq!(components[&ComponentCategory::Folders], vec!["backend"]);
        assert_eq!(
            components[&ComponentCategory::Backend],
            vec!["backend/db.sql", "backend/user_service.py"]
        );
        assert_eq!(components[&ComponentCategory::Services], vec!["backend/user_service.py"]);
        assert_eq!(components[&ComponentCategory::DatabaseFiles], vec!["backend/db.sql"]);
        assert_eq!(components[&ComponentCategory::ConfigFiles], vec!["config.yml"]);
        assert_eq!(components[&ComponentCategory::Dependencies], vec!["fastapi", "requests"]);
        assert!(components[&ComponentCategory::Frontend].is_empty());
    }

    #[test]
    fn test_db_matches_whole_segment_only() {
        assert!(ComponentCategory::DatabaseFiles.matches_file("src/db/pool.rs"));
        assert!(!ComponentCategory::DatabaseFiles.matches_file("src/feedback.rs"));
    }

    #[test]
    fn test_parse_dependency_names_per_manager() {
        let npm = r#"{"dependencies": {"react": "^18"}, "devDependencies": {"vite": "5"}}"#;
        assert_eq!(parse_dependency_names("npm", npm), vec!["react", "vite"]);

        let cargo = "[package]\nname = 'x'\n\n[dependencies]\nserde = '1'\ntokio = { version = '1' }\n";
        assert_eq!(parse_dependency_names("cargo", cargo), vec!["serde", "tokio"]);

        let gomod = "module example.com/x\n\ngo 1.22\n\nrequire (\n\tgithub.com/gin-gonic/gin v1.9.1\n)\n";
        assert_eq!(parse_dependency_names("go", gomod), vec!["github.com/gin-gonic/gin"]);

        assert!(parse_dependency_names("npm", "{ truncated").is_empty());
    }
}
