//! Rendering a snapshot as prompt text.

use crate::domain::{FileContent, FileNode, RepoSnapshot};
use crate::utils::classify::{categorize_components, ComponentCategory};
use crate::utils::truncate_chars;
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Entries listed per directory level before eliding the rest.
pub const TREE_ITEMS_PER_LEVEL: usize = 50;
/// Files whose contents are shown.
pub const CONTENT_FILES: usize = 30;
/// Characters of each file shown.
pub const CONTENT_PREVIEW_CHARS: usize = 2_000;
/// Characters of the README shown in the short context.
pub const README_PREVIEW_CHARS: usize = 5_000;

/// Indented listing of the tree, directories marked with a trailing `/`.
pub fn format_file_structure(tree: &BTreeMap<String, FileNode>) -> String {
    let mut lines = Vec::new();
    format_level(tree, 0, &mut lines);
    lines.join("\n")
}

fn format_level(tree: &BTreeMap<String, FileNode>, indent: usize, lines: &mut Vec<String>) {
    let prefix = "  ".repeat(indent);
    for (count, (name, node)) in tree.iter().enumerate() {
        if count >= TREE_ITEMS_PER_LEVEL {
            lines.push(format!("{prefix}... ({} more items)", tree.len() - count));
            break;
        }
        match node {
            FileNode::Dir { contents, .. } => {
                lines.push(format!("{prefix}{name}/"));
                format_level(contents, indent + 1, lines);
            }
            FileNode::File { size, extension, purpose, .. } => {
                lines.push(format!("{prefix}{name} [{extension}] ({purpose}, {size}B)"));
            }
        }
    }
}

/// Leading slice of the first files, each under a header with its metadata.
pub fn format_file_contents(contents: &BTreeMap<String, FileContent>) -> String {
    let rule = "=".repeat(60);
    let mut out = String::new();
    for (path, file) in contents.iter().take(CONTENT_FILES) {
        let _ = writeln!(out, "\n{rule}");
        let _ = writeln!(out, "FILE: {path}");
        let _ = writeln!(
            out,
            "Type: {} | Purpose: {} | Size: {}B",
            file.extension, file.purpose, file.full_size
        );
        let _ = writeln!(out, "{rule}");
        out.push_str(truncate_chars(&file.content, CONTENT_PREVIEW_CHARS));
        if file.full_size > CONTENT_PREVIEW_CHARS {
            let _ = write!(
                out,
                "\n... (truncated, {} characters remaining)",
                file.full_size - CONTENT_PREVIEW_CHARS
            );
        }
        out.push('\n');
    }
    out
}

/// Metadata, tree, contents and a README preview.
pub fn brief_context(snapshot: &RepoSnapshot) -> String {
    format!(
        "Repository: {}\nDescription: {}\nLanguage: {}\n\nFile Structure:\n{}\n\nFile Contents:\n{}\n\nREADME:\n{}\n",
        snapshot.name,
        snapshot.description,
        snapshot.language,
        format_file_structure(&snapshot.file_structure),
        format_file_contents(&snapshot.file_contents),
        truncate_chars(&snapshot.readme, README_PREVIEW_CHARS),
    )
}

/// Everything in the brief context plus categorized components, dependencies
/// and the full README, for open-ended conversation.
pub fn full_context(snapshot: &RepoSnapshot) -> String {
    let mut out = String::new();
    let languages = snapshot.languages.keys().cloned().collect::<Vec<_>>().join(", ");

    let _ = writeln!(out, "# Repository Analysis\n");
    let _ = writeln!(out, "## Metadata");
    let _ = writeln!(out, "Name: {}", snapshot.name);
    let _ = writeln!(out, "Description: {}", non_empty(&snapshot.description, "No description"));
    let _ = writeln!(out, "Primary Language: {}", snapshot.language);
    let _ = writeln!(out, "All Languages: {languages}");
    let _ = writeln!(out, "Stars: {} | Forks: {} | Open issues: {}", snapshot.stars, snapshot.forks, snapshot.open_issues);
    let _ = writeln!(out, "Topics: {}", snapshot.topics.join(", "));
    let _ = writeln!(out, "Files analyzed: {}\n", snapshot.total_files_analyzed());

    let _ = writeln!(out, "## File Structure");
    let _ = writeln!(out, "{}\n", format_file_structure(&snapshot.file_structure));

    let _ = writeln!(out, "## Components");
    let components = categorize_components(snapshot);
    for category in ComponentCategory::ALL {
        let members = components.get(&category).map(Vec::as_slice).unwrap_or_default();
        let limit = match category {
            ComponentCategory::Frontend | ComponentCategory::Backend => 30,
            ComponentCategory::Dependencies => 20,
            _ => usize::MAX,
        };
        let _ = writeln!(out, "\n### {} ({})", category.title(), members.len());
        for member in members.iter().take(limit) {
            let _ = writeln!(out, "- {member}");
        }
    }

    let _ = writeln!(out, "\n## File Contents");
    out.push_str(&format_file_contents(&snapshot.file_contents));

    let _ = writeln!(out, "\n## README");
    let _ = writeln!(out, "{}", non_empty(&snapshot.readme, "No README available"));
    out
}

fn non_empty<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FilePurpose;

    fn file(path: &str, size: u64, ext: &str, purpose: FilePurpose) -> FileNode {
        FileNode::File { path: path.into(), size, extension: ext.into(), purpose }
    }

    fn sample_tree() -> BTreeMap<String, FileNode> {
        let mut src = BTreeMap::new();
        src.insert("api.py".to_string(), file("src/api.py", 120, "py", FilePurpose::Api));
        src.insert("models.py".to_string(), file("src/models.py", 80, "py", FilePurpose::DataModel));
        let mut tree = BTreeMap::new();
        tree.insert("src".to_string(), FileNode::Dir { path: "src".into(), contents: src });
        tree.insert("README.md".to_string(), file("README.md", 10, "md", FilePurpose::General));
        tree
    }

    #[test]
    fn test_format_file_structure() {
        insta::assert_snapshot!(format_file_structure(&sample_tree()), @r###"
        README.md [md] (general, 10B)
        src/
          api.py [py] (api, 120B)
          models.py [py] (data_model, 80B)
        "###);
    }

    #[test]
    fn test_format_file_structure_elides_long_levels() {
        let tree: BTreeMap<String, FileNode> = (0..55)
            .map(|i| {
                let name = format!("f{i:02}.rs");
                (name.clone(), file(&name, 1, "rs", FilePurpose::General))
            })
            .collect();
        let text = format_file_structure(&tree);
        assert_eq!(text.lines().count(), 51);
        assert_eq!(text.lines().last(), Some("... (5 more items)"));
    }

    #[test]
    fn test_format_file_contents_truncates_preview() {
        let mut contents = BTreeMap::new();
        contents.insert(
            "big.py".to_string(),
            FileContent {
                content: "x".repeat(2_500),
                size: 2_500,
                extension: "py".into(),
                purpose: FilePurpose::General,
                full_size: 2_500,
            },
        );
        let text = format_file_contents(&contents);
        assert!(text.contains("FILE: big.py"));
        assert!(text.contains("Type: py | Purpose: general | Size: 2500B"));
        assert!(text.contains("... (truncated, 500 characters remaining)"));
        assert!(!text.contains(&"x".repeat(2_001)));
    }

    #[test]
    fn test_full_context_lists_components() {
        let snapshot = RepoSnapshot {
            name: "demo".into(),
            language: "Python".into(),
            file_structure: sample_tree(),
            ..Default::default()
        };
        let text = full_context(&snapshot);
        assert!(text.contains("Name: demo"));
        assert!(text.contains("### Models/Schemas (1)\n- src/models.py"));
        assert!(text.contains("### Folders (1)\n- src"));
        assert!(text.contains("No README available"));
    }
}
