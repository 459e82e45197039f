//! Nested directory tree for the repository snapshot.

use crate::domain::FileNode;
use crate::scan::is_skipped_dir;
use crate::utils::{classify_file_purpose, file_extension, relative_to};
use anyhow::Result;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub type FileTree = BTreeMap<String, FileNode>;

/// Build the tree below `root`. Directories deeper than `max_depth` are
/// listed with empty contents; unreadable directories are treated as empty.
pub fn build_file_tree(root: &Path, max_depth: usize) -> Result<FileTree> {
    if !root.is_dir() {
        anyhow::bail!("Path is not a directory: {}", root.display());
    }
    Ok(walk_tree(root, root, 0, max_depth))
}

fn walk_tree(root: &Path, current: &Path, depth: usize, max_depth: usize) -> FileTree {
    let mut tree = FileTree::new();
    if depth > max_depth {
        return tree;
    }

    let entries = match fs::read_dir(current) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!("skipping unreadable directory {}: {}", current.display(), e);
            return tree;
        }
    };

    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') && name != ".env" {
            continue;
        }

        let path = entry.path();
        let Some(rel_path) = relative_to(root, &path) else { continue };
        let Ok(file_type) = entry.file_type() else { continue };

        if file_type.is_dir() {
            if is_skipped_dir(&name) {
                continue;
            }
            let contents = walk_tree(root, &path, depth + 1, max_depth);
            tree.insert(name, FileNode::Dir { path: rel_path, contents });
        } else {
            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            let node = FileNode::File {
                path: rel_path,
                size,
                extension: file_extension(&name),
                purpose: classify_file_purpose(&name),
            };
            tree.insert(name, node);
        }
    }

    tree
}

/// Render a tree with box-drawing connectors, directories first.
pub fn render_tree(root_name: &str, tree: &FileTree, max_depth: usize) -> String {
    let mut lines = vec![format!("{root_name}/")];
    render_level(tree, "", 1, max_depth, &mut lines);
    lines.join("\n")
}

fn render_level(tree: &FileTree, prefix: &str, depth: usize, max_depth: usize, lines: &mut Vec<String>) {
    if depth > max_depth {
        return;
    }

    let mut entries: Vec<(&String, &FileNode)> = tree.iter().collect();
    entries.sort_by(|a, b| {
        let a_file = !matches!(a.1, FileNode::Dir { .. });
        let b_file = !matches!(b.1, FileNode::Dir { .. });
        a_file.cmp(&b_file).then_with(|| a.0.cmp(b.0))
    });

    let total = entries.len();
    for (idx, (name, node)) in entries.into_iter().enumerate() {
        let is_last = idx + 1 == total;
        let connector = if is_last { "└── " } else { "├── " };
        match node {
            FileNode::Dir { contents, .. } => {
                lines.push(format!("{prefix}{connector}{name}/"));
                let extension = if is_last { "    " } else { "│   " };
                render_level(contents, &format!("{prefix}{extension}"), depth + 1, max_depth, lines);
            }
            FileNode::File { .. } => lines.push(format!("{prefix}{connector}{name}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FilePurpose;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_build_tree_includes_dirs_and_files() {
        let tmp = TempDir::new().expect("tmp dir");
        let root = tmp.path();
        fs::create_dir(root.join("src")).expect("mkdir src");
        fs::write(root.join("src/main.rs"), "fn main() {}\n").expect("write main");
        fs::write(root.join("README.md"), "# Demo\n").expect("write readme");

        let tree = build_file_tree(root, 5).expect("tree");
        let Some(FileNode::Dir { path, contents }) = tree.get("src") else {
            panic!("src should be a directory: {tree:?}");
        };
        assert_eq!(path, "src");
        assert_eq!(
            contents.get("main.rs"),
            Some(&FileNode::File {
                path: "src/main.rs".to_string(),
                size: 13,
                extension: "rs".to_string(),
                purpose: FilePurpose::General,
            })
        );
        assert!(tree.contains_key("README.md"));
    }

    #[test]
    fn test_build_tree_skips_noise_and_hidden_entries() {
        let tmp = TempDir::new().expect("tmp dir");
        let root = tmp.path();
        for dir in ["target", "node_modules", ".git", ".idea"] {
            fs::create_dir(root.join(dir)).expect("mkdir");
            fs::write(root.join(dir).join("x.js"), "x").expect("write");
        }
        fs::write(root.join(".env"), "KEY=1").expect("write env");
        fs::write(root.join(".hidden"), "x").expect("write hidden");

        let tree = build_file_tree(root, 5).expect("tree");
        let names: Vec<&str> = tree.keys().map(String::as_str).collect();
        assert_eq!(names, vec![".env"]);
    }

    #[test]
    fn test_build_tree_stops_at_depth() {
        let tmp = TempDir::new().expect("tmp dir");
        fs::create_dir_all(tmp.path().join("a/b/c")).expect("mkdir");
        fs::write(tmp.path().join("a/b/c/deep.txt"), "x").expect("write");

        let tree = build_file_tree(tmp.path(), 1).expect("tree");
        let Some(FileNode::Dir { contents: a, .. }) = tree.get("a") else { panic!("a missing") };
        let Some(FileNode::Dir { contents: b, .. }) = a.get("b") else { panic!("b missing") };
        assert!(b.is_empty(), "contents below max depth are cut: {b:?}");
    }

    #[test]
    fn test_render_tree_lists_dirs_first() {
        let tmp = TempDir::new().expect("tmp dir");
        fs::create_dir(tmp.path().join("src")).expect("mkdir");
        fs::write(tmp.path().join("src/lib.rs"), "").expect("write");
        fs::write(tmp.path().join("Cargo.toml"), "").expect("write");

        let tree = build_file_tree(tmp.path(), 5).expect("tree");
        let rendered = render_tree("demo", &tree, 4);
        assert_eq!(rendered, "demo/\n├── src/\n│   └── lib.rs\n└── Cargo.toml");
    }
}
