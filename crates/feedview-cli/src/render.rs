//! Plain-text tree rendering.
//!
//! Both renderers walk an explicit stack, so tree depth never translates into
//! call depth.

use colored::Colorize;
use feedview_store::PathView;
use feedview_tree::{PathNode, StageId, StageNode};

const BRANCH: &str = "├── ";
const LAST: &str = "└── ";
const PIPE: &str = "│   ";
const SPACE: &str = "    ";

fn child_prefix(prefix: &str, is_last: bool) -> String {
    format!("{prefix}{}", if is_last { SPACE } else { PIPE })
}

fn connector(is_last: bool) -> &'static str {
    if is_last {
        LAST
    } else {
        BRANCH
    }
}

/// Render the stage tree, marking `selected` with `*`.
pub fn render_stage_tree(root: &StageNode, selected: Option<StageId>) -> String {
    let mut out = String::new();
    out.push_str(&stage_line(root, selected));
    out.push('\n');

    let mut stack: Vec<(&StageNode, String, bool)> = Vec::new();
    push_children(&mut stack, &root.children, "");
    while let Some((node, prefix, is_last)) = stack.pop() {
        out.push_str(&prefix);
        out.push_str(connector(is_last));
        out.push_str(&stage_line(node, selected));
        out.push('\n');
        push_children(&mut stack, &node.children, &child_prefix(&prefix, is_last));
    }
    out
}

fn push_children<'a, T>(stack: &mut Vec<(&'a T, String, bool)>, children: &'a [T], prefix: &str) {
    let last = children.len().saturating_sub(1);
    for (i, child) in children.iter().enumerate().rev() {
        stack.push((child, prefix.to_string(), i == last));
    }
}

fn stage_line(node: &StageNode, selected: Option<StageId>) -> String {
    let record = &node.record;
    let name = record.display_name();
    let status = record.status.as_str();
    if selected == Some(record.id) {
        format!("{} [#{} {}] *", name.bold(), record.id, status)
    } else {
        format!("{name} [#{} {status}]", record.id)
    }
}

/// Render a path tree; directories end in `/`, files show their handle id.
pub fn render_path_tree(root: &PathNode) -> String {
    let mut out = String::new();
    let root_label = if root.name.is_empty() { "." } else { root.name.as_str() };
    out.push_str(&format!("{}/\n", root_label.bold()));

    let children: Vec<&PathNode> = root.children.values().collect();
    let mut stack: Vec<(&PathNode, String, bool)> = Vec::new();
    push_path_children(&mut stack, &children, "");
    while let Some((node, prefix, is_last)) = stack.pop() {
        out.push_str(&prefix);
        out.push_str(connector(is_last));
        match &node.file_ref {
            Some(file) => out.push_str(&format!("{} (#{})", node.name, file.file_handle.id)),
            None => out.push_str(&format!("{}/", node.name.blue())),
        }
        out.push('\n');
        let grandchildren: Vec<&PathNode> = node.children.values().collect();
        push_path_children(&mut stack, &grandchildren, &child_prefix(&prefix, is_last));
    }
    out
}

fn push_path_children<'a>(
    stack: &mut Vec<(&'a PathNode, String, bool)>,
    children: &[&'a PathNode],
    prefix: &str,
) {
    let last = children.len().saturating_sub(1);
    for (i, child) in children.iter().enumerate().rev() {
        stack.push((*child, prefix.to_string(), i == last));
    }
}

/// Render what a listing view shows for one path.
pub fn render_view(view: &PathView<'_>) -> String {
    let mut out = String::new();
    let path = if view.path.is_empty() { "." } else { view.path };
    out.push_str(&format!("{} {} ({})\n", "path".bold(), path, view.state.as_str()));
    if let Some(cursor) = view.cursor {
        out.push_str(&format!(
            "page offset={} limit={} total={} has_next={}\n",
            cursor.offset, cursor.limit, cursor.total_count, cursor.has_next
        ));
    }
    out.push_str(&format!("folders ({})\n", view.folders.len()));
    for folder in view.folders {
        out.push_str(&format!("  {}/\n", folder.name));
    }
    out.push_str(&format!("files ({})\n", view.files.len()));
    for file in view.files {
        out.push_str(&format!("  {} (#{})\n", file.full_path, file.file_handle.id));
    }
    out.push_str(&format!("selected ({})\n", view.selected.len()));
    for entry in view.selected {
        out.push_str(&format!("  {} [{}]\n", entry.exact_path, entry.kind));
    }
    out
}
