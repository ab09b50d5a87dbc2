//! Path tree: flat `FileRecord`s → nested directories.
//!
//! Directories are synthesized from path prefixes; they are never listed
//! explicitly. Children keep first-insertion order so the rendered tree is
//! stable across rebuilds. A path reported twice keeps the *last* file handle
//! (last-write-wins).

use indexmap::IndexMap;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{PathIssue, TreeError};
use crate::records::FileRecord;

/// A directory (no `file_ref`) or a file leaf (`file_ref` set, no children).
///
/// Serializes as `{name, isLeaf, children, fileRef}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathNode {
    pub name: String,
    pub children: IndexMap<String, PathNode>,
    pub file_ref: Option<FileRecord>,
}

impl PathNode {
    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: IndexMap::new(),
            file_ref: None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.file_ref.is_some()
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves().len()
    }

    /// Every leaf with its path relative to this node, in pre-order.
    pub fn leaves(&self) -> Vec<(String, &FileRecord)> {
        let mut out = Vec::new();
        let mut stack: Vec<(String, &PathNode)> = self
            .children
            .values()
            .rev()
            .map(|child| (child.name.clone(), child))
            .collect();
        while let Some((path, node)) = stack.pop() {
            if let Some(file) = &node.file_ref {
                out.push((path, file));
                continue;
            }
            stack.extend(
                node.children
                    .values()
                    .rev()
                    .map(|child| (format!("{path}/{}", child.name), child)),
            );
        }
        out
    }

    /// Look up a descendant by a slash-separated path relative to this node.
    pub fn get(&self, path: &str) -> Option<&PathNode> {
        let mut node = self;
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            node = node.children.get(segment)?;
        }
        Some(node)
    }
}

impl Serialize for PathNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut node = serializer.serialize_struct("PathNode", 4)?;
        node.serialize_field("name", &self.name)?;
        node.serialize_field("isLeaf", &self.is_leaf())?;
        node.serialize_field("children", &self.children)?;
        node.serialize_field("fileRef", &self.file_ref)?;
        node.end()
    }
}

/// How the root node is named.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RootPolicy {
    /// Root is named `""` and holds every path from its first segment.
    #[default]
    Empty,
    /// The directory prefix shared by every file becomes the root name and is
    /// stripped from the paths below it.
    CommonPrefix,
}

impl std::str::FromStr for RootPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "empty" => Ok(Self::Empty),
            "common-prefix" | "common_prefix" => Ok(Self::CommonPrefix),
            other => Err(format!(
                "unknown root policy `{other}` (expected empty|common-prefix)"
            )),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PathTreeBuilder {
    root_policy: RootPolicy,
    root_name: Option<String>,
}

impl PathTreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root_policy(mut self, policy: RootPolicy) -> Self {
        self.root_policy = policy;
        self
    }

    /// Override the root label (e.g. with the selected stage's name).
    pub fn with_root_name(mut self, name: impl Into<String>) -> Self {
        self.root_name = Some(name.into());
        self
    }

    pub fn build(&self, files: &[FileRecord]) -> Result<PathNode, TreeError> {
        let split: Vec<Vec<&str>> = files
            .iter()
            .map(|file| split_path(&file.full_path))
            .collect::<Result<_, _>>()?;

        let prefix_len = match self.root_policy {
            RootPolicy::Empty => 0,
            RootPolicy::CommonPrefix => common_dir_prefix(&split),
        };
        let prefix = split
            .first()
            .map(|segments| segments[..prefix_len].join("/"))
            .unwrap_or_default();
        let mut root = PathNode::directory(self.root_name.clone().unwrap_or(prefix));

        for (file, segments) in files.iter().zip(&split) {
            insert(&mut root, file, segments, prefix_len)?;
        }

        tracing::debug!(
            files = files.len(),
            leaves = root.leaf_count(),
            root = %root.name,
            "built path tree"
        );
        Ok(root)
    }
}

/// Build with the default options (root named `""`).
pub fn build_path_tree(files: &[FileRecord]) -> Result<PathNode, TreeError> {
    PathTreeBuilder::new().build(files)
}

fn split_path(path: &str) -> Result<Vec<&str>, TreeError> {
    if path.is_empty() {
        return Err(TreeError::InvalidPath {
            path: path.to_string(),
            issue: PathIssue::Empty,
        });
    }
    let segments: Vec<&str> = path.split('/').collect();
    if let Some(index) = segments.iter().position(|segment| segment.is_empty()) {
        return Err(TreeError::InvalidPath {
            path: path.to_string(),
            issue: PathIssue::EmptySegment { index },
        });
    }
    Ok(segments)
}

/// Number of leading directory segments shared by every path. The last
/// segment of a path is its file name and never part of the prefix.
fn common_dir_prefix(paths: &[Vec<&str>]) -> usize {
    let Some((first, rest)) = paths.split_first() else {
        return 0;
    };
    let mut len = first.len() - 1;
    for segments in rest {
        len = len.min(segments.len() - 1);
        len = first[..len]
            .iter()
            .zip(segments)
            .take_while(|(a, b)| a == b)
            .count();
    }
    len
}

fn insert(
    root: &mut PathNode,
    file: &FileRecord,
    segments: &[&str],
    prefix_len: usize,
) -> Result<(), TreeError> {
    let conflict = |upto: usize| TreeError::InvalidPath {
        path: file.full_path.clone(),
        issue: PathIssue::FileDirectoryConflict {
            prefix: segments[..upto].join("/"),
        },
    };

    let rest = &segments[prefix_len..];
    let mut node = root;
    for (depth, segment) in rest.iter().enumerate() {
        let child = node
            .children
            .entry((*segment).to_string())
            .or_insert_with(|| PathNode::directory(*segment));

        if depth + 1 == rest.len() {
            if !child.children.is_empty() {
                return Err(conflict(segments.len()));
            }
            if let Some(previous) = child.file_ref.replace(file.clone()) {
                if previous.file_handle != file.file_handle {
                    tracing::debug!(
                        path = %file.full_path,
                        previous = previous.file_handle.id,
                        current = file.file_handle.id,
                        "duplicate path, keeping the later file"
                    );
                }
            }
            return Ok(());
        }

        if child.is_leaf() {
            return Err(conflict(prefix_len + depth + 1));
        }
        node = child;
    }
    Ok(())
}
