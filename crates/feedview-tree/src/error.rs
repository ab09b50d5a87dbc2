use crate::records::StageId;

/// Why a `full_path` was rejected by the path-tree builder.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathIssue {
    #[error("path is empty")]
    Empty,
    /// Segment `index` is empty (leading, trailing or doubled `/`).
    #[error("segment {index} is empty")]
    EmptySegment { index: usize },
    /// The path uses `prefix` as a directory, but `prefix` is also a file (or vice versa).
    #[error("`{prefix}` is used both as a file and as a directory")]
    FileDirectoryConflict { prefix: String },
}

/// Failures surfaced by the tree builders.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    #[error("expected exactly one root stage, found {roots}")]
    NotFound { roots: usize },

    #[error("stage {id} references unknown previous stage {previous_id}")]
    OrphanRecord { id: StageId, previous_id: StageId },

    #[error("stage id {id} appears more than once")]
    DuplicateId { id: StageId },

    #[error("stages {ids:?} are not reachable from the root (parent chain loops)")]
    Cycle { ids: Vec<StageId> },

    #[error("invalid path `{path}`: {issue}")]
    InvalidPath { path: String, issue: PathIssue },
}
