use serde::{Deserialize, Serialize};

/// Pagination progress for one path, as reported by the last listing page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageCursor {
    pub offset: u64,
    pub limit: u64,
    pub total_count: u64,
    pub has_next: bool,
}

impl PageCursor {
    pub fn new(offset: u64, limit: u64, total_count: u64) -> Self {
        Self {
            offset,
            limit,
            total_count,
            has_next: offset.saturating_add(limit) < total_count,
        }
    }

    /// Offset of the page after this one.
    pub fn next_offset(&self) -> u64 {
        self.offset.saturating_add(self.limit)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderDetails {
    pub current_folder: String,
    pub total_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomePath {
    pub path: String,
    pub home: bool,
}

/// Fetch progress of a single path, derived from the cache and in-flight tickets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathState {
    Unfetched,
    Loading,
    /// Cached, but the cursor says more pages exist.
    Partial,
    Complete,
}

impl PathState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unfetched => "unfetched",
            Self::Loading => "loading",
            Self::Partial => "partial",
            Self::Complete => "complete",
        }
    }
}

/// Which listing a fetch fills. Files and folders for one path are fetched
/// independently, so each kind has its own generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchKind {
    Files,
    Folders,
}
