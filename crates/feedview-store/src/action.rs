//! The closed set of store actions.
//!
//! On the wire an action is `{"type": "SET_FILES", "payload": {...}}`, the
//! same shape the listing views log and replay.

use feedview_tree::{FileRecord, FileSelect, FolderRecord};
use serde::{Deserialize, Deserializer, Serialize};

use crate::types::PageCursor;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum Action {
    /// Append a page of files to `path`. An empty page is a reset, see
    /// [`EmptyFilesPolicy`](crate::EmptyFilesPolicy).
    SetFiles {
        path: String,
        files: Vec<FileRecord>,
    },
    /// Replace the folder listing of `path`.
    SetFolders {
        path: String,
        folders: Vec<FolderRecord>,
    },
    SetPaginatedFolders {
        path: String,
        folders: Vec<String>,
    },
    /// The cursor fields sit next to `path` in the payload.
    SetPagination {
        path: String,
        #[serde(flatten)]
        cursor: PageCursor,
    },
    SetCurrentPath {
        path: String,
    },
    SetSelectedFolder {
        select_folder: FileSelect,
    },
    ClearSelectedFolder {
        select_folder: FileSelect,
    },
    /// Empty the selection. `clear` is carried for log compatibility only.
    #[serde(rename = "SET_CLEAR_FILE_SELECT")]
    ClearFileSelect {
        #[serde(default)]
        clear: bool,
    },
    ClearFilesState {
        path: String,
    },
    ClearFolderState {
        path: String,
    },
    SetLoading {
        loading: bool,
    },
    SetFolderDetails {
        current_folder: String,
        total_count: u64,
    },
    SetPreviewAll {
        preview_all: bool,
    },
    /// Prepend a folder to the user's uploads listing. `folder` may be a bare
    /// name, whose path is then filled in under the uploads listing.
    #[serde(rename = "SET_ADD_FOLDER")]
    AddFolder {
        #[serde(deserialize_with = "folder_or_name")]
        folder: FolderRecord,
        #[serde(default)]
        username: Option<String>,
    },
    SetTooltip {
        tooltip: bool,
    },
    SetInitialPath {
        #[serde(rename = "type")]
        kind: String,
        path: String,
    },
    SetHomePath {
        #[serde(rename = "type")]
        kind: String,
        path: String,
    },
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetFiles { .. } => "SET_FILES",
            Self::SetFolders { .. } => "SET_FOLDERS",
            Self::SetPaginatedFolders { .. } => "SET_PAGINATED_FOLDERS",
            Self::SetPagination { .. } => "SET_PAGINATION",
            Self::SetCurrentPath { .. } => "SET_CURRENT_PATH",
            Self::SetSelectedFolder { .. } => "SET_SELECTED_FOLDER",
            Self::ClearSelectedFolder { .. } => "CLEAR_SELECTED_FOLDER",
            Self::ClearFileSelect { .. } => "SET_CLEAR_FILE_SELECT",
            Self::ClearFilesState { .. } => "CLEAR_FILES_STATE",
            Self::ClearFolderState { .. } => "CLEAR_FOLDER_STATE",
            Self::SetLoading { .. } => "SET_LOADING",
            Self::SetFolderDetails { .. } => "SET_FOLDER_DETAILS",
            Self::SetPreviewAll { .. } => "SET_PREVIEW_ALL",
            Self::AddFolder { .. } => "SET_ADD_FOLDER",
            Self::SetTooltip { .. } => "SET_TOOLTIP",
            Self::SetInitialPath { .. } => "SET_INITIAL_PATH",
            Self::SetHomePath { .. } => "SET_HOME_PATH",
        }
    }

    /// The cache key the action targets, when it targets one.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::SetFiles { path, .. }
            | Self::SetFolders { path, .. }
            | Self::SetPaginatedFolders { path, .. }
            | Self::SetPagination { path, .. }
            | Self::SetCurrentPath { path }
            | Self::ClearFilesState { path }
            | Self::ClearFolderState { path } => Some(path.as_str()),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FolderOrName {
    Record(FolderRecord),
    Name(String),
}

fn folder_or_name<'de, D: Deserializer<'de>>(deserializer: D) -> Result<FolderRecord, D::Error> {
    Ok(match FolderOrName::deserialize(deserializer)? {
        FolderOrName::Record(record) => record,
        FolderOrName::Name(name) => FolderRecord::new(String::new(), name),
    })
}
