//! Flat records supplied by the fetch collaborator.
//!
//! These are immutable snapshots. Field names follow the backend's camelCase
//! JSON so a listing response deserializes directly into them.

use serde::{Deserialize, Serialize};

/// Identifier of a pipeline stage (plugin instance).
pub type StageId = u64;

// ============================================================================
// Stages
// ============================================================================

/// Execution status of a stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StageStatus {
    #[default]
    Created,
    Waiting,
    Scheduled,
    Started,
    RegisteringFiles,
    FinishedSuccessfully,
    FinishedWithError,
    Cancelled,
}

impl StageStatus {
    /// True once the stage can no longer produce files.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::FinishedSuccessfully | Self::FinishedWithError | Self::Cancelled
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Waiting => "waiting",
            Self::Scheduled => "scheduled",
            Self::Started => "started",
            Self::RegisteringFiles => "registeringFiles",
            Self::FinishedSuccessfully => "finishedSuccessfully",
            Self::FinishedWithError => "finishedWithError",
            Self::Cancelled => "cancelled",
        }
    }
}

/// One pipeline stage. Stages form a tree through `previous_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageRecord {
    pub id: StageId,
    pub previous_id: Option<StageId>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub status: StageStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin_name: Option<String>,
}

impl StageRecord {
    pub fn new(id: StageId, previous_id: Option<StageId>, title: impl Into<String>) -> Self {
        Self {
            id,
            previous_id,
            title: title.into(),
            status: StageStatus::Created,
            plugin_name: None,
        }
    }

    pub fn with_status(mut self, status: StageStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_plugin_name(mut self, plugin_name: impl Into<String>) -> Self {
        self.plugin_name = Some(plugin_name.into());
        self
    }

    pub fn is_root(&self) -> bool {
        self.previous_id.is_none()
    }

    /// Label shown for the stage: its title, else the plugin it ran, else its id.
    pub fn display_name(&self) -> String {
        let title = self.title.trim();
        if !title.is_empty() {
            return title.to_string();
        }
        match self.plugin_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("stage {}", self.id),
        }
    }
}

// ============================================================================
// Files and folders
// ============================================================================

/// Opaque reference to a stored file. The core never dereferences it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileHandle {
    pub id: u64,
    /// Download locator understood by the blob collaborator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
}

impl FileHandle {
    pub fn new(id: u64) -> Self {
        Self { id, resource: None }
    }
}

/// A file produced by a stage, addressed by its full slash-separated path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub full_path: String,
    pub file_handle: FileHandle,
}

impl FileRecord {
    pub fn new(full_path: impl Into<String>, id: u64) -> Self {
        Self {
            full_path: full_path.into(),
            file_handle: FileHandle::new(id),
        }
    }

    /// Last path segment.
    pub fn file_name(&self) -> &str {
        self.full_path
            .rsplit('/')
            .next()
            .unwrap_or(self.full_path.as_str())
    }
}

/// A folder entry in a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderRecord {
    pub path: String,
    pub name: String,
}

impl FolderRecord {
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
        }
    }
}

/// A multi-select entry. Identity is `exact_path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSelect {
    pub exact_path: String,
    pub path: String,
    pub folder: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
}

impl FileSelect {
    pub fn new(exact_path: impl Into<String>, kind: impl Into<String>) -> Self {
        let exact_path = exact_path.into();
        let (path, folder) = match exact_path.rsplit_once('/') {
            Some((parent, name)) => (parent.to_string(), name.to_string()),
            None => (String::new(), exact_path.clone()),
        };
        Self {
            exact_path,
            path,
            folder,
            kind: kind.into(),
            event: None,
        }
    }
}
