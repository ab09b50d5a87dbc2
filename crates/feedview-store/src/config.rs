use serde::{Deserialize, Serialize};

/// What `SetFiles` with an empty page does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyFilesPolicy {
    /// Drop every cached file listing, whatever the path (legacy behavior).
    #[default]
    ClearAll,
    /// Drop only the listing of the action's path.
    ClearPath,
}

/// Configuration for the resource store
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub empty_files_policy: EmptyFilesPolicy,
    /// Folder under a user's home that `AddFolder` prepends into.
    pub uploads_folder: String,
    /// Page size requested by the loader.
    pub default_page_limit: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            empty_files_policy: EmptyFilesPolicy::ClearAll,
            uploads_folder: "uploads".to_string(),
            default_page_limit: 50,
        }
    }
}
