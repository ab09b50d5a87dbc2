//! The reducer and its per-path bookkeeping.

use std::collections::{BTreeMap, HashMap};

use feedview_tree::{FileRecord, FileSelect, FolderRecord};
use serde::Serialize;

use crate::action::Action;
use crate::config::{EmptyFilesPolicy, StoreConfig};
use crate::types::{FetchKind, FolderDetails, HomePath, PageCursor, PathState};

// ============================================================================
// State
// ============================================================================

/// Everything the listing views read. Maps are keyed by path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryState {
    pub files_by_path: BTreeMap<String, Vec<FileRecord>>,
    pub folders_by_path: BTreeMap<String, Vec<FolderRecord>>,
    pub pagination_by_path: BTreeMap<String, PageCursor>,
    pub paginated_folders: BTreeMap<String, Vec<String>>,
    /// Unique by `exact_path`, in selection order.
    pub selected_paths: Vec<FileSelect>,
    pub current_path: String,
    pub initial_path: BTreeMap<String, String>,
    pub home_path: BTreeMap<String, HomePath>,
    pub folder_details: FolderDetails,
    pub preview_all: bool,
    pub loading: bool,
    pub tooltip: bool,
}

/// Proof that a fetch for `path` was started. Only the newest ticket for a
/// path and kind may write into its cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    path: String,
    kind: FetchKind,
    generation: u64,
}

impl FetchTicket {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn kind(&self) -> FetchKind {
        self.kind
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn key(&self) -> (String, FetchKind) {
        (self.path.clone(), self.kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    /// The path was cleared or re-requested after this fetch began.
    Stale,
}

/// Read-only view of one path, as handed to a renderer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathView<'a> {
    pub path: &'a str,
    pub state: PathState,
    pub files: &'a [FileRecord],
    pub folders: &'a [FolderRecord],
    pub cursor: Option<&'a PageCursor>,
    pub selected: &'a [FileSelect],
}

// ============================================================================
// Store
// ============================================================================

/// Incremental, per-path listing cache driven by [`Action`]s.
///
/// The store is owned by one consumer and mutated by sequential dispatch.
/// It never fails: payloads are trusted, and every action is a deterministic
/// state transition.
#[derive(Debug, Default)]
pub struct ResourceStore {
    config: StoreConfig,
    state: LibraryState,
    /// Latest generation handed out (or invalidated) per path and kind.
    generations: HashMap<(String, FetchKind), u64>,
    /// Generation of the outstanding fetch per path and kind.
    in_flight: HashMap<(String, FetchKind), u64>,
}

impl ResourceStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn state(&self) -> &LibraryState {
        &self.state
    }

    // ========================================================================
    // Reducer
    // ========================================================================

    pub fn dispatch(&mut self, action: Action) {
        tracing::trace!(action = action.name(), path = ?action.path(), "dispatch");
        match action {
            Action::SetFiles { path, files } => self.set_files(path, files),
            Action::SetFolders { path, folders } => {
                self.state.folders_by_path.insert(path, folders);
            }
            Action::SetPaginatedFolders { path, folders } => {
                self.state.paginated_folders.insert(path, folders);
            }
            Action::SetPagination { path, cursor } => {
                self.state.pagination_by_path.insert(path, cursor);
            }
            Action::SetCurrentPath { path } => {
                self.state.current_path = path;
            }
            Action::SetSelectedFolder { select_folder } => self.select(select_folder),
            Action::ClearSelectedFolder { select_folder } => {
                self.state
                    .selected_paths
                    .retain(|entry| entry.exact_path != select_folder.exact_path);
            }
            Action::ClearFileSelect { .. } => self.state.selected_paths.clear(),
            Action::ClearFilesState { path } => {
                if path.is_empty() {
                    return;
                }
                self.state.files_by_path.remove(&path);
                self.state.pagination_by_path.remove(&path);
                self.invalidate(&path, FetchKind::Files);
            }
            Action::ClearFolderState { path } => {
                if path.is_empty() {
                    return;
                }
                self.state.folders_by_path.remove(&path);
                self.state.paginated_folders.remove(&path);
                self.state.pagination_by_path.remove(&path);
                // The cursor is shared with file pages, so both kinds restart.
                self.invalidate(&path, FetchKind::Folders);
                self.invalidate(&path, FetchKind::Files);
            }
            Action::SetLoading { loading } => self.state.loading = loading,
            Action::SetFolderDetails {
                current_folder,
                total_count,
            } => {
                self.state.folder_details = FolderDetails {
                    current_folder,
                    total_count,
                };
            }
            Action::SetPreviewAll { preview_all } => self.state.preview_all = preview_all,
            Action::AddFolder {
                mut folder,
                username,
            } => {
                let key = match username {
                    Some(user) => format!("{user}/{}", self.config.uploads_folder),
                    None => self.config.uploads_folder.clone(),
                };
                if folder.path.is_empty() {
                    folder.path = format!("{key}/{}", folder.name);
                }
                self.state
                    .folders_by_path
                    .entry(key)
                    .or_default()
                    .insert(0, folder);
            }
            Action::SetTooltip { tooltip } => self.state.tooltip = tooltip,
            Action::SetInitialPath { kind, path } => {
                self.state.home_path.entry(kind.clone()).or_default().home = false;
                self.state.initial_path.insert(kind, path);
            }
            Action::SetHomePath { kind, path } => {
                self.state
                    .home_path
                    .insert(kind, HomePath { path, home: true });
            }
        }
    }

    fn set_files(&mut self, path: String, files: Vec<FileRecord>) {
        if files.is_empty() {
            let cleared: Vec<String> = match self.config.empty_files_policy {
                EmptyFilesPolicy::ClearAll => {
                    tracing::debug!(path = %path, "empty page resets every file listing");
                    std::mem::take(&mut self.state.files_by_path)
                        .into_keys()
                        .collect()
                }
                EmptyFilesPolicy::ClearPath => {
                    self.state.files_by_path.remove(&path);
                    vec![path]
                }
            };
            // A listing restarts at offset 0, so its cursor and any page in
            // flight go with it.
            for path in &cleared {
                self.state.pagination_by_path.remove(path);
                self.invalidate(path, FetchKind::Files);
            }
            return;
        }

        let total = self
            .state
            .pagination_by_path
            .get(&path)
            .map(|cursor| usize::try_from(cursor.total_count).unwrap_or(usize::MAX));
        let cached = self.state.files_by_path.entry(path).or_default();

        let mut positions: HashMap<String, usize> = cached
            .iter()
            .enumerate()
            .map(|(pos, file)| (file.full_path.clone(), pos))
            .collect();
        for file in files {
            match positions.get(&file.full_path) {
                Some(&pos) => cached[pos] = file,
                None => {
                    positions.insert(file.full_path.clone(), cached.len());
                    cached.push(file);
                }
            }
        }

        if let Some(total) = total {
            if cached.len() > total {
                tracing::warn!(
                    cached = cached.len(),
                    total_count = total,
                    "file listing exceeds the reported total; dropping the excess"
                );
                cached.truncate(total);
            }
        }
    }

    fn select(&mut self, entry: FileSelect) {
        let already = self
            .state
            .selected_paths
            .iter()
            .any(|selected| selected.exact_path == entry.exact_path);
        if already {
            tracing::debug!(exact_path = %entry.exact_path, "duplicate selection ignored");
            return;
        }
        self.state.selected_paths.push(entry);
    }

    // ========================================================================
    // Fetch generations
    // ========================================================================

    /// Record that a `kind` fetch for `path` started. Any older ticket for the
    /// same path and kind becomes stale.
    pub fn begin_fetch(&mut self, path: impl Into<String>, kind: FetchKind) -> FetchTicket {
        let path = path.into();
        let key = (path.clone(), kind);
        let generation = self.generations.entry(key.clone()).or_insert(0);
        *generation += 1;
        let generation = *generation;
        self.in_flight.insert(key, generation);
        FetchTicket {
            path,
            kind,
            generation,
        }
    }

    /// Apply a fetch result if its ticket is still the newest for its path.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        actions: impl IntoIterator<Item = Action>,
    ) -> FetchOutcome {
        if !self.is_current(&ticket) {
            tracing::warn!(
                path = %ticket.path,
                kind = ?ticket.kind,
                generation = ticket.generation,
                "dropping stale fetch result"
            );
            return FetchOutcome::Stale;
        }
        self.in_flight.remove(&ticket.key());
        for action in actions {
            self.dispatch(action);
        }
        FetchOutcome::Applied
    }

    /// Forget a failed fetch without touching cached data.
    pub fn abandon_fetch(&mut self, ticket: FetchTicket) {
        if self.is_current(&ticket) {
            self.in_flight.remove(&ticket.key());
        }
    }

    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        self.generations.get(&ticket.key()) == Some(&ticket.generation)
    }

    fn invalidate(&mut self, path: &str, kind: FetchKind) {
        let key = (path.to_string(), kind);
        if let Some(generation) = self.generations.get_mut(&key) {
            *generation += 1;
        }
        self.in_flight.remove(&key);
    }

    // ========================================================================
    // Reads
    // ========================================================================

    pub fn path_state(&self, path: &str) -> PathState {
        let loading = [FetchKind::Files, FetchKind::Folders]
            .into_iter()
            .any(|kind| self.in_flight.contains_key(&(path.to_string(), kind)));
        if loading {
            return PathState::Loading;
        }
        if let Some(cursor) = self.state.pagination_by_path.get(path) {
            return if cursor.has_next {
                PathState::Partial
            } else {
                PathState::Complete
            };
        }
        if self.state.files_by_path.contains_key(path)
            || self.state.folders_by_path.contains_key(path)
        {
            PathState::Complete
        } else {
            PathState::Unfetched
        }
    }

    pub fn files(&self, path: &str) -> &[FileRecord] {
        self.state
            .files_by_path
            .get(path)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn folders(&self, path: &str) -> &[FolderRecord] {
        self.state
            .folders_by_path
            .get(path)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn cursor(&self, path: &str) -> Option<&PageCursor> {
        self.state.pagination_by_path.get(path)
    }

    pub fn selected(&self) -> &[FileSelect] {
        &self.state.selected_paths
    }

    pub fn is_selected(&self, exact_path: &str) -> bool {
        self.state
            .selected_paths
            .iter()
            .any(|entry| entry.exact_path == exact_path)
    }

    pub fn current_path(&self) -> &str {
        &self.state.current_path
    }

    pub fn view<'a>(&'a self, path: &'a str) -> PathView<'a> {
        PathView {
            path,
            state: self.path_state(path),
            files: self.files(path),
            folders: self.folders(path),
            cursor: self.cursor(path),
            selected: self.selected(),
        }
    }

    pub fn current_view(&self) -> PathView<'_> {
        self.view(&self.state.current_path)
    }
}
