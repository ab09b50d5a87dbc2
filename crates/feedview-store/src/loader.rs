//! Drives paginated fetches into a [`SharedStore`].
//!
//! The network side lives behind [`ListingSource`]. Every request is
//! bracketed by a [`FetchTicket`](crate::FetchTicket), so a response that
//! arrives after its path was cleared or re-requested is dropped instead of
//! resurrecting old data.

use async_trait::async_trait;
use feedview_tree::{FileRecord, FolderRecord};

use crate::action::Action;
use crate::shared::SharedStore;
use crate::store::FetchOutcome;
use crate::types::{FetchKind, PageCursor, PathState};

/// One page of a file listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePage {
    pub files: Vec<FileRecord>,
    pub cursor: PageCursor,
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct SourceError {
    pub message: String,
}

impl SourceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    #[error("listing `{path}` failed: {source}")]
    Source {
        path: String,
        #[source]
        source: SourceError,
    },
}

/// The fetch collaborator.
#[async_trait]
pub trait ListingSource: Send + Sync {
    async fn list_files(&self, path: &str, offset: u64, limit: u64)
        -> Result<FilePage, SourceError>;

    async fn list_folders(&self, path: &str) -> Result<Vec<FolderRecord>, SourceError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    Stale,
    /// The cursor says there is nothing left to fetch.
    Exhausted,
}

impl From<FetchOutcome> for LoadOutcome {
    fn from(value: FetchOutcome) -> Self {
        match value {
            FetchOutcome::Applied => Self::Applied,
            FetchOutcome::Stale => Self::Stale,
        }
    }
}

pub struct PathLoader<S> {
    store: SharedStore,
    source: S,
    page_limit: u64,
}

impl<S: ListingSource> PathLoader<S> {
    pub fn new(store: SharedStore, source: S) -> Self {
        let page_limit = store.read(|s| s.config().default_page_limit);
        Self {
            store,
            source,
            page_limit,
        }
    }

    pub fn with_page_limit(mut self, limit: u64) -> Self {
        self.page_limit = limit.max(1);
        self
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch the page after the path's current cursor and append it.
    pub async fn load_next_page(&self, path: &str) -> Result<LoadOutcome, LoaderError> {
        let (cursor, cached) = self
            .store
            .read(|s| (s.cursor(path).copied(), s.files(path).len()));
        let offset = match cursor {
            Some(cursor) if !cursor.has_next => return Ok(LoadOutcome::Exhausted),
            // Accumulated files are a window from offset 0; an emptied listing
            // starts over instead of resuming mid-way.
            Some(cursor) if cached == 0 && cursor.offset > 0 => 0,
            Some(cursor) => cursor.next_offset(),
            None => 0,
        };

        let ticket = self.store.begin_fetch(path, FetchKind::Files);
        tracing::debug!(path, offset, limit = self.page_limit, "fetching file page");
        let page = match self.source.list_files(path, offset, self.page_limit).await {
            Ok(page) => page,
            Err(source) => {
                self.store.abandon_fetch(ticket);
                return Err(LoaderError::Source {
                    path: path.to_string(),
                    source,
                });
            }
        };

        // Cursor first, so accumulation clamps against this page's total.
        // An empty page carries no files and must not trigger the reset.
        let mut actions = vec![Action::SetPagination {
            path: path.to_string(),
            cursor: page.cursor,
        }];
        if !page.files.is_empty() {
            actions.push(Action::SetFiles {
                path: path.to_string(),
                files: page.files,
            });
        }
        Ok(self.store.complete_fetch(ticket, actions).into())
    }

    /// Fetch pages until the cursor reports no more.
    pub async fn load_all_files(&self, path: &str) -> Result<LoadOutcome, LoaderError> {
        let mut outcome = LoadOutcome::Exhausted;
        loop {
            match self.load_next_page(path).await? {
                LoadOutcome::Applied => {
                    outcome = LoadOutcome::Applied;
                    if self.store.read(|s| s.path_state(path)) == PathState::Complete {
                        return Ok(outcome);
                    }
                }
                LoadOutcome::Stale => return Ok(LoadOutcome::Stale),
                LoadOutcome::Exhausted => return Ok(outcome),
            }
        }
    }

    /// Fetch the full folder listing for `path`, replacing the cached one.
    pub async fn load_folders(&self, path: &str) -> Result<LoadOutcome, LoaderError> {
        let ticket = self.store.begin_fetch(path, FetchKind::Folders);
        tracing::debug!(path, "fetching folders");
        match self.source.list_folders(path).await {
            Ok(folders) => {
                let action = Action::SetFolders {
                    path: path.to_string(),
                    folders,
                };
                Ok(self.store.complete_fetch(ticket, [action]).into())
            }
            Err(source) => {
                self.store.abandon_fetch(ticket);
                Err(LoaderError::Source {
                    path: path.to_string(),
                    source,
                })
            }
        }
    }
}
