//! Feedview Resource Store
//!
//! An incremental, per-path cache for folder and file listings:
//!
//! ```text
//! ┌────────────┐  page   ┌───────────────┐ dispatch ┌──────────────────────┐
//! │  Listing   │───────► │  PathLoader   │────────► │    ResourceStore     │
//! │  Source    │         │ (fetch ticket)│          │ filesByPath   (append)│
//! └────────────┘         └───────────────┘          │ foldersByPath (replace)
//!                                                   │ paginationByPath      │
//!                                                   │ selectedPaths         │
//!                                                   └──────────┬───────────┘
//!                                                              │ view(path)
//!                                                              ▼
//!                                                     tree builders / render
//! ```
//!
//! ## Key Properties
//!
//! - **Append vs replace**: file pages accumulate per path; folder listings
//!   are always fetched whole and replace the previous listing.
//! - **Generation guard**: a response whose path was cleared or re-requested
//!   after the request began is dropped.
//! - **Never fails**: the reducer is a total function over trusted payloads.

pub mod action;
pub mod config;
pub mod loader;
pub mod shared;
pub mod store;
pub mod types;


pub use action::Action;
pub use config::{EmptyFilesPolicy, StoreConfig};
pub use loader::{FilePage, ListingSource, LoadOutcome, LoaderError, PathLoader, SourceError};
pub use shared::SharedStore;
pub use store::{FetchOutcome, FetchTicket, LibraryState, PathView, ResourceStore};
pub use types::{FetchKind, FolderDetails, HomePath, PageCursor, PathState};
