//! Feedview tree builders
//!
//! Turns the flat listings a pipeline backend hands out into navigable trees:
//!
//! ```text
//! ┌──────────────────────┐               ┌────────────────────────┐
//! │ [StageRecord]        │──instance───► │ StageNode (one root)   │
//! │ id / previousId      │   tree        │  children by id asc    │
//! └──────────────────────┘               └────────────────────────┘
//!
//! ┌──────────────────────┐               ┌────────────────────────┐
//! │ [FileRecord]         │──path───────► │ PathNode (one root)    │
//! │ "a/b/c.txt"          │   tree        │  dirs synthesized      │
//! └──────────────────────┘               └────────────────────────┘
//! ```
//!
//! Both builders are pure: they never mutate their input, and calling them
//! twice on the same snapshot yields structurally identical trees. Trees are
//! meant to be rebuilt whenever the snapshot changes, not patched in place.

pub mod error;
pub mod instance_tree;
pub mod path_tree;
pub mod records;


pub use error::{PathIssue, TreeError};
pub use instance_tree::{build_instance_tree, StageNode};
pub use path_tree::{build_path_tree, PathNode, PathTreeBuilder, RootPolicy};
pub use records::{FileHandle, FileRecord, FileSelect, FolderRecord, StageId, StageRecord, StageStatus};
