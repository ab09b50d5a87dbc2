use std::sync::Arc;

use parking_lot::RwLock;

use crate::action::Action;
use crate::config::StoreConfig;
use crate::store::{FetchOutcome, FetchTicket, LibraryState, ResourceStore};
use crate::types::FetchKind;

/// Clonable handle to one [`ResourceStore`], passed to every consumer that
/// reads or dispatches. Locks are held only for the duration of a call.
#[derive(Debug, Clone, Default)]
pub struct SharedStore {
    inner: Arc<RwLock<ResourceStore>>,
}

impl SharedStore {
    pub fn new(store: ResourceStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    pub fn with_config(config: StoreConfig) -> Self {
        Self::new(ResourceStore::new(config))
    }

    pub fn dispatch(&self, action: Action) {
        self.inner.write().dispatch(action);
    }

    pub fn begin_fetch(&self, path: impl Into<String>, kind: FetchKind) -> FetchTicket {
        self.inner.write().begin_fetch(path, kind)
    }

    pub fn complete_fetch(
        &self,
        ticket: FetchTicket,
        actions: impl IntoIterator<Item = Action>,
    ) -> FetchOutcome {
        self.inner.write().complete_fetch(ticket, actions)
    }

    pub fn abandon_fetch(&self, ticket: FetchTicket) {
        self.inner.write().abandon_fetch(ticket);
    }

    /// Run `f` against the store under a read lock.
    pub fn read<R>(&self, f: impl FnOnce(&ResourceStore) -> R) -> R {
        f(&self.inner.read())
    }

    pub fn snapshot(&self) -> LibraryState {
        self.inner.read().state().clone()
    }
}
