//! Loader tests: pagination and out-of-order fetch completion.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use feedview_store::{
    Action, FilePage, ListingSource, LoadOutcome, LoaderError, PageCursor, PathLoader, PathState,
    SharedStore, SourceError, StoreConfig,
};
use feedview_tree::{FileRecord, FolderRecord};
use tokio::sync::{mpsc, oneshot};

type Reply<T> = oneshot::Sender<Result<T, SourceError>>;

/// Serves a fixed file list per path, page by page.
struct StaticSource {
    files: Vec<FileRecord>,
    folders: Vec<FolderRecord>,
}

#[async_trait]
impl ListingSource for StaticSource {
    async fn list_files(
        &self,
        _path: &str,
        offset: u64,
        limit: u64,
    ) -> Result<FilePage, SourceError> {
        let total = self.files.len() as u64;
        let files = self
            .files
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect();
        Ok(FilePage {
            files,
            cursor: PageCursor::new(offset, limit, total),
        })
    }

    async fn list_folders(&self, _path: &str) -> Result<Vec<FolderRecord>, SourceError> {
        Ok(self.folders.clone())
    }
}

/// Holds every request open until the test sends its reply, so completion
/// order is under test control.
struct ScriptedSource {
    started: mpsc::UnboundedSender<String>,
    file_replies: Mutex<VecDeque<oneshot::Receiver<Result<FilePage, SourceError>>>>,
    folder_replies: Mutex<VecDeque<oneshot::Receiver<Result<Vec<FolderRecord>, SourceError>>>>,
}

impl ScriptedSource {
    fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (started, started_rx) = mpsc::unbounded_channel();
        let source = Self {
            started,
            file_replies: Mutex::new(VecDeque::new()),
            folder_replies: Mutex::new(VecDeque::new()),
        };
        (source, started_rx)
    }

    fn expect_files_call(&self) -> Reply<FilePage> {
        let (tx, rx) = oneshot::channel();
        self.file_replies.lock().unwrap().push_back(rx);
        tx
    }

    fn expect_folders_call(&self) -> Reply<Vec<FolderRecord>> {
        let (tx, rx) = oneshot::channel();
        self.folder_replies.lock().unwrap().push_back(rx);
        tx
    }
}

#[async_trait]
impl ListingSource for ScriptedSource {
    async fn list_files(
        &self,
        path: &str,
        _offset: u64,
        _limit: u64,
    ) -> Result<FilePage, SourceError> {
        let reply = self
            .file_replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected list_files call");
        self.started.send(path.to_string()).unwrap();
        reply
            .await
            .unwrap_or_else(|_| Err(SourceError::new("reply dropped")))
    }

    async fn list_folders(&self, path: &str) -> Result<Vec<FolderRecord>, SourceError> {
        let reply = self
            .folder_replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected list_folders call");
        self.started.send(format!("{path}#folders")).unwrap();
        reply
            .await
            .unwrap_or_else(|_| Err(SourceError::new("reply dropped")))
    }
}

fn files(paths: &[&str]) -> Vec<FileRecord> {
    paths
        .iter()
        .enumerate()
        .map(|(i, p)| FileRecord::new(*p, i as u64))
        .collect()
}

fn single_page(paths: &[&str]) -> FilePage {
    let total = paths.len() as u64;
    FilePage {
        files: files(paths),
        cursor: PageCursor::new(0, total.max(1), total),
    }
}

fn scripted_loader() -> (
    Arc<PathLoader<ScriptedSource>>,
    mpsc::UnboundedReceiver<String>,
) {
    let (source, started) = ScriptedSource::new();
    let loader = PathLoader::new(SharedStore::default(), source);
    (Arc::new(loader), started)
}

#[tokio::test]
async fn load_all_files_accumulates_every_page() {
    let source = StaticSource {
        files: files(&["p/1", "p/2", "p/3", "p/4", "p/5", "p/6", "p/7"]),
        folders: vec![],
    };
    let loader = PathLoader::new(SharedStore::default(), source).with_page_limit(3);

    let outcome = loader.load_all_files("p").await.unwrap();
    assert_eq!(outcome, LoadOutcome::Applied);

    let store = loader.store();
    assert_eq!(store.read(|s| s.files("p").len()), 7);
    assert_eq!(store.read(|s| s.path_state("p")), PathState::Complete);
    assert_eq!(
        store.read(|s| s.cursor("p").copied()),
        Some(PageCursor::new(6, 3, 7))
    );

    let again = loader.load_next_page("p").await.unwrap();
    assert_eq!(again, LoadOutcome::Exhausted);
}

#[tokio::test]
async fn empty_listing_completes_without_reset() {
    let store = SharedStore::default();
    store.dispatch(Action::SetFiles {
        path: "other".to_string(),
        files: files(&["other/keep"]),
    });
    let source = StaticSource {
        files: vec![],
        folders: vec![],
    };
    let loader = PathLoader::new(store.clone(), source);

    loader.load_all_files("empty").await.unwrap();
    assert_eq!(store.read(|s| s.path_state("empty")), PathState::Complete);
    assert_eq!(store.read(|s| s.files("other").len()), 1);
}

#[tokio::test]
async fn page_limit_comes_from_store_config() {
    let store = SharedStore::with_config(StoreConfig {
        default_page_limit: 2,
        ..StoreConfig::default()
    });
    let source = StaticSource {
        files: files(&["p/1", "p/2", "p/3"]),
        folders: vec![],
    };
    let loader = PathLoader::new(store.clone(), source);

    loader.load_next_page("p").await.unwrap();
    assert_eq!(store.read(|s| s.files("p").len()), 2);
    assert_eq!(store.read(|s| s.path_state("p")), PathState::Partial);
}

#[tokio::test]
async fn load_folders_replaces_listing() {
    let store = SharedStore::default();
    store.dispatch(Action::SetFolders {
        path: "root".to_string(),
        folders: vec![FolderRecord::new("root/old", "old")],
    });
    let source = StaticSource {
        files: vec![],
        folders: vec![FolderRecord::new("root/new", "new")],
    };
    let loader = PathLoader::new(store.clone(), source);

    assert_eq!(
        loader.load_folders("root").await.unwrap(),
        LoadOutcome::Applied
    );
    assert_eq!(
        store.read(|s| s.folders("root").to_vec()),
        vec![FolderRecord::new("root/new", "new")]
    );
}

#[tokio::test]
async fn cleared_path_drops_late_page() {
    let (loader, mut started) = scripted_loader();
    let reply = loader_source_reply(&loader);

    let task = tokio::spawn({
        let loader = loader.clone();
        async move { loader.load_next_page("a").await }
    });
    assert_eq!(started.recv().await.as_deref(), Some("a"));

    loader.store().dispatch(Action::ClearFilesState {
        path: "a".to_string(),
    });
    reply.send(Ok(single_page(&["a/stale"]))).unwrap();

    let outcome = task.await.unwrap().unwrap();
    assert_eq!(outcome, LoadOutcome::Stale);
    assert!(loader.store().read(|s| s.files("a").is_empty()));
    assert_eq!(
        loader.store().read(|s| s.path_state("a")),
        PathState::Unfetched
    );
}

#[tokio::test]
async fn different_paths_complete_in_any_order() {
    let (loader, mut started) = scripted_loader();
    let reply_a = loader_source_reply(&loader);
    let reply_b = loader_source_reply(&loader);

    let task_a = tokio::spawn({
        let loader = loader.clone();
        async move { loader.load_next_page("a").await }
    });
    assert_eq!(started.recv().await.as_deref(), Some("a"));
    let task_b = tokio::spawn({
        let loader = loader.clone();
        async move { loader.load_next_page("b").await }
    });
    assert_eq!(started.recv().await.as_deref(), Some("b"));

    loader.store().dispatch(Action::SetCurrentPath {
        path: "b".to_string(),
    });
    reply_b.send(Ok(single_page(&["b/1"]))).unwrap();
    assert_eq!(task_b.await.unwrap().unwrap(), LoadOutcome::Applied);
    reply_a.send(Ok(single_page(&["a/1", "a/2"]))).unwrap();
    assert_eq!(task_a.await.unwrap().unwrap(), LoadOutcome::Applied);

    let store = loader.store();
    assert_eq!(store.read(|s| s.files("a").len()), 2);
    assert_eq!(store.read(|s| s.files("b").len()), 1);
    assert_eq!(store.read(|s| s.current_view().files.len()), 1);
}

#[tokio::test]
async fn newer_request_for_same_path_wins() {
    let (loader, mut started) = scripted_loader();
    let reply_old = loader_source_reply(&loader);
    let reply_new = loader_source_reply(&loader);

    let old = tokio::spawn({
        let loader = loader.clone();
        async move { loader.load_next_page("p").await }
    });
    assert_eq!(started.recv().await.as_deref(), Some("p"));
    let new = tokio::spawn({
        let loader = loader.clone();
        async move { loader.load_next_page("p").await }
    });
    assert_eq!(started.recv().await.as_deref(), Some("p"));

    reply_new.send(Ok(single_page(&["p/new"]))).unwrap();
    assert_eq!(new.await.unwrap().unwrap(), LoadOutcome::Applied);
    reply_old.send(Ok(single_page(&["p/old"]))).unwrap();
    assert_eq!(old.await.unwrap().unwrap(), LoadOutcome::Stale);

    let cached = loader.store().read(|s| {
        s.files("p")
            .iter()
            .map(|f| f.full_path.clone())
            .collect::<Vec<_>>()
    });
    assert_eq!(cached, vec!["p/new".to_string()]);
}

#[tokio::test]
async fn source_failure_abandons_the_fetch() {
    let (loader, mut started) = scripted_loader();
    let reply = loader_source_reply(&loader);

    let task = tokio::spawn({
        let loader = loader.clone();
        async move { loader.load_next_page("p").await }
    });
    assert_eq!(started.recv().await.as_deref(), Some("p"));
    assert_eq!(
        loader.store().read(|s| s.path_state("p")),
        PathState::Loading
    );

    reply.send(Err(SourceError::new("503"))).unwrap();
    let err = task.await.unwrap().unwrap_err();
    assert!(matches!(&err, LoaderError::Source { path, .. } if path == "p"));
    assert!(err.to_string().contains("503"));
    assert_eq!(
        loader.store().read(|s| s.path_state("p")),
        PathState::Unfetched
    );
}

fn loader_source_reply(loader: &PathLoader<ScriptedSource>) -> Reply<FilePage> {
    loader.source().expect_files_call()
}

#[tokio::test]
async fn file_and_folder_listings_for_one_path_both_land() {
    let (loader, mut started) = scripted_loader();
    let files_reply = loader_source_reply(&loader);
    let folders_reply = loader.source().expect_folders_call();

    let files_task = tokio::spawn({
        let loader = loader.clone();
        async move { loader.load_next_page("p").await }
    });
    assert_eq!(started.recv().await.as_deref(), Some("p"));
    let folders_task = tokio::spawn({
        let loader = loader.clone();
        async move { loader.load_folders("p").await }
    });
    assert_eq!(started.recv().await.as_deref(), Some("p#folders"));

    folders_reply
        .send(Ok(vec![FolderRecord::new("p/d", "d")]))
        .unwrap();
    assert_eq!(folders_task.await.unwrap().unwrap(), LoadOutcome::Applied);
    files_reply.send(Ok(single_page(&["p/1"]))).unwrap();
    assert_eq!(files_task.await.unwrap().unwrap(), LoadOutcome::Applied);

    let store = loader.store();
    assert_eq!(store.read(|s| s.files("p").len()), 1);
    assert_eq!(store.read(|s| s.folders("p").len()), 1);
    assert_eq!(store.read(|s| s.path_state("p")), PathState::Complete);
}

#[tokio::test]
async fn reset_mid_listing_refetches_from_the_start() {
    let source = StaticSource {
        files: files(&["p/0", "p/1", "p/2", "p/3", "p/4"]),
        folders: vec![],
    };
    let loader = PathLoader::new(SharedStore::default(), source).with_page_limit(2);

    loader.load_next_page("p").await.unwrap();
    loader.store().dispatch(Action::SetFiles {
        path: "x".to_string(),
        files: vec![],
    });
    assert_eq!(loader.load_all_files("p").await.unwrap(), LoadOutcome::Applied);

    let cached = loader.store().read(|s| {
        s.files("p")
            .iter()
            .map(|f| f.full_path.clone())
            .collect::<Vec<_>>()
    });
    assert_eq!(cached, vec!["p/0", "p/1", "p/2", "p/3", "p/4"]);
    assert_eq!(
        loader.store().read(|s| s.path_state("p")),
        PathState::Complete
    );
}

#[tokio::test]
async fn emptied_listing_with_stale_cursor_restarts_at_zero() {
    let store = SharedStore::default();
    store.dispatch(Action::SetPagination {
        path: "p".to_string(),
        cursor: PageCursor::new(2, 2, 5),
    });
    let source = StaticSource {
        files: files(&["p/0", "p/1", "p/2", "p/3", "p/4"]),
        folders: vec![],
    };
    let loader = PathLoader::new(store.clone(), source).with_page_limit(2);

    loader.load_next_page("p").await.unwrap();
    assert_eq!(
        store.read(|s| s.files("p").first().map(|f| f.full_path.clone())),
        Some("p/0".to_string())
    );
}
