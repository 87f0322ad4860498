//! Background fetching for the views.
//!
//! Work runs on a tokio runtime and reports back over a channel that the UI
//! thread drains once per frame. Every request belongs to the scope (view
//! mount) that issued it; mounting a new view cancels the old scope's tasks
//! and any of its results still in flight are dropped in [`Loader::drain`].

use std::future::Future;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

use crate::comments::CommentThread;
use crate::hn_client::{fetch_many, ItemSource};
use crate::models::{Story, StoryId};

pub type ScopeId = u64;

/// Called after each result is queued so the UI can repaint.
pub type Notify = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug, Clone, PartialEq)]
pub enum Loaded {
    TopStories(Result<Vec<StoryId>, String>),
    /// `None` when the item is missing upstream or failed to load.
    Story { id: StoryId, story: Option<Story> },
    Comments { story_id: StoryId, thread: CommentThread },
    Bookmarked(Vec<Option<Story>>),
}

#[derive(Debug)]
pub struct LoadEvent {
    pub scope: ScopeId,
    pub loaded: Loaded,
}

struct Scope {
    id: ScopeId,
    token: CancellationToken,
}

pub struct Loader {
    runtime: Handle,
    source: Arc<dyn ItemSource>,
    notify: Notify,
    tx: Sender<LoadEvent>,
    rx: Receiver<LoadEvent>,
    scope: Scope,
}

impl Loader {
    pub fn new(runtime: Handle, source: Arc<dyn ItemSource>, notify: Notify) -> Self {
        let (tx, rx) = channel();
        Self {
            runtime,
            source,
            notify,
            tx,
            rx,
            scope: Scope {
                id: 0,
                token: CancellationToken::new(),
            },
        }
    }

    /// Starts a new scope, abandoning everything the previous one requested.
    pub fn mount(&mut self) -> ScopeId {
        self.scope.token.cancel();
        self.scope = Scope {
            id: self.scope.id + 1,
            token: CancellationToken::new(),
        };
        log::debug!("mounted scope {}", self.scope.id);
        self.scope.id
    }

    pub fn scope(&self) -> ScopeId {
        self.scope.id
    }

    /// Results that arrived since the last call, minus those of stale scopes.
    pub fn drain(&self) -> Vec<LoadEvent> {
        let current = self.scope.id;
        self.rx
            .try_iter()
            .filter(|event| {
                let fresh = event.scope == current;
                if !fresh {
                    log::debug!("dropping result of abandoned scope {}", event.scope);
                }
                fresh
            })
            .collect()
    }

    pub fn fetch_top_stories(&self) {
        let source = Arc::clone(&self.source);
        self.spawn(async move {
            let ids = source
                .top_story_ids()
                .await
                .map_err(|err| format!("{:#}", err));
            Loaded::TopStories(ids)
        });
    }

    pub fn fetch_story(&self, id: StoryId) {
        let source = Arc::clone(&self.source);
        self.spawn(async move {
            let story = match source.story(id).await {
                Ok(story) => story,
                Err(err) => {
                    log::warn!("story {} failed to load: {:#}", id, err);
                    None
                }
            };
            Loaded::Story { id, story }
        });
    }

    pub fn fetch_comments(&self, story_id: StoryId, ids: Vec<StoryId>) {
        let source = Arc::clone(&self.source);
        self.spawn(async move {
            let thread = CommentThread::load(source.as_ref(), &ids).await;
            Loaded::Comments { story_id, thread }
        });
    }

    /// Fetches every bookmarked story at once; results keep the input order.
    pub fn fetch_bookmarked(&self, ids: Vec<StoryId>) {
        let source = Arc::clone(&self.source);
        self.spawn(async move {
            let stories = fetch_many(&ids, |id| source.story(id)).await;
            Loaded::Bookmarked(stories)
        });
    }

    fn spawn<F>(&self, work: F)
    where
        F: Future<Output = Loaded> + Send + 'static,
    {
        let scope = self.scope.id;
        let token = self.scope.token.clone();
        let tx = self.tx.clone();
        let notify = Arc::clone(&self.notify);

        self.runtime.spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    log::debug!("scope {} cancelled before its request finished", scope);
                }
                loaded = work => {
                    if tx.send(LoadEvent { scope, loaded }).is_ok() {
                        notify();
                    }
                }
            }
        });
    }
}
