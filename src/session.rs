//! Everything behind the window that is not drawing: the mounted view, the
//! navigation history and the loader results that feed them.

use std::collections::{HashMap, HashSet};

use crate::comments::CommentThread;
use crate::db::Bookmarks;
use crate::feed::{FeedEffect, FeedMsg, FeedState, Presence, SentinelTrigger};
use crate::loader::{Loaded, Loader, ScopeId};
use crate::location::{History, Location, Route};
use crate::models::{Story, StoryId};

pub enum StorySlot {
    Loading,
    Missing,
    Loaded {
        story: Story,
        comments: Option<CommentThread>,
    },
}

pub struct FeedView {
    state: FeedState,
    // Page requested by the location at mount time.
    start_page: usize,
    stories: HashMap<StoryId, StorySlot>,
    trigger: SentinelTrigger,
}

impl FeedView {
    fn new(start_page: usize) -> Self {
        Self {
            state: FeedState::new(),
            start_page,
            stories: HashMap::new(),
            trigger: SentinelTrigger::default(),
        }
    }

    pub fn state(&self) -> &FeedState {
        &self.state
    }

    pub fn slot(&self, id: StoryId) -> Option<&StorySlot> {
        self.stories.get(&id)
    }

    pub fn presence(&self, id: StoryId) -> Presence {
        match self.stories.get(&id) {
            Some(StorySlot::Loaded { .. }) => Presence::Drawn,
            Some(StorySlot::Missing) => Presence::Absent,
            Some(StorySlot::Loading) | None => Presence::Pending,
        }
    }

    pub fn sentinel(&self) -> Option<StoryId> {
        self.state.sentinel(|id| self.presence(id))
    }
}

#[derive(Default)]
pub struct BookmarksView {
    stories: Option<Vec<Option<Story>>>,
    comments: HashMap<StoryId, CommentThread>,
}

impl BookmarksView {
    /// `None` until the bookmarked stories have arrived.
    pub fn stories(&self) -> Option<&[Option<Story>]> {
        self.stories.as_deref()
    }

    pub fn comments(&self, story_id: StoryId) -> Option<&CommentThread> {
        self.comments.get(&story_id)
    }
}

pub enum View {
    Feed(FeedView),
    Bookmarks(BookmarksView),
}

pub struct Session {
    loader: Loader,
    bookmarks: Bookmarks,
    history: History,
    view: View,
    address: String,
    status_line: Option<String>,
}

impl Session {
    pub fn new(loader: Loader, bookmarks: Bookmarks, start: Location) -> Self {
        let mut session = Self {
            loader,
            bookmarks,
            history: History::new(start),
            view: View::Feed(FeedView::new(0)),
            address: String::new(),
            status_line: None,
        };
        session.mount();
        session
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn scope(&self) -> ScopeId {
        self.loader.scope()
    }

    /// The address bar text; edits are applied by [`Session::navigate`].
    pub fn address_mut(&mut self) -> &mut String {
        &mut self.address
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn status_line(&self) -> Option<&str> {
        self.status_line.as_deref()
    }

    /// Builds the view for the current location in a fresh loader scope.
    pub fn mount(&mut self) {
        self.loader.mount();
        let location = self.history.current().clone();
        self.address = location.to_string();

        self.view = match location.route {
            Route::Feed => {
                self.loader.fetch_top_stories();
                View::Feed(FeedView::new(location.page_index()))
            }
            Route::Bookmarks => {
                let ids = self.bookmarks.list_bookmarks().unwrap_or_else(|err| {
                    log::error!("could not read bookmarks: {:#}", err);
                    Vec::new()
                });
                self.loader.fetch_bookmarked(ids);
                View::Bookmarks(BookmarksView::default())
            }
        };
    }

    pub fn navigate(&mut self, location: Location) {
        log::debug!("navigating to {}", location);
        self.history.push(location);
        self.mount();
    }

    pub fn back(&mut self) {
        if self.history.back().is_some() {
            self.mount();
        }
    }

    pub fn retry(&mut self) {
        log::info!("retrying {}", self.history.current());
        self.mount();
    }

    pub fn load_previous(&mut self) {
        self.dispatch_feed(FeedMsg::LoadPrevious);
    }

    /// Reports where the sentinel stood in the last frame.
    pub fn sentinel_seen(&mut self, sentinel: Option<StoryId>, visible: bool) {
        let entered = match &mut self.view {
            View::Feed(feed) => feed.trigger.observe(sentinel, visible),
            View::Bookmarks(_) => false,
        };
        if entered {
            log::debug!("sentinel {:?} entered the viewport", sentinel);
            self.dispatch_feed(FeedMsg::SentinelVisible);
        }
    }

    pub fn bookmark(&mut self, id: StoryId) {
        self.status_line = Some(match self.bookmarks.add_bookmark(id) {
            Ok(ids) => format!("Bookmarked story {} ({} saved)", id, ids.len()),
            Err(err) => {
                log::error!("could not bookmark story {}: {:#}", id, err);
                format!("Could not save bookmark: {}", err)
            }
        });
    }

    fn dispatch_feed(&mut self, msg: FeedMsg) {
        let View::Feed(feed) = &mut self.view else {
            return;
        };
        // The first sync only spells out the page the view was mounted at.
        let settles_mount = matches!(msg, FeedMsg::IdsFetched { .. });

        for effect in feed.state.update(msg) {
            match effect {
                FeedEffect::SyncPage(page) => {
                    let location = Location::feed(page);
                    if settles_mount {
                        self.history.replace(location);
                    } else {
                        self.history.push(location);
                    }
                    self.address = self.history.current().to_string();
                }
            }
        }

        // Stories of newly mounted chunks are fetched on first sight.
        let unseen: Vec<StoryId> = feed
            .state
            .visible_chunks()
            .flat_map(|(_, ids)| ids.iter().copied())
            .filter(|id| !feed.stories.contains_key(id))
            .collect();
        for id in unseen {
            feed.stories.insert(id, StorySlot::Loading);
            self.loader.fetch_story(id);
        }
    }

    /// Applies every loader result that arrived since the last frame.
    pub fn process_events(&mut self) {
        for event in self.loader.drain() {
            match event.loaded {
                Loaded::TopStories(Ok(ids)) => {
                    if let View::Feed(feed) = &self.view {
                        let page = feed.start_page;
                        self.dispatch_feed(FeedMsg::IdsFetched { ids, page });
                    }
                }
                Loaded::TopStories(Err(reason)) => self.dispatch_feed(FeedMsg::IdsFailed(reason)),
                Loaded::Story { id, story } => self.apply_story(id, story),
                Loaded::Comments { story_id, thread } => match &mut self.view {
                    View::Feed(feed) => {
                        if let Some(StorySlot::Loaded { comments, .. }) = feed.stories.get_mut(&story_id) {
                            *comments = Some(thread);
                        }
                    }
                    View::Bookmarks(view) => {
                        view.comments.insert(story_id, thread);
                    }
                },
                Loaded::Bookmarked(stories) => {
                    if let View::Bookmarks(view) = &mut self.view {
                        let mut requested = HashSet::new();
                        for story in stories.iter().flatten() {
                            if requested.insert(story.id) {
                                self.loader.fetch_comments(story.id, story.kids.clone());
                            }
                        }
                        view.stories = Some(stories);
                    }
                }
            }
        }
    }

    fn apply_story(&mut self, id: StoryId, story: Option<Story>) {
        let View::Feed(feed) = &mut self.view else {
            return;
        };
        let Some(slot) = feed.stories.get_mut(&id) else {
            return;
        };
        *slot = match story {
            Some(story) if !story.deleted && !story.dead => {
                self.loader.fetch_comments(id, story.kids.clone());
                StorySlot::Loaded {
                    story,
                    comments: None,
                }
            }
            _ => StorySlot::Missing,
        };
    }
}
