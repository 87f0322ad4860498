//! Pagination state for the top-stories feed.
//!
//! The full id list is split into fixed chunks once, then chunks are mounted
//! one at a time as the reader scrolls. All transitions go through
//! [`FeedState::update`], which returns the side effects the caller has to
//! carry out (keeping the address bar in sync).

use std::collections::HashSet;

use crate::models::{StoryId, CHUNK_SIZE};

/// The ordered story ids, partitioned into consecutive chunks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkedIds {
    chunks: Vec<Vec<StoryId>>,
}

impl ChunkedIds {
    /// Splits `ids` into chunks of `size`, preserving order. Only the last
    /// chunk may be shorter.
    pub fn new(ids: &[StoryId], size: usize) -> Self {
        let size = size.max(1);
        Self {
            chunks: ids.chunks(size).map(<[StoryId]>::to_vec).collect(),
        }
    }

    pub fn get(&self, index: usize) -> Option<&[StoryId]> {
        self.chunks.get(index).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &[StoryId]> {
        self.chunks.iter().map(Vec::as_slice)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStatus {
    Loading,
    Ok,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedMsg {
    /// The top-story list arrived; `page` is the index requested by the location.
    IdsFetched { ids: Vec<StoryId>, page: usize },
    IdsFailed(String),
    /// The sentinel story scrolled into view.
    SentinelVisible,
    LoadPrevious,
}

/// How a story of a mounted chunk currently shows on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Pending,
    Drawn,
    /// Missing upstream, failed, deleted or dead; takes no space.
    Absent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedEffect {
    /// Reflect the current page in the location.
    SyncPage(usize),
}

#[derive(Debug, Clone)]
pub struct FeedState {
    status: FeedStatus,
    chunks: ChunkedIds,
    // Mount order; `rendered_set` mirrors it for membership tests.
    rendered: Vec<usize>,
    rendered_set: HashSet<usize>,
    current_page: Option<usize>,
    error: Option<String>,
}

impl Default for FeedState {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedState {
    pub fn new() -> Self {
        Self {
            status: FeedStatus::Loading,
            chunks: ChunkedIds::default(),
            rendered: Vec::new(),
            rendered_set: HashSet::new(),
            current_page: None,
            error: None,
        }
    }

    pub fn update(&mut self, msg: FeedMsg) -> Vec<FeedEffect> {
        match msg {
            FeedMsg::IdsFetched { ids, page } => {
                self.chunks = ChunkedIds::new(&ids, CHUNK_SIZE);
                log::info!(
                    "feed holds {} stories in {} chunks, starting at page {}",
                    ids.len(),
                    self.chunks.len(),
                    page
                );
                self.go_to(page)
            }
            FeedMsg::IdsFailed(reason) => {
                log::error!("top stories failed to load: {}", reason);
                self.status = FeedStatus::Error;
                self.error = Some(reason);
                Vec::new()
            }
            // No upper bound; a page past the end renders nothing.
            FeedMsg::SentinelVisible => match self.current_page.and_then(|page| page.checked_add(1)) {
                Some(next) => self.go_to(next),
                None => Vec::new(),
            },
            FeedMsg::LoadPrevious => match self.current_page {
                Some(page) if page > 0 => {
                    let previous = page - 1;
                    self.mark_rendered(previous);
                    self.go_to(previous)
                }
                _ => Vec::new(),
            },
        }
    }

    /// Moves the page pointer; a change of page renders that chunk.
    fn go_to(&mut self, page: usize) -> Vec<FeedEffect> {
        if self.current_page == Some(page) {
            return Vec::new();
        }
        self.current_page = Some(page);
        self.render(page)
    }

    fn render(&mut self, page: usize) -> Vec<FeedEffect> {
        self.mark_rendered(page);
        self.status = FeedStatus::Ok;
        vec![FeedEffect::SyncPage(page)]
    }

    fn mark_rendered(&mut self, page: usize) {
        if self.rendered_set.insert(page) {
            self.rendered.push(page);
        }
    }

    pub fn status(&self) -> FeedStatus {
        self.status
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn current_page(&self) -> Option<usize> {
        self.current_page
    }

    /// Chunk indices in the order they were mounted.
    pub fn rendered(&self) -> &[usize] {
        &self.rendered
    }

    pub fn is_rendered(&self, page: usize) -> bool {
        self.rendered_set.contains(&page)
    }

    /// Whether the chunk before the current page exists.
    pub fn has_previous(&self) -> bool {
        match self.current_page {
            Some(page) if page > 0 => self.chunks.get(page - 1).is_some(),
            _ => false,
        }
    }

    /// Rendered chunks in mount order. Indices past the end yield empty slices.
    pub fn visible_chunks(&self) -> impl Iterator<Item = (usize, &[StoryId])> {
        self.rendered
            .iter()
            .map(|&index| (index, self.chunks.get(index).unwrap_or(&[])))
    }

    /// The last drawn story of the most recently mounted chunk.
    ///
    /// There is none while any story of that chunk is still pending, or when
    /// the chunk lies past the end of the list. A chunk whose stories are all
    /// absent hands the role to the last drawn story of an earlier chunk.
    pub fn sentinel(&self, presence: impl Fn(StoryId) -> Presence) -> Option<StoryId> {
        let newest = self.chunks.get(*self.rendered.last()?)?;
        if newest.iter().any(|&id| presence(id) == Presence::Pending) {
            return None;
        }
        self.rendered
            .iter()
            .rev()
            .filter_map(|&index| self.chunks.get(index))
            .flat_map(|chunk| chunk.iter().rev())
            .copied()
            .find(|&id| presence(id) == Presence::Drawn)
    }
}

/// Fires once each time the sentinel enters the viewport.
///
/// Moving the sentinel to a different story re-arms the trigger, so a new
/// sentinel that is already on screen fires immediately.
#[derive(Debug, Default)]
pub struct SentinelTrigger {
    watched: Option<StoryId>,
    was_visible: bool,
}

impl SentinelTrigger {
    pub fn observe(&mut self, sentinel: Option<StoryId>, visible: bool) -> bool {
        if sentinel != self.watched {
            self.watched = sentinel;
            self.was_visible = false;
        }
        if sentinel.is_none() {
            return false;
        }
        let entered = visible && !self.was_visible;
        self.was_visible = visible;
        entered
    }
}
