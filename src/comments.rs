use crate::hn_client::{fetch_many, ItemSource};
use crate::models::{Comment, StoryId};

/// The top-level comments of one story, in the order the story lists them.
///
/// Missing items stay in the sequence as `None`; they are only skipped when
/// rendering. Replies are not followed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommentThread {
    entries: Vec<Option<Comment>>,
}

impl CommentThread {
    pub fn new(entries: Vec<Option<Comment>>) -> Self {
        Self { entries }
    }

    pub async fn load(source: &dyn ItemSource, ids: &[StoryId]) -> Self {
        let entries = fetch_many(ids, |id| source.comment(id)).await;
        Self { entries }
    }

    pub fn entries(&self) -> &[Option<Comment>] {
        &self.entries
    }

    pub fn visible(&self) -> impl Iterator<Item = &Comment> {
        self.entries
            .iter()
            .flatten()
            .filter(|comment| comment.is_visible())
    }

    pub fn is_empty(&self) -> bool {
        self.visible().next().is_none()
    }
}
