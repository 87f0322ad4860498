use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use hn_feed_reader::hn_client::ItemSource;
use hn_feed_reader::loader::{LoadEvent, Loaded, Loader, Notify};
use hn_feed_reader::models::{Comment, Story, StoryId};
use pretty_assertions::assert_eq;
use serde_json::json;
use tokio::runtime::Handle;

const FAILING_ID: StoryId = 500;
const MISSING_ID: StoryId = 404;

/// Answers every id after an id-dependent delay.
struct FakeSource {
    delays: Vec<(StoryId, Duration)>,
}

impl FakeSource {
    fn new() -> Self {
        Self { delays: Vec::new() }
    }

    fn with_delay(mut self, id: StoryId, millis: u64) -> Self {
        self.delays.push((id, Duration::from_millis(millis)));
        self
    }

    async fn pause(&self, id: StoryId) {
        if let Some((_, delay)) = self.delays.iter().find(|(delayed, _)| *delayed == id) {
            tokio::time::sleep(*delay).await;
        }
    }
}

fn story(id: StoryId) -> Story {
    serde_json::from_value(json!({
        "id": id,
        "by": "tester",
        "title": format!("story {}", id),
        "kids": [id * 10, id * 10 + 1],
    }))
    .unwrap()
}

#[async_trait]
impl ItemSource for FakeSource {
    async fn top_story_ids(&self) -> Result<Vec<StoryId>> {
        self.pause(0).await;
        Ok((1..=25).collect())
    }

    async fn story(&self, id: StoryId) -> Result<Option<Story>> {
        self.pause(id).await;
        match id {
            FAILING_ID => Err(anyhow!("connection reset")),
            MISSING_ID => Ok(None),
            _ => Ok(Some(story(id))),
        }
    }

    async fn comment(&self, id: StoryId) -> Result<Option<Comment>> {
        self.pause(id).await;
        Ok(Some(
            serde_json::from_value(json!({"id": id, "by": "commenter", "text": "hello"})).unwrap(),
        ))
    }
}

fn loader_with(source: FakeSource) -> (Loader, Arc<AtomicUsize>) {
    let repaints = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&repaints);
    let notify: Notify = Arc::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    let loader = Loader::new(Handle::current(), Arc::new(source), notify);
    (loader, repaints)
}

async fn collect(loader: &Loader, expected: usize) -> Vec<LoadEvent> {
    let mut events = Vec::new();
    for _ in 0..300 {
        events.extend(loader.drain());
        if events.len() >= expected {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    events
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn top_stories_arrive_tagged_with_the_current_scope() {
    let (mut loader, repaints) = loader_with(FakeSource::new());
    let scope = loader.mount();

    loader.fetch_top_stories();
    let events = collect(&loader, 1).await;

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].scope, scope);
    assert_eq!(events[0].loaded, Loaded::TopStories(Ok((1..=25).collect())));
    assert_eq!(repaints.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn remounting_abandons_outstanding_requests() {
    let (mut loader, repaints) = loader_with(FakeSource::new().with_delay(1, 100));
    loader.mount();
    loader.fetch_story(1);

    let scope = loader.mount();
    loader.fetch_story(2);

    let events = collect(&loader, 1).await;
    // Give the abandoned request time to finish had it not been cancelled.
    tokio::time::sleep(Duration::from_millis(200)).await;
    let late = loader.drain();

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].scope, scope);
    assert_eq!(
        events[0].loaded,
        Loaded::Story {
            id: 2,
            story: Some(story(2))
        }
    );
    assert!(late.is_empty());
    assert_eq!(repaints.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn failed_and_missing_stories_both_arrive_empty() {
    let (mut loader, _) = loader_with(FakeSource::new());
    loader.mount();

    loader.fetch_story(FAILING_ID);
    loader.fetch_story(MISSING_ID);
    let mut events = collect(&loader, 2).await;
    events.sort_by_key(|event| match &event.loaded {
        Loaded::Story { id, .. } => *id,
        _ => 0,
    });

    let loaded: Vec<Loaded> = events.into_iter().map(|event| event.loaded).collect();
    assert_eq!(
        loaded,
        vec![
            Loaded::Story {
                id: MISSING_ID,
                story: None
            },
            Loaded::Story {
                id: FAILING_ID,
                story: None
            },
        ]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn bookmarked_stories_keep_bookmark_order() {
    let source = FakeSource::new()
        .with_delay(5, 120)
        .with_delay(3, 60);
    let (mut loader, _) = loader_with(source);
    loader.mount();

    loader.fetch_bookmarked(vec![5, 3, 9, MISSING_ID]);
    let events = collect(&loader, 1).await;

    assert_eq!(events.len(), 1);
    assert_eq!(
        events[0].loaded,
        Loaded::Bookmarked(vec![Some(story(5)), Some(story(3)), Some(story(9)), None])
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn comments_are_loaded_for_the_given_story() {
    let (mut loader, _) = loader_with(FakeSource::new().with_delay(70, 50));
    loader.mount();

    loader.fetch_comments(7, vec![70, 71]);
    let events = collect(&loader, 1).await;

    assert_eq!(events.len(), 1);
    match &events[0].loaded {
        Loaded::Comments { story_id, thread } => {
            assert_eq!(*story_id, 7);
            let ids: Vec<StoryId> = thread.visible().map(|c| c.id).collect();
            assert_eq!(ids, vec![70, 71]);
        }
        other => panic!("unexpected event {:?}", other),
    }
}
