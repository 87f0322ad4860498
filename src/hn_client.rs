use std::future::Future;

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures_util::future::join_all;
use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::ApiConfig;
use crate::models::{Comment, Story, StoryId};

/// Read-only lookup of Hacker News items.
///
/// `Ok(None)` means the service answered `null` for the id (deleted or never
/// existed). Errors cover transport, status and decode failures alike.
#[async_trait]
pub trait ItemSource: Send + Sync {
    async fn top_story_ids(&self) -> Result<Vec<StoryId>>;
    async fn story(&self, id: StoryId) -> Result<Option<Story>>;
    async fn comment(&self, id: StoryId) -> Result<Option<Comment>>;
}

pub struct HackerNewsClient {
    client: Client,
    base_url: Url,
}

impl HackerNewsClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .context("building HTTP client")?;

        // `Url::join` drops the last path segment unless the base ends in '/'.
        let mut base = config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base).with_context(|| format!("invalid API base url {}", base))?;

        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("joining {} onto {}", path, self.base_url))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint(path)?;
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("GET {}", url))?
            .error_for_status()?;
        response
            .json::<T>()
            .await
            .with_context(|| format!("decoding {}", url))
    }

    async fn item<T: DeserializeOwned>(&self, id: StoryId) -> Result<Option<T>> {
        self.get_json(&format!("item/{}.json", id)).await
    }
}

#[async_trait]
impl ItemSource for HackerNewsClient {
    async fn top_story_ids(&self) -> Result<Vec<StoryId>> {
        let ids: Vec<StoryId> = self.get_json("topstories.json").await?;
        log::debug!("fetched {} top story ids", ids.len());
        Ok(ids)
    }

    async fn story(&self, id: StoryId) -> Result<Option<Story>> {
        self.item(id).await
    }

    async fn comment(&self, id: StoryId) -> Result<Option<Comment>> {
        self.item(id).await
    }
}

/// Runs `fetch` for every id concurrently and joins the results.
///
/// The output is index-aligned with `ids` no matter which request finishes
/// first. A failed fetch is logged and leaves `None` in its slot.
pub async fn fetch_many<T, F, Fut>(ids: &[StoryId], fetch: F) -> Vec<Option<T>>
where
    F: Fn(StoryId) -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let pending = ids.iter().map(|&id| {
        let request = fetch(id);
        async move {
            match request.await {
                Ok(item) => item,
                Err(err) => {
                    log::warn!("item {} failed to load: {:#}", id, err);
                    None
                }
            }
        }
    });
    join_all(pending).await
}
