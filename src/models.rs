use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use url::Url;

pub type StoryId = u64;

/// Number of story ids rendered per page of the feed.
pub const CHUNK_SIZE: usize = 10;

const DISCUSSION_URL: &str = "https://news.ycombinator.com/item?id=";

lazy_static! {
    static ref PARAGRAPH_RE: Regex = Regex::new(r"(?i)<p>").expect("valid paragraph regex");
    static ref TAG_RE: Regex = Regex::new(r"<[^>]+>").expect("valid tag regex");
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Story {
    pub id: StoryId,
    #[serde(default)]
    pub by: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub time: i64,
    #[serde(default)]
    pub kids: Vec<StoryId>,
    #[serde(default)]
    pub descendants: u32,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub dead: bool,
}

impl Story {
    /// Host of the linked article, `None` for self posts.
    pub fn domain(&self) -> Option<String> {
        let url = Url::parse(self.url.as_deref()?).ok()?;
        url.host_str()
            .map(|host| host.trim_start_matches("www.").to_string())
    }

    pub fn discussion_url(&self) -> String {
        format!("{}{}", DISCUSSION_URL, self.id)
    }

    /// The article link, falling back to the discussion page for Ask/Show posts.
    pub fn link(&self) -> String {
        match &self.url {
            Some(url) if !url.is_empty() => url.clone(),
            _ => self.discussion_url(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Comment {
    pub id: StoryId,
    #[serde(default)]
    pub by: String,
    #[serde(default)]
    pub text: String,
    // Fetched with the comment but never followed.
    #[serde(default)]
    pub kids: Vec<StoryId>,
    #[serde(default)]
    pub parent: Option<StoryId>,
    #[serde(default)]
    pub time: i64,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub dead: bool,
}

impl Comment {
    pub fn is_visible(&self) -> bool {
        !self.deleted && !self.dead
    }

    /// Comment body with markup removed and entities decoded.
    pub fn plain_text(&self) -> String {
        let text = PARAGRAPH_RE.replace_all(&self.text, "\n\n");
        let text = TAG_RE.replace_all(&text, "");
        html_escape::decode_html_entities(text.trim()).to_string()
    }
}

/// Formats a unix timestamp relative to `now`, e.g. "3 hours ago".
pub fn time_ago(unix: i64, now: DateTime<Utc>) -> String {
    let Some(then) = DateTime::from_timestamp(unix, 0) else {
        return String::new();
    };
    let elapsed = now.signed_duration_since(then);

    let (value, unit) = if elapsed.num_days() > 0 {
        (elapsed.num_days(), "day")
    } else if elapsed.num_hours() > 0 {
        (elapsed.num_hours(), "hour")
    } else if elapsed.num_minutes() > 0 {
        (elapsed.num_minutes(), "minute")
    } else {
        return "just now".to_string();
    };

    if value == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", value, unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(text: &str) -> Comment {
        Comment {
            id: 1,
            by: "pg".to_string(),
            text: text.to_string(),
            kids: Vec::new(),
            parent: Some(8863),
            time: 0,
            deleted: false,
            dead: false,
        }
    }

    #[test]
    fn story_defaults_missing_fields() {
        let story: Story = serde_json::from_str(r#"{"id": 8863, "title": "My YC app"}"#).unwrap();
        assert_eq!(story.kids, Vec::<StoryId>::new());
        assert_eq!(story.url, None);
        assert_eq!(story.link(), "https://news.ycombinator.com/item?id=8863");
    }

    #[test]
    fn domain_strips_www() {
        let story: Story = serde_json::from_str(
            r#"{"id": 1, "url": "https://www.getdropbox.com/u/2/screencast.html"}"#,
        )
        .unwrap();
        assert_eq!(story.domain().as_deref(), Some("getdropbox.com"));
    }

    #[test]
    fn plain_text_strips_markup() {
        let c = comment("Fair point.<p>See <a href=\"https://x.io\">this</a> &amp; that");
        assert_eq!(c.plain_text(), "Fair point.\n\nSee this & that");
    }

    #[test]
    fn deleted_comment_is_hidden() {
        let mut c = comment("gone");
        c.deleted = true;
        assert!(!c.is_visible());
    }

    #[test]
    fn time_ago_picks_largest_unit() {
        let now = DateTime::from_timestamp(100_000, 0).unwrap();
        assert_eq!(time_ago(100_000 - 30, now), "just now");
        assert_eq!(time_ago(100_000 - 60, now), "1 minute ago");
        assert_eq!(time_ago(100_000 - 3 * 3600, now), "3 hours ago");
        assert_eq!(time_ago(100_000 - 2 * 86_400, now), "2 days ago");
    }
}
