use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use shared::domain::{BlogPost, PostId};
use tracing::debug;

use super::{FeedError, FeedSource};

pub const MAX_POSTS_PER_FEED: usize = 10;
const EXCERPT_CHARS: usize = 180;

#[derive(Debug, Deserialize)]
struct Feed {
    #[serde(default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    id: String,
    url: Option<String>,
    title: Option<String>,
    summary: Option<String>,
    content_text: Option<String>,
    image: Option<String>,
    banner_image: Option<String>,
    date_published: Option<DateTime<Utc>>,
    #[serde(default)]
    authors: Vec<Author>,
    author: Option<Author>,
}

#[derive(Debug, Deserialize)]
struct Author {
    name: Option<String>,
}

pub struct JsonFeedSource {
    http: Client,
    name: String,
    url: String,
}

impl JsonFeedSource {
    pub fn new(http: Client, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            http,
            name: name.into(),
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl FeedSource for JsonFeedSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, _now: DateTime<Utc>) -> Result<Vec<BlogPost>, FeedError> {
        let feed: Feed = self
            .http
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        let total = feed.items.len();
        let posts: Vec<BlogPost> = feed
            .items
            .into_iter()
            .filter_map(|item| into_post(&self.name, item))
            .take(MAX_POSTS_PER_FEED)
            .collect();
        debug!(source = %self.name, total, kept = posts.len(), "json feed read");
        Ok(posts)
    }
}

/// Items without a link, title or publication date are skipped.
fn into_post(source: &str, item: Item) -> Option<BlogPost> {
    let url = item.url?;
    let title = item.title.filter(|t| !t.trim().is_empty())?;
    let published = item.date_published?;
    let excerpt = item
        .summary
        .or(item.content_text)
        .map(|text| excerpt_of(&text))
        .unwrap_or_default();
    let author = item
        .authors
        .into_iter()
        .chain(item.author)
        .find_map(|a| a.name);

    Some(BlogPost {
        id: PostId::new(item.id),
        title,
        source: source.to_string(),
        url,
        image: item.image.or(item.banner_image).unwrap_or_default(),
        published,
        excerpt,
        author,
    })
}

fn excerpt_of(text: &str) -> String {
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.chars().count() <= EXCERPT_CHARS {
        return text;
    }
    let mut cut: String = text.chars().take(EXCERPT_CHARS).collect();
    cut.push_str("...");
    cut
}
