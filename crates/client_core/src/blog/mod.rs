use std::{collections::HashSet, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use reqwest::Client;
use shared::domain::BlogPost;
use thiserror::Error;
use tracing::{info, warn};

pub mod fallback;
pub mod json_feed;

pub use json_feed::JsonFeedSource;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("feed unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait FeedSource: Send + Sync {
    fn name(&self) -> &str;
    async fn fetch(&self, now: DateTime<Utc>) -> Result<Vec<BlogPost>, FeedError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedEndpoint {
    pub source: &'static str,
    pub feed_url: &'static str,
    pub has_blog: bool,
}

pub const FEED_ENDPOINTS: &[FeedEndpoint] = &[
    FeedEndpoint {
        source: "3D Printing Industry",
        feed_url: "https://3dprintingindustry.com/feed/json",
        has_blog: true,
    },
    FeedEndpoint {
        source: "All3DP",
        feed_url: "https://all3dp.com/feed/json",
        has_blog: true,
    },
    FeedEndpoint {
        source: "3D Insider",
        feed_url: "https://3dinsider.com/feed/json",
        has_blog: true,
    },
    FeedEndpoint {
        source: "Sculpteo",
        feed_url: "https://www.sculpteo.com/blog/feed/json",
        has_blog: true,
    },
    FeedEndpoint {
        source: "3D Printing Media",
        feed_url: "https://www.3dprintingmedia.network/feed/json",
        has_blog: true,
    },
];

pub struct CuratedSource {
    name: String,
}

impl CuratedSource {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl FeedSource for CuratedSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, now: DateTime<Utc>) -> Result<Vec<BlogPost>, FeedError> {
        Ok(fallback::source_posts(&self.name, now))
    }
}

pub struct BlogAggregator {
    sources: Vec<Arc<dyn FeedSource>>,
    excluded: HashSet<String>,
}

impl BlogAggregator {
    pub fn new(sources: Vec<Arc<dyn FeedSource>>) -> Self {
        Self {
            sources,
            excluded: HashSet::new(),
        }
    }

    pub fn curated() -> Self {
        Self::new(
            blog_endpoints()
                .map(|endpoint| Arc::new(CuratedSource::new(endpoint.source)) as Arc<dyn FeedSource>)
                .collect(),
        )
    }

    pub fn live(http: Client) -> Self {
        Self::new(
            blog_endpoints()
                .map(|endpoint| {
                    Arc::new(JsonFeedSource::new(
                        http.clone(),
                        endpoint.source,
                        endpoint.feed_url,
                    )) as Arc<dyn FeedSource>
                })
                .collect(),
        )
    }

    pub fn with_excluded<I, S>(mut self, excluded: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded = excluded.into_iter().map(Into::into).collect();
        self
    }

    pub fn source_names(&self) -> Vec<&str> {
        self.active_sources().map(|source| source.name()).collect()
    }

    pub async fn fetch_all(&self) -> Vec<BlogPost> {
        self.fetch_all_at(Utc::now()).await
    }

    /// Fetches every active source concurrently; newest posts first.
    pub async fn fetch_all_at(&self, now: DateTime<Utc>) -> Vec<BlogPost> {
        let fetches = self.active_sources().map(|source| async move {
            match source.fetch(now).await {
                Ok(posts) if !posts.is_empty() => posts,
                Ok(_) => {
                    info!(source = source.name(), "feed returned no posts, using curated posts");
                    fallback::source_posts(source.name(), now)
                }
                Err(err) => {
                    warn!(source = source.name(), error = %err, "feed failed, using curated posts");
                    fallback::source_posts(source.name(), now)
                }
            }
        });

        let mut posts: Vec<BlogPost> = join_all(fetches).await.into_iter().flatten().collect();
        if posts.is_empty() {
            warn!("no source produced posts, serving global curated list");
            posts = fallback::global_posts(now);
        }
        posts.sort_by(|a, b| b.published.cmp(&a.published));
        posts
    }

    fn active_sources(&self) -> impl Iterator<Item = &Arc<dyn FeedSource>> {
        self.sources
            .iter()
            .filter(|source| !self.excluded.contains(source.name()))
    }
}

fn blog_endpoints() -> impl Iterator<Item = &'static FeedEndpoint> {
    FEED_ENDPOINTS.iter().filter(|endpoint| endpoint.has_blog)
}

#[cfg(test)]
#[path = "../tests/blog_tests.rs"]
mod tests;
