//! The feed-source seam.
//!
//! Fetching and parsing feeds is an external concern behind [`FeedSource`]:
//! the refresh actions hand it a feed config and take back articles. The
//! binary ships [`OfflineSource`], which never touches the network; tests
//! and embedders supply in-memory sources.

use crate::error::Result;
use std::collections::HashMap;
use tidings_core::{Article, FeedConfig};

/// Produces the current articles for one configured feed.
pub trait FeedSource {
    fn fetch(&self, feed: &FeedConfig) -> Result<Vec<Article>>;
}

/// A source that fetches nothing. Refreshing against it leaves the store
/// as loaded from disk.
#[derive(Debug, Default)]
pub struct OfflineSource;

impl FeedSource for OfflineSource {
    fn fetch(&self, feed: &FeedConfig) -> Result<Vec<Article>> {
        tracing::debug!(url = %feed.url, "offline source, nothing fetched");
        Ok(Vec::new())
    }
}

/// A fixed in-memory source keyed by feed URL.
#[derive(Debug, Default)]
pub struct StaticSource {
    articles: HashMap<String, Vec<Article>>,
}

impl StaticSource {
    pub fn new() -> Self {
        StaticSource::default()
    }

    pub fn with_feed(mut self, url: &str, articles: Vec<Article>) -> Self {
        self.articles.insert(url.to_string(), articles);
        self
    }
}

impl FeedSource for StaticSource {
    fn fetch(&self, feed: &FeedConfig) -> Result<Vec<Article>> {
        Ok(self.articles.get(&feed.url).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_source_serves_only_its_feed() {
        let source = StaticSource::new().with_feed(
            "https://example.org/rss",
            vec![Article::new("a1", "https://example.org/rss", "Hello")],
        );

        let known = FeedConfig {
            name: "Example".to_string(),
            url: "https://example.org/rss".to_string(),
        };
        let unknown = FeedConfig {
            name: "Other".to_string(),
            url: "https://other.example/rss".to_string(),
        };

        assert_eq!(source.fetch(&known).unwrap().len(), 1);
        assert!(source.fetch(&unknown).unwrap().is_empty());
    }
}
