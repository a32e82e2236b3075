//! Plain data types shared between the interpreter's host and the searcher.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One configured feed subscription.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedConfig {
    pub name: String,
    pub url: String,
}

/// One stored article.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Stable id, normally the entry's guid or link.
    pub id: String,
    /// URL of the feed this article came from.
    pub feed_url: String,
    pub title: String,
    pub link: String,
    /// Raw entry content, usually HTML.
    pub content: String,
    pub published: Option<DateTime<Utc>>,
    pub read: bool,
}

impl Article {
    pub fn new(id: &str, feed_url: &str, title: &str) -> Self {
        Article {
            id: id.to_string(),
            feed_url: feed_url.to_string(),
            title: title.to_string(),
            link: String::new(),
            content: String::new(),
            published: None,
            read: false,
        }
    }
}
