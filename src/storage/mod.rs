//! Article persistence.
//!
//! The store is an in-memory map keyed by article id, loaded from and saved
//! to a TOML file in the data directory. Feed refreshes upsert into it;
//! read state is the only field the reader itself mutates, and upserting a
//! fresh copy of a known article never resets it.

use crate::error::{Result, TidingsError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tidings_core::Article;

/// On-disk shape: a flat article list.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Default)]
pub struct ArticleStore {
    articles: HashMap<String, Article>,
    path: Option<PathBuf>,
}

impl ArticleStore {
    pub fn new() -> Self {
        ArticleStore::default()
    }

    /// Load the store from `path`. A missing file yields an empty store
    /// bound to that path; a malformed one is an error so the caller can
    /// decide whether to start empty.
    pub fn load(path: PathBuf) -> Result<Self> {
        if !path.exists() {
            return Ok(ArticleStore {
                articles: HashMap::new(),
                path: Some(path),
            });
        }
        let content = std::fs::read_to_string(&path)?;
        let mut store = parse_store_content(&content).map_err(|source| TidingsError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        store.path = Some(path);
        tracing::info!(articles = store.len(), "article store loaded");
        Ok(store)
    }

    /// Write the store back to the path it was loaded from. A pathless
    /// (in-memory) store saves nowhere.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_content()?)?;
        tracing::debug!(articles = self.len(), "article store saved");
        Ok(())
    }

    fn to_content(&self) -> Result<String> {
        let mut articles: Vec<Article> = self.articles.values().cloned().collect();
        // Stable output keeps the file diffable.
        articles.sort_by(|a, b| a.id.cmp(&b.id));
        toml::to_string(&StoreFile { articles }).map_err(|source| TidingsError::Serialize {
            path: self
                .path
                .as_deref()
                .map(Path::display)
                .map(|d| d.to_string())
                .unwrap_or_else(|| "article store".to_string()),
            source,
        })
    }

    /// Insert or update an article. An update keeps the stored read flag;
    /// everything else comes from the incoming copy. Returns true if the
    /// article was new.
    pub fn upsert(&mut self, mut article: Article) -> bool {
        match self.articles.get(&article.id) {
            Some(existing) => {
                article.read = existing.read;
                self.articles.insert(article.id.clone(), article);
                false
            }
            None => {
                self.articles.insert(article.id.clone(), article);
                true
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&Article> {
        self.articles.get(id)
    }

    /// Articles for one feed, newest first. Undated articles sort last,
    /// then by id so the order is deterministic.
    pub fn list_by_feed(&self, feed_url: &str) -> Vec<&Article> {
        let mut list: Vec<&Article> = self
            .articles
            .values()
            .filter(|a| a.feed_url == feed_url)
            .collect();
        list.sort_by(|a, b| b.published.cmp(&a.published).then_with(|| a.id.cmp(&b.id)));
        list
    }

    /// Set an article's read flag. Returns false if the id is unknown.
    pub fn mark_read(&mut self, id: &str, read: bool) -> bool {
        match self.articles.get_mut(id) {
            Some(article) => {
                article.read = read;
                true
            }
            None => false,
        }
    }

    /// Mark every stored article read. Returns how many flipped.
    pub fn mark_all_read(&mut self) -> usize {
        let mut changed = 0;
        for article in self.articles.values_mut() {
            if !article.read {
                article.read = true;
                changed += 1;
            }
        }
        changed
    }

    pub fn count_unread(&self, feed_url: &str) -> usize {
        self.articles
            .values()
            .filter(|a| a.feed_url == feed_url && !a.read)
            .count()
    }

    pub fn total_unread(&self) -> usize {
        self.articles.values().filter(|a| !a.read).count()
    }

    /// Snapshot of every article, for the palette searcher.
    pub fn all_articles(&self) -> Vec<Article> {
        self.articles.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }
}

fn parse_store_content(content: &str) -> std::result::Result<ArticleStore, toml::de::Error> {
    let file: StoreFile = toml::from_str(content)?;
    let mut articles = HashMap::with_capacity(file.articles.len());
    for article in file.articles {
        articles.insert(article.id.clone(), article);
    }
    Ok(ArticleStore {
        articles,
        path: None,
    })
}
