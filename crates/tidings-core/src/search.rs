//! Fuzzy matching and multi-source result ranking for the command palette.
//!
//! [`fuzzy_match`] is a case-insensitive subsequence matcher with bonuses for
//! adjacency, word boundaries, and matching the very start of the target,
//! minus a small penalty for longer targets. [`Searcher`] runs it across
//! commands, feeds, and articles with per-source weights and merges the
//! results into one capped, score-sorted list.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::commands::CommandRegistry;
use crate::feed::{Article, FeedConfig};
use crate::html::html_to_text;
use crate::timeago::time_ago;

/// Per-character base score.
const BASE_SCORE: f64 = 1.0;
/// Bonus when a match directly follows the previous matched character.
const ADJACENCY_BONUS: f64 = 3.0;
/// Bonus when a match sits at a word boundary.
const BOUNDARY_BONUS: f64 = 5.0;
/// Additional bonus when a match is the first character of the target.
const START_BONUS: f64 = 10.0;
/// Penalty per character of target length beyond the query length.
const LENGTH_PENALTY: f64 = 0.1;

/// Source weights applied before cross-source ranking.
pub const COMMAND_WEIGHT: f64 = 10.0;
pub const FEED_WEIGHT: f64 = 5.0;
pub const TITLE_WEIGHT: f64 = 2.0;
pub const CONTENT_WEIGHT: f64 = 1.0;

/// Cap on the merged result list.
pub const MAX_RESULTS: usize = 50;

/// A successful fuzzy match: the raw score plus the matched character
/// positions in the target (for highlight rendering).
#[derive(Clone, Debug, PartialEq)]
pub struct FuzzyMatch {
    pub score: f64,
    pub indices: Vec<usize>,
}

/// Case-insensitive subsequence match of `query` against `target`.
///
/// Every query character must appear in order; a single unmatched character
/// fails the whole match. An empty query matches everything with score 0,
/// which is what an unfiltered, freshly-opened palette shows.
pub fn fuzzy_match(query: &str, target: &str) -> Option<FuzzyMatch> {
    if query.is_empty() {
        return Some(FuzzyMatch {
            score: 0.0,
            indices: Vec::new(),
        });
    }

    let target_chars: Vec<char> = target.chars().collect();
    let mut score = 0.0;
    let mut indices = Vec::new();
    let mut search_from = 0usize;
    let mut prev_index: Option<usize> = None;

    for qc in query.chars() {
        let found = (search_from..target_chars.len())
            .find(|&i| chars_eq_ignore_case(target_chars[i], qc))?;

        let mut char_score = BASE_SCORE;
        if prev_index == Some(found.wrapping_sub(1)) && found > 0 {
            char_score += ADJACENCY_BONUS;
        }
        if is_word_boundary(&target_chars, found) {
            char_score += BOUNDARY_BONUS;
        }
        if found == 0 {
            char_score += START_BONUS;
        }

        score += char_score;
        indices.push(found);
        prev_index = Some(found);
        search_from = found + 1;
    }

    // Bias toward tighter targets carrying the same subsequence.
    score -= LENGTH_PENALTY * (target_chars.len() as f64 - query.chars().count() as f64);

    Some(FuzzyMatch { score, indices })
}

fn chars_eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

fn is_word_boundary(chars: &[char], index: usize) -> bool {
    index == 0 || matches!(chars[index - 1], ' ' | '-' | '_' | '/')
}

/// One item that survived ranking, with its weighted score.
#[derive(Clone, Debug)]
pub struct Ranked<'a, T> {
    pub item: &'a T,
    pub score: f64,
    pub matched: FuzzyMatch,
}

/// Run [`fuzzy_match`] over each item's derived search string, weight the
/// surviving scores, and sort descending. The sort is stable, so exact ties
/// keep input order.
pub fn rank_matches<'a, T>(
    query: &str,
    items: &'a [T],
    key_fn: impl Fn(&T) -> String,
    weight: f64,
) -> Vec<Ranked<'a, T>> {
    let mut ranked: Vec<Ranked<'a, T>> = items
        .iter()
        .filter_map(|item| {
            let matched = fuzzy_match(query, &key_fn(item))?;
            Some(Ranked {
                score: matched.score * weight,
                item,
                matched,
            })
        })
        .collect();
    ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    ranked
}

/// Which side of an article the query matched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchField {
    Title,
    Content,
}

/// What a result refers to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchSource {
    /// Command id.
    Command(String),
    /// Feed URL.
    Feed(String),
    /// Article id.
    Article(String),
}

/// One ranked palette hit. Recomputed on every keystroke.
#[derive(Clone, Debug)]
pub struct SearchResult {
    pub source: SearchSource,
    pub label: String,
    pub description: String,
    pub weight: f64,
    pub score: f64,
    /// Set for article hits only.
    pub matched_in: Option<MatchField>,
}

type ArticlesFn = Box<dyn Fn() -> Vec<Article> + Send>;

/// Cross-source palette search over commands, feeds, and articles.
///
/// Articles are fetched fresh through the accessor on every call rather than
/// cached here, so the palette always reflects the current store.
pub struct Searcher {
    registry: Arc<CommandRegistry>,
    feeds: Vec<FeedConfig>,
    articles: ArticlesFn,
}

impl Searcher {
    pub fn new(
        registry: Arc<CommandRegistry>,
        feeds: Vec<FeedConfig>,
        articles: impl Fn() -> Vec<Article> + Send + 'static,
    ) -> Self {
        Searcher {
            registry,
            feeds,
            articles: Box::new(articles),
        }
    }

    /// Replace the feed list, e.g. after a config reload.
    pub fn set_feeds(&mut self, feeds: Vec<FeedConfig>) {
        self.feeds = feeds;
    }

    /// Rank `query` across all sources. Blank input returns nothing: the
    /// palette shows its own placeholder instead of a full dump.
    pub fn search(&self, query: &str) -> Vec<SearchResult> {
        if query.trim().is_empty() {
            return Vec::new();
        }

        let mut results = Vec::new();

        let commands: Vec<_> = self.registry.iter().filter(|c| c.is_enabled()).collect();
        for hit in rank_matches(query, &commands, |c| c.name.clone(), COMMAND_WEIGHT) {
            results.push(SearchResult {
                source: SearchSource::Command(hit.item.id.clone()),
                label: hit.item.name.clone(),
                description: hit.item.description.clone(),
                weight: COMMAND_WEIGHT,
                score: hit.score,
                matched_in: None,
            });
        }

        for hit in rank_matches(query, &self.feeds, |f| f.name.clone(), FEED_WEIGHT) {
            results.push(SearchResult {
                source: SearchSource::Feed(hit.item.url.clone()),
                label: hit.item.name.clone(),
                description: hit.item.url.clone(),
                weight: FEED_WEIGHT,
                score: hit.score,
                matched_in: None,
            });
        }

        let articles = (self.articles)();
        let mut matched_titles = Vec::new();
        for hit in rank_matches(query, &articles, |a| a.title.clone(), TITLE_WEIGHT) {
            matched_titles.push(hit.item.id.clone());
            results.push(SearchResult {
                source: SearchSource::Article(hit.item.id.clone()),
                label: hit.item.title.clone(),
                description: time_ago(hit.item.published),
                weight: TITLE_WEIGHT,
                score: hit.score,
                matched_in: Some(MatchField::Title),
            });
        }

        // Title matches take precedence: an article never appears twice.
        let remaining: Vec<&Article> = articles
            .iter()
            .filter(|a| !matched_titles.contains(&a.id))
            .collect();
        for hit in rank_matches(
            query,
            &remaining,
            |a| html_to_text(&a.content),
            CONTENT_WEIGHT,
        ) {
            results.push(SearchResult {
                source: SearchSource::Article(hit.item.id.clone()),
                label: hit.item.title.clone(),
                description: time_ago(hit.item.published),
                weight: CONTENT_WEIGHT,
                score: hit.score,
                matched_in: Some(MatchField::Content),
            });
        }

        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        results.truncate(MAX_RESULTS);

        tracing::trace!(query, hits = results.len(), "palette search");
        results
    }
}
