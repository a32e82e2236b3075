//! Application state and logic.
//!
//! [`App`] owns the feed list, the article store, the interpreter, and the
//! palette searcher, and carries the per-pane selection and scroll state the
//! renderer draws from. Key events flow through the interpreter; the
//! resulting actions come back in through [`super::actions::apply_action`].

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use tidings_core::{
    Article, Command, CommandRegistry, Direction, FeedConfig, Interpreter, JumpTarget, KeyInput,
    Pane, SearchResult, SearchSource, Searcher,
};

use crate::config::{Config, load_config};
use crate::fetch::FeedSource;
use crate::storage::ArticleStore;

use super::actions::{ApplyResult, apply_action};

/// Open command palette: query, ranked results, and an optional form that
/// takes over input.
pub struct PaletteState {
    pub query: String,
    pub results: Vec<SearchResult>,
    pub selected: usize,
    pub form: Option<FormState>,
}

impl PaletteState {
    fn new() -> Self {
        PaletteState {
            query: String::new(),
            results: Vec::new(),
            selected: 0,
            form: None,
        }
    }
}

/// A small field form shown inside the palette, e.g. for adding a feed.
pub struct FormState {
    pub title: String,
    pub fields: Vec<FormField>,
    pub focused: usize,
    kind: FormKind,
}

pub struct FormField {
    pub label: String,
    pub value: String,
}

enum FormKind {
    AddFeed,
}

pub struct App {
    pub feeds: Vec<FeedConfig>,
    store: Arc<Mutex<ArticleStore>>,
    pub interpreter: Interpreter,
    pub searcher: Searcher,
    source: Box<dyn FeedSource>,
    config_path: Option<PathBuf>,
    /// Selected row in the feeds pane.
    pub selected_feed: usize,
    /// Selected row in the articles pane.
    pub selected_article: usize,
    /// Scroll offset in the article view, in lines.
    pub article_scroll: usize,
    /// Visible height of the article view, updated each draw.
    pub article_view_height: usize,
    pub palette: Option<PaletteState>,
    pub status_message: String,
    pub should_quit: bool,
}

impl App {
    pub fn new(
        config: Config,
        store: ArticleStore,
        source: Box<dyn FeedSource>,
        config_path: Option<PathBuf>,
    ) -> Self {
        let registry = Arc::new(build_registry());
        let store = Arc::new(Mutex::new(store));
        let searcher_store = Arc::clone(&store);
        let searcher = Searcher::new(Arc::clone(&registry), config.feeds.clone(), move || {
            lock(&searcher_store).all_articles()
        });
        App {
            feeds: config.feeds,
            store,
            interpreter: Interpreter::new(config.bindings, registry),
            searcher,
            source,
            config_path,
            selected_feed: 0,
            selected_article: 0,
            article_scroll: 0,
            article_view_height: 1,
            palette: None,
            status_message: String::new(),
            should_quit: false,
        }
    }

    /// Route one key event through the interpreter and apply the result.
    pub fn handle_key(&mut self, event: &KeyInput) -> ApplyResult {
        match self.interpreter.handle_key(event) {
            Some(action) => apply_action(self, action),
            None => ApplyResult::Continue,
        }
    }

    pub fn pane(&self) -> Pane {
        self.interpreter.pane()
    }

    pub fn store(&self) -> MutexGuard<'_, ArticleStore> {
        lock(&self.store)
    }

    pub fn current_feed(&self) -> Option<&FeedConfig> {
        self.feeds.get(self.selected_feed)
    }

    /// Articles of the selected feed, newest first (cloned snapshot).
    pub fn current_articles(&self) -> Vec<Article> {
        match self.current_feed() {
            Some(feed) => self
                .store()
                .list_by_feed(&feed.url)
                .into_iter()
                .cloned()
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn current_article(&self) -> Option<Article> {
        self.current_articles().into_iter().nth(self.selected_article)
    }

    // --- navigation -----------------------------------------------------

    pub fn navigate(&mut self, direction: Direction) {
        match self.pane() {
            Pane::Feeds => {
                self.selected_feed = step(self.selected_feed, direction, self.feeds.len());
                self.selected_article = 0;
            }
            Pane::Articles => {
                let count = self.current_articles().len();
                self.selected_article = step(self.selected_article, direction, count);
            }
            Pane::Article => self.scroll(direction, 1),
        }
    }

    pub fn jump(&mut self, target: JumpTarget) {
        match self.pane() {
            Pane::Feeds => {
                self.selected_feed = match target {
                    JumpTarget::Top => 0,
                    JumpTarget::Bottom => self.feeds.len().saturating_sub(1),
                };
                self.selected_article = 0;
            }
            Pane::Articles => {
                self.selected_article = match target {
                    JumpTarget::Top => 0,
                    JumpTarget::Bottom => self.current_articles().len().saturating_sub(1),
                };
            }
            Pane::Article => {
                self.article_scroll = match target {
                    JumpTarget::Top => 0,
                    JumpTarget::Bottom => usize::MAX / 2,
                };
            }
        }
    }

    pub fn scroll(&mut self, direction: Direction, amount: usize) {
        self.article_scroll = match direction {
            Direction::Down => self.article_scroll.saturating_add(amount),
            Direction::Up => self.article_scroll.saturating_sub(amount),
        };
    }

    pub fn page_scroll(&mut self, direction: Direction) {
        self.scroll(direction, self.article_view_height.max(1));
    }

    pub fn select(&mut self) {
        match self.pane() {
            Pane::Feeds => {
                if self.current_feed().is_some() {
                    self.selected_article = 0;
                    self.focus_pane(Pane::Articles);
                }
            }
            Pane::Articles => {
                if self.current_article().is_some() {
                    self.focus_pane(Pane::Article);
                }
            }
            Pane::Article => {}
        }
    }

    pub fn back(&mut self) {
        match self.pane() {
            Pane::Article => self.focus_pane(Pane::Articles),
            Pane::Articles => self.focus_pane(Pane::Feeds),
            Pane::Feeds => {}
        }
    }

    pub fn focus_pane(&mut self, pane: Pane) {
        if pane == Pane::Article {
            self.article_scroll = 0;
            if let Some(article) = self.current_article() {
                self.store().mark_read(&article.id, true);
            }
        }
        self.clamp_selection();
        self.interpreter.set_pane(pane);
    }

    fn clamp_selection(&mut self) {
        if self.selected_feed >= self.feeds.len() {
            self.selected_feed = self.feeds.len().saturating_sub(1);
        }
        let count = self.current_articles().len();
        if self.selected_article >= count {
            self.selected_article = count.saturating_sub(1);
        }
    }

    // --- refresh --------------------------------------------------------

    pub fn refresh_selected(&mut self) {
        let Some(feed) = self.current_feed().cloned() else {
            self.status_message = "No feed selected".to_string();
            return;
        };
        match self.refresh_one(&feed) {
            Ok(new) => {
                self.status_message = format!("Refreshed {}: {} new", feed.name, new);
            }
            Err(err) => {
                tracing::warn!(url = %feed.url, error = %err, "refresh failed");
                self.status_message = format!("Failed to refresh {}: {}", feed.name, err);
            }
        }
    }

    pub fn refresh_all(&mut self) {
        let feeds = self.feeds.clone();
        let mut new_total = 0;
        let mut failures = 0;
        for feed in &feeds {
            match self.refresh_one(feed) {
                Ok(new) => new_total += new,
                Err(err) => {
                    tracing::warn!(url = %feed.url, error = %err, "refresh failed");
                    failures += 1;
                }
            }
        }
        self.status_message = if failures == 0 {
            format!("Refreshed {} feeds: {} new", feeds.len(), new_total)
        } else {
            format!(
                "Refreshed {} feeds: {} new, {} failed",
                feeds.len(),
                new_total,
                failures
            )
        };
    }

    fn refresh_one(&mut self, feed: &FeedConfig) -> crate::error::Result<usize> {
        let articles = self.source.fetch(feed)?;
        let mut store = self.store();
        let mut new = 0;
        for article in articles {
            if store.upsert(article) {
                new += 1;
            }
        }
        Ok(new)
    }

    pub fn open_in_browser(&mut self) {
        let Some(article) = self.current_article() else {
            self.status_message = "No article selected".to_string();
            return;
        };
        if article.link.is_empty() {
            self.status_message = "Article has no link".to_string();
            return;
        }
        match open_url(&article.link) {
            Ok(()) => self.status_message = format!("Opened {}", article.link),
            Err(err) => {
                tracing::warn!(link = %article.link, error = %err, "browser launch failed");
                self.status_message = format!("Failed to open browser: {}", err);
            }
        }
    }

    // --- palette --------------------------------------------------------

    pub fn open_palette(&mut self) {
        self.palette = Some(PaletteState::new());
        self.interpreter.set_command_palette_mode(true);
    }

    pub fn close_palette(&mut self) {
        self.palette = None;
        self.interpreter.set_command_palette_mode(false);
    }

    pub fn palette_input(&mut self, text: &str) {
        let Some(palette) = self.palette.as_mut() else {
            return;
        };
        if let Some(form) = palette.form.as_mut() {
            if let Some(field) = form.fields.get_mut(form.focused) {
                field.value.push_str(text);
            }
            return;
        }
        palette.query.push_str(text);
        self.refresh_palette_results();
    }

    pub fn palette_backspace(&mut self) {
        let Some(palette) = self.palette.as_mut() else {
            return;
        };
        if let Some(form) = palette.form.as_mut() {
            if let Some(field) = form.fields.get_mut(form.focused) {
                field.value.pop();
            }
            return;
        }
        palette.query.pop();
        self.refresh_palette_results();
    }

    pub fn palette_navigate(&mut self, direction: Direction) {
        let Some(palette) = self.palette.as_mut() else {
            return;
        };
        if let Some(form) = palette.form.as_mut() {
            let count = form.fields.len();
            if count > 0 {
                form.focused = cycle(form.focused, direction, count);
            }
            return;
        }
        let count = palette.results.len();
        if count > 0 {
            palette.selected = cycle(palette.selected, direction, count);
        }
    }

    pub fn palette_select(&mut self) {
        let Some(palette) = self.palette.as_ref() else {
            return;
        };
        if palette.form.is_some() {
            self.submit_form();
            return;
        }
        let Some(result) = palette.results.get(palette.selected) else {
            return;
        };
        match result.source.clone() {
            SearchSource::Command(id) => {
                self.close_palette();
                self.execute_command(&id);
            }
            SearchSource::Feed(url) => {
                self.close_palette();
                if let Some(index) = self.feeds.iter().position(|f| f.url == url) {
                    self.selected_feed = index;
                    self.selected_article = 0;
                    self.focus_pane(Pane::Articles);
                }
            }
            SearchSource::Article(id) => {
                self.close_palette();
                self.focus_article_by_id(&id);
            }
        }
    }

    fn focus_article_by_id(&mut self, id: &str) {
        let Some(feed_url) = self.store().get(id).map(|a| a.feed_url.clone()) else {
            return;
        };
        let Some(feed_index) = self.feeds.iter().position(|f| f.url == feed_url) else {
            return;
        };
        self.selected_feed = feed_index;
        let position = self
            .store()
            .list_by_feed(&feed_url)
            .iter()
            .position(|a| a.id == id);
        if let Some(position) = position {
            self.selected_article = position;
            self.focus_pane(Pane::Article);
        }
    }

    fn refresh_palette_results(&mut self) {
        let Some(palette) = self.palette.as_mut() else {
            return;
        };
        palette.results = self.searcher.search(&palette.query);
        palette.selected = 0;
    }

    // --- commands -------------------------------------------------------

    /// Dispatch a registered command by id. Unknown ids only set a status
    /// message; the binding that produced them may come from a user config.
    pub fn execute_command(&mut self, id: &str) {
        tracing::debug!(id, "executing command");
        match id {
            "refresh" => self.refresh_selected(),
            "refresh-all" => self.refresh_all(),
            "mark-all-read" => {
                let changed = self.store().mark_all_read();
                self.status_message = format!("Marked {} articles read", changed);
            }
            "toggle-read" => {
                let Some(article) = self.current_article() else {
                    self.status_message = "No article selected".to_string();
                    return;
                };
                self.store().mark_read(&article.id, !article.read);
                self.status_message = if article.read {
                    format!("Marked unread: {}", article.title)
                } else {
                    format!("Marked read: {}", article.title)
                };
            }
            "reload-config" => self.reload_config(),
            "add-feed" => self.open_add_feed_form(),
            _ => {
                self.status_message = format!("Unknown command: {}", id);
            }
        }
    }

    pub fn reload_config(&mut self) {
        let (config, warnings) = load_config(self.config_path.as_ref());
        self.feeds = config.feeds;
        self.searcher.set_feeds(self.feeds.clone());
        self.interpreter.set_keybindings(config.bindings);
        self.clamp_selection();
        self.status_message = if warnings.is_empty() {
            format!("Config reloaded: {} feeds", self.feeds.len())
        } else {
            format!("Config reloaded with {} warnings", warnings.len())
        };
        for warning in warnings {
            tracing::warn!(warning, "config reload");
        }
    }

    fn open_add_feed_form(&mut self) {
        let mut palette = self.palette.take().unwrap_or_else(PaletteState::new);
        palette.form = Some(FormState {
            title: "Add feed".to_string(),
            fields: vec![
                FormField {
                    label: "Name".to_string(),
                    value: String::new(),
                },
                FormField {
                    label: "URL".to_string(),
                    value: String::new(),
                },
            ],
            focused: 0,
            kind: FormKind::AddFeed,
        });
        self.palette = Some(palette);
        self.interpreter.set_command_palette_mode(true);
        self.interpreter.set_form_mode(true);
    }

    fn submit_form(&mut self) {
        let Some(form) = self.palette.as_mut().and_then(|p| p.form.take()) else {
            return;
        };
        match form.kind {
            FormKind::AddFeed => {
                let name = form.fields[0].value.trim().to_string();
                let url = form.fields[1].value.trim().to_string();
                if url.is_empty() {
                    self.status_message = "Feed URL is required".to_string();
                    self.close_palette();
                    return;
                }
                if self.feeds.iter().any(|f| f.url == url) {
                    self.status_message = format!("Feed already configured: {}", url);
                    self.close_palette();
                    return;
                }
                let name = if name.is_empty() { url.clone() } else { name };
                self.feeds.push(FeedConfig {
                    name: name.clone(),
                    url,
                });
                self.searcher.set_feeds(self.feeds.clone());
                self.status_message = format!("Added feed: {}", name);
                self.close_palette();
            }
        }
    }

    /// Persist the article store; called on shutdown.
    pub fn save(&self) -> crate::error::Result<()> {
        self.store().save()
    }
}

/// Registered palette commands. Execution lives in [`App::execute_command`].
fn build_registry() -> CommandRegistry {
    let mut registry = CommandRegistry::new();
    registry.register(Command::new(
        "refresh",
        "Refresh feed",
        "Fetch new articles for the selected feed",
    ));
    registry.register(Command::new(
        "refresh-all",
        "Refresh all feeds",
        "Fetch new articles for every feed",
    ));
    registry.register(
        Command::new("mark-all-read", "Mark all read", "Mark every article read")
            .with_keybind("mark-all-read"),
    );
    registry.register(
        Command::new(
            "toggle-read",
            "Toggle read",
            "Flip the selected article's read flag",
        )
        .with_keybind("toggle-read")
        .for_pane(Pane::Articles),
    );
    registry.register(
        Command::new(
            "reload-config",
            "Reload config",
            "Re-read config.toml and keybindings",
        )
        .with_keybind("reload-config"),
    );
    registry.register(Command::new(
        "add-feed",
        "Add feed",
        "Subscribe to a new feed",
    ));
    registry
}

fn lock<'a>(store: &'a Arc<Mutex<ArticleStore>>) -> MutexGuard<'a, ArticleStore> {
    // Single-threaded event loop; a poisoned lock still holds valid data.
    store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn step(current: usize, direction: Direction, count: usize) -> usize {
    if count == 0 {
        return 0;
    }
    match direction {
        Direction::Down => (current + 1).min(count - 1),
        Direction::Up => current.saturating_sub(1),
    }
}

fn cycle(current: usize, direction: Direction, count: usize) -> usize {
    match direction {
        Direction::Down => (current + 1) % count,
        Direction::Up => (current + count - 1) % count,
    }
}

fn open_url(url: &str) -> std::io::Result<()> {
    #[cfg(target_os = "macos")]
    let launcher = "open";
    #[cfg(not(target_os = "macos"))]
    let launcher = "xdg-open";
    std::process::Command::new(launcher).arg(url).spawn()?;
    Ok(())
}
