//! End-to-end palette flow: key events through the interpreter driving a
//! search query, ranked by the searcher, down to command selection.

use std::sync::Arc;

use tidings_core::{
    Action, Article, Command, CommandRegistry, Direction, FeedConfig, Interpreter, KeyInput,
    KeybindingsConfig, SearchSource, Searcher,
};

fn fixtures() -> (Interpreter, Searcher) {
    let mut registry = CommandRegistry::new();
    registry.register(Command::new(
        "refresh-all",
        "Refresh all feeds",
        "Fetch new articles for every feed",
    ));
    registry.register(Command::new(
        "mark-all-read",
        "Mark all read",
        "Mark every article read",
    ));
    let registry = Arc::new(registry);

    let feeds = vec![FeedConfig {
        name: "Rust Blog".to_string(),
        url: "https://blog.rust-lang.org/feed.xml".to_string(),
    }];
    let mut article = Article::new(
        "a1",
        "https://blog.rust-lang.org/feed.xml",
        "Refreshed release process",
    );
    article.content = "<p>Details about the new release cadence.</p>".to_string();

    let searcher = Searcher::new(Arc::clone(&registry), feeds, move || vec![article.clone()]);
    let interpreter = Interpreter::new(KeybindingsConfig::default(), registry);
    (interpreter, searcher)
}

/// Feed one key through the interpreter and mirror what the orchestrator
/// does with palette actions: maintain the query and the selection index.
fn drive(
    interp: &mut Interpreter,
    searcher: &Searcher,
    query: &mut String,
    selected: &mut usize,
    key: &KeyInput,
) -> Option<Action> {
    let action = interp.handle_key(key)?;
    match &action {
        Action::OpenCommandPalette => {
            interp.set_command_palette_mode(true);
            query.clear();
            *selected = 0;
        }
        Action::CloseCommandPalette => interp.set_command_palette_mode(false),
        Action::PaletteInput(text) => {
            query.push_str(text);
            *selected = 0;
        }
        Action::PaletteBackspace => {
            query.pop();
            *selected = 0;
        }
        Action::PaletteNavigate(direction) => {
            let count = searcher.search(query).len();
            if count > 0 {
                *selected = match direction {
                    Direction::Down => (*selected + 1) % count,
                    Direction::Up => (*selected + count - 1) % count,
                };
            }
        }
        _ => {}
    }
    Some(action)
}

#[test]
fn typing_a_query_ranks_commands_above_articles() {
    let (mut interp, searcher) = fixtures();
    let mut query = String::new();
    let mut selected = 0usize;

    drive(&mut interp, &searcher, &mut query, &mut selected, &KeyInput::key(":"));
    assert!(interp.command_palette_mode());

    for c in "refresh".chars() {
        drive(
            &mut interp,
            &searcher,
            &mut query,
            &mut selected,
            &KeyInput::key(&c.to_string()),
        );
    }
    assert_eq!(query, "refresh");

    let results = searcher.search(&query);
    assert!(results.len() >= 2);
    assert_eq!(
        results[0].source,
        SearchSource::Command("refresh-all".to_string())
    );
    // The article title also matches, but at a lower weight.
    assert!(results
        .iter()
        .any(|r| r.source == SearchSource::Article("a1".to_string())));
}

#[test]
fn navigation_and_selection_close_over_the_ranked_list() {
    let (mut interp, searcher) = fixtures();
    let mut query = String::new();
    let mut selected = 0usize;

    drive(&mut interp, &searcher, &mut query, &mut selected, &KeyInput::key("/"));
    for c in "refresh".chars() {
        drive(
            &mut interp,
            &searcher,
            &mut query,
            &mut selected,
            &KeyInput::key(&c.to_string()),
        );
    }

    drive(&mut interp, &searcher, &mut query, &mut selected, &KeyInput::key("tab"));
    assert_eq!(selected, 1);
    drive(
        &mut interp,
        &searcher,
        &mut query,
        &mut selected,
        &KeyInput::key("tab").with_shift(),
    );
    assert_eq!(selected, 0);

    let action = drive(
        &mut interp,
        &searcher,
        &mut query,
        &mut selected,
        &KeyInput::key("return"),
    );
    assert_eq!(action, Some(Action::PaletteSelect));
    let results = searcher.search(&query);
    assert_eq!(
        results[selected].source,
        SearchSource::Command("refresh-all".to_string())
    );
}

#[test]
fn escape_closes_and_keys_go_back_to_navigation() {
    let (mut interp, searcher) = fixtures();
    let mut query = String::new();
    let mut selected = 0usize;

    drive(&mut interp, &searcher, &mut query, &mut selected, &KeyInput::key(":"));
    let action = drive(
        &mut interp,
        &searcher,
        &mut query,
        &mut selected,
        &KeyInput::key("escape"),
    );
    assert_eq!(action, Some(Action::CloseCommandPalette));
    assert!(!interp.command_palette_mode());

    // j navigates again instead of typing into the query.
    assert_eq!(
        interp.handle_key(&KeyInput::key("j")),
        Some(Action::Navigate(Direction::Down))
    );
}

#[test]
fn backspace_on_empty_query_leaves_the_palette_open() {
    let (mut interp, searcher) = fixtures();
    let mut query = String::new();
    let mut selected = 0usize;

    drive(&mut interp, &searcher, &mut query, &mut selected, &KeyInput::key(":"));
    let action = drive(
        &mut interp,
        &searcher,
        &mut query,
        &mut selected,
        &KeyInput::key("backspace"),
    );
    assert_eq!(action, Some(Action::PaletteBackspace));
    assert!(interp.command_palette_mode());
    assert!(searcher.search(&query).is_empty());
}
