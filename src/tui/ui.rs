//! UI rendering

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};
use tidings_core::{MatchField, Pane, SearchSource, html_to_text, time_ago};

use super::app::{App, FormState, PaletteState};

pub(crate) const FEEDS_PANE_WIDTH: u16 = 28;
pub(crate) const STATUS_BAR_HEIGHT: u16 = 1;

const SELECTED_STYLE: Style = Style::new()
    .bg(Color::Blue)
    .fg(Color::White)
    .add_modifier(Modifier::BOLD);

pub fn draw(f: &mut Frame, app: &mut App) {
    let area = f.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(STATUS_BAR_HEIGHT)])
        .split(area);

    let main = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(FEEDS_PANE_WIDTH), Constraint::Min(30)])
        .split(chunks[0]);

    draw_feeds(f, app, main[0]);
    if app.pane() == Pane::Article {
        draw_article(f, app, main[1]);
    } else {
        draw_articles(f, app, main[1]);
    }
    draw_status_bar(f, app, chunks[1]);

    if app.palette.is_some() {
        draw_palette(f, app, area);
    }
}

fn pane_block(title: &str, focused: bool) -> Block<'_> {
    let style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(style)
        .title(title)
}

fn draw_feeds(f: &mut Frame, app: &App, area: Rect) {
    let store = app.store();
    let items: Vec<ListItem> = app
        .feeds
        .iter()
        .map(|feed| {
            let unread = store.count_unread(&feed.url);
            let mut line = vec![Span::raw(feed.name.clone())];
            if unread > 0 {
                line.push(Span::styled(
                    format!(" ({})", unread),
                    Style::default().fg(Color::Yellow),
                ));
            }
            ListItem::new(Line::from(line))
        })
        .collect();
    drop(store);

    let mut state = ListState::default();
    if !app.feeds.is_empty() {
        state.select(Some(app.selected_feed));
    }
    let list = List::new(items)
        .block(pane_block("Feeds", app.pane() == Pane::Feeds))
        .highlight_style(SELECTED_STYLE);
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_articles(f: &mut Frame, app: &App, area: Rect) {
    let articles = app.current_articles();
    let items: Vec<ListItem> = articles
        .iter()
        .map(|article| {
            let marker = if article.read { "  " } else { "• " };
            let title_style = if article.read {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default().add_modifier(Modifier::BOLD)
            };
            ListItem::new(Line::from(vec![
                Span::styled(marker, Style::default().fg(Color::Yellow)),
                Span::styled(article.title.clone(), title_style),
                Span::styled(
                    format!("  {}", time_ago(article.published)),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    let title = app
        .current_feed()
        .map(|feed| format!("Articles — {}", feed.name))
        .unwrap_or_else(|| "Articles".to_string());
    let mut state = ListState::default();
    if !articles.is_empty() {
        state.select(Some(app.selected_article.min(articles.len() - 1)));
    }
    let list = List::new(items)
        .block(pane_block(&title, app.pane() == Pane::Articles))
        .highlight_style(SELECTED_STYLE);
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_article(f: &mut Frame, app: &mut App, area: Rect) {
    let Some(article) = app.current_article() else {
        let block = pane_block("Article", true);
        f.render_widget(Paragraph::new("No article selected").block(block), area);
        return;
    };

    let body = html_to_text(&article.content);
    let mut lines = vec![
        Line::from(Span::styled(
            article.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            article.link.clone(),
            Style::default().fg(Color::Blue),
        )),
        Line::from(Span::styled(
            time_ago(article.published),
            Style::default().fg(Color::DarkGray),
        )),
        Line::default(),
    ];
    for line in body.lines() {
        lines.push(Line::from(line.to_string()));
    }

    let inner_height = area.height.saturating_sub(2) as usize;
    let inner_width = area.width.saturating_sub(2).max(1) as usize;
    app.article_view_height = inner_height.max(1);

    // Clamp the scroll so jump-to-bottom lands on the last page.
    let total_rows = wrapped_row_count(&lines, inner_width);
    let max_scroll = total_rows.saturating_sub(inner_height);
    if app.article_scroll > max_scroll {
        app.article_scroll = max_scroll;
    }

    let paragraph = Paragraph::new(lines)
        .block(pane_block("Article", true))
        .wrap(Wrap { trim: false })
        .scroll((app.article_scroll.min(u16::MAX as usize) as u16, 0));
    f.render_widget(paragraph, area);
}

fn draw_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let unread = app.store().total_unread();
    let pane_name = match app.pane() {
        Pane::Feeds => "FEEDS",
        Pane::Articles => "ARTICLES",
        Pane::Article => "ARTICLE",
    };
    let right = format!("{} unread | {}", unread, pane_name);
    let left_width = (area.width as usize).saturating_sub(right.len() + 1);
    let line = Line::from(vec![
        Span::raw(format!("{:<width$}", app.status_message, width = left_width)),
        Span::styled(right, Style::default().fg(Color::Cyan)),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn draw_palette(f: &mut Frame, app: &App, area: Rect) {
    let Some(palette) = app.palette.as_ref() else {
        return;
    };
    let popup = centered_rect(60, 60, area);
    f.render_widget(Clear, popup);

    if let Some(form) = palette.form.as_ref() {
        draw_form(f, form, popup);
        return;
    }
    draw_search(f, palette, popup);
}

fn draw_search(f: &mut Frame, palette: &PaletteState, popup: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(popup);

    let input = if palette.query.is_empty() {
        Paragraph::new(Span::styled(
            "Type to search...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Paragraph::new(palette.query.clone())
    };
    f.render_widget(
        input.block(Block::default().borders(Borders::ALL).title("Search")),
        chunks[0],
    );

    let items: Vec<ListItem> = palette
        .results
        .iter()
        .map(|result| {
            let kind = match (&result.source, result.matched_in) {
                (SearchSource::Command(_), _) => "cmd",
                (SearchSource::Feed(_), _) => "feed",
                (SearchSource::Article(_), Some(MatchField::Content)) => "text",
                (SearchSource::Article(_), _) => "article",
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:<7} ", kind), Style::default().fg(Color::Magenta)),
                Span::raw(result.label.clone()),
                Span::styled(
                    format!("  {}", result.description),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    let mut state = ListState::default();
    if !palette.results.is_empty() {
        state.select(Some(palette.selected));
    }
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL))
        .highlight_style(SELECTED_STYLE);
    f.render_stateful_widget(list, chunks[1], &mut state);
}

fn draw_form(f: &mut Frame, form: &FormState, popup: Rect) {
    let mut constraints = vec![Constraint::Length(3); form.fields.len()];
    constraints.push(Constraint::Min(0));
    let height = (form.fields.len() as u16) * 3 + 2;
    let popup = Rect {
        height: height.min(popup.height),
        ..popup
    };
    let block = Block::default().borders(Borders::ALL).title(form.title.clone());
    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    for (i, field) in form.fields.iter().enumerate() {
        let focused = i == form.focused;
        let style = if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let paragraph = Paragraph::new(field.value.clone()).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(style)
                .title(field.label.clone()),
        );
        f.render_widget(paragraph, rows[i]);
    }
}

pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);
    horizontal[1]
}

/// Rows a set of lines occupies after wrapping to `width` columns.
fn wrapped_row_count(lines: &[Line], width: usize) -> usize {
    lines
        .iter()
        .map(|line| {
            let chars: usize = line.spans.iter().map(|s| s.content.chars().count()).sum();
            chars / width.max(1) + 1
        })
        .sum()
}
