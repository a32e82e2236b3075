//! Applies interpreter actions to the application state.

use tidings_core::Action;

use super::app::App;

/// Whether the event loop keeps going after an action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyResult {
    Continue,
    Quit,
}

/// Exhaustive action dispatch. Every variant the interpreter can emit is
/// handled here; adding an action without a handler is a compile error.
pub fn apply_action(app: &mut App, action: Action) -> ApplyResult {
    match action {
        Action::Navigate(direction) => app.navigate(direction),
        Action::Jump(target) => app.jump(target),
        Action::Select => app.select(),
        Action::Back => app.back(),
        Action::Quit => {
            app.should_quit = true;
            return ApplyResult::Quit;
        }
        Action::Refresh => app.refresh_selected(),
        Action::RefreshAll => app.refresh_all(),
        Action::OpenInBrowser => app.open_in_browser(),
        Action::FocusPane(pane) => app.focus_pane(pane),
        Action::Scroll(direction, amount) => app.scroll(direction, amount),
        Action::PageScroll(direction) => app.page_scroll(direction),
        Action::OpenCommandPalette => app.open_palette(),
        Action::CloseCommandPalette => app.close_palette(),
        Action::PaletteInput(text) => app.palette_input(&text),
        Action::PaletteBackspace => app.palette_backspace(),
        Action::PaletteNavigate(direction) => app.palette_navigate(direction),
        Action::PaletteSelect => app.palette_select(),
        Action::PalettePaste => paste_into_palette(app),
        Action::ExecuteCommand(id) => app.execute_command(&id),
    }
    ApplyResult::Continue
}

/// Resolve a clipboard paste into palette input. Control characters are
/// never query or field text, whatever the clipboard holds.
fn paste_into_palette(app: &mut App) {
    let text = match arboard::Clipboard::new().and_then(|mut c| c.get_text()) {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!(error = %err, "clipboard read failed");
            app.status_message = format!("Clipboard error: {}", err);
            return;
        }
    };
    let filtered: String = text.chars().filter(|c| (' '..='~').contains(c)).collect();
    if !filtered.is_empty() {
        app.palette_input(&filtered);
    }
}
