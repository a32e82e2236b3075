//! User-intent actions produced by the interpreter.
//!
//! Actions decouple key handling from application behavior: the interpreter
//! translates key events into actions, which the orchestrator applies to the
//! application state with an exhaustive match.

/// One of the three navigation contexts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Pane {
    /// The feed list.
    Feeds,
    /// The article list for the selected feed.
    Articles,
    /// The article content view.
    Article,
}

impl Pane {
    /// Cyclic successor: feeds → articles → article → feeds.
    pub fn next(self) -> Pane {
        match self {
            Pane::Feeds => Pane::Articles,
            Pane::Articles => Pane::Article,
            Pane::Article => Pane::Feeds,
        }
    }

    /// Cyclic predecessor.
    pub fn prev(self) -> Pane {
        match self {
            Pane::Feeds => Pane::Article,
            Pane::Articles => Pane::Feeds,
            Pane::Article => Pane::Articles,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JumpTarget {
    Top,
    Bottom,
}

/// A single user intent. Produced at most once per key event; `None` from
/// the interpreter means the key was consumed or ignored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// Move the selection in the current list pane.
    Navigate(Direction),
    /// Jump to the top or bottom of the current pane.
    Jump(JumpTarget),
    /// Activate the selected item.
    Select,
    /// Leave the current pane for its parent.
    Back,
    /// Exit the application.
    Quit,
    /// Refresh the selected feed.
    Refresh,
    /// Refresh every configured feed.
    RefreshAll,
    /// Open the selected item's link in the system browser.
    OpenInBrowser,
    /// Switch focus to a specific pane.
    FocusPane(Pane),
    /// Scroll article content by `amount` lines.
    Scroll(Direction, usize),
    /// Scroll article content by a page.
    PageScroll(Direction),
    OpenCommandPalette,
    CloseCommandPalette,
    /// Append text to the palette query or the focused form field.
    PaletteInput(String),
    /// Delete one character from the palette query or form field.
    PaletteBackspace,
    /// Move the palette result selection or form field focus.
    PaletteNavigate(Direction),
    /// Select the highlighted palette result, or submit the form.
    PaletteSelect,
    /// Request a clipboard paste into the palette (resolved externally).
    PalettePaste,
    /// Run a registered command by id.
    ExecuteCommand(String),
}
