//! The keybinding state machine.
//!
//! Translates a stream of key events, given the current pane and mode flags,
//! into at most one [`Action`] per event. Owns the transient state that makes
//! multi-key input work: the pending `gg` sequence and the leader-key window,
//! both tracked as monotonic deadlines checked on the next relevant event
//! rather than background timers, so the whole machine stays single-threaded.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::actions::{Action, Direction, JumpTarget, Pane};
use crate::bindings::KeybindingsConfig;
use crate::commands::CommandRegistry;
use crate::keys::{KeyInput, has_sequence, matches_any};

/// How long a lone `g` stays armed waiting for the second `g`.
pub const PENDING_SEQUENCE_TIMEOUT: Duration = Duration::from_millis(500);
/// How long the leader window stays armed after the leader key.
pub const LEADER_TIMEOUT: Duration = Duration::from_millis(2000);

/// Stateful key-event interpreter. One instance per UI session.
#[derive(Debug)]
pub struct Interpreter {
    bindings: KeybindingsConfig,
    registry: Arc<CommandRegistry>,
    pane: Pane,
    palette_mode: bool,
    form_mode: bool,
    /// Deadline until which a first `g` counts toward `gg`.
    pending_g: Option<Instant>,
    /// Deadline until which leader-gated bindings may match.
    leader_until: Option<Instant>,
}

impl Interpreter {
    pub fn new(bindings: KeybindingsConfig, registry: Arc<CommandRegistry>) -> Self {
        Interpreter {
            bindings,
            registry,
            pane: Pane::Feeds,
            palette_mode: false,
            form_mode: false,
            pending_g: None,
            leader_until: None,
        }
    }

    pub fn pane(&self) -> Pane {
        self.pane
    }

    /// Switch the active navigation context. Changing screens mid-sequence
    /// cancels a pending `gg`.
    pub fn set_pane(&mut self, pane: Pane) {
        if pane != self.pane {
            tracing::trace!(?pane, "pane changed");
        }
        self.pane = pane;
        self.pending_g = None;
    }

    /// Enter or exit palette routing. Entering clears leader state; exiting
    /// also leaves form mode.
    pub fn set_command_palette_mode(&mut self, active: bool) {
        self.palette_mode = active;
        self.leader_until = None;
        if !active {
            self.form_mode = false;
        }
    }

    pub fn command_palette_mode(&self) -> bool {
        self.palette_mode
    }

    /// Toggle whether palette input is routed to a form instead of the
    /// search query.
    pub fn set_form_mode(&mut self, active: bool) {
        self.form_mode = active;
    }

    pub fn form_mode(&self) -> bool {
        self.form_mode
    }

    /// Hot-swap the active keybinding table. Clears pending sequences.
    pub fn set_keybindings(&mut self, bindings: KeybindingsConfig) {
        self.bindings = bindings;
        self.pending_g = None;
        self.leader_until = None;
    }

    /// Core dispatch: map one key event to at most one action. Total over
    /// (state, event) — unrecognized or malformed input simply matches
    /// nothing and yields `None`.
    pub fn handle_key(&mut self, event: &KeyInput) -> Option<Action> {
        self.handle_key_at(event, Instant::now())
    }

    /// Dispatch with an explicit clock, so sequence and leader expiry are
    /// deterministic under test.
    pub fn handle_key_at(&mut self, event: &KeyInput, now: Instant) -> Option<Action> {
        // Expired deadlines silently revert to the non-special state.
        if self.pending_g.is_some_and(|deadline| now >= deadline) {
            tracing::trace!("pending g expired");
            self.pending_g = None;
        }
        if self.leader_until.is_some_and(|deadline| now >= deadline) {
            tracing::trace!("leader window expired");
            self.leader_until = None;
        }
        let leader_armed = self.leader_until.is_some();
        let global = &self.bindings.global;

        // 1. Palette-open wins over everything outside palette/leader state.
        if !self.palette_mode
            && !leader_armed
            && matches_any(&global.open_command_palette, event, false)
        {
            return Some(Action::OpenCommandPalette);
        }

        // 2. Palette mode routes everything itself.
        if self.palette_mode {
            return self.handle_palette_key(event);
        }

        // 3. Arm the leader window.
        if !leader_armed && matches_any(&global.leader, event, false) {
            tracing::debug!("leader armed");
            self.leader_until = Some(now + LEADER_TIMEOUT);
            self.pending_g = None;
            return None;
        }

        // 4. Named commands, scanned in both states; leader gating lives in
        // the binding match itself.
        if let Some(id) = self.match_command(event, leader_armed) {
            self.leader_until = None;
            return Some(Action::ExecuteCommand(id));
        }

        // 5. Any non-matching key while armed cancels leader mode.
        if leader_armed {
            tracing::debug!("leader canceled");
            self.leader_until = None;
            return None;
        }

        // 6. The gg sequence, when jump-to-top is configured as one.
        let wants_sequence = has_sequence(&global.jump_top)
            || (self.pane == Pane::Article && has_sequence(&self.bindings.article.jump_top));
        if wants_sequence
            && event.name == "g"
            && !event.ctrl
            && !event.meta
            && !event.shift
        {
            if self.pending_g.take().is_some() {
                return Some(Action::Jump(JumpTarget::Top));
            }
            self.pending_g = Some(now + PENDING_SEQUENCE_TIMEOUT);
            return None;
        }

        // 7. Any other key cancels a pending g.
        self.pending_g = None;

        // 8. Quit un-nests before exiting.
        if matches_any(&global.quit, event, false) {
            return Some(match self.pane {
                Pane::Article => Action::Back,
                Pane::Articles => Action::FocusPane(Pane::Feeds),
                Pane::Feeds => Action::Quit,
            });
        }

        // 9. Force quit is unconditional.
        if matches_any(&global.force_quit, event, false) {
            return Some(Action::Quit);
        }

        // 10. Navigation; the article pane scrolls instead of moving a
        // selection.
        if matches_any(&global.down, event, false) {
            if self.pane == Pane::Article
                && matches_any(&self.bindings.article.scroll_down, event, false)
            {
                return Some(Action::Scroll(Direction::Down, 1));
            }
            return Some(Action::Navigate(Direction::Down));
        }
        if matches_any(&global.up, event, false) {
            if self.pane == Pane::Article
                && matches_any(&self.bindings.article.scroll_up, event, false)
            {
                return Some(Action::Scroll(Direction::Up, 1));
            }
            return Some(Action::Navigate(Direction::Up));
        }

        // 11. Jump to bottom.
        if matches_any(&global.jump_bottom, event, false)
            || (self.pane == Pane::Article
                && matches_any(&self.bindings.article.jump_bottom, event, false))
        {
            return Some(Action::Jump(JumpTarget::Bottom));
        }

        // 12. Remaining pane-specific bindings; first match wins.
        self.handle_pane_key(event)
    }

    fn match_command(&self, event: &KeyInput, leader_armed: bool) -> Option<String> {
        for command in self.registry.iter() {
            if !command.is_enabled() || !command.allowed_in(self.pane) {
                continue;
            }
            let Some(keybind) = &command.keybind else {
                continue;
            };
            let Some(binds) = self.bindings.commands.get(keybind) else {
                continue;
            };
            if matches_any(binds, event, leader_armed) {
                tracing::debug!(id = %command.id, "command keybinding matched");
                return Some(command.id.clone());
            }
        }
        None
    }

    fn handle_pane_key(&self, event: &KeyInput) -> Option<Action> {
        let global = &self.bindings.global;
        match self.pane {
            Pane::Feeds => {
                let feeds = &self.bindings.feeds;
                if matches_any(&feeds.select, event, false) {
                    return Some(Action::Select);
                }
                if matches_any(&feeds.refresh, event, false) {
                    return Some(Action::Refresh);
                }
                if matches_any(&feeds.refresh_all, event, false) {
                    return Some(Action::RefreshAll);
                }
            }
            Pane::Articles => {
                let articles = &self.bindings.articles;
                if matches_any(&articles.select, event, false) {
                    return Some(Action::Select);
                }
                if matches_any(&articles.back, event, false) {
                    return Some(Action::Back);
                }
                if matches_any(&articles.open_browser, event, false) {
                    return Some(Action::OpenInBrowser);
                }
                if matches_any(&articles.page_down, event, false) {
                    return Some(Action::PageScroll(Direction::Down));
                }
                if matches_any(&articles.page_up, event, false) {
                    return Some(Action::PageScroll(Direction::Up));
                }
            }
            Pane::Article => {
                let article = &self.bindings.article;
                if matches_any(&article.scroll_down, event, false) {
                    return Some(Action::Scroll(Direction::Down, 1));
                }
                if matches_any(&article.scroll_up, event, false) {
                    return Some(Action::Scroll(Direction::Up, 1));
                }
                if matches_any(&article.back, event, false) {
                    return Some(Action::Back);
                }
                if matches_any(&article.open_browser, event, false) {
                    return Some(Action::OpenInBrowser);
                }
                if matches_any(&article.page_down, event, false) {
                    return Some(Action::PageScroll(Direction::Down));
                }
                if matches_any(&article.page_up, event, false) {
                    return Some(Action::PageScroll(Direction::Up));
                }
            }
        }
        if matches_any(&global.next_pane, event, false) {
            return Some(Action::FocusPane(self.pane.next()));
        }
        if matches_any(&global.prev_pane, event, false) {
            return Some(Action::FocusPane(self.pane.prev()));
        }
        None
    }

    /// Palette routing: escape always closes; otherwise form mode routes to
    /// field editing and search mode to query editing plus list navigation.
    fn handle_palette_key(&self, event: &KeyInput) -> Option<Action> {
        if event.name == "escape" {
            return Some(Action::CloseCommandPalette);
        }

        if self.form_mode {
            return match event.name.as_str() {
                "tab" => Some(Action::PaletteNavigate(if event.shift {
                    Direction::Up
                } else {
                    Direction::Down
                })),
                "up" => Some(Action::PaletteNavigate(Direction::Up)),
                "down" => Some(Action::PaletteNavigate(Direction::Down)),
                "return" | "linefeed" => Some(Action::PaletteSelect),
                "backspace" => Some(Action::PaletteBackspace),
                _ => {
                    // Field input keeps only printable ASCII from the event.
                    let text = event.text()?;
                    let filtered: String =
                        text.chars().filter(|c| (' '..='~').contains(c)).collect();
                    if filtered.is_empty() {
                        None
                    } else {
                        Some(Action::PaletteInput(filtered))
                    }
                }
            };
        }

        // Search mode.
        if event.name == "tab" {
            return Some(Action::PaletteNavigate(if event.shift {
                Direction::Up
            } else {
                Direction::Down
            }));
        }
        if !event.ctrl && !event.meta {
            match event.name.as_str() {
                "up" | "k" => return Some(Action::PaletteNavigate(Direction::Up)),
                "down" | "j" => return Some(Action::PaletteNavigate(Direction::Down)),
                _ => {}
            }
        }
        match event.name.as_str() {
            "return" | "linefeed" => return Some(Action::PaletteSelect),
            "backspace" => return Some(Action::PaletteBackspace),
            "v" if event.ctrl || event.meta => return Some(Action::PalettePaste),
            "y" if event.ctrl => return Some(Action::PalettePaste),
            _ => {}
        }
        // Query input. A sequence containing any non-printable byte is a
        // stray escape code, not text; reject the whole event.
        let text = event.text()?;
        if text.is_empty() || text.chars().any(|c| !(' '..='~').contains(&c)) {
            return None;
        }
        Some(Action::PaletteInput(text.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command;

    fn interpreter() -> Interpreter {
        Interpreter::new(KeybindingsConfig::default(), Arc::new(CommandRegistry::new()))
    }

    fn interpreter_with(registry: CommandRegistry) -> Interpreter {
        Interpreter::new(KeybindingsConfig::default(), Arc::new(registry))
    }

    #[test]
    fn gg_within_window_jumps_to_top() {
        let mut interp = interpreter();
        let start = Instant::now();
        assert_eq!(interp.handle_key_at(&KeyInput::key("g"), start), None);
        assert_eq!(
            interp.handle_key_at(&KeyInput::key("g"), start + Duration::from_millis(100)),
            Some(Action::Jump(JumpTarget::Top))
        );
    }

    #[test]
    fn gg_after_timeout_rearms_instead_of_jumping() {
        let mut interp = interpreter();
        let start = Instant::now();
        assert_eq!(interp.handle_key_at(&KeyInput::key("g"), start), None);
        // Second g arrives after the 500ms window: it arms a fresh sequence.
        assert_eq!(
            interp.handle_key_at(&KeyInput::key("g"), start + Duration::from_millis(600)),
            None
        );
        assert_eq!(
            interp.handle_key_at(&KeyInput::key("g"), start + Duration::from_millis(700)),
            Some(Action::Jump(JumpTarget::Top))
        );
    }

    #[test]
    fn other_key_cancels_pending_g() {
        let mut interp = interpreter();
        let start = Instant::now();
        assert_eq!(interp.handle_key_at(&KeyInput::key("g"), start), None);
        // j cancels the sequence (and navigates).
        assert_eq!(
            interp.handle_key_at(&KeyInput::key("j"), start + Duration::from_millis(10)),
            Some(Action::Navigate(Direction::Down))
        );
        assert_eq!(
            interp.handle_key_at(&KeyInput::key("g"), start + Duration::from_millis(20)),
            None
        );
    }

    #[test]
    fn set_pane_cancels_pending_g() {
        let mut interp = interpreter();
        let start = Instant::now();
        assert_eq!(interp.handle_key_at(&KeyInput::key("g"), start), None);
        interp.set_pane(Pane::Articles);
        assert_eq!(
            interp.handle_key_at(&KeyInput::key("g"), start + Duration::from_millis(10)),
            None
        );
    }

    #[test]
    fn quit_is_context_sensitive() {
        let mut interp = interpreter();
        interp.set_pane(Pane::Article);
        assert_eq!(interp.handle_key(&KeyInput::key("q")), Some(Action::Back));
        interp.set_pane(Pane::Articles);
        assert_eq!(
            interp.handle_key(&KeyInput::key("q")),
            Some(Action::FocusPane(Pane::Feeds))
        );
        interp.set_pane(Pane::Feeds);
        assert_eq!(interp.handle_key(&KeyInput::key("q")), Some(Action::Quit));
    }

    #[test]
    fn force_quit_ignores_pane() {
        let mut interp = interpreter();
        interp.set_pane(Pane::Article);
        assert_eq!(
            interp.handle_key(&KeyInput::key("c").with_ctrl()),
            Some(Action::Quit)
        );
    }

    #[test]
    fn navigation_becomes_scroll_in_article_pane() {
        let mut interp = interpreter();
        assert_eq!(
            interp.handle_key(&KeyInput::key("j")),
            Some(Action::Navigate(Direction::Down))
        );
        interp.set_pane(Pane::Article);
        assert_eq!(
            interp.handle_key(&KeyInput::key("j")),
            Some(Action::Scroll(Direction::Down, 1))
        );
        assert_eq!(
            interp.handle_key(&KeyInput::key("k")),
            Some(Action::Scroll(Direction::Up, 1))
        );
    }

    #[test]
    fn jump_bottom_from_capital_g() {
        let mut interp = interpreter();
        assert_eq!(
            interp.handle_key(&KeyInput::key("G")),
            Some(Action::Jump(JumpTarget::Bottom))
        );
    }

    #[test]
    fn palette_open_binding_emits_action() {
        let mut interp = interpreter();
        assert_eq!(
            interp.handle_key(&KeyInput::key(":")),
            Some(Action::OpenCommandPalette)
        );
    }

    #[test]
    fn leader_command_requires_armed_window() {
        let mut registry = CommandRegistry::new();
        registry.register(
            Command::new("mark-all-read", "Mark all read", "").with_keybind("mark-all-read"),
        );
        let mut interp = interpreter_with(registry);

        // Bare a does nothing: the binding is leader-gated.
        assert_eq!(interp.handle_key(&KeyInput::key("a")), None);

        let start = Instant::now();
        assert_eq!(interp.handle_key_at(&KeyInput::key(" "), start), None);
        assert_eq!(
            interp.handle_key_at(&KeyInput::key("a"), start + Duration::from_millis(200)),
            Some(Action::ExecuteCommand("mark-all-read".to_string()))
        );
    }

    #[test]
    fn leader_window_expires_after_timeout() {
        let mut registry = CommandRegistry::new();
        registry.register(
            Command::new("mark-all-read", "Mark all read", "").with_keybind("mark-all-read"),
        );
        let mut interp = interpreter_with(registry);

        let start = Instant::now();
        assert_eq!(interp.handle_key_at(&KeyInput::key(" "), start), None);
        // Past the 2000ms window the a key matches nothing.
        assert_eq!(
            interp.handle_key_at(&KeyInput::key("a"), start + Duration::from_millis(2500)),
            None
        );
    }

    #[test]
    fn non_matching_key_cancels_leader() {
        let mut registry = CommandRegistry::new();
        registry.register(
            Command::new("mark-all-read", "Mark all read", "").with_keybind("mark-all-read"),
        );
        let mut interp = interpreter_with(registry);

        let start = Instant::now();
        assert_eq!(interp.handle_key_at(&KeyInput::key(" "), start), None);
        // x matches no command binding: leader cancels, nothing is emitted.
        assert_eq!(
            interp.handle_key_at(&KeyInput::key("x"), start + Duration::from_millis(100)),
            None
        );
        // And the window really is gone.
        assert_eq!(
            interp.handle_key_at(&KeyInput::key("a"), start + Duration::from_millis(200)),
            None
        );
    }

    #[test]
    fn disabled_command_never_matches() {
        let mut registry = CommandRegistry::new();
        registry.register(
            Command::new("mark-all-read", "Mark all read", "")
                .with_keybind("mark-all-read")
                .disabled_when(|| true),
        );
        let mut interp = interpreter_with(registry);

        let start = Instant::now();
        assert_eq!(interp.handle_key_at(&KeyInput::key(" "), start), None);
        assert_eq!(
            interp.handle_key_at(&KeyInput::key("a"), start + Duration::from_millis(100)),
            None
        );
    }

    #[test]
    fn pane_restricted_command_only_matches_in_its_pane() {
        let mut registry = CommandRegistry::new();
        registry.register(
            Command::new("toggle-read", "Toggle read", "")
                .with_keybind("toggle-read")
                .for_pane(Pane::Articles),
        );
        let mut interp = interpreter_with(registry);

        let start = Instant::now();
        assert_eq!(interp.handle_key_at(&KeyInput::key(" "), start), None);
        assert_eq!(
            interp.handle_key_at(&KeyInput::key("m"), start + Duration::from_millis(50)),
            None
        );

        interp.set_pane(Pane::Articles);
        let later = start + Duration::from_millis(500);
        assert_eq!(interp.handle_key_at(&KeyInput::key(" "), later), None);
        assert_eq!(
            interp.handle_key_at(&KeyInput::key("m"), later + Duration::from_millis(50)),
            Some(Action::ExecuteCommand("toggle-read".to_string()))
        );
    }

    #[test]
    fn palette_escape_always_closes() {
        let mut interp = interpreter();
        interp.set_command_palette_mode(true);
        assert_eq!(
            interp.handle_key(&KeyInput::key("escape")),
            Some(Action::CloseCommandPalette)
        );
        interp.set_form_mode(true);
        assert_eq!(
            interp.handle_key(&KeyInput::key("escape")),
            Some(Action::CloseCommandPalette)
        );
    }

    #[test]
    fn palette_search_navigation_keys() {
        let mut interp = interpreter();
        interp.set_command_palette_mode(true);
        assert_eq!(
            interp.handle_key(&KeyInput::key("tab")),
            Some(Action::PaletteNavigate(Direction::Down))
        );
        assert_eq!(
            interp.handle_key(&KeyInput::key("tab").with_shift()),
            Some(Action::PaletteNavigate(Direction::Up))
        );
        assert_eq!(
            interp.handle_key(&KeyInput::key("j")),
            Some(Action::PaletteNavigate(Direction::Down))
        );
        assert_eq!(
            interp.handle_key(&KeyInput::key("k")),
            Some(Action::PaletteNavigate(Direction::Up))
        );
        assert_eq!(
            interp.handle_key(&KeyInput::key("down")),
            Some(Action::PaletteNavigate(Direction::Down))
        );
        assert_eq!(
            interp.handle_key(&KeyInput::key("return")),
            Some(Action::PaletteSelect)
        );
    }

    #[test]
    fn palette_search_text_input() {
        let mut interp = interpreter();
        interp.set_command_palette_mode(true);
        assert_eq!(
            interp.handle_key(&KeyInput::key("a")),
            Some(Action::PaletteInput("a".to_string()))
        );
        // Multi-character paste-like sequences are query input too.
        assert_eq!(
            interp.handle_key(&KeyInput::sequence("rust blog")),
            Some(Action::PaletteInput("rust blog".to_string()))
        );
    }

    #[test]
    fn palette_rejects_sequences_with_escape_bytes() {
        let mut interp = interpreter();
        interp.set_command_palette_mode(true);
        assert_eq!(interp.handle_key(&KeyInput::sequence("\x1b[200~junk")), None);
    }

    #[test]
    fn palette_paste_combos() {
        let mut interp = interpreter();
        interp.set_command_palette_mode(true);
        assert_eq!(
            interp.handle_key(&KeyInput::key("v").with_ctrl()),
            Some(Action::PalettePaste)
        );
        assert_eq!(
            interp.handle_key(&KeyInput::key("v").with_meta()),
            Some(Action::PalettePaste)
        );
        assert_eq!(
            interp.handle_key(&KeyInput::key("y").with_ctrl()),
            Some(Action::PalettePaste)
        );
    }

    #[test]
    fn form_mode_filters_input_to_printable_ascii() {
        let mut interp = interpreter();
        interp.set_command_palette_mode(true);
        interp.set_form_mode(true);
        assert_eq!(
            interp.handle_key(&KeyInput::sequence("ab\x1bcd")),
            Some(Action::PaletteInput("abcd".to_string()))
        );
        assert_eq!(interp.handle_key(&KeyInput::sequence("\x01\x02")), None);
    }

    #[test]
    fn form_mode_tab_and_return_navigate_and_submit() {
        let mut interp = interpreter();
        interp.set_command_palette_mode(true);
        interp.set_form_mode(true);
        assert_eq!(
            interp.handle_key(&KeyInput::key("tab")),
            Some(Action::PaletteNavigate(Direction::Down))
        );
        assert_eq!(
            interp.handle_key(&KeyInput::key("tab").with_shift()),
            Some(Action::PaletteNavigate(Direction::Up))
        );
        assert_eq!(
            interp.handle_key(&KeyInput::key("linefeed")),
            Some(Action::PaletteSelect)
        );
        // j is field text in form mode, not navigation.
        assert_eq!(
            interp.handle_key(&KeyInput::key("j")),
            Some(Action::PaletteInput("j".to_string()))
        );
    }

    #[test]
    fn exiting_palette_clears_form_mode() {
        let mut interp = interpreter();
        interp.set_command_palette_mode(true);
        interp.set_form_mode(true);
        interp.set_command_palette_mode(false);
        assert!(!interp.form_mode());
    }

    #[test]
    fn set_keybindings_clears_pending_state() {
        let mut interp = interpreter();
        let start = Instant::now();
        assert_eq!(interp.handle_key_at(&KeyInput::key("g"), start), None);
        interp.set_keybindings(KeybindingsConfig::default());
        assert_eq!(
            interp.handle_key_at(&KeyInput::key("g"), start + Duration::from_millis(10)),
            None
        );
    }

    #[test]
    fn unrecognized_events_are_a_no_op() {
        let mut interp = interpreter();
        assert_eq!(interp.handle_key(&KeyInput::key("f13")), None);
        assert_eq!(interp.handle_key(&KeyInput::default()), None);
    }
}
