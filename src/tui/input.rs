//! Terminal event loop and key event conversion.

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::prelude::*;
use std::io;

use tidings_core::KeyInput;

use super::actions::ApplyResult;
use super::app::App;
use super::ui;

pub fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        match event::read()? {
            Event::Key(key) => {
                // Only process key press events (Windows reports Press + Release)
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                let Some(input) = key_to_input(key) else {
                    continue;
                };
                if app.handle_key(&input) == ApplyResult::Quit {
                    return Ok(());
                }
            }
            // Bracketed paste arrives as one multi-character sequence.
            Event::Paste(text) => {
                if app.handle_key(&KeyInput::sequence(&text)) == ApplyResult::Quit {
                    return Ok(());
                }
            }
            _ => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

/// Convert a crossterm key event into the interpreter's key shape. Keys the
/// reader has no use for map to `None` and are dropped before dispatch.
pub(crate) fn key_to_input(key: KeyEvent) -> Option<KeyInput> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let meta = key.modifiers.contains(KeyModifiers::ALT);
    let mut shift = key.modifiers.contains(KeyModifiers::SHIFT);

    let (name, sequence) = match key.code {
        KeyCode::Char(c) => (c.to_string(), c.to_string()),
        KeyCode::Enter => ("return".to_string(), String::new()),
        KeyCode::Esc => ("escape".to_string(), String::new()),
        KeyCode::Tab => ("tab".to_string(), String::new()),
        KeyCode::BackTab => {
            shift = true;
            ("tab".to_string(), String::new())
        }
        KeyCode::Backspace => ("backspace".to_string(), String::new()),
        KeyCode::Delete => ("delete".to_string(), String::new()),
        KeyCode::Up => ("up".to_string(), String::new()),
        KeyCode::Down => ("down".to_string(), String::new()),
        KeyCode::Left => ("left".to_string(), String::new()),
        KeyCode::Right => ("right".to_string(), String::new()),
        KeyCode::Home => ("home".to_string(), String::new()),
        KeyCode::End => ("end".to_string(), String::new()),
        KeyCode::PageUp => ("pageup".to_string(), String::new()),
        KeyCode::PageDown => ("pagedown".to_string(), String::new()),
        KeyCode::F(n) => (format!("f{}", n), String::new()),
        _ => return None,
    };

    Some(KeyInput {
        name,
        sequence,
        ctrl,
        meta,
        shift,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn printable_chars_carry_their_sequence() {
        let input = key_to_input(press(KeyCode::Char('j'), KeyModifiers::NONE)).unwrap();
        assert_eq!(input.name, "j");
        assert_eq!(input.sequence, "j");
        assert!(!input.ctrl && !input.meta && !input.shift);
    }

    #[test]
    fn uppercase_chars_keep_the_shift_flag() {
        let input = key_to_input(press(KeyCode::Char('G'), KeyModifiers::SHIFT)).unwrap();
        assert_eq!(input.name, "G");
        assert!(input.shift);
    }

    #[test]
    fn enter_maps_to_return() {
        let input = key_to_input(press(KeyCode::Enter, KeyModifiers::NONE)).unwrap();
        assert_eq!(input.name, "return");
        assert!(input.sequence.is_empty());
    }

    #[test]
    fn backtab_is_shift_tab() {
        let input = key_to_input(press(KeyCode::BackTab, KeyModifiers::NONE)).unwrap();
        assert_eq!(input.name, "tab");
        assert!(input.shift);
    }

    #[test]
    fn control_modifier_survives_conversion() {
        let input = key_to_input(press(KeyCode::Char('c'), KeyModifiers::CONTROL)).unwrap();
        assert_eq!(input.name, "c");
        assert!(input.ctrl);
    }

    #[test]
    fn unused_keys_are_dropped() {
        assert!(key_to_input(press(KeyCode::Insert, KeyModifiers::NONE)).is_none());
        assert!(key_to_input(press(KeyCode::CapsLock, KeyModifiers::NONE)).is_none());
    }
}
