//! Key events and keybinding strings.
//!
//! A [`KeyInput`] is one observed keystroke as the terminal reported it; a
//! [`Keybinding`] is one parsed configuration string. Matching the two is the
//! only place terminal quirks (shifted letters without a shift flag, the two
//! names for the return key) are smoothed over.

/// A single observed keystroke.
///
/// `name` is the logical key name (e.g. `"j"`, `"return"`, `"tab"`);
/// `sequence` carries the raw characters for printable or pasted input.
/// Ephemeral: exists only for the duration of one dispatch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyInput {
    pub name: String,
    pub sequence: String,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
}

impl KeyInput {
    /// A plain key press with no modifiers. Single-character names also fill
    /// in the raw sequence, as terminals do for printable keys.
    pub fn key(name: &str) -> Self {
        let sequence = if name.chars().count() == 1 {
            name.to_string()
        } else {
            String::new()
        };
        KeyInput {
            name: name.to_string(),
            sequence,
            ctrl: false,
            meta: false,
            shift: false,
        }
    }

    /// A pasted or multi-character raw sequence with no logical name.
    pub fn sequence(seq: &str) -> Self {
        KeyInput {
            name: String::new(),
            sequence: seq.to_string(),
            ctrl: false,
            meta: false,
            shift: false,
        }
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn with_meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    /// The printable text carried by this event, if any: the raw sequence
    /// when present, otherwise a single-character name. Modified keys carry
    /// no text.
    pub fn text(&self) -> Option<&str> {
        if self.ctrl || self.meta {
            return None;
        }
        if !self.sequence.is_empty() {
            return Some(&self.sequence);
        }
        if self.name.chars().count() == 1 {
            return Some(&self.name);
        }
        None
    }
}

/// One parsed keybinding configuration string.
///
/// Invariant: exactly one parsed form per string. A chord is an optional
/// `<leader>` prefix, an optional `C-`/`M-`/`S-` modifier, and a key token;
/// the literal string `"gg"` parses to the two-key jump-to-top sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Keybinding {
    Chord(Chord),
    /// The `gg` two-key sequence; matched statefully by the interpreter, not
    /// against single events.
    GotoSequence,
}

/// A single physical chord.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chord {
    /// Only matches while leader mode is armed.
    pub leader: bool,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    /// Canonical key token: a single character or a lowercase key name.
    pub key: String,
}

impl Keybinding {
    /// Parse a configuration string. Errors are plain strings collected as
    /// warnings by the config loader; an invalid binding is never fatal.
    pub fn parse(input: &str) -> Result<Keybinding, String> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err("empty keybinding".to_string());
        }
        if trimmed == "gg" {
            return Ok(Keybinding::GotoSequence);
        }

        let (leader, rest) = match trimmed.strip_prefix("<leader>") {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        if rest.is_empty() {
            return Err("missing key after <leader>".to_string());
        }

        let (ctrl, meta, shift, key_part) = if let Some(k) = rest.strip_prefix("C-") {
            (true, false, false, k)
        } else if let Some(k) = rest.strip_prefix("M-") {
            (false, true, false, k)
        } else if let Some(k) = rest.strip_prefix("S-") {
            (false, false, true, k)
        } else {
            (false, false, false, rest)
        };

        let key = parse_key_token(key_part)?;
        Ok(Keybinding::Chord(Chord {
            leader,
            ctrl,
            meta,
            shift,
            key,
        }))
    }

    /// Whether this binding matches a key event, given the current
    /// leader-armed state.
    pub fn matches(&self, event: &KeyInput, leader_armed: bool) -> bool {
        match self {
            // Sequences are driven by interpreter state, never by one event.
            Keybinding::GotoSequence => false,
            Keybinding::Chord(chord) => chord.matches(event, leader_armed),
        }
    }

    /// Human-readable form for help text and status lines.
    pub fn display(&self) -> String {
        match self {
            Keybinding::GotoSequence => "gg".to_string(),
            Keybinding::Chord(chord) => {
                let mut out = String::new();
                if chord.leader {
                    out.push_str("<leader>");
                }
                if chord.ctrl {
                    out.push_str("C-");
                }
                if chord.meta {
                    out.push_str("M-");
                }
                if chord.shift {
                    out.push_str("S-");
                }
                out.push_str(&chord.key);
                out
            }
        }
    }
}

impl Chord {
    fn matches(&self, event: &KeyInput, leader_armed: bool) -> bool {
        // Leader-gated bindings only match while armed, and vice versa.
        if self.leader != leader_armed {
            return false;
        }
        if self.ctrl != event.ctrl || self.meta != event.meta {
            return false;
        }
        match self.key.as_str() {
            // Terminals report the return key as either name.
            "enter" => event.name == "return" || event.name == "linefeed",
            ":" => event.name == ":" || event.sequence == ":",
            key if is_upper_letter(key) => {
                // Shifted letters may arrive without a separate shift flag.
                event.name == key || event.sequence == key
            }
            key => self.shift == event.shift && event.name == key,
        }
    }
}

fn is_upper_letter(key: &str) -> bool {
    let mut chars = key.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if c.is_ascii_uppercase())
}

fn parse_key_token(input: &str) -> Result<String, String> {
    let mut chars = input.chars();
    if let (Some(ch), None) = (chars.next(), chars.next()) {
        return Ok(ch.to_string());
    }
    let norm = input.to_ascii_lowercase();
    match norm.as_str() {
        "enter" | "return" => Ok("enter".to_string()),
        "esc" | "escape" => Ok("escape".to_string()),
        "tab" => Ok("tab".to_string()),
        "backspace" => Ok("backspace".to_string()),
        "delete" => Ok("delete".to_string()),
        "space" | "spc" => Ok(" ".to_string()),
        "up" => Ok("up".to_string()),
        "down" => Ok("down".to_string()),
        "left" => Ok("left".to_string()),
        "right" => Ok("right".to_string()),
        "home" => Ok("home".to_string()),
        "end" => Ok("end".to_string()),
        "pageup" => Ok("pageup".to_string()),
        "pagedown" => Ok("pagedown".to_string()),
        _ => Err(format!("unknown key '{}'", input)),
    }
}

/// True iff at least one binding in the list structurally matches the event.
/// Order of bindings never affects the result.
pub fn matches_any(bindings: &[Keybinding], event: &KeyInput, leader_armed: bool) -> bool {
    bindings.iter().any(|b| b.matches(event, leader_armed))
}

/// Whether a binding list declares the `gg` jump sequence.
pub fn has_sequence(bindings: &[Keybinding]) -> bool {
    bindings.iter().any(|b| *b == Keybinding::GotoSequence)
}
