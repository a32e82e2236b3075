//! Keybinding configuration: defaults and per-key user overrides.
//!
//! Bindings are grouped by scope (global plus one group per pane) with a
//! free-form map for named commands. Defaults are always complete; a user
//! override file replaces individual keys and leaves the rest alone.

use std::collections::HashMap;

use serde::Deserialize;

use crate::keys::Keybinding;

/// Bindings active in every pane.
#[derive(Clone, Debug, PartialEq)]
pub struct GlobalBindings {
    pub open_command_palette: Vec<Keybinding>,
    pub leader: Vec<Keybinding>,
    pub quit: Vec<Keybinding>,
    pub force_quit: Vec<Keybinding>,
    pub down: Vec<Keybinding>,
    pub up: Vec<Keybinding>,
    pub jump_top: Vec<Keybinding>,
    pub jump_bottom: Vec<Keybinding>,
    pub next_pane: Vec<Keybinding>,
    pub prev_pane: Vec<Keybinding>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FeedsBindings {
    pub select: Vec<Keybinding>,
    pub refresh: Vec<Keybinding>,
    pub refresh_all: Vec<Keybinding>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ArticlesBindings {
    pub select: Vec<Keybinding>,
    pub back: Vec<Keybinding>,
    pub open_browser: Vec<Keybinding>,
    pub page_down: Vec<Keybinding>,
    pub page_up: Vec<Keybinding>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ArticleBindings {
    pub scroll_down: Vec<Keybinding>,
    pub scroll_up: Vec<Keybinding>,
    pub jump_top: Vec<Keybinding>,
    pub jump_bottom: Vec<Keybinding>,
    pub back: Vec<Keybinding>,
    pub open_browser: Vec<Keybinding>,
    pub page_down: Vec<Keybinding>,
    pub page_up: Vec<Keybinding>,
}

/// The full keybinding table. Loaded once at startup, replaceable at runtime
/// via [`Interpreter::set_keybindings`](crate::Interpreter::set_keybindings).
#[derive(Clone, Debug, PartialEq)]
pub struct KeybindingsConfig {
    pub global: GlobalBindings,
    pub feeds: FeedsBindings,
    pub articles: ArticlesBindings,
    pub article: ArticleBindings,
    /// Named-command bindings, keyed by the command's keybind name.
    pub commands: HashMap<String, Vec<Keybinding>>,
}

// Default binding strings are known-good at compile time; anything that
// failed to parse would simply be absent from the list.
fn bindings(specs: &[&str]) -> Vec<Keybinding> {
    specs.iter().filter_map(|s| Keybinding::parse(s).ok()).collect()
}

impl Default for KeybindingsConfig {
    fn default() -> Self {
        let mut commands = HashMap::new();
        commands.insert("mark-all-read".to_string(), bindings(&["<leader>a"]));
        commands.insert("reload-config".to_string(), bindings(&["<leader>c"]));
        commands.insert("toggle-read".to_string(), bindings(&["<leader>m"]));

        KeybindingsConfig {
            global: GlobalBindings {
                open_command_palette: bindings(&[":", "/"]),
                leader: bindings(&["space"]),
                quit: bindings(&["q"]),
                force_quit: bindings(&["C-c"]),
                down: bindings(&["j", "down"]),
                up: bindings(&["k", "up"]),
                jump_top: bindings(&["gg"]),
                jump_bottom: bindings(&["G"]),
                next_pane: bindings(&["tab"]),
                prev_pane: bindings(&["S-tab"]),
            },
            feeds: FeedsBindings {
                select: bindings(&["enter", "l"]),
                refresh: bindings(&["r"]),
                refresh_all: bindings(&["R"]),
            },
            articles: ArticlesBindings {
                select: bindings(&["enter", "l"]),
                back: bindings(&["h"]),
                open_browser: bindings(&["o"]),
                page_down: bindings(&["C-d", "pagedown"]),
                page_up: bindings(&["C-u", "pageup"]),
            },
            article: ArticleBindings {
                scroll_down: bindings(&["j", "down"]),
                scroll_up: bindings(&["k", "up"]),
                jump_top: bindings(&["gg"]),
                jump_bottom: bindings(&["G"]),
                back: bindings(&["h", "backspace"]),
                open_browser: bindings(&["o"]),
                page_down: bindings(&["C-d", "pagedown"]),
                page_up: bindings(&["C-u", "pageup"]),
            },
            commands,
        }
    }
}

/// Raw per-key override tables as they appear in `config.toml`. Every entry
/// is optional; omitted keys keep their defaults.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KeybindingsOverride {
    pub global: HashMap<String, Vec<String>>,
    pub feeds: HashMap<String, Vec<String>>,
    pub articles: HashMap<String, Vec<String>>,
    pub article: HashMap<String, Vec<String>>,
    pub commands: HashMap<String, Vec<String>>,
}

impl KeybindingsConfig {
    /// Build a config from defaults plus a user override table. Invalid
    /// binding strings and unknown action names produce warnings, never
    /// errors; the affected key keeps its default.
    pub fn with_overrides(overrides: &KeybindingsOverride, warnings: &mut Vec<String>) -> Self {
        let mut config = KeybindingsConfig::default();

        for (name, specs) in &overrides.global {
            let Some(slot) = config.global.slot_mut(name) else {
                warnings.push(format!("Unknown global keybinding '{}'", name));
                continue;
            };
            apply_override("global", name, specs, slot, warnings);
        }
        for (name, specs) in &overrides.feeds {
            let Some(slot) = config.feeds.slot_mut(name) else {
                warnings.push(format!("Unknown feeds keybinding '{}'", name));
                continue;
            };
            apply_override("feeds", name, specs, slot, warnings);
        }
        for (name, specs) in &overrides.articles {
            let Some(slot) = config.articles.slot_mut(name) else {
                warnings.push(format!("Unknown articles keybinding '{}'", name));
                continue;
            };
            apply_override("articles", name, specs, slot, warnings);
        }
        for (name, specs) in &overrides.article {
            let Some(slot) = config.article.slot_mut(name) else {
                warnings.push(format!("Unknown article keybinding '{}'", name));
                continue;
            };
            apply_override("article", name, specs, slot, warnings);
        }
        for (name, specs) in &overrides.commands {
            let mut parsed = Vec::new();
            apply_override("commands", name, specs, &mut parsed, warnings);
            if !parsed.is_empty() {
                config.commands.insert(name.clone(), parsed);
            }
        }

        config
    }
}

fn apply_override(
    scope: &str,
    name: &str,
    specs: &[String],
    slot: &mut Vec<Keybinding>,
    warnings: &mut Vec<String>,
) {
    let mut parsed = Vec::new();
    for spec in specs {
        match Keybinding::parse(spec) {
            Ok(binding) => parsed.push(binding),
            Err(err) => warnings.push(format!(
                "Invalid key '{}' in {} binding '{}': {}",
                spec, scope, name, err
            )),
        }
    }
    // An override that parses to nothing keeps the default.
    if !parsed.is_empty() {
        *slot = parsed;
    }
}

impl GlobalBindings {
    fn slot_mut(&mut self, name: &str) -> Option<&mut Vec<Keybinding>> {
        match name {
            "open_command_palette" => Some(&mut self.open_command_palette),
            "leader" => Some(&mut self.leader),
            "quit" => Some(&mut self.quit),
            "force_quit" => Some(&mut self.force_quit),
            "down" => Some(&mut self.down),
            "up" => Some(&mut self.up),
            "jump_top" => Some(&mut self.jump_top),
            "jump_bottom" => Some(&mut self.jump_bottom),
            "next_pane" => Some(&mut self.next_pane),
            "prev_pane" => Some(&mut self.prev_pane),
            _ => None,
        }
    }
}

impl FeedsBindings {
    fn slot_mut(&mut self, name: &str) -> Option<&mut Vec<Keybinding>> {
        match name {
            "select" => Some(&mut self.select),
            "refresh" => Some(&mut self.refresh),
            "refresh_all" => Some(&mut self.refresh_all),
            _ => None,
        }
    }
}

impl ArticlesBindings {
    fn slot_mut(&mut self, name: &str) -> Option<&mut Vec<Keybinding>> {
        match name {
            "select" => Some(&mut self.select),
            "back" => Some(&mut self.back),
            "open_browser" => Some(&mut self.open_browser),
            "page_down" => Some(&mut self.page_down),
            "page_up" => Some(&mut self.page_up),
            _ => None,
        }
    }
}

impl ArticleBindings {
    fn slot_mut(&mut self, name: &str) -> Option<&mut Vec<Keybinding>> {
        match name {
            "scroll_down" => Some(&mut self.scroll_down),
            "scroll_up" => Some(&mut self.scroll_up),
            "jump_top" => Some(&mut self.jump_top),
            "jump_bottom" => Some(&mut self.jump_bottom),
            "back" => Some(&mut self.back),
            "open_browser" => Some(&mut self.open_browser),
            "page_down" => Some(&mut self.page_down),
            "page_up" => Some(&mut self.page_up),
            _ => None,
        }
    }
}
