//! Command metadata and the registry the interpreter and searcher consume.
//!
//! A command is a named, describable unit the orchestrator knows how to run;
//! the registry is a plain keyed collection passed explicitly to whoever
//! needs it. Execution stays with the orchestrator, which dispatches on the
//! command id carried by [`Action::ExecuteCommand`](crate::Action).

use std::collections::HashMap;
use std::fmt;

use crate::actions::Pane;

type DisabledFn = Box<dyn Fn() -> bool + Send + Sync>;

/// One registered command.
pub struct Command {
    /// Stable id the orchestrator dispatches on.
    pub id: String,
    /// Display name shown in the palette.
    pub name: String,
    pub description: String,
    /// Name in the keybinding config's command map, if bound to a key.
    pub keybind: Option<String>,
    /// Restricts the command to one pane; `None` means every pane.
    pub pane: Option<Pane>,
    /// Evaluated at dispatch/filter time; `None` means always enabled.
    disabled_when: Option<DisabledFn>,
}

impl Command {
    pub fn new(id: &str, name: &str, description: &str) -> Self {
        Command {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            keybind: None,
            pane: None,
            disabled_when: None,
        }
    }

    pub fn with_keybind(mut self, name: &str) -> Self {
        self.keybind = Some(name.to_string());
        self
    }

    pub fn for_pane(mut self, pane: Pane) -> Self {
        self.pane = Some(pane);
        self
    }

    pub fn disabled_when(mut self, predicate: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        self.disabled_when = Some(Box::new(predicate));
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.disabled_when.as_ref().is_none_or(|d| !d())
    }

    /// Whether this command may run in the given pane.
    pub fn allowed_in(&self, pane: Pane) -> bool {
        self.pane.is_none_or(|p| p == pane)
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("keybind", &self.keybind)
            .field("pane", &self.pane)
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

/// Registration-ordered command collection with id lookup.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: Vec<Command>,
    index: HashMap<String, usize>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command. Re-registering an id replaces the earlier entry
    /// in place, keeping its position.
    pub fn register(&mut self, command: Command) {
        match self.index.get(&command.id) {
            Some(&pos) => self.commands[pos] = command,
            None => {
                self.index.insert(command.id.clone(), self.commands.len());
                self.commands.push(command);
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&Command> {
        self.index.get(id).map(|&pos| &self.commands[pos])
    }

    /// All commands in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter()
    }

    /// Enabled commands valid in the given pane.
    pub fn available_in(&self, pane: Pane) -> impl Iterator<Item = &Command> {
        self.commands
            .iter()
            .filter(move |c| c.is_enabled() && c.allowed_in(pane))
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn register_and_lookup() {
        let mut registry = CommandRegistry::new();
        registry.register(Command::new("mark-all-read", "Mark all read", "Mark every article read"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("mark-all-read").expect("command").name, "Mark all read");
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn reregister_replaces_in_place() {
        let mut registry = CommandRegistry::new();
        registry.register(Command::new("a", "First", ""));
        registry.register(Command::new("b", "Second", ""));
        registry.register(Command::new("a", "Replaced", ""));
        assert_eq!(registry.len(), 2);
        let names: Vec<&str> = registry.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Replaced", "Second"]);
    }

    #[test]
    fn disabled_predicate_flips_at_query_time() {
        let flag = Arc::new(AtomicBool::new(false));
        let probe = Arc::clone(&flag);
        let command =
            Command::new("x", "X", "").disabled_when(move || probe.load(Ordering::Relaxed));

        assert!(command.is_enabled());
        flag.store(true, Ordering::Relaxed);
        assert!(!command.is_enabled());
    }

    #[test]
    fn pane_restriction_filters_availability() {
        let mut registry = CommandRegistry::new();
        registry.register(Command::new("everywhere", "Everywhere", ""));
        registry.register(Command::new("feeds-only", "Feeds only", "").for_pane(Pane::Feeds));

        let in_feeds: Vec<&str> = registry.available_in(Pane::Feeds).map(|c| c.id.as_str()).collect();
        let in_article: Vec<&str> =
            registry.available_in(Pane::Article).map(|c| c.id.as_str()).collect();
        assert_eq!(in_feeds, vec!["everywhere", "feeds-only"]);
        assert_eq!(in_article, vec!["everywhere"]);
    }
}
