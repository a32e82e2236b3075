//! Core logic for the tidings feed reader, kept free of any terminal or
//! filesystem concerns so it can be tested headlessly.
//!
//! The two central pieces are [`Interpreter`], which turns raw key events
//! into [`Action`]s according to the active pane and palette state, and
//! [`Searcher`], which ranks commands, feeds, and articles for the command
//! palette.

pub mod actions;
pub mod bindings;
pub mod commands;
pub mod feed;
pub mod html;
pub mod interpreter;
pub mod keys;
pub mod search;
pub mod timeago;

pub use actions::{Action, Direction, JumpTarget, Pane};
pub use bindings::{KeybindingsConfig, KeybindingsOverride};
pub use commands::{Command, CommandRegistry};
pub use feed::{Article, FeedConfig};
pub use html::html_to_text;
pub use interpreter::{Interpreter, LEADER_TIMEOUT, PENDING_SEQUENCE_TIMEOUT};
pub use keys::{Keybinding, KeyInput, matches_any};
pub use search::{
    fuzzy_match, FuzzyMatch, MatchField, SearchResult, SearchSource, Searcher, MAX_RESULTS,
};
pub use timeago::time_ago;
