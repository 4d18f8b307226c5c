//! Raw-terminal input and boxed dialogs for line-oriented assistants.
//!
//! Everything here is synchronous and writes straight to a [`Terminal`]. Raw mode is only
//! ever held through a [`RawModeGuard`], so nested primitives (a confirm inside a dialog
//! inside the REPL prompt) each restore the mode they found.
//!
//! # Public API Overview
//! - [`read_interactive_line`], [`read_plain_line`] and [`confirm`] read user input.
//! - [`select_from_list`] and [`prompt_text`] show boxed dialogs that repaint in place.
//! - [`ProcessTerminal`] talks to the real TTY; [`testing::ScriptedTerminal`] replays keys.

pub mod config;

pub mod core;
pub mod platform;
pub mod render;
pub mod testing;
pub mod widgets;

/// Keyboard decoding.
pub use crate::core::input::{parse_keys, Key, KeyDecoder};
/// Line input primitives.
pub use crate::core::line_input::{
    confirm, is_denial, read_interactive_line, read_plain_line, LineInput, COMMAND_PREFIX,
};
pub use crate::core::style::Style;

/// Terminal interfaces and process-backed implementation.
pub use crate::core::terminal::Terminal;
pub use crate::platform::{ProcessTerminal, RawModeGuard};

pub use crate::config::EnvConfig;
pub use crate::render::InPlaceRenderer;

/// Dialogs.
pub use crate::widgets::{
    prompt_text, prompt_text_with, select_from_list, select_from_list_with, Panel, SelectDialog,
    TextPrompt,
};

/// ANSI-aware truncation helper.
pub use crate::core::text::utils::truncate_to_width;
/// Visible width helper that ignores ANSI control sequences.
pub use crate::core::text::width::visible_width;
/// Escape stripping helper.
pub use crate::core::text::ansi::strip_ansi;
