//! In-memory terminal for driving line input and dialogs from tests.

use std::cell::Cell;
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;

use crate::core::input::{parse_keys, Key};
use crate::core::terminal::Terminal;
use crate::core::text::ansi::strip_ansi;
use crate::platform::RawModeGuard;

/// Scripted key and line source that records everything written to it.
///
/// Raw-mode guards handed out by this terminal track nesting depth, so tests can assert the
/// mode was released on every path.
pub struct ScriptedTerminal {
    interactive: bool,
    columns: u16,
    keys: VecDeque<Key>,
    lines: VecDeque<String>,
    output: String,
    raw_depth: Rc<Cell<usize>>,
    raw_entries: usize,
}

impl ScriptedTerminal {
    /// A TTY-like terminal that reads keys.
    pub fn interactive() -> Self {
        Self::new(true)
    }

    /// A pipe-like terminal that reads whole lines.
    pub fn piped() -> Self {
        Self::new(false)
    }

    fn new(interactive: bool) -> Self {
        Self {
            interactive,
            columns: 80,
            keys: VecDeque::new(),
            lines: VecDeque::new(),
            output: String::new(),
            raw_depth: Rc::new(Cell::new(0)),
            raw_entries: 0,
        }
    }

    pub fn with_columns(mut self, columns: u16) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_keys(mut self, keys: impl IntoIterator<Item = Key>) -> Self {
        self.push_keys(keys);
        self
    }

    /// Queues one key per character of `text`.
    pub fn with_typed(mut self, text: &str) -> Self {
        self.push_typed(text);
        self
    }

    /// Queues `text` followed by Enter.
    pub fn with_typed_line(mut self, text: &str) -> Self {
        self.push_typed(text);
        self.keys.push_back(Key::Enter);
        self
    }

    /// Queues keys decoded from raw terminal bytes.
    pub fn with_bytes(mut self, bytes: &[u8]) -> Self {
        self.keys.extend(parse_keys(bytes));
        self
    }

    pub fn with_lines<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines.extend(lines.into_iter().map(Into::into));
        self
    }

    pub fn push_keys(&mut self, keys: impl IntoIterator<Item = Key>) {
        self.keys.extend(keys);
    }

    pub fn push_typed(&mut self, text: &str) {
        self.keys.extend(text.chars().map(Key::Char));
    }

    /// Everything written so far, escape sequences included.
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Written output with ANSI sequences removed.
    pub fn plain_output(&self) -> String {
        strip_ansi(&self.output)
    }

    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }

    /// Raw-mode guards currently alive.
    pub fn raw_depth(&self) -> usize {
        self.raw_depth.get()
    }

    /// Raw-mode guards handed out so far.
    pub fn raw_entries(&self) -> usize {
        self.raw_entries
    }

    pub fn remaining_keys(&self) -> usize {
        self.keys.len()
    }
}

impl Terminal for ScriptedTerminal {
    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn raw_mode(&mut self) -> io::Result<RawModeGuard> {
        self.raw_entries += 1;
        self.raw_depth.set(self.raw_depth.get() + 1);
        let depth = Rc::clone(&self.raw_depth);
        Ok(RawModeGuard::with_release(move || {
            depth.set(depth.get().saturating_sub(1));
        }))
    }

    fn read_key(&mut self) -> io::Result<Option<Key>> {
        Ok(self.keys.pop_front())
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        Ok(self.lines.pop_front())
    }

    fn write(&mut self, data: &str) {
        self.output.push_str(data);
    }

    fn columns(&self) -> u16 {
        self.columns
    }
}
