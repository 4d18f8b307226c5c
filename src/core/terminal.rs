//! Terminal trait shared by the line editor and dialogs.

use std::io;

use crate::core::input::Key;
use crate::platform::RawModeGuard;

/// Minimal terminal interface for interactive primitives.
///
/// Raw mode is handed out as a [`RawModeGuard`] value rather than toggled on the terminal,
/// so nested primitives each restore exactly the mode they found.
pub trait Terminal {
    /// True when input comes from a TTY and keystrokes can be read one at a time.
    fn is_interactive(&self) -> bool;

    /// Enter raw input mode until the returned guard is dropped.
    fn raw_mode(&mut self) -> io::Result<RawModeGuard>;

    /// Block until one key is available. `Ok(None)` means the input stream closed.
    fn read_key(&mut self) -> io::Result<Option<Key>>;

    /// Line-buffered read used when the terminal is not interactive.
    /// The trailing newline is stripped; `Ok(None)` means end of input.
    fn read_line(&mut self) -> io::Result<Option<String>>;

    /// Write output to the terminal and flush it.
    fn write(&mut self, data: &str);

    /// Terminal width in columns.
    fn columns(&self) -> u16;
}
