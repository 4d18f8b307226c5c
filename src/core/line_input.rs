//! Raw-mode line editor with an instant slash trigger.
//!
//! Keys are read one at a time under a [`crate::platform::RawModeGuard`], so the terminal does
//! no echo of its own: every visible character is written back here. `cfmakeraw` also clears
//! `OPOST`, which is why line breaks are written as `\r\n`.

use std::io;

use crate::core::input::Key;
use crate::core::terminal::Terminal;
use crate::core::text::utils::pop_grapheme;

/// Character that opens the command palette when typed into an empty line.
pub const COMMAND_PREFIX: char = '/';

/// Result of reading one line from the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineInput {
    /// A submitted line. Ctrl+C submits an empty line so callers simply redraw the prompt.
    Text(String),
    /// The first keystroke was [`COMMAND_PREFIX`]; nothing else was read.
    SlashTrigger,
    /// Ctrl+D or the input stream closed.
    Eof,
}

#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Submitted(String),
    Interrupted,
    SlashTrigger,
    Eof,
}

/// Reads a line, returning [`LineInput::SlashTrigger`] as soon as `/` is typed into an empty buffer.
///
/// Non-interactive terminals fall back to line-buffered reads and never trigger.
pub fn read_interactive_line(terminal: &mut dyn Terminal, prompt: &str) -> io::Result<LineInput> {
    Ok(match read_line(terminal, prompt, true)? {
        Outcome::Submitted(text) => LineInput::Text(text),
        Outcome::Interrupted => LineInput::Text(String::new()),
        Outcome::SlashTrigger => LineInput::SlashTrigger,
        Outcome::Eof => LineInput::Eof,
    })
}

/// Same editor as [`read_interactive_line`] without the slash trigger.
pub fn read_plain_line(terminal: &mut dyn Terminal, prompt: &str) -> io::Result<LineInput> {
    Ok(match read_line(terminal, prompt, false)? {
        Outcome::Submitted(text) => LineInput::Text(text),
        Outcome::Interrupted | Outcome::SlashTrigger => LineInput::Text(String::new()),
        Outcome::Eof => LineInput::Eof,
    })
}

/// Yes/no question that defaults to yes.
///
/// Only `n` or `no` (any case) deny. Ctrl+C and end of input also deny.
pub fn confirm(terminal: &mut dyn Terminal, question: &str) -> io::Result<bool> {
    let prompt = format!("{question} [Y/n] ");
    Ok(match read_line(terminal, &prompt, false)? {
        Outcome::Submitted(answer) => !is_denial(&answer),
        Outcome::Interrupted | Outcome::SlashTrigger | Outcome::Eof => false,
    })
}

/// True for answers that decline a confirmation.
pub fn is_denial(answer: &str) -> bool {
    let answer = answer.trim();
    answer.eq_ignore_ascii_case("n") || answer.eq_ignore_ascii_case("no")
}

fn read_line(terminal: &mut dyn Terminal, prompt: &str, slash_trigger: bool) -> io::Result<Outcome> {
    terminal.write(prompt);

    if !terminal.is_interactive() {
        return Ok(match terminal.read_line()? {
            Some(line) => Outcome::Submitted(line),
            None => Outcome::Eof,
        });
    }

    let _raw = terminal.raw_mode()?;
    let mut buffer = String::new();
    let mut first_edit = true;

    loop {
        let Some(key) = terminal.read_key()? else {
            terminal.write("\r\n");
            return Ok(Outcome::Eof);
        };

        match key {
            Key::Enter => {
                terminal.write("\r\n");
                return Ok(Outcome::Submitted(buffer));
            }
            Key::CtrlD => {
                terminal.write("\r\n");
                return Ok(Outcome::Eof);
            }
            Key::CtrlC => {
                terminal.write("^C\r\n");
                return Ok(Outcome::Interrupted);
            }
            Key::Backspace => {
                if let Some(width) = pop_grapheme(&mut buffer) {
                    terminal.write(&erase_cells(width));
                }
                first_edit = false;
            }
            other => {
                if let Some(ch) = other.printable() {
                    buffer.push(ch);
                    let mut encoded = [0u8; 4];
                    terminal.write(ch.encode_utf8(&mut encoded));

                    if slash_trigger && first_edit && ch == COMMAND_PREFIX {
                        terminal.write("\r\n");
                        return Ok(Outcome::SlashTrigger);
                    }
                    first_edit = false;
                }
                // Arrows, Tab, Escape and unknown sequences are swallowed.
            }
        }
    }
}

fn erase_cells(width: usize) -> String {
    let back = "\x08".repeat(width);
    format!("{back}{}{back}", " ".repeat(width))
}

#[cfg(test)]
mod tests {
    use super::{erase_cells, is_denial};

    #[test]
    fn denial_is_case_insensitive_and_trimmed() {
        assert!(is_denial("n"));
        assert!(is_denial(" No "));
        assert!(!is_denial(""));
        assert!(!is_denial("nope"));
        assert!(!is_denial("y"));
    }

    #[test]
    fn erase_covers_wide_cells() {
        assert_eq!(erase_cells(1), "\x08 \x08");
        assert_eq!(erase_cells(2), "\x08\x08  \x08\x08");
    }
}
