//! In-place repaint of a block of lines.

use crate::core::terminal::Terminal;

const CLEAR_TO_END: &str = "\x1b[J";

/// Repaints a block of whole lines below the cursor.
///
/// Every painted line ends with `\r\n`, so after a paint the cursor sits at column 0 of the
/// row below the block. Callers must keep each line narrower than the terminal; a wrapped
/// line would make the remembered count wrong.
#[derive(Debug, Default)]
pub struct InPlaceRenderer {
    painted_lines: usize,
}

impl InPlaceRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows the last paint occupied.
    pub fn painted_lines(&self) -> usize {
        self.painted_lines
    }

    /// Bytes that clear the previous block and draw `lines` in its place.
    pub fn frame(&mut self, lines: &[String]) -> String {
        let mut buffer = self.clear_sequence();
        for line in lines {
            buffer.push_str(line);
            buffer.push_str("\r\n");
        }
        self.painted_lines = lines.len();
        buffer
    }

    /// Bytes that remove the previous block, leaving the cursor where the block started.
    pub fn erase_frame(&mut self) -> String {
        let buffer = self.clear_sequence();
        self.painted_lines = 0;
        buffer
    }

    pub fn paint(&mut self, terminal: &mut dyn Terminal, lines: &[String]) {
        let frame = self.frame(lines);
        terminal.write(&frame);
    }

    pub fn erase(&mut self, terminal: &mut dyn Terminal) {
        let frame = self.erase_frame();
        terminal.write(&frame);
    }

    fn clear_sequence(&self) -> String {
        if self.painted_lines == 0 {
            return String::new();
        }
        format!("\x1b[{}A\r{CLEAR_TO_END}", self.painted_lines)
    }
}
