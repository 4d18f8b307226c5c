use helm_tui::Terminal;

/// Writes `text` and a newline. Only used outside raw mode, so `\n` is translated by the tty.
pub fn print_line(terminal: &mut dyn Terminal, text: &str) {
    terminal.write(text);
    terminal.write("\n");
}

/// Writes each line of a block, skipping nothing.
pub fn print_block(terminal: &mut dyn Terminal, text: &str) {
    for line in text.lines() {
        print_line(terminal, line);
    }
}
