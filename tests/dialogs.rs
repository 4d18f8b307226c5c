use helm_tui::testing::ScriptedTerminal;
use helm_tui::{
    prompt_text_with, select_from_list_with, visible_width, EnvConfig, Key, SelectDialog,
    TextPrompt,
};

fn plain_config() -> EnvConfig {
    EnvConfig {
        box_width: 40,
        color: false,
    }
}

fn commands() -> SelectDialog {
    SelectDialog::new(
        "Commands",
        vec![
            "/help  show help".to_string(),
            "/clear  clear the screen".to_string(),
            "/exit  quit".to_string(),
        ],
    )
    .with_subtitle("Pick a command")
}

#[test]
fn down_down_enter_selects_third_item() {
    let mut terminal =
        ScriptedTerminal::interactive().with_keys([Key::Down, Key::Down, Key::Down, Key::Enter]);
    let chosen =
        select_from_list_with(&mut terminal, &commands(), &plain_config()).expect("select");
    assert_eq!(chosen, Some(2));
    assert_eq!(terminal.raw_depth(), 0);
    assert_eq!(terminal.raw_entries(), 1);
}

#[test]
fn up_at_top_stays_on_first_item() {
    let mut terminal = ScriptedTerminal::interactive().with_keys([Key::Up, Key::Enter]);
    let chosen =
        select_from_list_with(&mut terminal, &commands(), &plain_config()).expect("select");
    assert_eq!(chosen, Some(0));
}

#[test]
fn escape_and_interrupt_cancel() {
    for key in [Key::Escape, Key::CtrlC] {
        let mut terminal = ScriptedTerminal::interactive().with_keys([Key::Down, key]);
        let chosen =
            select_from_list_with(&mut terminal, &commands(), &plain_config()).expect("select");
        assert_eq!(chosen, None);
        assert_eq!(terminal.raw_depth(), 0);
    }
}

#[test]
fn closed_input_cancels() {
    let mut terminal = ScriptedTerminal::interactive();
    let chosen =
        select_from_list_with(&mut terminal, &commands(), &plain_config()).expect("select");
    assert_eq!(chosen, None);
}

#[test]
fn non_interactive_and_empty_lists_cancel_without_drawing() {
    let mut terminal = ScriptedTerminal::piped().with_lines(["1"]);
    let chosen =
        select_from_list_with(&mut terminal, &commands(), &plain_config()).expect("select");
    assert_eq!(chosen, None);
    assert!(terminal.output().is_empty());

    let mut terminal = ScriptedTerminal::interactive().with_keys([Key::Enter]);
    let empty = SelectDialog::new("Nothing", Vec::new());
    let chosen = select_from_list_with(&mut terminal, &empty, &plain_config()).expect("select");
    assert_eq!(chosen, None);
    assert!(terminal.output().is_empty());
}

#[test]
fn repaint_moves_up_by_the_painted_height_and_erases_on_exit() {
    let mut terminal = ScriptedTerminal::interactive().with_keys([Key::Down, Key::Enter]);
    select_from_list_with(&mut terminal, &commands(), &plain_config()).expect("select");

    let output = terminal.output();
    // top border, subtitle, gap, three items, separator, footer, bottom border
    let panel_height = 9;
    let move_up = format!("\x1b[{panel_height}A\r\x1b[J");
    assert_eq!(
        output.matches(&move_up).count(),
        2,
        "one repaint after Down and one erase on exit: {output:?}"
    );
    assert!(output.ends_with(&format!("{move_up}\x1b[?25h")));
}

#[test]
fn highlight_follows_the_selection() {
    let mut terminal = ScriptedTerminal::interactive().with_keys([Key::Down, Key::Enter]);
    select_from_list_with(&mut terminal, &commands(), &plain_config()).expect("select");

    let plain = terminal.plain_output();
    assert!(plain.contains("› /help  show help"));
    assert!(plain.contains("› /clear  clear the screen"));
}

#[test]
fn panel_lines_fit_the_configured_width() {
    let mut terminal = ScriptedTerminal::interactive().with_keys([Key::Escape]);
    select_from_list_with(&mut terminal, &commands(), &plain_config()).expect("select");

    let plain = terminal.plain_output();
    for line in plain.split("\r\n").filter(|line| line.contains('│')) {
        assert_eq!(visible_width(line), 40, "line {line:?}");
    }
}

#[test]
fn narrow_terminal_clamps_panel_width() {
    let mut terminal = ScriptedTerminal::interactive()
        .with_columns(24)
        .with_keys([Key::Escape]);
    select_from_list_with(&mut terminal, &commands(), &plain_config()).expect("select");

    let plain = terminal.plain_output();
    for line in plain.split("\r\n").filter(|line| line.contains('│')) {
        assert_eq!(visible_width(line), 24, "line {line:?}");
    }
}

#[test]
fn prompt_text_returns_typed_value() {
    let mut terminal = ScriptedTerminal::interactive()
        .with_typed("reviewr")
        .with_keys([Key::Backspace, Key::Char('e'), Key::Char('r'), Key::Enter]);
    let prompt = TextPrompt::new("Agent name").with_placeholder("e.g. reviewer");
    let value = prompt_text_with(&mut terminal, &prompt, &plain_config()).expect("prompt");
    assert_eq!(value.as_deref(), Some("reviewer"));
    assert_eq!(terminal.raw_depth(), 0);
}

#[test]
fn prompt_text_accepts_empty_submission() {
    let mut terminal = ScriptedTerminal::interactive().with_keys([Key::Enter]);
    let prompt = TextPrompt::new("Model").with_subtitle("Empty keeps the current model");
    let value = prompt_text_with(&mut terminal, &prompt, &plain_config()).expect("prompt");
    assert_eq!(value.as_deref(), Some(""));
}

#[test]
fn prompt_text_cancels_on_escape_and_pipe() {
    let mut terminal = ScriptedTerminal::interactive()
        .with_typed("abc")
        .with_keys([Key::Escape]);
    let prompt = TextPrompt::new("Name");
    assert_eq!(
        prompt_text_with(&mut terminal, &prompt, &plain_config()).expect("prompt"),
        None
    );
    assert_eq!(terminal.raw_depth(), 0);

    let mut terminal = ScriptedTerminal::piped().with_lines(["abc"]);
    assert_eq!(
        prompt_text_with(&mut terminal, &prompt, &plain_config()).expect("prompt"),
        None
    );
    assert!(terminal.output().is_empty());
}

#[test]
fn emoji_items_keep_the_right_border_aligned() {
    let dialog = SelectDialog::new(
        "Agents",
        vec!["👨‍👩‍👧 family".to_string(), "👍🏽 approver".to_string()],
    );
    let mut terminal = ScriptedTerminal::interactive().with_keys([Key::Escape]);
    select_from_list_with(&mut terminal, &dialog, &plain_config()).expect("select");

    let plain = terminal.plain_output();
    for line in plain.split("\r\n").filter(|line| line.contains('│')) {
        assert!(line.ends_with('│'), "line {line:?}");
        assert_eq!(visible_width(line), 40, "line {line:?}");
    }
}
