//! Boxed single-line text prompt.

use std::io;

use crate::config::EnvConfig;
use crate::core::input::Key;
use crate::core::style::Style;
use crate::core::terminal::Terminal;
use crate::core::text::utils::{pop_grapheme, truncate_start_to_width};
use crate::render::InPlaceRenderer;
use crate::widgets::r#box::Panel;

const FOOTER: &str = "enter confirm · esc cancel";
const FIELD_PREFIX: &str = "› ";
const HIDE_CURSOR: &str = "\x1b[?25l";
const SHOW_CURSOR: &str = "\x1b[?25h";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextPrompt {
    pub title: String,
    pub subtitle: Option<String>,
    pub placeholder: Option<String>,
}

impl TextPrompt {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }
}

/// What a key did to the field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    Edited,
    Ignored,
    Submitted(String),
    Cancelled,
}

/// Editable buffer behind a [`TextPrompt`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputState {
    value: String,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn handle_key(&mut self, key: Key) -> InputAction {
        match key {
            Key::Enter => InputAction::Submitted(self.value.clone()),
            Key::Escape | Key::CtrlC | Key::CtrlD => InputAction::Cancelled,
            Key::Backspace => match pop_grapheme(&mut self.value) {
                Some(_) => InputAction::Edited,
                None => InputAction::Ignored,
            },
            other => match other.printable() {
                Some(ch) => {
                    self.value.push(ch);
                    InputAction::Edited
                }
                None => InputAction::Ignored,
            },
        }
    }
}

/// Shows `prompt` and returns the entered text, or `None` when cancelled.
///
/// Non-interactive terminals resolve as cancelled without drawing.
pub fn prompt_text(terminal: &mut dyn Terminal, prompt: &TextPrompt) -> io::Result<Option<String>> {
    prompt_text_with(terminal, prompt, &EnvConfig::from_env())
}

pub fn prompt_text_with(
    terminal: &mut dyn Terminal,
    prompt: &TextPrompt,
    config: &EnvConfig,
) -> io::Result<Option<String>> {
    if !terminal.is_interactive() {
        return Ok(None);
    }

    let style = Style::new(config.color);
    let width = config.panel_width(terminal.columns());
    let mut renderer = InPlaceRenderer::new();
    let mut state = InputState::new();

    let _raw = terminal.raw_mode()?;
    terminal.write(HIDE_CURSOR);
    let outcome = run(terminal, prompt, &mut state, &mut renderer, width, &style);
    renderer.erase(terminal);
    terminal.write(SHOW_CURSOR);
    outcome
}

fn run(
    terminal: &mut dyn Terminal,
    prompt: &TextPrompt,
    state: &mut InputState,
    renderer: &mut InPlaceRenderer,
    width: usize,
    style: &Style,
) -> io::Result<Option<String>> {
    renderer.paint(terminal, &render_lines(prompt, state, width, style));
    loop {
        let Some(key) = terminal.read_key()? else {
            return Ok(None);
        };
        match state.handle_key(key) {
            InputAction::Edited => {
                renderer.paint(terminal, &render_lines(prompt, state, width, style));
            }
            InputAction::Ignored => {}
            InputAction::Submitted(value) => return Ok(Some(value)),
            InputAction::Cancelled => return Ok(None),
        }
    }
}

pub fn render_lines(
    prompt: &TextPrompt,
    state: &InputState,
    width: usize,
    style: &Style,
) -> Vec<String> {
    let mut panel = Panel::new(prompt.title.as_str())
        .subtitle(prompt.subtitle.as_deref())
        .footer(Some(FOOTER));

    // Panel content area, minus the prefix and the cursor cell.
    let field_width = width.saturating_sub(4 + 2 + 1);
    let cursor = style.inverse(" ");
    let field = if state.value.is_empty() {
        let placeholder = prompt.placeholder.as_deref().unwrap_or("");
        let placeholder = truncate_start_to_width(placeholder, field_width, "…");
        format!("{cursor}{}", style.dim(&placeholder))
    } else {
        let value = truncate_start_to_width(&state.value, field_width, "…");
        format!("{value}{cursor}")
    };
    panel.push_line(format!("{}{field}", style.cyan(FIELD_PREFIX)));

    panel.render(width, style)
}

#[cfg(test)]
mod tests {
    use super::{render_lines, InputAction, InputState, TextPrompt};
    use crate::core::input::Key;
    use crate::core::style::Style;

    #[test]
    fn typing_and_backspace_edit_the_buffer() {
        let mut state = InputState::new();
        assert_eq!(state.handle_key(Key::Char('h')), InputAction::Edited);
        assert_eq!(state.handle_key(Key::Char('é')), InputAction::Edited);
        assert_eq!(state.handle_key(Key::Left), InputAction::Ignored);
        assert_eq!(state.handle_key(Key::Backspace), InputAction::Edited);
        assert_eq!(state.value(), "h");
        assert_eq!(
            state.handle_key(Key::Enter),
            InputAction::Submitted("h".to_string())
        );
    }

    #[test]
    fn backspace_on_empty_is_ignored() {
        let mut state = InputState::new();
        assert_eq!(state.handle_key(Key::Backspace), InputAction::Ignored);
    }

    #[test]
    fn placeholder_shows_only_while_empty() {
        let prompt = TextPrompt::new("Name").with_placeholder("my-agent");
        let mut state = InputState::new();
        let lines = render_lines(&prompt, &state, 40, &Style::plain());
        assert!(lines.iter().any(|line| line.contains("my-agent")));

        state.handle_key(Key::Char('x'));
        let lines = render_lines(&prompt, &state, 40, &Style::plain());
        assert!(!lines.iter().any(|line| line.contains("my-agent")));
        assert!(lines.iter().any(|line| line.contains("› x")));
    }

    #[test]
    fn long_values_show_their_tail() {
        let prompt = TextPrompt::new("Key");
        let mut state = InputState::new();
        for ch in "abcdefghijklmnopqrstuvwxyz".chars() {
            state.handle_key(Key::Char(ch));
        }
        let lines = render_lines(&prompt, &state, 20, &Style::plain());
        assert!(lines.iter().any(|line| line.contains("…opqrstuvwxyz")));
    }
}
