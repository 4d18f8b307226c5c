//! Boxed select list dialog.

use std::io;

use crate::config::EnvConfig;
use crate::core::input::Key;
use crate::core::style::Style;
use crate::core::terminal::Terminal;
use crate::render::InPlaceRenderer;
use crate::widgets::r#box::Panel;

const MAX_VISIBLE: usize = 10;
const DEFAULT_FOOTER: &str = "↑/↓ move · enter select · esc cancel";
const HIDE_CURSOR: &str = "\x1b[?25l";
const SHOW_CURSOR: &str = "\x1b[?25h";

fn normalize_to_single_line(text: &str) -> String {
    text.split(['\n', '\r'])
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectDialog {
    pub title: String,
    pub subtitle: Option<String>,
    pub items: Vec<String>,
    pub footer: Option<String>,
}

impl SelectDialog {
    pub fn new(title: impl Into<String>, items: Vec<String>) -> Self {
        Self {
            title: title.into(),
            items,
            ..Self::default()
        }
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }
}

/// What a key did to the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectAction {
    Moved,
    Ignored,
    Selected(usize),
    Cancelled,
}

/// Highlight position and scroll window over `len` items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectState {
    len: usize,
    selected: usize,
    scroll: usize,
}

impl SelectState {
    pub fn new(len: usize) -> Self {
        Self {
            len,
            selected: 0,
            scroll: 0,
        }
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn handle_key(&mut self, key: Key) -> SelectAction {
        match key {
            Key::Up => self.move_to(self.selected.saturating_sub(1)),
            Key::Down => self.move_to((self.selected + 1).min(self.len.saturating_sub(1))),
            Key::Enter if self.len > 0 => SelectAction::Selected(self.selected),
            Key::Enter => SelectAction::Cancelled,
            Key::Escape | Key::CtrlC | Key::CtrlD => SelectAction::Cancelled,
            _ => SelectAction::Ignored,
        }
    }

    fn move_to(&mut self, index: usize) -> SelectAction {
        if index == self.selected {
            return SelectAction::Ignored;
        }
        self.selected = index;
        if self.selected < self.scroll {
            self.scroll = self.selected;
        } else if self.selected >= self.scroll + MAX_VISIBLE {
            self.scroll = self.selected + 1 - MAX_VISIBLE;
        }
        SelectAction::Moved
    }

    fn visible_range(&self) -> std::ops::Range<usize> {
        self.scroll..(self.scroll + MAX_VISIBLE).min(self.len)
    }
}

/// Shows `dialog` and returns the chosen index, or `None` when cancelled.
///
/// Non-interactive terminals and empty lists resolve as cancelled without drawing.
pub fn select_from_list(
    terminal: &mut dyn Terminal,
    dialog: &SelectDialog,
) -> io::Result<Option<usize>> {
    select_from_list_with(terminal, dialog, &EnvConfig::from_env())
}

pub fn select_from_list_with(
    terminal: &mut dyn Terminal,
    dialog: &SelectDialog,
    config: &EnvConfig,
) -> io::Result<Option<usize>> {
    if !terminal.is_interactive() || dialog.items.is_empty() {
        return Ok(None);
    }

    let style = Style::new(config.color);
    let width = config.panel_width(terminal.columns());
    let mut renderer = InPlaceRenderer::new();
    let mut state = SelectState::new(dialog.items.len());

    let _raw = terminal.raw_mode()?;
    terminal.write(HIDE_CURSOR);
    let outcome = run(terminal, dialog, &mut state, &mut renderer, width, &style);
    renderer.erase(terminal);
    terminal.write(SHOW_CURSOR);
    outcome
}

fn run(
    terminal: &mut dyn Terminal,
    dialog: &SelectDialog,
    state: &mut SelectState,
    renderer: &mut InPlaceRenderer,
    width: usize,
    style: &Style,
) -> io::Result<Option<usize>> {
    renderer.paint(terminal, &render_lines(dialog, state, width, style));
    loop {
        let Some(key) = terminal.read_key()? else {
            return Ok(None);
        };
        match state.handle_key(key) {
            SelectAction::Moved => {
                renderer.paint(terminal, &render_lines(dialog, state, width, style));
            }
            SelectAction::Ignored => {}
            SelectAction::Selected(index) => return Ok(Some(index)),
            SelectAction::Cancelled => return Ok(None),
        }
    }
}

pub fn render_lines(
    dialog: &SelectDialog,
    state: &SelectState,
    width: usize,
    style: &Style,
) -> Vec<String> {
    let footer = dialog.footer.as_deref().unwrap_or(DEFAULT_FOOTER);
    let mut panel = Panel::new(dialog.title.as_str())
        .subtitle(dialog.subtitle.as_deref())
        .footer(Some(footer));

    for index in state.visible_range() {
        let label = normalize_to_single_line(&dialog.items[index]);
        if index == state.selected {
            panel.push_line(style.cyan(&format!("› {label}")));
        } else {
            panel.push_line(format!("  {label}"));
        }
    }

    if state.len > MAX_VISIBLE {
        panel.push_line(style.dim(&format!("  ({}/{})", state.selected + 1, state.len)));
    }

    panel.render(width, style)
}
