//! Fixed-width bordered panel.

use crate::core::style::Style;
use crate::core::text::utils::truncate_to_width;
use crate::core::text::width::visible_width;

const TOP_LEFT: &str = "╭";
const TOP_RIGHT: &str = "╮";
const BOTTOM_LEFT: &str = "╰";
const BOTTOM_RIGHT: &str = "╯";
const TEE_LEFT: &str = "├";
const TEE_RIGHT: &str = "┤";
const HORIZONTAL: &str = "─";
const VERTICAL: &str = "│";
const ELLIPSIS: &str = "…";

/// A titled box of text lines.
///
/// ```text
/// ╭─ Title ──────────╮
/// │ subtitle         │
/// │                  │
/// │ body line        │
/// ├──────────────────┤
/// │ footer           │
/// ╰──────────────────╯
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Panel {
    title: String,
    subtitle: Option<String>,
    body: Vec<String>,
    footer: Option<String>,
}

impl Panel {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn subtitle(mut self, subtitle: Option<impl Into<String>>) -> Self {
        self.subtitle = subtitle.map(Into::into);
        self
    }

    pub fn footer(mut self, footer: Option<impl Into<String>>) -> Self {
        self.footer = footer.map(Into::into);
        self
    }

    pub fn push_line(&mut self, line: impl Into<String>) {
        self.body.push(line.into());
    }

    /// Renders exactly `width` cells per line. Body lines may carry ANSI styling.
    pub fn render(&self, width: usize, style: &Style) -> Vec<String> {
        let width = width.max(crate::config::MIN_BOX_WIDTH);
        let inner = width - 2;
        let content = width - 4;

        let mut lines = Vec::with_capacity(self.body.len() + 6);
        lines.push(self.top_border(inner, style));

        if let Some(subtitle) = self.subtitle.as_deref() {
            let subtitle = truncate_to_width(subtitle, content, ELLIPSIS, false);
            lines.push(content_row(&style.dim(&subtitle), content, style));
            lines.push(content_row("", content, style));
        }

        for line in &self.body {
            lines.push(content_row(line, content, style));
        }

        if let Some(footer) = self.footer.as_deref() {
            lines.push(style.dim(&format!(
                "{TEE_LEFT}{}{TEE_RIGHT}",
                HORIZONTAL.repeat(inner)
            )));
            let footer = truncate_to_width(footer, content, ELLIPSIS, false);
            lines.push(content_row(&style.dim(&footer), content, style));
        }

        lines.push(style.dim(&format!(
            "{BOTTOM_LEFT}{}{BOTTOM_RIGHT}",
            HORIZONTAL.repeat(inner)
        )));
        lines
    }

    fn top_border(&self, inner: usize, style: &Style) -> String {
        // `─ Title ` plus at least one trailing rule cell.
        let title = truncate_to_width(&self.title, inner.saturating_sub(4), ELLIPSIS, false);
        let fill = inner.saturating_sub(visible_width(&title) + 3);
        format!(
            "{}{}{}",
            style.dim(&format!("{TOP_LEFT}{HORIZONTAL} ")),
            style.bold(&title),
            style.dim(&format!(" {}{TOP_RIGHT}", HORIZONTAL.repeat(fill)))
        )
    }
}

fn content_row(text: &str, content: usize, style: &Style) -> String {
    let text = truncate_to_width(text, content, ELLIPSIS, true);
    let border = style.dim(VERTICAL);
    format!("{border} {text} {border}")
}
