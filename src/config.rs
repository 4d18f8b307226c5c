//! Environment configuration.

use std::env;

/// Panel width used when `HELM_BOX_WIDTH` is unset or invalid.
pub const DEFAULT_BOX_WIDTH: usize = 64;

/// Narrowest panel that still fits a border, padding, and one cell of content.
pub const MIN_BOX_WIDTH: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvConfig {
    pub box_width: usize,
    pub color: bool,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            box_width: DEFAULT_BOX_WIDTH,
            color: true,
        }
    }
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self {
            box_width: env_usize("HELM_BOX_WIDTH")
                .filter(|width| *width >= MIN_BOX_WIDTH)
                .unwrap_or(DEFAULT_BOX_WIDTH),
            // https://no-color.org: any non-empty value disables color.
            color: env_string_opt("NO_COLOR").is_none(),
        }
    }

    /// Panel width clamped to the terminal's column count.
    pub fn panel_width(&self, columns: u16) -> usize {
        let columns = usize::from(columns).max(MIN_BOX_WIDTH);
        self.box_width.min(columns)
    }
}

fn env_usize(key: &str) -> Option<usize> {
    env_string_opt(key).and_then(|value| value.trim().parse().ok())
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}
