//! SGR styling that can be switched off as a whole.

const RESET: &str = "\x1b[0m";

/// Applies ANSI styles when enabled, returns text untouched otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    enabled: bool,
}

impl Style {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn plain() -> Self {
        Self::new(false)
    }

    pub fn from_env() -> Self {
        Self::new(crate::config::EnvConfig::from_env().color)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn bold(&self, text: &str) -> String {
        self.paint("1", text)
    }

    pub fn dim(&self, text: &str) -> String {
        self.paint("2", text)
    }

    pub fn inverse(&self, text: &str) -> String {
        self.paint("7", text)
    }

    pub fn red(&self, text: &str) -> String {
        self.paint("31", text)
    }

    pub fn green(&self, text: &str) -> String {
        self.paint("32", text)
    }

    pub fn yellow(&self, text: &str) -> String {
        self.paint("33", text)
    }

    pub fn cyan(&self, text: &str) -> String {
        self.paint("36", text)
    }

    fn paint(&self, sgr: &str, text: &str) -> String {
        if !self.enabled || text.is_empty() {
            return text.to_string();
        }
        format!("\x1b[{sgr}m{text}{RESET}")
    }
}

impl Default for Style {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::Style;

    #[test]
    fn disabled_style_is_identity() {
        let style = Style::plain();
        assert_eq!(style.bold("hi"), "hi");
        assert_eq!(style.cyan("hi"), "hi");
    }

    #[test]
    fn enabled_style_wraps_and_resets() {
        let style = Style::new(true);
        assert_eq!(style.dim("x"), "\x1b[2mx\x1b[0m");
        assert_eq!(style.red(""), "");
    }
}
