use std::sync::OnceLock;

use regex::Regex;

fn closed_span_regex() -> &'static Regex {
    static CACHED: OnceLock<Regex> = OnceLock::new();
    CACHED.get_or_init(|| {
        Regex::new(r"(?s)<think>.*?</think>|<thinking>.*?</thinking>")
            .expect("closed thinking regex must compile")
    })
}

fn open_span_regex() -> &'static Regex {
    static CACHED: OnceLock<Regex> = OnceLock::new();
    CACHED.get_or_init(|| {
        Regex::new(r"<think(?:ing)?>").expect("open thinking regex must compile")
    })
}

/// Removes reasoning spans from model text.
///
/// Closed `<think>`/`<thinking>` spans are dropped (shortest match). An opener left without
/// its closing tag drops everything after it. The result is trimmed, so leading and trailing
/// whitespace of the surrounding text is not preserved.
pub fn strip_thinking(text: &str) -> String {
    let without_closed = closed_span_regex().replace_all(text, "");
    let visible = match open_span_regex().find(&without_closed) {
        Some(opener) => &without_closed[..opener.start()],
        None => &without_closed[..],
    };
    visible.trim().to_string()
}
