//! Truncation and padding helpers.

use unicode_segmentation::UnicodeSegmentation;

use super::ansi::extract_ansi_code;
use super::width::{grapheme_width, visible_width};

const ANSI_RESET: &str = "\x1b[0m";

#[derive(Debug)]
enum Segment {
    Ansi(String),
    Grapheme(String),
}

fn segments(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut idx = 0;
    while idx < text.len() {
        if let Some(ansi) = extract_ansi_code(text, idx) {
            segments.push(Segment::Ansi(ansi.code));
            idx += ansi.length;
            continue;
        }

        let text_end = next_ansi_or_end(text, idx);
        for grapheme in text[idx..text_end].graphemes(true) {
            segments.push(Segment::Grapheme(grapheme.to_string()));
        }
        idx = text_end;
    }
    segments
}

fn next_ansi_or_end(text: &str, start: usize) -> usize {
    let bytes = text.as_bytes();
    let mut idx = start;
    while idx < bytes.len() {
        if bytes[idx] == 0x1b && extract_ansi_code(text, idx).is_some() {
            return idx;
        }
        idx += 1;
    }
    bytes.len()
}

/// Truncates `text` to `max_width` visible cells, appending `ellipsis` when cut.
///
/// When `pad` is set the result is right-padded with spaces to exactly `max_width` cells.
pub fn truncate_to_width(text: &str, max_width: usize, ellipsis: &str, pad: bool) -> String {
    if max_width == 0 {
        return String::new();
    }

    let text_width = visible_width(text);
    if text_width <= max_width {
        if pad {
            return format!("{text}{}", " ".repeat(max_width - text_width));
        }
        return text.to_string();
    }

    let ellipsis_width = visible_width(ellipsis);
    let target_width = max_width.saturating_sub(ellipsis_width);
    if target_width == 0 {
        return ellipsis.chars().take(max_width).collect();
    }

    let mut truncated = String::new();
    let mut current_width = 0;
    let mut saw_ansi = false;
    for segment in segments(text) {
        match segment {
            Segment::Ansi(code) => {
                saw_ansi = true;
                truncated.push_str(&code);
            }
            Segment::Grapheme(grapheme) => {
                let width = grapheme_width(&grapheme);
                if current_width + width > target_width {
                    break;
                }
                truncated.push_str(&grapheme);
                current_width += width;
            }
        }
    }

    if saw_ansi {
        truncated.push_str(ANSI_RESET);
    }
    truncated.push_str(ellipsis);

    if pad {
        let result_width = visible_width(&truncated);
        if result_width < max_width {
            truncated.push_str(&" ".repeat(max_width - result_width));
        }
    }

    truncated
}

/// Keeps the tail of plain `text` that fits in `max_width` cells, prefixing `ellipsis` when cut.
pub fn truncate_start_to_width(text: &str, max_width: usize, ellipsis: &str) -> String {
    if visible_width(text) <= max_width {
        return text.to_string();
    }

    let target_width = max_width.saturating_sub(visible_width(ellipsis));
    let mut kept = Vec::new();
    let mut current_width = 0;
    for grapheme in text.graphemes(true).rev() {
        let width = grapheme_width(grapheme);
        if current_width + width > target_width {
            break;
        }
        kept.push(grapheme);
        current_width += width;
    }
    kept.reverse();
    format!("{ellipsis}{}", kept.concat())
}

/// Removes the last grapheme from `buffer`, returning its display width.
pub fn pop_grapheme(buffer: &mut String) -> Option<usize> {
    let (offset, grapheme) = buffer.grapheme_indices(true).next_back()?;
    let width = grapheme_width(grapheme);
    buffer.truncate(offset);
    Some(width)
}
