//! Flat `KEY=VALUE` settings file, in `.env` syntax.
//!
//! [`read_values`] parses with `dotenvy`, the same parser used for a project `.env`.
//! Blank lines and `#` comments are preserved by [`set_value`]. When a key appears more
//! than once the first line wins.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::Path;

/// Parsed values; a missing file reads as empty.
pub fn read_values(path: &Path) -> Result<BTreeMap<String, String>, dotenvy::Error> {
    let items = match dotenvy::from_path_iter(path) {
        Ok(items) => items,
        Err(error) if error.not_found() => return Ok(BTreeMap::new()),
        Err(error) => return Err(error),
    };
    let mut values = BTreeMap::new();
    for item in items {
        let (key, value) = item?;
        values.entry(key).or_insert(value);
    }
    Ok(values)
}

/// Replaces the first `key=` line in place, drops later duplicates, or appends a new line.
/// The file and its parent directories are created when missing.
pub fn set_value(path: &Path, key: &str, value: &str) -> io::Result<()> {
    let existing = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(error) if error.kind() == ErrorKind::NotFound => String::new(),
        Err(error) => return Err(error),
    };

    let assignment = format!("{key}={value}");
    let mut replaced = false;
    let mut lines = Vec::new();
    for line in existing.lines() {
        match split_assignment(line) {
            Some((existing_key, _)) if existing_key == key => {
                if !replaced {
                    lines.push(assignment.clone());
                    replaced = true;
                }
            }
            _ => lines.push(line.to_string()),
        }
    }
    if !replaced {
        lines.push(assignment);
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut contents = lines.join("\n");
    contents.push('\n');
    fs::write(path, contents)?;
    tracing::info!(key, path = %path.display(), "setting saved");
    Ok(())
}

fn split_assignment(line: &str) -> Option<(&str, &str)> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    let (key, value) = trimmed.split_once('=')?;
    let key = key.trim();
    let key = key.strip_prefix("export ").map_or(key, str::trim);
    if key.is_empty() {
        return None;
    }
    Some((key, value.trim()))
}
