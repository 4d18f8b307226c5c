use std::path::{Path, PathBuf};

use crate::error::AgentStoreError;

pub const AGENT_DIR: [&str; 2] = [".helm", "agents"];

const MAX_NAME_LEN: usize = 64;

/// `<base>/.helm/agents`, where `base` is a project directory or the user's home.
#[must_use]
pub fn agents_root(base: &Path) -> PathBuf {
    base.join(AGENT_DIR[0]).join(AGENT_DIR[1])
}

#[must_use]
pub fn agent_file_name(name: &str) -> String {
    format!("{name}.json")
}

/// Names become file names, so they are limited to `[a-z0-9_-]` and must start with a
/// letter or digit.
pub fn validate_agent_name(name: &str) -> Result<(), AgentStoreError> {
    let invalid = |reason| AgentStoreError::InvalidName {
        name: name.to_string(),
        reason,
    };

    let Some(first) = name.chars().next() else {
        return Err(invalid("name is empty"));
    };
    if name.len() > MAX_NAME_LEN {
        return Err(invalid("name is longer than 64 characters"));
    }
    if !first.is_ascii_lowercase() && !first.is_ascii_digit() {
        return Err(invalid("name must start with a lowercase letter or digit"));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
    {
        return Err(invalid(
            "only lowercase letters, digits, '-' and '_' are allowed",
        ));
    }
    Ok(())
}
