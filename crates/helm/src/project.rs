//! Bounded project snapshot sent with the system prompt.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

pub const MAX_DEPTH: usize = 3;
pub const MAX_ENTRIES: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Rust,
    Node,
    Python,
    Go,
    Make,
    Docker,
    Git,
}

impl MarkerKind {
    fn label(self) -> &'static str {
        match self {
            Self::Rust => "Rust (Cargo.toml)",
            Self::Node => "Node.js (package.json)",
            Self::Python => "Python (pyproject.toml)",
            Self::Go => "Go (go.mod)",
            Self::Make => "Makefile",
            Self::Docker => "Dockerfile",
            Self::Git => "git repository",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectMarker {
    pub kind: MarkerKind,
    pub name: Option<String>,
    pub version: Option<String>,
}

impl ProjectMarker {
    fn bare(kind: MarkerKind) -> Self {
        Self {
            kind,
            name: None,
            version: None,
        }
    }
}

impl fmt::Display for ProjectMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.label())?;
        if let Some(name) = &self.name {
            write!(f, ": {name}")?;
            if let Some(version) = &self.version {
                write!(f, " {version}")?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectContext {
    pub root: PathBuf,
    pub markers: Vec<ProjectMarker>,
    pub listing: String,
}

impl ProjectContext {
    /// Scans `root` once. Unreadable entries are skipped, never fatal.
    pub fn scan(root: &Path) -> Self {
        let context = Self {
            root: root.to_path_buf(),
            markers: detect_markers(root),
            listing: directory_listing(root, MAX_DEPTH, MAX_ENTRIES),
        };
        tracing::info!(
            root = %root.display(),
            markers = context.markers.len(),
            "project scanned"
        );
        context
    }
}

/// Indented tree of `root`, respecting ignore files and skipping hidden entries.
pub fn directory_listing(root: &Path, max_depth: usize, max_entries: usize) -> String {
    let walker = WalkBuilder::new(root)
        .max_depth(Some(max_depth))
        .require_git(false)
        .sort_by_file_path(|left, right| left.cmp(right))
        .build();

    let mut lines = Vec::new();
    let mut hidden_count = 0usize;
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                tracing::debug!(%error, "skipping unreadable entry");
                continue;
            }
        };
        if entry.depth() == 0 {
            continue;
        }
        if lines.len() >= max_entries {
            hidden_count += 1;
            continue;
        }
        let is_dir = entry.file_type().is_some_and(|kind| kind.is_dir());
        let name = entry.file_name().to_string_lossy();
        let indent = "  ".repeat(entry.depth() - 1);
        lines.push(format!("{indent}{name}{}", if is_dir { "/" } else { "" }));
    }
    if hidden_count > 0 {
        lines.push(format!("… ({hidden_count} more entries not shown)"));
    }
    lines.join("\n")
}

pub fn detect_markers(root: &Path) -> Vec<ProjectMarker> {
    let mut markers = Vec::new();
    if let Some(text) = read_marker(root, "Cargo.toml") {
        markers.push(cargo_marker(&text));
    }
    if let Some(text) = read_marker(root, "package.json") {
        markers.push(package_json_marker(&text));
    }
    if let Some(text) = read_marker(root, "pyproject.toml") {
        markers.push(pyproject_marker(&text));
    }
    if let Some(text) = read_marker(root, "go.mod") {
        markers.push(ProjectMarker {
            name: go_module(&text),
            ..ProjectMarker::bare(MarkerKind::Go)
        });
    }
    if root.join("Makefile").is_file() {
        markers.push(ProjectMarker::bare(MarkerKind::Make));
    }
    if root.join("Dockerfile").is_file() {
        markers.push(ProjectMarker::bare(MarkerKind::Docker));
    }
    if root.join(".git").exists() {
        markers.push(ProjectMarker::bare(MarkerKind::Git));
    }
    markers
}

fn read_marker(root: &Path, file_name: &str) -> Option<String> {
    let path = root.join(file_name);
    if !path.is_file() {
        return None;
    }
    match fs::read_to_string(&path) {
        Ok(text) => Some(text),
        Err(error) => {
            tracing::debug!(path = %path.display(), %error, "marker unreadable");
            Some(String::new())
        }
    }
}

fn cargo_marker(text: &str) -> ProjectMarker {
    let table = toml::from_str::<toml::Table>(text).ok();
    let package = table
        .as_ref()
        .and_then(|table| table.get("package"))
        .and_then(toml::Value::as_table);
    ProjectMarker {
        name: toml_string(package, "name"),
        version: toml_string(package, "version"),
        ..ProjectMarker::bare(MarkerKind::Rust)
    }
}

fn pyproject_marker(text: &str) -> ProjectMarker {
    let table = toml::from_str::<toml::Table>(text).ok();
    let project = table.as_ref().and_then(|table| {
        table.get("project").and_then(toml::Value::as_table).or_else(|| {
            table
                .get("tool")
                .and_then(|tool| tool.get("poetry"))
                .and_then(toml::Value::as_table)
        })
    });
    ProjectMarker {
        name: toml_string(project, "name"),
        version: toml_string(project, "version"),
        ..ProjectMarker::bare(MarkerKind::Python)
    }
}

fn toml_string(table: Option<&toml::Table>, key: &str) -> Option<String> {
    table?.get(key)?.as_str().map(str::to_string)
}

fn package_json_marker(text: &str) -> ProjectMarker {
    let value: serde_json::Value = serde_json::from_str(text).unwrap_or_default();
    let field = |key: &str| value.get(key).and_then(|v| v.as_str()).map(str::to_string);
    ProjectMarker {
        name: field("name"),
        version: field("version"),
        ..ProjectMarker::bare(MarkerKind::Node)
    }
}

fn go_module(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .find_map(|line| line.strip_prefix("module "))
        .map(|module| module.trim().to_string())
        .filter(|module| !module.is_empty())
}
