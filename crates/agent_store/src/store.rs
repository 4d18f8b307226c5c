use std::collections::BTreeSet;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::error::AgentStoreError;
use crate::paths::{agent_file_name, agents_root, validate_agent_name};
use crate::schema::{AgentRecord, AgentScope};

/// A record together with where it was read from or written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAgent {
    pub scope: AgentScope,
    pub path: PathBuf,
    pub record: AgentRecord,
}

/// File store for agent records, one JSON file per agent.
#[derive(Debug, Clone)]
pub struct AgentStore {
    project_root: PathBuf,
    personal_root: Option<PathBuf>,
}

impl AgentStore {
    /// Store rooted at explicit directories. `personal_root` is `None` when there is no home.
    pub fn new(project_root: impl Into<PathBuf>, personal_root: Option<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            personal_root,
        }
    }

    /// Store using `<cwd>/.helm/agents` and `<home>/.helm/agents`.
    pub fn for_workspace(cwd: &Path, home: Option<&Path>) -> Self {
        Self::new(agents_root(cwd), home.map(agents_root))
    }

    pub fn root(&self, scope: AgentScope) -> Result<&Path, AgentStoreError> {
        match scope {
            AgentScope::Project => Ok(&self.project_root),
            AgentScope::Personal => self
                .personal_root
                .as_deref()
                .ok_or(AgentStoreError::ScopeUnavailable { scope }),
        }
    }

    /// Validates the name, stamps `created_at`, and writes a new record.
    ///
    /// Fails with [`AgentStoreError::AlreadyExists`] instead of replacing an existing file.
    pub fn create(
        &self,
        scope: AgentScope,
        name: &str,
        description: &str,
        model: Option<String>,
        tools: BTreeSet<String>,
    ) -> Result<StoredAgent, AgentStoreError> {
        validate_agent_name(name)?;
        let root = self.root(scope)?;
        let path = root.join(agent_file_name(name));

        let record = AgentRecord {
            name: name.to_string(),
            description: description.trim().to_string(),
            model: model
                .map(|model| model.trim().to_string())
                .filter(|model| !model.is_empty()),
            tools,
            created_at: now_rfc3339()?,
        };
        let json = serde_json::to_string_pretty(&record)
            .map_err(|source| AgentStoreError::JsonSerialize {
                path: path.clone(),
                source,
            })?;

        fs::create_dir_all(root)
            .map_err(|source| AgentStoreError::io("creating agent directory", root, source))?;
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|source| {
                if source.kind() == ErrorKind::AlreadyExists {
                    AgentStoreError::AlreadyExists {
                        name: name.to_string(),
                        path: path.clone(),
                    }
                } else {
                    AgentStoreError::io("creating agent file", &path, source)
                }
            })?;
        file.write_all(json.as_bytes())
            .and_then(|()| file.write_all(b"\n"))
            .map_err(|source| AgentStoreError::io("writing agent file", &path, source))?;

        tracing::info!(name, %scope, path = %path.display(), "agent created");
        Ok(StoredAgent {
            scope,
            path,
            record,
        })
    }

    /// Every readable record, project scope first, each scope sorted by name.
    ///
    /// Missing directories list as empty. Files that fail to parse are skipped with a warning.
    pub fn list(&self) -> Result<Vec<StoredAgent>, AgentStoreError> {
        let mut agents = Vec::new();
        for scope in AgentScope::ALL {
            let Ok(root) = self.root(scope) else {
                continue;
            };
            agents.extend(list_scope(scope, root)?);
        }
        Ok(agents)
    }
}

fn list_scope(scope: AgentScope, root: &Path) -> Result<Vec<StoredAgent>, AgentStoreError> {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(source) if source.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(AgentStoreError::io("reading agent directory", root, source));
        }
    };

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry
            .map_err(|source| AgentStoreError::io("reading agent directory", root, source))?;
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "json") && path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();

    let mut agents = Vec::with_capacity(paths.len());
    for path in paths {
        match read_record(&path) {
            Ok(record) => agents.push(StoredAgent {
                scope,
                path,
                record,
            }),
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "skipping unreadable agent record");
            }
        }
    }
    agents.sort_by(|left, right| left.record.name.cmp(&right.record.name));
    Ok(agents)
}

fn read_record(path: &Path) -> Result<AgentRecord, AgentStoreError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| AgentStoreError::io("reading agent file", path, source))?;
    let record: AgentRecord =
        serde_json::from_str(&raw).map_err(|source| AgentStoreError::JsonParse {
            path: path.to_path_buf(),
            source,
        })?;
    if OffsetDateTime::parse(&record.created_at, &Rfc3339).is_err() {
        return Err(AgentStoreError::InvalidTimestamp {
            path: path.to_path_buf(),
            value: record.created_at,
        });
    }
    Ok(record)
}

fn now_rfc3339() -> Result<String, AgentStoreError> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(AgentStoreError::ClockFormat)
}
