use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Where an agent record lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentScope {
    /// `<project>/.helm/agents`
    Project,
    /// `~/.helm/agents`
    Personal,
}

impl AgentScope {
    pub const ALL: [AgentScope; 2] = [AgentScope::Project, AgentScope::Personal];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Personal => "personal",
        }
    }
}

impl fmt::Display for AgentScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A custom agent definition. Written once, never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRecord {
    pub name: String,
    pub description: String,
    /// `None` means the agent uses whatever model the session runs.
    #[serde(default)]
    pub model: Option<String>,
    /// Capability names the agent may use.
    #[serde(default)]
    pub tools: BTreeSet<String>,
    /// RFC 3339, UTC.
    pub created_at: String,
}
