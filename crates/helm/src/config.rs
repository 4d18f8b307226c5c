//! Layered configuration.
//!
//! Precedence, lowest first: built-in defaults, the settings file under the helm home,
//! `.env` in the working directory, then the process environment. `.env` is parsed without
//! touching the process environment.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use chat_api::ChatApiConfig;
use thiserror::Error;

use crate::settings;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_BASE_URL: &str = chat_api::url::DEFAULT_BASE_URL;

pub const HOME_VAR: &str = "HELM_HOME";
pub const API_KEY_VAR: &str = "HELM_API_KEY";
pub const API_KEY_FALLBACK_VAR: &str = "OPENAI_API_KEY";
pub const MODEL_VAR: &str = "HELM_MODEL";
pub const BASE_URL_VAR: &str = "HELM_BASE_URL";
pub const MAX_TOOL_ROUNDS_VAR: &str = "HELM_MAX_TOOL_ROUNDS";

const KNOWN_KEYS: [&str; 5] = [
    API_KEY_VAR,
    API_KEY_FALLBACK_VAR,
    MODEL_VAR,
    BASE_URL_VAR,
    MAX_TOOL_ROUNDS_VAR,
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine a home directory; set HELM_HOME")]
    NoHome,
    #[error("failed to read {path}: {source}")]
    EnvFile {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },
    #[error("invalid {key} value {value:?}: expected a positive integer")]
    InvalidValue { key: &'static str, value: String },
    #[error("no API key configured; run `helm login` or set HELM_API_KEY")]
    MissingApiKey,
}

/// Where helm keeps its settings and logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelmPaths {
    pub home: PathBuf,
}

impl HelmPaths {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    /// `$HELM_HOME`, else `~/.helm`.
    pub fn discover() -> Result<Self, ConfigError> {
        if let Some(home) = std::env::var_os(HOME_VAR).filter(|value| !value.is_empty()) {
            return Ok(Self::new(home));
        }
        dirs::home_dir()
            .map(|home| Self::new(home.join(".helm")))
            .ok_or(ConfigError::NoHome)
    }

    pub fn settings_file(&self) -> PathBuf {
        self.home.join("config")
    }

    pub fn log_dir(&self) -> PathBuf {
        self.home.join("logs")
    }
}

/// Layer a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Default,
    SettingsFile,
    DotEnv,
    Environment,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Default => "default",
            Self::SettingsFile => "settings file",
            Self::DotEnv => ".env",
            Self::Environment => "environment",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sourced<T> {
    pub value: T,
    pub source: Source,
}

impl<T> Sourced<T> {
    fn new(value: T, source: Source) -> Self {
        Self { value, source }
    }
}

/// Raw key/value maps for each non-default layer.
#[derive(Debug, Clone, Default)]
pub struct ConfigLayers {
    pub settings: BTreeMap<String, String>,
    pub dotenv: BTreeMap<String, String>,
    pub environment: BTreeMap<String, String>,
}

impl ConfigLayers {
    pub fn load(paths: &HelmPaths, cwd: &Path) -> Result<Self, ConfigError> {
        let settings = read_env_file(&paths.settings_file())?;
        let dotenv = read_env_file(&cwd.join(".env"))?;
        let environment = KNOWN_KEYS
            .iter()
            .filter_map(|key| std::env::var(key).ok().map(|value| (key.to_string(), value)))
            .collect();

        tracing::debug!(
            settings = settings.len(),
            dotenv = dotenv.len(),
            "configuration layers loaded"
        );
        Ok(Self {
            settings,
            dotenv,
            environment,
        })
    }

    /// Highest-precedence non-empty value for `key`.
    pub fn lookup(&self, key: &str) -> Option<Sourced<String>> {
        [
            (&self.environment, Source::Environment),
            (&self.dotenv, Source::DotEnv),
            (&self.settings, Source::SettingsFile),
        ]
        .into_iter()
        .find_map(|(layer, source)| {
            layer
                .get(key)
                .map(|value| value.trim())
                .filter(|value| !value.is_empty())
                .map(|value| Sourced::new(value.to_string(), source))
        })
    }

    pub fn resolve(&self) -> Result<ResolvedConfig, ConfigError> {
        let api_key = self
            .lookup(API_KEY_VAR)
            .or_else(|| self.lookup(API_KEY_FALLBACK_VAR));
        let model = self
            .lookup(MODEL_VAR)
            .unwrap_or_else(|| Sourced::new(DEFAULT_MODEL.to_string(), Source::Default));
        let base_url = self
            .lookup(BASE_URL_VAR)
            .unwrap_or_else(|| Sourced::new(DEFAULT_BASE_URL.to_string(), Source::Default));
        let max_tool_rounds = match self.lookup(MAX_TOOL_ROUNDS_VAR) {
            Some(raw) => Some(Sourced::new(parse_round_limit(&raw.value)?, raw.source)),
            None => None,
        };

        Ok(ResolvedConfig {
            api_key,
            model,
            base_url,
            max_tool_rounds,
        })
    }
}

fn parse_round_limit(value: &str) -> Result<u32, ConfigError> {
    value
        .parse::<u32>()
        .ok()
        .filter(|limit| *limit > 0)
        .ok_or_else(|| ConfigError::InvalidValue {
            key: MAX_TOOL_ROUNDS_VAR,
            value: value.to_string(),
        })
}

/// Both file layers share the `.env` syntax; a missing file is an empty layer.
fn read_env_file(path: &Path) -> Result<BTreeMap<String, String>, ConfigError> {
    settings::read_values(path).map_err(|source| ConfigError::EnvFile {
        path: path.to_path_buf(),
        source,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub api_key: Option<Sourced<String>>,
    pub model: Sourced<String>,
    pub base_url: Sourced<String>,
    pub max_tool_rounds: Option<Sourced<u32>>,
}

impl ResolvedConfig {
    pub fn load(paths: &HelmPaths, cwd: &Path) -> Result<Self, ConfigError> {
        ConfigLayers::load(paths, cwd)?.resolve()
    }

    pub fn api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_ref()
            .map(|key| key.value.as_str())
            .ok_or(ConfigError::MissingApiKey)
    }

    pub fn max_tool_rounds(&self) -> Option<u32> {
        self.max_tool_rounds.as_ref().map(|limit| limit.value)
    }

    /// Key with everything but the last four characters hidden.
    pub fn masked_api_key(&self) -> String {
        match &self.api_key {
            None => "(not set)".to_string(),
            Some(key) => mask_secret(&key.value),
        }
    }

    /// Human-readable summary with the layer each value came from.
    pub fn report_lines(&self, paths: &HelmPaths) -> Vec<String> {
        let key_source = self
            .api_key
            .as_ref()
            .map(|key| key.source.to_string())
            .unwrap_or_else(|| "missing".to_string());
        let rounds = match &self.max_tool_rounds {
            Some(limit) => format!("{} ({})", limit.value, limit.source),
            None => "unlimited (default)".to_string(),
        };
        vec![
            format!("API key:         {} ({key_source})", self.masked_api_key()),
            format!("Model:           {} ({})", self.model.value, self.model.source),
            format!(
                "Base URL:        {} ({})",
                self.base_url.value, self.base_url.source
            ),
            format!("Max tool rounds: {rounds}"),
            format!("Settings file:   {}", paths.settings_file().display()),
            format!("Log directory:   {}", paths.log_dir().display()),
        ]
    }

    pub fn chat_api_config(&self) -> Result<ChatApiConfig, ConfigError> {
        Ok(ChatApiConfig::new(self.api_key()?)
            .with_base_url(self.base_url.value.clone())
            .with_user_agent(format!("helm/{}", env!("CARGO_PKG_VERSION"))))
    }
}

fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{tail}", "*".repeat(chars.len() - 4))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_keeps_only_the_tail() {
        assert_eq!(mask_secret("sk-abcdefgh1234"), "***********1234");
        assert_eq!(mask_secret("short"), "*****");
    }

    #[test]
    fn round_limit_must_be_positive() {
        assert_eq!(parse_round_limit("8").expect("8 is valid"), 8);
        for value in ["0", "-1", "many"] {
            assert!(matches!(
                parse_round_limit(value),
                Err(ConfigError::InvalidValue { .. })
            ));
        }
    }
}
