//! `phocco.toml` configuration.
//!
//! Every key is optional:
//!
//! ```toml
//! output = "docs"
//!
//! [highlighter]
//! command = "pygmentize"
//! remote-url = "http://pygments.appspot.com/"
//! timeout-secs = 30
//! fallback = true
//!
//! [languages.lua]
//! name = "lua"
//! symbols = ["--"]
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::highlight::{DEFAULT_COMMAND, DEFAULT_REMOTE_URL};
use crate::language::{LanguageError, LanguageProfile, LanguageRegistry, LanguageSpec};

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = "phocco.toml";

/// Output directory used when none is configured.
pub const DEFAULT_OUTPUT: &str = "docs";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Errors that can occur when loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid language '{extension}': {source}")]
    InvalidLanguage {
        extension: String,
        source: LanguageError,
    },

    #[error("highlighter timeout must be greater than zero")]
    ZeroTimeout,
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct Config {
    /// Directory pages are written to.
    pub output: PathBuf,

    /// Highlighter settings.
    pub highlighter: HighlighterConfig,

    /// Extra or overriding language profiles, keyed by extension.
    pub languages: BTreeMap<String, LanguageSpec>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output: PathBuf::from(DEFAULT_OUTPUT),
            highlighter: HighlighterConfig::default(),
            languages: BTreeMap::new(),
        }
    }
}

/// `[highlighter]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct HighlighterConfig {
    /// Local highlighter executable.
    pub command: String,

    /// Remote highlighting service endpoint.
    pub remote_url: String,

    /// Seconds to wait for the highlighter.
    pub timeout_secs: u64,

    /// Whether to use the remote service when the local command is missing.
    pub fallback: bool,
}

impl Default for HighlighterConfig {
    fn default() -> Self {
        Self {
            command: DEFAULT_COMMAND.to_string(),
            remote_url: DEFAULT_REMOTE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            fallback: true,
        }
    }
}

impl HighlighterConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Load `phocco.toml` from `dir` if present, otherwise the defaults.
    pub fn discover(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILE);
        if path.is_file() {
            Self::from_path(&path)
        } else {
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.highlighter.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        self.registry().map(|_| ())
    }

    /// The built-in languages with this configuration's entries merged over them.
    pub fn registry(&self) -> Result<LanguageRegistry, ConfigError> {
        let mut registry = LanguageRegistry::builtin();
        for (extension, spec) in &self.languages {
            let profile =
                LanguageProfile::new(spec.clone()).map_err(|source| ConfigError::InvalidLanguage {
                    extension: extension.clone(),
                    source,
                })?;
            registry.register(extension, profile);
        }
        Ok(registry)
    }
}
