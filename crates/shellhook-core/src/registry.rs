//! The script registry and its YAML loader.
//!
//! [`Registry`] is built once at startup, validated, and then only read.
//! The read path distinguishes a malformed identifier from an unknown one
//! so the HTTP layer can answer 400 vs 404.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::Deserialize;

use crate::error::CoreError;
use crate::id::ScriptId;
use crate::script::{EnvVar, Script};

/// On-disk configuration document.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    default_token: String,
    #[serde(default)]
    environment: Vec<EnvVar>,
    #[serde(default)]
    scripts: Vec<Script>,
}

/// Immutable table of every registered script plus shared defaults.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    default_token: String,
    environment: Vec<EnvVar>,
    scripts: Vec<Script>,
    index: HashMap<ScriptId, usize>,
}

impl Registry {
    /// Builds a registry from parts, validating every script.
    pub fn new(
        default_token: impl Into<String>,
        environment: Vec<EnvVar>,
        scripts: Vec<Script>,
    ) -> Result<Self, CoreError> {
        Self::validate(&scripts)?;
        let index = scripts
            .iter()
            .enumerate()
            .map(|(pos, script)| (script.id, pos))
            .collect();
        Ok(Registry {
            default_token: default_token.into(),
            environment,
            scripts,
            index,
        })
    }

    /// An empty registry (no scripts, empty default token).
    pub fn empty() -> Self {
        Registry::default()
    }

    /// Loads and validates the YAML configuration at `path`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| CoreError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&raw)
    }

    /// Parses and validates a YAML configuration document.
    pub fn from_yaml_str(raw: &str) -> Result<Self, CoreError> {
        // An empty document is a valid, empty configuration.
        let config: ConfigFile = if raw.trim().is_empty() {
            ConfigFile::default()
        } else {
            serde_yaml_ng::from_str(raw)?
        };
        Self::new(config.default_token, config.environment, config.scripts)
    }

    /// Checks that each script has exactly one of `path` / `inline` and
    /// that no identifier is registered twice.
    pub fn validate(scripts: &[Script]) -> Result<(), CoreError> {
        let mut seen = HashSet::new();
        for script in scripts {
            if script.source().is_none() {
                let reason = if script.path.is_some() {
                    "both path and inline are set"
                } else {
                    "one of path or inline is required"
                };
                return Err(CoreError::InvalidScript {
                    id: script.id,
                    reason: reason.to_string(),
                });
            }
            if !seen.insert(script.id) {
                return Err(CoreError::DuplicateScript { id: script.id });
            }
        }
        Ok(())
    }

    /// Looks up a script by identifier.
    pub fn lookup(&self, id: &ScriptId) -> Result<&Script, CoreError> {
        self.index
            .get(id)
            .map(|&pos| &self.scripts[pos])
            .ok_or(CoreError::ScriptNotFound { id: *id })
    }

    /// Parses a textual identifier and looks it up.
    ///
    /// Returns `MalformedId` for unparseable input and `ScriptNotFound`
    /// for a well-formed identifier that is not registered.
    pub fn resolve(&self, input: &str) -> Result<&Script, CoreError> {
        let id = ScriptId::parse(input)?;
        self.lookup(&id)
    }

    /// The token a request for `script` must present.
    pub fn token_for<'a>(&'a self, script: &'a Script) -> &'a str {
        script.token.as_deref().unwrap_or(&self.default_token)
    }

    pub fn default_token(&self) -> &str {
        &self.default_token
    }

    /// Registry-wide environment, applied before script-scoped entries.
    pub fn environment(&self) -> &[EnvVar] {
        &self.environment
    }

    pub fn scripts(&self) -> &[Script] {
        &self.scripts
    }

    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }
}
