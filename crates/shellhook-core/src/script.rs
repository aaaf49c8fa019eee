//! Script definitions and environment entries.
//!
//! A [`Script`] is either a path to an executable file or an inline body
//! that gets materialized at execution time. Empty strings in the
//! configuration are treated the same as absent keys.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};

use crate::id::ScriptId;

/// A single `KEY=value` entry passed to a child process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVar {
    pub key: String,
    pub value: String,
}

impl EnvVar {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        EnvVar {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A registered, identifier-addressed unit of execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    pub id: ScriptId,
    /// Filesystem path to the script. Mutually exclusive with `inline`.
    #[serde(default, deserialize_with = "non_empty", skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Script body materialized to a temp file per execution.
    #[serde(default, deserialize_with = "non_empty", skip_serializing_if = "Option::is_none")]
    pub inline: Option<String>,
    /// Per-script token; the registry default applies when absent.
    #[serde(default, deserialize_with = "non_empty", skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// When false, executions of this script are serialized process-wide.
    #[serde(default)]
    pub concurrent: bool,
    /// Interpreter override.
    #[serde(default, deserialize_with = "non_empty", skip_serializing_if = "Option::is_none")]
    pub shell: Option<String>,
    /// OS user to execute as.
    #[serde(default, deserialize_with = "non_empty", skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Script-scoped environment, applied after the registry-wide list.
    #[serde(default)]
    pub environment: Vec<EnvVar>,
    /// Optional execution limit in seconds. No limit when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

/// Where the script body comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptSource<'a> {
    Path(&'a Path),
    Inline(&'a str),
}

impl Script {
    /// A non-concurrent script backed by a file on disk.
    pub fn from_path(id: ScriptId, path: impl Into<String>) -> Self {
        Script {
            path: Some(path.into()),
            ..Script::empty(id)
        }
    }

    /// A non-concurrent script with an inline body.
    pub fn inline(id: ScriptId, body: impl Into<String>) -> Self {
        Script {
            inline: Some(body.into()),
            ..Script::empty(id)
        }
    }

    fn empty(id: ScriptId) -> Self {
        Script {
            id,
            path: None,
            inline: None,
            token: None,
            concurrent: false,
            shell: None,
            user: None,
            environment: Vec::new(),
            timeout: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_concurrent(mut self, concurrent: bool) -> Self {
        self.concurrent = concurrent;
        self
    }

    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = Some(shell.into());
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.push(EnvVar::new(key, value));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout.as_secs());
        self
    }

    /// Returns the script source, or `None` unless exactly one of
    /// `path` / `inline` is set.
    pub fn source(&self) -> Option<ScriptSource<'_>> {
        match (self.path.as_deref(), self.inline.as_deref()) {
            (Some(path), None) => Some(ScriptSource::Path(Path::new(path))),
            (None, Some(body)) => Some(ScriptSource::Inline(body)),
            _ => None,
        }
    }

    pub fn is_inline(&self) -> bool {
        matches!(self.source(), Some(ScriptSource::Inline(_)))
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }
}

fn non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}
