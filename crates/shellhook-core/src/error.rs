//! Core error types for shellhook-core.
//!
//! Covers configuration loading failures (all startup-fatal) and the two
//! distinguishable resolution failures of the registry read path.

use thiserror::Error;

use crate::id::ScriptId;

/// Errors produced by the shellhook-core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The configuration file could not be read.
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The configuration document is not valid YAML or has the wrong shape.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml_ng::Error),

    /// A script entry does not carry exactly one of `path` / `inline`.
    #[error("invalid script {id}: {reason}")]
    InvalidScript { id: ScriptId, reason: String },

    /// Two script entries share the same identifier.
    #[error("duplicate script id: {id}")]
    DuplicateScript { id: ScriptId },

    /// The textual identifier is missing or is not a UUID.
    #[error("malformed script id: '{input}'")]
    MalformedId { input: String },

    /// The identifier is a valid UUID but no script is registered under it.
    #[error("script not found: {id}")]
    ScriptNotFound { id: ScriptId },
}
