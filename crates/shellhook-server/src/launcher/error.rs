//! Launcher error types.
//!
//! Every variant is an execution error: it becomes a 500 whose body is the
//! `Display` text, and it is counted against `shellhook_errors_total`.

use shellhook_core::ScriptId;

/// Errors that can occur while preparing or running a script.
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    /// The script carries neither or both of `path` / `inline`.
    #[error("invalid script {0}: exactly one of path or inline is required")]
    InvalidScript(ScriptId),

    /// The inline body could not be written to a temp file.
    #[error("error creating temporary script file: {0}")]
    TempFile(#[source] std::io::Error),

    /// The target user could not be resolved from the user database.
    #[error("{reason} for {user}")]
    Identity { user: String, reason: String },

    /// The target user's login environment could not be retrieved.
    #[error("failed to read login environment: {reason} for {user}")]
    LoginEnvironment { user: String, reason: String },

    /// The process failed to launch, exited non-zero, or timed out.
    ///
    /// Captured stdout, captured stderr and the failure reason are
    /// newline-separated in that order. Output is kept as raw bytes; the
    /// `Display` form is lossy, [`LaunchError::body`] is exact.
    #[error("{}\n{}\n{reason}", String::from_utf8_lossy(stdout), String::from_utf8_lossy(stderr))]
    Execution {
        stdout: Vec<u8>,
        stderr: Vec<u8>,
        reason: String,
    },
}

impl LaunchError {
    /// A failure with no captured output.
    pub(crate) fn bare(reason: impl Into<String>) -> Self {
        LaunchError::Execution {
            stdout: Vec::new(),
            stderr: Vec::new(),
            reason: reason.into(),
        }
    }

    /// The failure text as bytes, with captured output passed through
    /// unchanged.
    pub fn body(&self) -> Vec<u8> {
        match self {
            LaunchError::Execution {
                stdout,
                stderr,
                reason,
            } => {
                let mut body = Vec::with_capacity(stdout.len() + stderr.len() + reason.len() + 2);
                body.extend_from_slice(stdout);
                body.push(b'\n');
                body.extend_from_slice(stderr);
                body.push(b'\n');
                body.extend_from_slice(reason.as_bytes());
                body
            }
            other => other.to_string().into_bytes(),
        }
    }
}
