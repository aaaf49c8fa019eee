//! Interpreter resolution and inline script materialization.

use std::io::Write;
use std::path::Path;

use tempfile::TempPath;

use shellhook_core::Script;

/// Interpreter used when neither the script nor `SHELL` names one.
pub const FALLBACK_SHELL: &str = "/bin/sh";

/// Suffix for materialized inline scripts.
pub const TEMP_SUFFIX: &str = "-shellhook";

/// Picks the interpreter: script override, then `SHELL`, then `/bin/sh`.
pub fn resolve_shell(script: &Script) -> String {
    resolve_shell_with(script, std::env::var("SHELL").ok())
}

pub(crate) fn resolve_shell_with(script: &Script, env_shell: Option<String>) -> String {
    script
        .shell
        .clone()
        .or_else(|| env_shell.filter(|s| !s.is_empty()))
        .unwrap_or_else(|| FALLBACK_SHELL.to_string())
}

/// Writes an inline body verbatim to a uniquely named file in `dir`.
///
/// The returned [`TempPath`] deletes the file when closed or dropped.
pub fn materialize(body: &str, dir: &Path) -> std::io::Result<TempPath> {
    let mut file = tempfile::Builder::new()
        .suffix(TEMP_SUFFIX)
        .tempfile_in(dir)?;
    file.write_all(body.as_bytes())?;
    file.flush()?;
    Ok(file.into_temp_path())
}
