//! Process launcher: turns a resolved [`Script`] into a finished OS process.
//!
//! [`Launcher::run`] resolves the interpreter, materializes inline bodies,
//! assembles the environment, optionally switches user, runs the script and
//! captures its output. Every step is fail-fast.
//!
//! The launcher is the single counting point for execution metrics: one
//! `execs_total` per [`Launcher::run`] call, one `errors_total` per failed
//! run, and one more for each temp file that could not be removed.

pub mod environment;
pub mod error;
pub mod identity;
pub mod shell;

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;

use tokio::process::Command;

use shellhook_core::{EnvVar, Script, ScriptSource};

use crate::metrics::Metrics;

pub use environment::{apply_environment, assemble_environment, login_environment};
pub use error::LaunchError;
pub use identity::{Identity, IdentityResolver, SystemIdentities};
pub use shell::{materialize, resolve_shell, FALLBACK_SHELL};

/// Runs scripts and accounts for each attempt.
pub struct Launcher {
    metrics: Arc<Metrics>,
    identities: Box<dyn IdentityResolver>,
    temp_dir: PathBuf,
}

impl Launcher {
    /// A launcher using the system user database and temp directory.
    pub fn new(metrics: Arc<Metrics>) -> Self {
        Launcher {
            metrics,
            identities: Box::new(SystemIdentities),
            temp_dir: std::env::temp_dir(),
        }
    }

    /// Replaces the user database used for privilege drops.
    pub fn with_identities(mut self, identities: impl IdentityResolver + 'static) -> Self {
        self.identities = Box::new(identities);
        self
    }

    /// Places materialized inline scripts under `dir`.
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = dir.into();
        self
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    /// Executes `script` and returns its standard output.
    pub async fn run(&self, script: &Script, registry_env: &[EnvVar]) -> Result<Vec<u8>, LaunchError> {
        self.metrics.record_exec();
        let result = self.execute(script, registry_env).await;
        if let Err(err) = &result {
            self.metrics.record_error();
            tracing::error!(script = %script.id, error = %err, "Script execution failed");
        }
        result
    }

    async fn execute(&self, script: &Script, registry_env: &[EnvVar]) -> Result<Vec<u8>, LaunchError> {
        let shell = resolve_shell(script);
        let run_as = match script.user.as_deref() {
            Some(user) => Some((user, self.identities.resolve(user)?)),
            None => None,
        };

        match script.source() {
            Some(ScriptSource::Path(path)) => {
                self.invoke(&shell, path, script, run_as, registry_env).await
            }
            Some(ScriptSource::Inline(body)) => {
                let temp = materialize(body, &self.temp_dir).map_err(LaunchError::TempFile)?;
                if let Some((_, identity)) = &run_as {
                    identity::hand_over(&temp, identity).map_err(LaunchError::TempFile)?;
                }
                let outcome = self.invoke(&shell, &temp, script, run_as, registry_env).await;

                let temp_path = temp.to_path_buf();
                if let Err(err) = temp.close() {
                    // Logged and counted, but the execution outcome stands.
                    self.metrics.record_error();
                    tracing::error!(
                        script = %script.id,
                        path = %temp_path.display(),
                        error = %err,
                        "Failed to remove temporary script"
                    );
                }
                outcome
            }
            None => Err(LaunchError::InvalidScript(script.id)),
        }
    }

    async fn invoke(
        &self,
        shell: &str,
        target: &Path,
        script: &Script,
        run_as: Option<(&str, Identity)>,
        registry_env: &[EnvVar],
    ) -> Result<Vec<u8>, LaunchError> {
        let mut cmd = Command::new(shell);
        cmd.arg(target)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(script.timeout().is_some());

        let mut env = Vec::new();
        if let Some((user, identity)) = run_as {
            tracing::debug!(script = %script.id, user, uid = identity.uid, gid = identity.gid, "Running script as user");
            env.extend(login_environment(user).await?);
            identity::apply_identity(&mut cmd, identity);
        }
        env.extend(assemble_environment(registry_env, &script.environment));
        apply_environment(&mut cmd, &env);

        let child = cmd
            .spawn()
            .map_err(|err| LaunchError::bare(err.to_string()))?;

        let output = match script.timeout() {
            Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| LaunchError::bare(format!("timed out after {}s", limit.as_secs())))?,
            None => child.wait_with_output().await,
        }
        .map_err(|err| LaunchError::bare(err.to_string()))?;

        if !output.status.success() {
            return Err(LaunchError::Execution {
                stdout: output.stdout,
                stderr: output.stderr,
                reason: describe_exit(output.status),
            });
        }

        tracing::debug!(
            script = %script.id,
            target = %target.display(),
            output = %String::from_utf8_lossy(&output.stdout),
            "Script output"
        );
        Ok(output.stdout)
    }
}

fn describe_exit(status: ExitStatus) -> String {
    if let Some(code) = status.code() {
        return format!("exit status {code}");
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return format!("terminated by signal {signal}");
        }
    }
    "terminated abnormally".to_string()
}
