//! Child process environment assembly.
//!
//! The list is ordered: login environment of the target user (if any),
//! then registry-wide entries, then script-scoped entries. A later entry
//! with the same key overrides an earlier one.

use std::process::Stdio;

use tokio::process::Command;

use shellhook_core::EnvVar;

use super::error::LaunchError;

/// Concatenates registry-wide and script-scoped entries, registry first.
pub fn assemble_environment(registry: &[EnvVar], script: &[EnvVar]) -> Vec<EnvVar> {
    registry.iter().chain(script.iter()).cloned().collect()
}

/// Installs `env` on `cmd`.
///
/// An empty list leaves the inherited environment untouched; otherwise the
/// child sees exactly the listed variables.
pub fn apply_environment(cmd: &mut Command, env: &[EnvVar]) {
    if env.is_empty() {
        return;
    }
    cmd.env_clear();
    for var in env {
        cmd.env(&var.key, &var.value);
    }
}

/// Reads `username`'s login environment via `sudo -Hiu <user> env`.
pub async fn login_environment(username: &str) -> Result<Vec<EnvVar>, LaunchError> {
    let output = Command::new("sudo")
        .args(["-Hiu", username, "env"])
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|err| LaunchError::LoginEnvironment {
            user: username.to_string(),
            reason: err.to_string(),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(LaunchError::LoginEnvironment {
            user: username.to_string(),
            reason: format!("{} {}", output.status, stderr.trim()),
        });
    }

    Ok(parse_env_listing(&String::from_utf8_lossy(&output.stdout)))
}

/// Parses `env` output, one `KEY=value` per line.
pub(crate) fn parse_env_listing(listing: &str) -> Vec<EnvVar> {
    listing
        .lines()
        .filter_map(|line| line.split_once('='))
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| EnvVar::new(key, value))
        .collect()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn registry_entries_come_first() {
        let registry = vec![EnvVar::new("NAME", "Gandalf"), EnvVar::new("A", "1")];
        let script = vec![EnvVar::new("NAME", "Frodo")];
        let env = assemble_environment(&registry, &script);
        assert_eq!(
            env,
            vec![
                EnvVar::new("NAME", "Gandalf"),
                EnvVar::new("A", "1"),
                EnvVar::new("NAME", "Frodo"),
            ]
        );
    }

    #[test]
    fn parses_env_listing() {
        let listing = "HOME=/home/deploy\nPATH=/usr/bin:/bin\nEQ=a=b\n\nnot a var\n";
        assert_eq!(
            parse_env_listing(listing),
            vec![
                EnvVar::new("HOME", "/home/deploy"),
                EnvVar::new("PATH", "/usr/bin:/bin"),
                EnvVar::new("EQ", "a=b"),
            ]
        );
    }

    proptest! {
        #[test]
        fn assembly_preserves_order_and_length(
            registry in proptest::collection::vec(("[A-Z]{1,4}", "[a-z]{0,8}"), 0..8),
            script in proptest::collection::vec(("[A-Z]{1,4}", "[a-z]{0,8}"), 0..8),
        ) {
            let registry: Vec<EnvVar> = registry.into_iter().map(|(k, v)| EnvVar::new(k, v)).collect();
            let script: Vec<EnvVar> = script.into_iter().map(|(k, v)| EnvVar::new(k, v)).collect();
            let env = assemble_environment(&registry, &script);

            prop_assert_eq!(env.len(), registry.len() + script.len());
            prop_assert_eq!(&env[..registry.len()], &registry[..]);
            prop_assert_eq!(&env[registry.len()..], &script[..]);
        }
    }
}
