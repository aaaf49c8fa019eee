//! Configuration loading from files on disk.

use std::io::Write;
use std::path::PathBuf;

use proptest::prelude::*;

use shellhook_core::{CoreError, Registry, Script, ScriptId};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn configuration_loads_correctly() {
    let registry = Registry::from_file(fixture("config.yaml")).unwrap();
    let id = ScriptId::parse("5e5adb92-0d04-11ee-97cf-4b6c30e50f6a").unwrap();

    assert_eq!(
        registry.default_token(),
        "KXjk9waX9fqRLQ4t8sQf5IK94e2u1CXr8X4MscDc"
    );
    assert_eq!(registry.len(), 3);

    let scripts = registry.scripts();
    assert_eq!(scripts[0].id, id);
    assert_eq!(scripts[0].path.as_deref(), Some("./scripts/success.sh"));
    assert!(!scripts[0].concurrent);
    assert!(scripts[1].concurrent);
    assert_eq!(
        scripts[1].token.as_deref(),
        Some("YT9U08gqQ8yxa0Sk3PnDk6jpWu31bCyqa5SRQVFV8")
    );
    assert_eq!(scripts[2].inline.as_deref(), Some("echo \"Hello, world!\"\n"));
    assert_eq!(scripts[2].shell.as_deref(), Some("/bin/sh"));
    assert_eq!(scripts[2].environment.len(), 1);
}

#[test]
fn configuration_fails_on_invalid_script() {
    let err = Registry::from_file(fixture("bad_config.yaml")).unwrap_err();
    assert!(matches!(err, CoreError::InvalidScript { .. }), "{err}");
}

#[test]
fn configuration_fails_on_bad_yaml() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "scripts: [this is: not: valid").unwrap();
    let err = Registry::from_file(file.path()).unwrap_err();
    assert!(matches!(err, CoreError::Parse(_)), "{err}");
}

proptest! {
    #[test]
    fn every_registered_script_resolves(count in 0usize..16, probe in any::<u128>()) {
        let scripts: Vec<Script> = (0..count)
            .map(|i| Script::inline(ScriptId::new_v4(), format!("echo {i}")))
            .collect();
        let registry = Registry::new("token", Vec::new(), scripts.clone()).unwrap();

        for script in &scripts {
            let found = registry.resolve(&script.id.to_string()).unwrap();
            prop_assert_eq!(found, script);
        }

        let unknown = ScriptId(uuid::Uuid::from_u128(probe));
        if !scripts.iter().any(|s| s.id == unknown) {
            let is_not_found = matches!(
                registry.lookup(&unknown),
                Err(CoreError::ScriptNotFound { .. })
            );
            prop_assert!(is_not_found);
        }
    }
}
