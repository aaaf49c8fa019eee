//! Shared helpers for router-level tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use shellhook_core::{EnvVar, Registry, Script};
use shellhook_server::launcher::Launcher;
use shellhook_server::metrics::Metrics;
use shellhook_server::router::build_router;
use shellhook_server::state::AppState;

pub const SCRIPT_ID: &str = "b9f71a96-0d23-11ee-860e-ff55b106c448";
pub const INLINE_ID: &str = "47878e38-a700-11ee-bc6d-f3d25921fcde";

/// Absolute path of a fixture under `tests/scripts`.
pub fn script_path(name: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("scripts")
        .join(name)
        .display()
        .to_string()
}

/// Builds state whose inline scripts are materialized under `temp_dir`.
pub fn test_state(
    default_token: &str,
    environment: Vec<EnvVar>,
    scripts: Vec<Script>,
    temp_dir: &std::path::Path,
) -> AppState {
    let registry = Registry::new(default_token, environment, scripts)
        .expect("test registry must be valid");
    let launcher = Launcher::new(Arc::new(Metrics::new())).with_temp_dir(temp_dir);
    AppState::with_launcher(registry, launcher)
}

pub fn test_app(state: AppState) -> Router {
    build_router(state)
}

/// Sends a GET with an optional raw `Authorization` header and returns
/// (status, body text).
pub async fn get(app: &Router, path: &str, token: Option<&str>) -> (StatusCode, String) {
    let mut builder = Request::builder().uri(path);
    if let Some(token) = token {
        builder = builder.header("Authorization", token);
    }
    let response = app
        .clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8_lossy(&bytes).into_owned())
}

/// `PATH` for scripts whose environment is replaced by configured entries.
pub fn path_env() -> EnvVar {
    EnvVar::new(
        "PATH",
        std::env::var("PATH").unwrap_or_else(|_| "/usr/bin:/bin".to_string()),
    )
}
