//! Script execution handler.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use tokio::task::JoinError;

use shellhook_core::{CoreError, Script, ScriptId};

use crate::auth;
use crate::error::ApiError;
use crate::extract::ClientAddr;
use crate::launcher::LaunchError;
use crate::metrics::Metrics;
use crate::state::AppState;

/// Query string of `GET /hook`.
#[derive(Debug, Deserialize)]
pub struct HookParams {
    pub script: Option<String>,
}

/// `GET /hook?script=<uuid>`
pub async fn run_hook(
    State(state): State<AppState>,
    ClientAddr(client): ClientAddr,
    params: Result<Query<HookParams>, QueryRejection>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let raw_id = params
        .ok()
        .and_then(|Query(params)| params.script)
        .unwrap_or_default();

    let script = match state.registry.resolve(&raw_id) {
        Ok(script) => script.clone(),
        Err(err) => {
            if matches!(err, CoreError::MalformedId { .. }) {
                tracing::warn!(script = %raw_id, client = %client, "Invalid script parameter");
            } else {
                tracing::warn!(script = %raw_id, client = %client, "Script not found");
            }
            return Err(ApiError::from(err));
        }
    };

    let provided = headers
        .get(AUTHORIZATION)
        .map(|value| value.as_bytes())
        .unwrap_or_default();
    if let Err(err) = auth::authorize(provided, state.registry.token_for(&script)) {
        tracing::warn!(error = %err, client = %client, script = %script.id, "Authorization error");
        return Err(err.into());
    }

    tracing::info!(
        id = %script.id,
        path = script.path.as_deref().unwrap_or_default(),
        inline = script.is_inline(),
        concurrent = script.concurrent,
        shell = script.shell.as_deref().unwrap_or_default(),
        user = script.user.as_deref().unwrap_or_default(),
        client = %client,
        "Executing script"
    );

    let id = script.id;
    let output = execute(state, script).await?;
    tracing::info!(id = %id, bytes = output.len(), "Script succeeded");
    Ok((
        StatusCode::OK,
        [(CONTENT_TYPE, "text/plain; charset=utf-8")],
        output,
    )
        .into_response())
}

/// Runs the script on a detached task that owns the script lease.
///
/// If the client goes away mid-request the task keeps the lock until the
/// child exits, so a serialized script never overlaps with itself.
async fn execute(state: AppState, script: Script) -> Result<Vec<u8>, ApiError> {
    let id = script.id;
    let metrics = state.metrics.clone();
    let task = tokio::spawn(async move {
        if state.locks.is_serialized(&script.id) {
            tracing::debug!(id = %script.id, "Acquiring lock for script");
        }
        let lease = state.locks.acquire(&script.id).await;
        let result = state
            .launcher
            .run(&script, state.registry.environment())
            .await;
        drop(lease);
        result
    });

    settle(&metrics, id, task.await)
}

/// Maps a joined execution task to the handler result.
///
/// Launch failures were already logged and counted by the launcher; a task
/// that died before reporting is logged and counted here.
fn settle(
    metrics: &Metrics,
    id: ScriptId,
    joined: Result<Result<Vec<u8>, LaunchError>, JoinError>,
) -> Result<Vec<u8>, ApiError> {
    match joined {
        Ok(result) => result.map_err(ApiError::from),
        Err(err) => {
            metrics.record_error();
            tracing::error!(script = %id, error = %err, "Execution task failed");
            Err(ApiError::Internal(format!("execution task failed: {err}")))
        }
    }
}
