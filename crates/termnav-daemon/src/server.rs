use crate::registry::{TerminalEntry, TerminalRegistry};
use anyhow::Result;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use termnav_proc::CwdResolver;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<TerminalRegistry>,
    pub resolver: Arc<CwdResolver>,
}

/// Wire shape of `GET /api/terminal-cwd/{terminal_name}`. `cwd` is empty and
/// `error` populated on the failure statuses; clients key off the HTTP code.
#[derive(Debug, Serialize)]
pub struct CwdResponse {
    pub terminal_name: String,
    pub cwd: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub pid: i32,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/terminal-cwd/{terminal_name}", get(terminal_cwd))
        .route("/api/terminals", post(register_terminal).get(list_terminals))
        .route("/api/terminals/{terminal_name}", delete(unregister_terminal))
        .with_state(state)
}

pub async fn serve(state: AppState, addr: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("termnavd listening on {}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn terminal_cwd(
    State(state): State<AppState>,
    Path(terminal_name): Path<String>,
) -> (StatusCode, Json<CwdResponse>) {
    let Some(pid) = state.registry.lookup(&terminal_name).await else {
        return failure(
            StatusCode::NOT_FOUND,
            terminal_name.clone(),
            format!("terminal '{}' not found", terminal_name),
        );
    };

    // /proc reads and external tool invocations block; keep them off the
    // event loop.
    let resolver = state.resolver.clone();
    match tokio::task::spawn_blocking(move || resolver.resolve(pid)).await {
        Ok(Ok(cwd)) => (
            StatusCode::OK,
            Json(CwdResponse {
                terminal_name,
                cwd: cwd.to_string_lossy().to_string(),
                error: None,
            }),
        ),
        Ok(Err(e)) => {
            tracing::warn!(
                "cwd resolution for terminal {} (pid {}) failed: {}",
                terminal_name,
                pid,
                e
            );
            failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                terminal_name,
                e.to_string(),
            )
        }
        Err(e) => {
            tracing::error!("cwd resolution task failed: {}", e);
            failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                terminal_name,
                "could not determine terminal cwd".to_string(),
            )
        }
    }
}

fn failure(status: StatusCode, terminal_name: String, error: String) -> (StatusCode, Json<CwdResponse>) {
    (
        status,
        Json(CwdResponse {
            terminal_name,
            cwd: String::new(),
            error: Some(error),
        }),
    )
}

async fn register_terminal(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<TerminalEntry>, (StatusCode, Json<ErrorBody>)> {
    if req.name.is_empty() {
        return Err(bad_request("terminal name cannot be empty"));
    }
    if req.pid <= 0 {
        return Err(bad_request("pid must be positive"));
    }
    Ok(Json(state.registry.register(&req.name, req.pid).await))
}

fn bad_request(msg: &str) -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            error: msg.to_string(),
        }),
    )
}

async fn list_terminals(State(state): State<AppState>) -> Json<Vec<TerminalEntry>> {
    Json(state.registry.list().await)
}

async fn unregister_terminal(
    State(state): State<AppState>,
    Path(terminal_name): Path<String>,
) -> StatusCode {
    if state.registry.unregister(&terminal_name).await {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    }
}
