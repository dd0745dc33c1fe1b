use crate::{
    config::{Config, Cors},
    errors::AppError,
    sandbox::{self, FileEntry},
    workspaces::WorkspaceStore,
};
use anyhow::Context;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use http::{HeaderName, HeaderValue, Method};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub workspaces: Arc<WorkspaceStore>,
}

#[derive(Debug, Serialize)]
pub struct FileListResponse {
    pub files: Vec<FileEntry>,
}

#[derive(Debug, Serialize)]
pub struct FileContentResponse {
    pub path: String,
    pub contents: String,
}

pub async fn serve(cfg: Config, workspaces: WorkspaceStore) -> anyhow::Result<()> {
    let addr = cfg.socket_addr()?;
    let shared = AppState { cfg: Arc::new(cfg), workspaces: Arc::new(workspaces) };
    let app = build_router(shared)?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(shared: AppState) -> anyhow::Result<Router> {
    let base = shared.cfg.route_prefix().to_string();
    let cors = cors_layer(&shared.cfg.cors)?;
    Ok(Router::new()
        .route("/healthz", get(health))
        .route(&format!("{base}/:project_id/files"), get(list_project_files))
        .route(&format!("{base}/:project_id/files/*file_path"), get(read_project_file))
        .fallback(fallback)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(shared))
}

pub fn cors_layer(cfg: &Cors) -> anyhow::Result<CorsLayer> {
    let origins = if cfg.allow_origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let list = cfg
            .allow_origins
            .iter()
            .map(|o| HeaderValue::from_str(o).with_context(|| format!("invalid CORS origin: {o}")))
            .collect::<anyhow::Result<Vec<_>>>()?;
        AllowOrigin::list(list)
    };
    let methods = cfg
        .allow_methods
        .iter()
        .map(|m| Method::from_bytes(m.as_bytes()).with_context(|| format!("invalid CORS method: {m}")))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let headers = cfg
        .allow_headers
        .iter()
        .map(|h| HeaderName::from_bytes(h.as_bytes()).with_context(|| format!("invalid CORS header: {h}")))
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers(headers)
        .allow_credentials(cfg.allow_credentials))
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status":"ok"})))
}

async fn fallback() -> AppError {
    AppError::RouteNotFound
}

async fn list_project_files(State(state): State<AppState>, Path(project_id): Path<String>) -> Response {
    let started = Instant::now();
    let request_id = uuid::Uuid::new_v4().to_string();
    let result = match state.workspaces.locate(&project_id) {
        Ok(ws) => blocking(move || sandbox::list_files(&ws)).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(files) => {
            audit(&request_id, &project_id, "list", "OK", started, Some(files.len()));
            (StatusCode::OK, Json(FileListResponse { files })).into_response()
        }
        Err(e) => {
            audit(&request_id, &project_id, "list", e.code(), started, None);
            e.into_response()
        }
    }
}

async fn read_project_file(
    State(state): State<AppState>,
    Path((project_id, file_path)): Path<(String, String)>,
) -> Response {
    let started = Instant::now();
    let request_id = uuid::Uuid::new_v4().to_string();
    let result = match state.workspaces.locate(&project_id) {
        Ok(ws) => {
            let rel = file_path.clone();
            blocking(move || sandbox::read_file(&ws, &rel)).await
        }
        Err(e) => Err(e),
    };
    match result {
        Ok(contents) => {
            audit(&request_id, &project_id, "read", "OK", started, Some(contents.len()));
            (StatusCode::OK, Json(FileContentResponse { path: file_path, contents })).into_response()
        }
        Err(e) => {
            audit(&request_id, &project_id, "read", e.code(), started, None);
            e.into_response()
        }
    }
}

/// Sandbox calls block on filesystem I/O.
async fn blocking<T, F>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> sandbox::SandboxResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .map_err(AppError::from)
}

fn audit(request_id: &str, project_id: &str, op: &str, code: &str, started: Instant, count: Option<usize>) {
    tracing::info!(
        request_id = request_id,
        project_id = project_id,
        op = op,
        code = code,
        duration_ms = started.elapsed().as_millis() as u64,
        count = ?count,
        "audit"
    );
}
