use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use super::dto::*;
use super::error::ApiError;
use super::state::AppState;
use crate::domain::{DiagramRequestKind, RepoSnapshot};
use crate::fetch::RepoRequest;
use crate::render::ImageFormat;

/// Header carrying a per-request GitHub token for private repositories.
pub const GITHUB_TOKEN_HEADER: &str = "x-github-token";

fn request_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(GITHUB_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

async fn snapshot(state: &AppState, repo_url: &str, headers: &HeaderMap) -> Result<Arc<RepoSnapshot>, ApiError> {
    let request = RepoRequest::github(repo_url, request_token(headers))?;
    Ok(state.fetcher.fetch(&request).await?)
}

/// GET / - Service description
pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo::current())
}

/// GET /health - Health check
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok", version: env!("CARGO_PKG_VERSION") })
}

/// POST /generate-diagram - Diagram of a fixed type
pub async fn generate_diagram(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<DiagramRequest>,
) -> Result<Json<DiagramResponse>, ApiError> {
    let kind: DiagramRequestKind = req.diagram_type.parse().map_err(ApiError::BadRequest)?;
    let repo = snapshot(&state, &req.repo_url, &headers).await?;
    let artifact = state.engine.generate_by_type(&repo, kind).await?;
    Ok(Json(artifact.into()))
}

/// POST /generate-custom-diagram - Diagram from a free-form request
pub async fn generate_custom_diagram(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CustomDiagramRequest>,
) -> Result<Json<DiagramResponse>, ApiError> {
    if req.user_prompt.trim().is_empty() {
        return Err(ApiError::BadRequest("user_prompt cannot be empty".into()));
    }
    let repo = snapshot(&state, &req.repo_url, &headers).await?;
    let artifact = state.engine.generate_custom(&repo, &req.request_text()).await?;
    Ok(Json(artifact.into()))
}

/// POST /chat - Ask a question about a repository
pub async fn chat(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if req.question.trim().is_empty() {
        return Err(ApiError::BadRequest("question cannot be empty".into()));
    }
    let repo = snapshot(&state, &req.repo_url, &headers).await?;
    tracing::info!(repo = %repo.name, history = req.chat_history.len(), "chat request");
    let reply = state.engine.converse(&repo, &req.question, &req.history()).await?;
    Ok(Json(reply.into()))
}

/// POST /export-diagram - Render a diagram to PNG or SVG
pub async fn export_diagram(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ExportRequest>,
) -> Result<Response, ApiError> {
    let format: ImageFormat = req.format.parse()?;
    let image = state.renderer.render(&req.mermaid_code, format).await?;

    let disposition = HeaderValue::from_str(&format!("attachment; filename={}", image.file_name()))
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let headers = [
        (header::CONTENT_TYPE, HeaderValue::from_static(format.media_type())),
        (header::CONTENT_DISPOSITION, disposition),
    ];
    Ok((headers, image.bytes).into_response())
}
