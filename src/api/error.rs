use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::engine::EngineError;
use crate::fetch::FetchError;
use crate::llm::LlmError;
use crate::mermaid::Diagnostic;
use crate::render::ExportError;

/// API-layer error type
#[derive(Debug)]
pub enum ApiError {
    /// 400 - Bad request (invalid input)
    BadRequest(String),
    /// 403 - Repository exists but the credential cannot read it
    Forbidden(String),
    /// 404 - Repository not found
    NotFound(String),
    /// 408 - Repository fetch took too long
    FetchTimeout(String),
    /// 422 - The model never produced a valid diagram
    InvalidDiagram(Vec<Diagnostic>),
    /// 502 - An upstream service failed
    BadGateway(String),
    /// 504 - An upstream service took too long
    GatewayTimeout(String),
    /// 500 - Internal error
    Internal(String),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    diagnostics: Vec<Diagnostic>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut diagnostics = Vec::new();
        let (status, error, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::FetchTimeout(msg) => (StatusCode::REQUEST_TIMEOUT, "fetch_timeout", msg),
            ApiError::InvalidDiagram(found) => {
                let message = EngineError::InvalidDiagram { diagnostics: found.clone() }.to_string();
                diagnostics = found;
                (StatusCode::UNPROCESSABLE_ENTITY, "invalid_diagram", message)
            }
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, "upstream_error", msg),
            ApiError::GatewayTimeout(msg) => (StatusCode::GATEWAY_TIMEOUT, "upstream_timeout", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg),
        };

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "{message}");
        } else {
            tracing::debug!(status = status.as_u16(), "{message}");
        }

        (status, Json(ErrorBody { error, message, diagnostics })).into_response()
    }
}

impl From<FetchError> for ApiError {
    fn from(err: FetchError) -> Self {
        let message = err.to_string();
        match err {
            FetchError::NotFound(_) => ApiError::NotFound(message),
            FetchError::AccessDenied(_) => ApiError::Forbidden(message),
            FetchError::Timeout(_) => ApiError::FetchTimeout(message),
            FetchError::InvalidUrl(_) => ApiError::BadRequest(message),
            FetchError::Transient(_) => ApiError::BadGateway(message),
            FetchError::Io(_) => ApiError::Internal(message),
        }
    }
}

impl From<LlmError> for ApiError {
    fn from(err: LlmError) -> Self {
        let message = err.to_string();
        match err {
            LlmError::Timeout(_) => ApiError::GatewayTimeout(message),
            LlmError::MissingApiKey(_) => ApiError::Internal(message),
            LlmError::Api { .. } | LlmError::Transport(_) | LlmError::EmptyResponse => {
                ApiError::BadGateway(message)
            }
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::InvalidDiagram { diagnostics } => ApiError::InvalidDiagram(diagnostics),
            EngineError::EmptyInput(_) => ApiError::BadRequest(err.to_string()),
            EngineError::Llm(e) => e.into(),
        }
    }
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        let message = err.to_string();
        match err {
            ExportError::EmptyDiagram | ExportError::UnsupportedFormat(_) => ApiError::BadRequest(message),
            ExportError::Timeout(_) => ApiError::GatewayTimeout(message),
            ExportError::Upstream(_) | ExportError::Transport(_) => ApiError::BadGateway(message),
        }
    }
}
