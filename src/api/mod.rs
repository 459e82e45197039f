//! HTTP surface for the browser client.

mod dto;
mod error;
mod handlers;
mod state;

pub use dto::{ChatResponse, DiagramResponse};
pub use error::ApiError;
pub use handlers::GITHUB_TOKEN_HEADER;
pub use state::AppState;

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/generate-diagram", post(handlers::generate_diagram))
        .route("/generate-custom-diagram", post(handlers::generate_custom_diagram))
        .route("/chat", post(handlers::chat))
        .route("/export-diagram", post(handlers::export_diagram))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(state: Arc<AppState>, host: &str, port: u16) -> anyhow::Result<()> {
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("listening on http://{addr}");
    axum::serve(listener, router(state)).await.context("Server error")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RenderConfig, RepoSnapshot};
    use crate::engine::{Engine, EngineConfig};
    use crate::fetch::{FetchError, RepoRequest, RepoSource, RepositoryFetcher};
    use crate::llm::scripted::ScriptedClient;
    use crate::llm::LlmClient;
    use crate::render::MermaidInk;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Mutex;
    use tower::ServiceExt;

    /// Serves `o/demo`, reports everything else missing, and records tokens.
    #[derive(Default)]
    struct FakeFetcher {
        tokens: Mutex<Vec<Option<String>>>,
    }

    #[async_trait]
    impl RepositoryFetcher for FakeFetcher {
        async fn fetch(&self, request: &RepoRequest) -> Result<Arc<RepoSnapshot>, FetchError> {
            self.tokens.lock().unwrap().push(request.token.clone());
            match &request.source {
                RepoSource::GitHub(repo) if repo.name == "demo" => {
                    Ok(Arc::new(RepoSnapshot { name: "demo".into(), language: "Rust".into(), ..Default::default() }))
                }
                _ => Err(FetchError::NotFound(request.display_name())),
            }
        }
    }

    fn app(responses: &[&str]) -> (Router, Arc<FakeFetcher>, Arc<ScriptedClient>) {
        let fetcher = Arc::new(FakeFetcher::default());
        let llm = Arc::new(ScriptedClient::replying(responses));
        let client: Arc<dyn LlmClient> = llm.clone();
        let renderer = MermaidInk::new(
            reqwest::Client::new(),
            &RenderConfig { base_url: "http://127.0.0.1:9".into(), timeout_secs: 1 },
        );
        let state = AppState::new(fetcher.clone(), Engine::new(client, EngineConfig::default()), renderer);
        (router(state), fetcher, llm)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _, _) = app(&[]);
        let response = app.oneshot(Request::get("/health").body(Body::empty()).unwrap()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_generate_diagram() {
        let (app, _, _) = app(&["[DIAGRAM_START]\nsequenceDiagram\n  User->>API: GET /\n[DIAGRAM_END]"]);
        let request = post_json(
            "/generate-diagram",
            json!({"repo_url": "https://github.com/o/demo", "diagram_type": "sequence"}),
        );
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({"mermaid_code": "sequenceDiagram\n  User->>API: GET /", "diagram_type": "sequence", "repo_name": "demo"})
        );
    }

    #[tokio::test]
    async fn test_unknown_diagram_type_is_bad_request() {
        let (app, _, llm) = app(&[]);
        let request = post_json("/generate-diagram", json!({"repo_url": "o/demo", "diagram_type": "pie"}));
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_repo_is_not_found() {
        let (app, _, _) = app(&[]);
        let request = post_json("/chat", json!({"repo_url": "o/missing", "question": "what?"}));
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"], "not_found");
    }

    #[tokio::test]
    async fn test_invalid_diagram_is_unprocessable_with_diagnostics() {
        let bad = "[DIAGRAM_START]\nflowchart TD\n  A[x --> B\n[DIAGRAM_END]";
        let (app, _, llm) = app(&[bad, bad]);
        let request = post_json(
            "/generate-custom-diagram",
            json!({"repo_url": "o/demo", "user_prompt": "show the flow"}),
        );
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(llm.calls(), 2);
        let body = body_json(response).await;
        assert_eq!(body["diagnostics"][0], json!({"line": 2, "kind": "unmatched_brackets"}));
    }

    #[tokio::test]
    async fn test_chat_passes_token_header_and_history() {
        let (app, fetcher, llm) = app(&["It is small.\n[DIAGRAM_START]\ngraph TB\n  cli --> engine\n[DIAGRAM_END]"]);
        let mut request = post_json(
            "/chat",
            json!({
                "repo_url": "o/demo",
                "question": "How is it built?",
                "chat_history": [{"role": "user", "content": "hi"}, {"role": "assistant", "content": "hello"}]
            }),
        );
        request.headers_mut().insert(GITHUB_TOKEN_HEADER, "ghp_secret".parse().unwrap());

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["answer"], "It is small.");
        assert_eq!(body["has_diagram"], true);
        assert_eq!(body["diagram_type"], "flowchart");
        assert_eq!(body["follow_up_questions"][0], "Add more implementation details");

        assert_eq!(fetcher.tokens.lock().unwrap().as_slice(), &[Some("ghp_secret".to_string())]);
        // system + two history turns + question
        assert_eq!(llm.request(0).len(), 4);
    }

    #[tokio::test]
    async fn test_export_rejects_empty_code_and_unknown_format() {
        let (app, _, _) = app(&[]);
        let response = app
            .clone()
            .oneshot(post_json("/export-diagram", json!({"mermaid_code": "", "format": "png"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .oneshot(post_json("/export-diagram", json!({"mermaid_code": "graph TD\nA-->B", "format": "gif"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
