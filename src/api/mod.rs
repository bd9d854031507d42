//! API 路由模块

mod config;
mod docs;
mod health;
mod sessions;

pub use config::config_routes;
pub use docs::docs_routes;
pub use health::health_routes;
pub use sessions::session_routes;

use axum::Router;

use crate::state::AppState;
use std::sync::Arc;

/// 创建所有 API 路由
pub fn create_api_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(config_routes())
        .merge(docs_routes())
        .merge(session_routes())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const COMBINED: &str = "=== GITHUB_DESCRIPTION ===\nA tracker.\n=== RESUME_BULLET ===\nTracker | Rust\n=== README ===\n# Tracker";

    fn app_for(server: &MockServer, api_key: &str) -> Router {
        let config = AppConfig {
            api_key: api_key.to_string(),
            base_url: server.uri(),
            github_api_base: server.uri(),
            ..Default::default()
        };
        create_api_routes(Arc::new(AppState::new(&config).unwrap()))
    }

    async fn mount_completion(server: &MockServer, content: &str) {
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": content}, "finish_reason": "stop"}]
            })))
            .mount(server)
            .await;
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let server = MockServer::start().await;
        let response = app_for(&server, "k").oneshot(get("/api/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "readme-forge");
    }

    #[tokio::test]
    async fn test_generate_idea_then_fetch_session_and_readme() {
        let server = MockServer::start().await;
        mount_completion(&server, COMBINED).await;
        let app = app_for(&server, "k");

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/generate/idea",
                json!({"session_id": "s1", "title": "Tracker", "description": "Tracks things."}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["session_id"], "s1");
        assert_eq!(body["description"], "A tracker.");
        assert_eq!(body["readme"], "# Tracker");
        assert_eq!(body["has_resume_bullet"], true);

        let response = app.clone().oneshot(get("/api/sessions/s1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["document"]["resume_bullet"], "Tracker | Rust");

        let response = app.oneshot(get("/api/sessions/s1/readme")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/markdown; charset=utf-8"
        );
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"README.md\""
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"# Tracker");
    }

    #[tokio::test]
    async fn test_generate_idea_requires_description() {
        let server = MockServer::start().await;
        let response = app_for(&server, "k")
            .oneshot(post_json("/api/generate/idea", json!({"description": "  "})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["success"], false);
    }

    #[tokio::test]
    async fn test_missing_api_key_is_reported() {
        let server = MockServer::start().await;
        let response = app_for(&server, "")
            .oneshot(post_json("/api/generate/idea", json!({"description": "x"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = json_body(response).await;
        assert_eq!(body["kind"], "missing_credential");
        assert_eq!(body["error"], "Please provide a valid Groq API Key.");
    }

    #[tokio::test]
    async fn test_generate_repo_rejects_invalid_url() {
        let server = MockServer::start().await;
        let response = app_for(&server, "k")
            .oneshot(post_json(
                "/api/generate/repo",
                json!({"repo_url": "https://github.com/only-owner"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().contains("Invalid GitHub URL"));
    }

    #[tokio::test]
    async fn test_repo_context_listing_failure_is_bad_gateway() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/missing/contents/"))
            .respond_with(ResponseTemplate::new(403))
            .expect(1)
            .mount(&server)
            .await;

        let response = app_for(&server, "k")
            .oneshot(post_json(
                "/api/repo/context",
                json!({"repo_url": "https://github.com/octo/missing"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Error fetching repo contents: 403");
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let server = MockServer::start().await;
        let app = app_for(&server, "k");

        let response = app.clone().oneshot(get("/api/sessions/nope")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app.oneshot(get("/api/sessions/nope/readme")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_clear_cache_reports_counts() {
        let server = MockServer::start().await;
        mount_completion(&server, COMBINED).await;
        let app = app_for(&server, "k");

        app.clone()
            .oneshot(post_json("/api/generate/idea", json!({"description": "x"})))
            .await
            .unwrap();

        let response = app
            .oneshot(post_json("/api/cache/clear", json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["generations"], 1);
        assert_eq!(body["repo_contexts"], 0);
    }
}
