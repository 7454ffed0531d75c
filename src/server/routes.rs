/// API Routes definition

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::websocket;
use super::AppState;

pub fn create_router(state: AppState, enable_cors: bool) -> Router {
    let mut app = Router::new()
        .route("/metrics", get(handlers::get_metrics))
        .route("/ws", get(websocket::ws_metrics_handler))
        .route("/container/action", post(handlers::container_action))
        .route("/health", get(handlers::health_check))
        .with_state(state)
        // Add tracing middleware
        .layer(TraceLayer::new_for_http());

    if enable_cors {
        app = app.layer(CorsLayer::permissive());
    }

    app
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MetricsCollector;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    fn router() -> Router {
        create_router(AppState::new(MetricsCollector::new(None)), true)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn action_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/container/action")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = router()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, serde_json::json!({"status": "healthy"}));
    }

    #[tokio::test]
    async fn test_metrics_record_shape() {
        let response = router()
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(body["cpu"]["usage_percent"].is_array());
        assert!(body["host"]["hostname"].is_string());
        assert_eq!(body["docker"]["container_count"], 0);
    }

    #[tokio::test]
    async fn test_action_bad_json() {
        let response = router().oneshot(action_request("{not json")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn test_action_unknown() {
        let response = router()
            .oneshot(action_request(r#"{"container_id": "abc", "action": "pause"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "invalid action: pause");
    }

    #[tokio::test]
    async fn test_action_without_docker() {
        let response = router()
            .oneshot(action_request(r#"{"container_id": "abc", "action": "start"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(body_json(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let response = router()
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
