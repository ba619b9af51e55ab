// Wearable HTTP listener (protocol b) and status endpoints
// POST /count takes the device's absolute running total; GET /status serves
// the counters under their historical wire names; POST /reset is the remote
// UI-control path into the aggregator.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use crate::session::SessionAggregator;

#[derive(Clone)]
pub struct HttpState {
    pub aggregator: Arc<SessionAggregator>,
}

/// Build the listener's router. `accept_count` is false when the deployment
/// counts the wearable over the symbol socket instead; the push endpoint is
/// then absent so the two external policies can never mix.
pub fn router(state: HttpState, accept_count: bool) -> Router {
    let mut router = Router::new()
        .route("/status", get(status))
        .route("/reset", post(reset));
    if accept_count {
        router = router.route("/count", post(receive_count));
    }
    router.with_state(state)
}

/// Counter snapshot under the wire names the wearable firmware polls
#[derive(Debug, Serialize)]
struct StatusBody {
    tflite_count: u64,
    m5stack_count: u64,
    total_count: u64,
}

async fn status(State(state): State<HttpState>) -> Json<StatusBody> {
    let s = state.aggregator.snapshot();
    Json(StatusBody {
        tflite_count: s.camera_count,
        m5stack_count: s.external_count,
        total_count: s.camera_count + s.external_count,
    })
}

/// Absolute count push from the wearable. The body must carry an unsigned
/// `count` field; anything else fails the request and leaves the counters
/// untouched.
async fn receive_count(
    State(state): State<HttpState>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    match body.get("count").and_then(|v| v.as_u64()) {
        Some(count) => {
            state.aggregator.set_external_absolute(count);
            (
                StatusCode::OK,
                Json(serde_json::json!({ "status": "ok", "total_count": count })),
            )
                .into_response()
        }
        None => {
            log::warn!("invalid count payload from wearable: {}", body);
            (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "status": "error", "message": "Invalid data" })),
            )
                .into_response()
        }
    }
}

async fn reset(State(state): State<HttpState>) -> Json<serde_json::Value> {
    state.aggregator.reset();
    Json(serde_json::json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{CompletionPolicy, RepEvent, RepSource};
    use axum::body::Body;
    use axum::http::Request;
    use std::time::Instant;
    use tower::ServiceExt;

    fn test_router(accept_count: bool) -> (Router, Arc<SessionAggregator>) {
        let aggregator = Arc::new(SessionAggregator::new(None, CompletionPolicy::Sum));
        let router = router(
            HttpState {
                aggregator: Arc::clone(&aggregator),
            },
            accept_count,
        );
        (router, aggregator)
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_count_push_is_absolute() {
        let (router, aggregator) = test_router(true);

        let response = router
            .clone()
            .oneshot(post_json("/count", r#"{"count": 5}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["total_count"], 5);

        // Re-posting the same total must not double-count
        let response = router
            .oneshot(post_json("/count", r#"{"count": 5}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(aggregator.snapshot().external_count, 5);
    }

    #[tokio::test]
    async fn test_missing_count_field_is_rejected() {
        let (router, aggregator) = test_router(true);

        let response = router
            .oneshot(post_json("/count", r#"{"bad": 1}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(aggregator.snapshot().external_count, 0);
    }

    #[tokio::test]
    async fn test_non_integer_count_is_rejected() {
        let (router, aggregator) = test_router(true);

        let response = router
            .oneshot(post_json("/count", r#"{"count": "many"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(aggregator.snapshot().external_count, 0);
    }

    #[tokio::test]
    async fn test_status_reports_wire_names_and_sum() {
        let (router, aggregator) = test_router(true);
        aggregator.record(&RepEvent::new(RepSource::Camera, Instant::now()));
        aggregator.record(&RepEvent::new(RepSource::Camera, Instant::now()));
        aggregator.set_external_absolute(3);

        let response = router
            .oneshot(Request::builder().uri("/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["tflite_count"], 2);
        assert_eq!(body["m5stack_count"], 3);
        assert_eq!(body["total_count"], 5);
    }

    #[tokio::test]
    async fn test_reset_endpoint_zeroes_counters() {
        let (router, aggregator) = test_router(true);
        aggregator.set_external_absolute(4);

        let response = router
            .oneshot(post_json("/reset", ""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let s = aggregator.snapshot();
        assert_eq!(s.camera_count, 0);
        assert_eq!(s.external_count, 0);
    }

    #[tokio::test]
    async fn test_count_route_absent_in_socket_mode() {
        let (router, _aggregator) = test_router(false);

        let response = router
            .oneshot(post_json("/count", r#"{"count": 5}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
