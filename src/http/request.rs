//! Request identification.
//!
//! # Responsibilities
//! - Assign each inbound request a UUID v4 `x-request-id` unless it has one
//! - Expose the ID to handlers for log correlation
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - The ID is not echoed on responses; the gatekeeper does not rewrite them

use axum::http::{HeaderName, HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId, SetRequestIdLayer};
use uuid::Uuid;

/// Header carrying the request ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Generates UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuidV4;

impl MakeRequestId for MakeRequestUuidV4 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Layer that fills in `x-request-id` on requests lacking one.
pub fn request_id_layer() -> SetRequestIdLayer<MakeRequestUuidV4> {
    SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuidV4)
}

/// Read the request ID assigned to a request.
pub trait RequestIdExt {
    /// The request ID, or `"unknown"` when none was assigned.
    fn request_id(&self) -> &str;
}

impl<B> RequestIdExt for Request<B> {
    fn request_id(&self) -> &str {
        self.headers()
            .get(&X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, routing::get, Router};
    use tower::ServiceExt;

    async fn echo_id(request: Request<Body>) -> String {
        request.request_id().to_string()
    }

    async fn id_seen(request: Request<Body>) -> String {
        let app = Router::new().route("/", get(echo_id)).layer(request_id_layer());
        let response = app.oneshot(request).await.unwrap();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(body.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn assigns_uuid_when_absent() {
        let id = id_seen(Request::builder().uri("/").body(Body::empty()).unwrap()).await;
        assert!(Uuid::parse_str(&id).is_ok(), "not a uuid: {id}");
    }

    #[tokio::test]
    async fn keeps_existing_id() {
        let request = Request::builder()
            .uri("/")
            .header("x-request-id", "edge-123")
            .body(Body::empty())
            .unwrap();
        assert_eq!(id_seen(request).await, "edge-123");
    }

    #[test]
    fn missing_id_reads_as_unknown() {
        let request = Request::new(());
        assert_eq!(request.request_id(), "unknown");
    }
}
