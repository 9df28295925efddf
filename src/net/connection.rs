//! Per-connection security context.
//!
//! # Responsibilities
//! - Carry the negotiated TLS version from the terminating layer to handlers
//! - Populate it from a trusted header when TLS is terminated upstream
//!
//! The context travels as a request extension. A request without one is
//! treated as plaintext.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderName, Request},
    middleware::Next,
    response::Response,
};

/// Transport security of the connection a request arrived on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionSecurity {
    tls_version: Option<String>,
}

impl ConnectionSecurity {
    /// A connection without TLS.
    pub fn plaintext() -> Self {
        Self { tls_version: None }
    }

    /// A TLS connection that negotiated `version` (e.g. `TLSv1.3`).
    pub fn tls(version: impl Into<String>) -> Self {
        Self {
            tls_version: Some(version.into()),
        }
    }

    /// The negotiated TLS version, if any.
    pub fn tls_version(&self) -> Option<&str> {
        self.tls_version.as_deref()
    }
}

/// Access the connection security context of a request.
pub trait ConnectionSecurityExt {
    /// The negotiated TLS version, or `None` for plaintext or unknown transport.
    fn tls_version(&self) -> Option<&str>;
}

impl<B> ConnectionSecurityExt for Request<B> {
    fn tls_version(&self) -> Option<&str> {
        self.extensions()
            .get::<ConnectionSecurity>()
            .and_then(ConnectionSecurity::tls_version)
    }
}

/// Name of the header a fronting TLS terminator reports the version in.
#[derive(Debug, Clone)]
pub struct TrustedTlsHeader(pub HeaderName);

/// Copy the TLS version reported by a trusted terminator into the request.
///
/// A missing or non-text header value leaves the request as plaintext.
pub async fn tls_from_trusted_header(
    State(TrustedTlsHeader(header)): State<TrustedTlsHeader>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let security = request
        .headers()
        .get(&header)
        .and_then(|value| value.to_str().ok())
        .map(ConnectionSecurity::tls)
        .unwrap_or_else(ConnectionSecurity::plaintext);

    request.extensions_mut().insert(security);
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::HeaderValue, middleware, routing::get, Router};
    use tower::ServiceExt;

    async fn echo_version(request: Request<Body>) -> String {
        request.tls_version().unwrap_or("none").to_string()
    }

    fn app() -> Router {
        Router::new().route("/", get(echo_version)).layer(middleware::from_fn_with_state(
            TrustedTlsHeader(HeaderName::from_static("x-tls-version")),
            tls_from_trusted_header,
        ))
    }

    async fn version_seen(request: Request<Body>) -> String {
        let response = app().oneshot(request).await.unwrap();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(body.to_vec()).unwrap()
    }

    #[test]
    fn extension_reports_version() {
        let mut request = Request::new(());
        assert_eq!(request.tls_version(), None);

        request.extensions_mut().insert(ConnectionSecurity::plaintext());
        assert_eq!(request.tls_version(), None);

        request.extensions_mut().insert(ConnectionSecurity::tls("TLSv1.3"));
        assert_eq!(request.tls_version(), Some("TLSv1.3"));
    }

    #[tokio::test]
    async fn trusted_header_populates_context() {
        let request = Request::builder()
            .uri("/")
            .header("x-tls-version", "TLSv1.2")
            .body(Body::empty())
            .unwrap();
        assert_eq!(version_seen(request).await, "TLSv1.2");
    }

    #[tokio::test]
    async fn missing_or_opaque_header_means_plaintext() {
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        assert_eq!(version_seen(request).await, "none");

        let mut request = Request::builder().uri("/").body(Body::empty()).unwrap();
        request.headers_mut().insert(
            "x-tls-version",
            HeaderValue::from_bytes(b"TLSv1.3\xff").unwrap(),
        );
        assert_eq!(version_seen(request).await, "none");
    }
}
