//! Assets fetched from an HTTP origin.
//!
//! The request is forwarded as received; only its URI is made absolute so the
//! client knows where to connect. Whatever the origin answers, including 4xx
//! and 5xx, is handed back untouched. Only failing to get an answer at all is
//! an error.

use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{
        uri::{Authority, Scheme},
        Request, Uri, Version,
    },
    response::Response,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use super::{AssetError, AssetStore};

/// Forwards admitted requests to an HTTP origin.
#[derive(Clone)]
pub struct OriginStore {
    client: Client<HttpConnector, Body>,
    scheme: Scheme,
    authority: Authority,
    timeout: Duration,
}

impl OriginStore {
    /// Create a store for `origin` (e.g. `http://127.0.0.1:3000`).
    pub fn new(origin: &str, timeout: Duration) -> Result<Self, AssetError> {
        let uri: Uri = origin
            .parse()
            .map_err(|e| AssetError::InvalidUri(format!("{origin}: {e}")))?;
        let authority = uri
            .authority()
            .cloned()
            .ok_or_else(|| AssetError::InvalidUri(format!("{origin}: missing host")))?;
        let scheme = uri.scheme().cloned().unwrap_or(Scheme::HTTP);

        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        Ok(Self {
            client,
            scheme,
            authority,
            timeout,
        })
    }

    /// Rewrite the request target to point at the origin.
    fn target(&self, uri: &Uri) -> Result<Uri, AssetError> {
        let mut parts = uri.clone().into_parts();
        parts.scheme = Some(self.scheme.clone());
        parts.authority = Some(self.authority.clone());
        if parts.path_and_query.is_none() {
            parts.path_and_query = Some("/".parse().map_err(|e| AssetError::InvalidUri(format!("{e}")))?);
        }
        Uri::from_parts(parts).map_err(|e| AssetError::InvalidUri(e.to_string()))
    }
}

#[async_trait]
impl AssetStore for OriginStore {
    async fn fetch(&self, request: Request<Body>) -> Result<Response, AssetError> {
        let (mut parts, body) = request.into_parts();
        parts.uri = self.target(&parts.uri)?;
        // The client speaks HTTP/1.1 to the origin whatever the client used.
        parts.version = Version::HTTP_11;
        let request = Request::from_parts(parts, body);

        match tokio::time::timeout(self.timeout, self.client.request(request)).await {
            Ok(Ok(response)) => Ok(response.map(Body::new)),
            Ok(Err(e)) => Err(AssetError::Upstream(e)),
            Err(_) => Err(AssetError::Timeout(self.timeout)),
        }
    }
}
