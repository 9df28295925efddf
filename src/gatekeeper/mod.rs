//! Request gatekeeper.
//!
//! # Data Flow
//! ```text
//! Request
//!     → policy::check_transport (TLS 1.2+ or 403)
//!     → policy::check_method    (GET or 405 + Allow)
//!     → AssetStore::fetch       (response returned untouched)
//!         ↳ Err → 404 quoting the path
//! ```
//!
//! # Design Decisions
//! - Checks are ordered and short-circuit: a plaintext POST is a TLS failure
//! - Each rejection or failure logs exactly once; success logs nothing
//! - Invocations share nothing but the store handle

pub mod error;
pub mod policy;

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
};

use crate::assets::AssetStore;
use crate::http::request::RequestIdExt;
use crate::net::connection::ConnectionSecurityExt;
use crate::observability::metrics::{self, Outcome};

pub use error::GateError;

/// Admits TLS-protected GET requests and delegates them to an asset store.
#[derive(Clone)]
pub struct Gatekeeper {
    store: Arc<dyn AssetStore>,
}

impl Gatekeeper {
    pub fn new(store: Arc<dyn AssetStore>) -> Self {
        Self { store }
    }

    /// Run the admission checks without touching the store.
    pub fn admit<B>(&self, request: &Request<B>) -> Result<(), GateError> {
        policy::check_transport(request.tls_version())?;
        policy::check_method(request.method())?;
        Ok(())
    }

    /// Handle one request end to end.
    pub async fn handle(&self, request: Request<Body>) -> Response {
        let request_id = request.request_id().to_string();

        let result = match self.admit(&request) {
            Ok(()) => self.deliver(request).await,
            Err(rejection) => Err(rejection),
        };

        match result {
            Ok(response) => {
                metrics::record_outcome(Outcome::Delivered, response.status().as_u16());
                response
            }
            Err(err) => {
                err.log(&request_id);
                metrics::record_outcome(err.outcome(), err.status().as_u16());
                err.into_response()
            }
        }
    }

    /// Forward an admitted request, turning store failures into `GateError`.
    async fn deliver(&self, request: Request<Body>) -> Result<Response, GateError> {
        let path = request.uri().path().to_string();
        self.store
            .fetch(request)
            .await
            .map_err(|source| GateError::AssetDeliveryFailure { path, source })
    }
}

/// Axum handler for every path and method.
pub async fn gate_handler(State(gatekeeper): State<Gatekeeper>, request: Request<Body>) -> Response {
    gatekeeper.handle(request).await
}
