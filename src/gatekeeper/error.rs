//! Gatekeeper rejections and their HTTP rendering.

use axum::{
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::assets::AssetError;
use crate::observability::logging::error_stack;
use crate::observability::metrics::Outcome;

/// Body sent when the transport-security floor is not met.
pub const TLS_REJECTION_BODY: &str = "Please use TLS version 1.2 or higher.";

/// Why a request did not get the asset store's response.
#[derive(Debug, Error)]
pub enum GateError {
    /// Missing or insufficient TLS.
    #[error("TLS version error: {}", describe_version(.version))]
    TlsPolicyViolation { version: Option<String> },

    /// Method other than GET.
    #[error("Method {method} not allowed")]
    MethodNotAllowed { method: Method },

    /// The asset store failed; always reported to the client as 404.
    #[error("\"{path}\" not found")]
    AssetDeliveryFailure {
        path: String,
        #[source]
        source: AssetError,
    },
}

fn describe_version(version: &Option<String>) -> String {
    match version {
        Some(version) => format!("{version:?}"),
        None => "none negotiated".to_string(),
    }
}

impl GateError {
    pub fn status(&self) -> StatusCode {
        match self {
            GateError::TlsPolicyViolation { .. } => StatusCode::FORBIDDEN,
            GateError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            GateError::AssetDeliveryFailure { .. } => StatusCode::NOT_FOUND,
        }
    }

    pub fn outcome(&self) -> Outcome {
        match self {
            GateError::TlsPolicyViolation { .. } => Outcome::TlsRejected,
            GateError::MethodNotAllowed { .. } => Outcome::MethodRejected,
            GateError::AssetDeliveryFailure { .. } => Outcome::DeliveryFailed,
        }
    }

    /// Emit the single log record for this rejection.
    pub fn log(&self, request_id: &str) {
        match self {
            GateError::TlsPolicyViolation { version } => {
                tracing::warn!(
                    request_id = %request_id,
                    error = %self,
                    tls_version = ?version,
                    "Rejected request without acceptable TLS"
                );
            }
            GateError::MethodNotAllowed { method } => {
                tracing::warn!(
                    request_id = %request_id,
                    error = %self,
                    method = %method,
                    "Rejected request method"
                );
            }
            GateError::AssetDeliveryFailure { path, source } => {
                tracing::error!(
                    request_id = %request_id,
                    error = %self,
                    error_stack = %error_stack(source),
                    path = %path,
                    "Asset delivery failed"
                );
            }
        }
    }
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        match self {
            GateError::TlsPolicyViolation { .. } => {
                (StatusCode::FORBIDDEN, TLS_REJECTION_BODY).into_response()
            }
            GateError::MethodNotAllowed { method } => (
                StatusCode::METHOD_NOT_ALLOWED,
                [(header::ALLOW, "GET")],
                format!("Method {method} not allowed."),
            )
                .into_response(),
            GateError::AssetDeliveryFailure { path, .. } => {
                (StatusCode::NOT_FOUND, format!("\"{path}\" not found")).into_response()
            }
        }
    }
}
