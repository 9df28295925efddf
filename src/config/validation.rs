//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Reject ambiguous TLS setups (local termination plus a trusted header)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatekeeperConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::HeaderName;
use thiserror::Error;
use url::Url;

use crate::config::schema::{AssetsConfig, GatekeeperConfig};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("listener.tls.{0} must not be empty")]
    EmptyTlsPath(&'static str),

    #[error("listener.tls_version_header: invalid header name {0:?}")]
    InvalidHeaderName(String),

    #[error("listener.tls_version_header cannot be combined with listener.tls")]
    TrustedHeaderWithLocalTls,

    #[error("assets.root must not be empty")]
    EmptyAssetRoot,

    #[error("assets.index_file must be a plain file name, got {0:?}")]
    InvalidIndexFile(String),

    #[error("assets.url: {0}")]
    InvalidOriginUrl(String),

    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),
}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &GatekeeperConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let listener = &config.listener;
    if listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: listener.bind_address.clone(),
        });
    }

    if let Some(tls) = &listener.tls {
        if tls.cert_path.trim().is_empty() {
            errors.push(ValidationError::EmptyTlsPath("cert_path"));
        }
        if tls.key_path.trim().is_empty() {
            errors.push(ValidationError::EmptyTlsPath("key_path"));
        }
        if listener.tls_version_header.is_some() {
            errors.push(ValidationError::TrustedHeaderWithLocalTls);
        }
    }

    if let Some(header) = &listener.tls_version_header {
        if HeaderName::from_bytes(header.as_bytes()).is_err() {
            errors.push(ValidationError::InvalidHeaderName(header.clone()));
        }
    }

    match &config.assets {
        AssetsConfig::Directory { root, index_file } => {
            if root.trim().is_empty() {
                errors.push(ValidationError::EmptyAssetRoot);
            }
            if index_file.is_empty()
                || index_file.contains('/')
                || index_file.contains('\\')
                || index_file == ".."
            {
                errors.push(ValidationError::InvalidIndexFile(index_file.clone()));
            }
        }
        AssetsConfig::Origin { url } => {
            if let Err(reason) = check_origin_url(url) {
                errors.push(ValidationError::InvalidOriginUrl(reason));
            }
        }
    }

    let timeouts = &config.timeouts;
    if timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("request_secs"));
    }
    if timeouts.origin_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("origin_secs"));
    }

    let observability = &config.observability;
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_origin_url(raw: &str) -> Result<(), String> {
    let url = Url::parse(raw).map_err(|e| format!("{raw:?} does not parse: {e}"))?;
    if url.scheme() != "http" {
        return Err(format!("unsupported scheme {:?}, only http origins are supported", url.scheme()));
    }
    if url.host_str().is_none() {
        return Err(format!("{raw:?} has no host"));
    }
    Ok(())
}
