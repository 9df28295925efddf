//! Asset stores the gatekeeper delegates admitted requests to.
//!
//! # Data Flow
//! ```text
//! admitted GET request
//!     → AssetStore::fetch
//!         → directory.rs (files under a root directory)
//!         → origin.rs    (HTTP origin via hyper-util)
//!         → memory.rs    (in-process assets)
//!     → Ok(response) returned to the client untouched
//!     → Err(AssetError) mapped to 404 by the gatekeeper
//! ```

pub mod directory;
pub mod memory;
pub mod origin;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{body::Body, http::Request, response::Response};
use thiserror::Error;

use crate::config::{AssetsConfig, TimeoutConfig};

pub use directory::DirectoryStore;
pub use memory::MemoryStore;
pub use origin::OriginStore;

/// Errors an asset store reports instead of producing a response.
#[derive(Debug, Error)]
pub enum AssetError {
    /// No asset exists at the requested path.
    #[error("no asset at {path}")]
    NotFound { path: String },

    /// The request path cannot name an asset (traversal, hidden segment, bad encoding).
    #[error("refusing to serve {path}")]
    InvalidPath { path: String },

    /// Reading the asset failed.
    #[error("failed to read asset: {0}")]
    Io(#[from] std::io::Error),

    /// The origin could not be reached or the exchange broke down.
    #[error("origin request failed")]
    Upstream(#[source] hyper_util::client::legacy::Error),

    /// The origin did not answer within its deadline.
    #[error("origin did not respond within {0:?}")]
    Timeout(Duration),

    /// The origin URI could not be formed.
    #[error("invalid origin URI: {0}")]
    InvalidUri(String),

    /// The response could not be assembled.
    #[error("failed to build response: {0}")]
    Response(#[from] axum::http::Error),
}

/// Capability to turn a request into a response, or fail.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Produce the response for `request`.
    async fn fetch(&self, request: Request<Body>) -> Result<Response, AssetError>;
}

/// Construct the store selected by configuration.
pub fn build_store(
    assets: &AssetsConfig,
    timeouts: &TimeoutConfig,
) -> Result<Arc<dyn AssetStore>, AssetError> {
    let store: Arc<dyn AssetStore> = match assets {
        AssetsConfig::Directory { root, index_file } => {
            tracing::info!(root = %root, index_file = %index_file, "Serving assets from directory");
            Arc::new(DirectoryStore::new(root, index_file.clone()))
        }
        AssetsConfig::Origin { url } => {
            tracing::info!(origin = %url, "Serving assets from origin");
            Arc::new(OriginStore::new(url, Duration::from_secs(timeouts.origin_secs))?)
        }
    };
    Ok(store)
}
