//! In-process asset store.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{Body, Bytes},
    http::{header, Request, StatusCode},
    response::Response,
};
use dashmap::DashMap;

use super::{AssetError, AssetStore};

/// A single asset held in memory.
#[derive(Debug, Clone)]
pub struct StaticAsset {
    pub content_type: String,
    pub body: Bytes,
}

/// Assets keyed by request path. Cloning shares the underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    assets: Arc<DashMap<String, StaticAsset>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the asset served at `path`.
    pub fn insert(&self, path: impl Into<String>, content_type: impl Into<String>, body: impl Into<Bytes>) {
        self.assets.insert(
            path.into(),
            StaticAsset {
                content_type: content_type.into(),
                body: body.into(),
            },
        );
    }

    /// Remove the asset at `path`, returning it if present.
    pub fn remove(&self, path: &str) -> Option<StaticAsset> {
        self.assets.remove(path).map(|(_, asset)| asset)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

#[async_trait]
impl AssetStore for MemoryStore {
    async fn fetch(&self, request: Request<Body>) -> Result<Response, AssetError> {
        let path = request.uri().path();
        let asset = self
            .assets
            .get(path)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AssetError::NotFound {
                path: path.to_string(),
            })?;

        let response = Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, asset.content_type)
            .header(header::CONTENT_LENGTH, asset.body.len())
            .body(Body::from(asset.body))?;
        Ok(response)
    }
}
