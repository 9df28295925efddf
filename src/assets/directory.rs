//! Static assets served from a directory on disk.
//!
//! # Responsibilities
//! - Map a request path onto a file below the configured root
//! - Resolve directories to their index file
//! - Attach `Content-Type` and `Content-Length`
//!
//! # Design Decisions
//! - Paths are percent-decoded, then split; `..` and dot-prefixed segments
//!   are refused outright instead of normalized
//! - Files with sensitive extensions are reported as missing

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
};

use super::{AssetError, AssetStore};

/// Extensions that are never served, even when present under the root.
const DISALLOWED_EXTENSIONS: &[&str] = &[
    "crdownload", "db", "der", "key", "lock", "log", "part", "pem", "swp", "temp", "tmp",
];

/// Serves files below `root`.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
    index_file: String,
}

impl DirectoryStore {
    /// Create a store rooted at `root`; directories resolve to `index_file`.
    pub fn new(root: impl Into<PathBuf>, index_file: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            index_file: index_file.into(),
        }
    }

    /// Map a request path to a file system path below the root.
    fn resolve(&self, uri_path: &str) -> Result<PathBuf, AssetError> {
        let invalid = || AssetError::InvalidPath {
            path: uri_path.to_string(),
        };

        let decoded = urlencoding::decode(uri_path).map_err(|_| invalid())?;

        let mut resolved = self.root.clone();
        for segment in decoded.split('/') {
            if segment.is_empty() || segment == "." {
                continue;
            }
            if segment.starts_with('.') || segment.contains('\\') || segment.contains('\0') {
                return Err(invalid());
            }
            resolved.push(segment);
        }

        if decoded.ends_with('/') {
            resolved.push(&self.index_file);
        }

        Ok(resolved)
    }
}

#[async_trait]
impl AssetStore for DirectoryStore {
    async fn fetch(&self, request: Request<Body>) -> Result<Response, AssetError> {
        let path = request.uri().path().to_string();
        let mut file = self.resolve(&path)?;

        let metadata = tokio::fs::metadata(&file)
            .await
            .map_err(|e| not_found_or_io(e, &path))?;
        if metadata.is_dir() {
            file.push(&self.index_file);
        }

        if is_disallowed(&file) {
            tracing::debug!(path = %path, "Refusing to serve file with disallowed extension");
            return Err(AssetError::NotFound { path });
        }

        let contents = tokio::fs::read(&file)
            .await
            .map_err(|e| not_found_or_io(e, &path))?;

        let response = Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, media_type_for(&file))
            .header(header::CONTENT_LENGTH, contents.len())
            .body(Body::from(contents))?;
        Ok(response)
    }
}

fn not_found_or_io(err: std::io::Error, path: &str) -> AssetError {
    if err.kind() == ErrorKind::NotFound {
        AssetError::NotFound {
            path: path.to_string(),
        }
    } else {
        AssetError::Io(err)
    }
}

fn extension_of(file: &Path) -> Option<String> {
    file.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

fn is_disallowed(file: &Path) -> bool {
    extension_of(file)
        .map(|ext| DISALLOWED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Media type for a file, by extension.
pub fn media_type_for(file: &Path) -> &'static str {
    match extension_of(file).as_deref() {
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js" | "mjs") => "text/javascript; charset=utf-8",
        Some("md") => "text/markdown; charset=utf-8",
        Some("txt") => "text/plain; charset=utf-8",
        Some("json" | "map") => "application/json; charset=utf-8",
        Some("webmanifest") => "application/manifest+json",
        Some("xml") => "application/xml; charset=utf-8",
        Some("rss") => "application/rss+xml; charset=utf-8",
        Some("atom") => "application/atom+xml; charset=utf-8",
        Some("pdf") => "application/pdf",
        Some("wasm") => "application/wasm",
        Some("zip") => "application/zip",
        Some("gif") => "image/gif",
        Some("ico") => "image/x-icon",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("svg") => "image/svg+xml",
        Some("webp") => "image/webp",
        Some("avif") => "image/avif",
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        Some("otf") => "font/otf",
        _ => "application/octet-stream",
    }
}
