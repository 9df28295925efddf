//! TLS configuration, certificate loading, and version reporting.
//!
//! rustls only negotiates TLS 1.2 and 1.3, so a locally terminated
//! connection that reaches the gatekeeper always passes its TLS check.
//! Plaintext or older clients fail the handshake and are dropped without
//! an HTTP response.

use std::io;
use std::path::Path;

use axum::Extension;
use axum_server::{
    accept::{Accept, DefaultAcceptor},
    tls_rustls::{RustlsAcceptor, RustlsConfig},
};
use futures_util::future::BoxFuture;
use rustls::ProtocolVersion;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_rustls::server::TlsStream;
use tower::Layer;

use crate::net::connection::ConnectionSecurity;

/// Install the process-wide rustls crypto provider.
///
/// Safe to call more than once; later calls are no-ops.
pub fn install_crypto_provider() {
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
}

/// Load TLS configuration from certificate and key files.
pub async fn load_tls_config(cert_path: &Path, key_path: &Path) -> Result<RustlsConfig, io::Error> {
    if !cert_path.exists() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("Certificate file not found: {:?}", cert_path),
        ));
    }
    if !key_path.exists() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("Private key file not found: {:?}", key_path),
        ));
    }

    install_crypto_provider();
    RustlsConfig::from_pem_file(cert_path, key_path).await
}

/// Render a negotiated protocol version the way clients and logs expect it.
pub fn describe_protocol_version(version: ProtocolVersion) -> String {
    match version {
        ProtocolVersion::TLSv1_3 => "TLSv1.3".to_string(),
        ProtocolVersion::TLSv1_2 => "TLSv1.2".to_string(),
        ProtocolVersion::TLSv1_1 => "TLSv1.1".to_string(),
        ProtocolVersion::TLSv1_0 => "TLSv1".to_string(),
        ProtocolVersion::SSLv3 => "SSLv3".to_string(),
        ProtocolVersion::SSLv2 => "SSLv2".to_string(),
        other => format!("{:?}", other),
    }
}

/// Rustls acceptor that tags every request with the connection's TLS version.
#[derive(Clone)]
pub struct TlsVersionAcceptor {
    inner: RustlsAcceptor<DefaultAcceptor>,
}

impl TlsVersionAcceptor {
    pub fn new(config: RustlsConfig) -> Self {
        Self {
            inner: RustlsAcceptor::new(config),
        }
    }
}

impl<I, S> Accept<I, S> for TlsVersionAcceptor
where
    I: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    S: Send + 'static,
{
    type Stream = TlsStream<I>;
    type Service = axum::middleware::AddExtension<S, ConnectionSecurity>;
    type Future = BoxFuture<'static, io::Result<(Self::Stream, Self::Service)>>;

    fn accept(&self, stream: I, service: S) -> Self::Future {
        let acceptor = self.inner.clone();

        Box::pin(async move {
            let (stream, service) = acceptor.accept(stream, service).await?;
            let (_, connection) = stream.get_ref();

            let security = match connection.protocol_version() {
                Some(version) => ConnectionSecurity::tls(describe_protocol_version(version)),
                None => ConnectionSecurity::plaintext(),
            };
            tracing::trace!(tls_version = ?security.tls_version(), "TLS handshake complete");

            Ok((stream, Extension(security).layer(service)))
        })
    }
}
