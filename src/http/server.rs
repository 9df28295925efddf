//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router sending every path and method to the gatekeeper
//! - Wire up middleware (tracing, timeout, request ID, trusted TLS header)
//! - Serve plain HTTP or terminate TLS with rustls
//! - Drain on shutdown signal

use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::{middleware, routing::any, Router};
use axum::http::HeaderName;
use axum_server::{tls_rustls::RustlsConfig, Handle};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::assets::AssetStore;
use crate::config::GatekeeperConfig;
use crate::gatekeeper::{gate_handler, Gatekeeper};
use crate::http::request::request_id_layer;
use crate::net::connection::{tls_from_trusted_header, TrustedTlsHeader};
use crate::net::tls::{load_tls_config, TlsVersionAcceptor};

/// HTTP server fronting the gatekeeper.
pub struct GatekeeperServer {
    router: Router,
    config: GatekeeperConfig,
}

impl GatekeeperServer {
    /// Create a new server delegating admitted requests to `store`.
    pub fn new(config: GatekeeperConfig, store: Arc<dyn AssetStore>) -> Self {
        let gatekeeper = Gatekeeper::new(store);
        let router = Self::build_router(&config, gatekeeper);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatekeeperConfig, gatekeeper: Gatekeeper) -> Router {
        // The fallback catches targets no path route matches, e.g. `OPTIONS *`.
        let mut router = Router::new()
            .route("/{*path}", any(gate_handler))
            .route("/", any(gate_handler))
            .fallback(gate_handler)
            .with_state(gatekeeper);

        // A locally terminated connection always knows its own TLS version.
        if config.listener.tls.is_none() {
            let trusted = config
                .listener
                .tls_version_header
                .as_deref()
                .and_then(|name| HeaderName::from_bytes(name.as_bytes()).ok());
            if let Some(header) = trusted {
                router = router.layer(middleware::from_fn_with_state(
                    TrustedTlsHeader(header),
                    tls_from_trusted_header,
                ));
            }
        }

        router
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(request_id_layer())
            .layer(TraceLayer::new_for_http())
    }

    /// The fully layered router, for embedding or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires, terminating TLS if configured.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), io::Error> {
        match self.config.listener.tls.clone() {
            Some(tls) => {
                let rustls = load_tls_config(Path::new(&tls.cert_path), Path::new(&tls.key_path)).await?;
                self.run_with_tls(listener, rustls, shutdown).await
            }
            None => self.run_plain(listener, shutdown).await,
        }
    }

    async fn run_plain(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), io::Error> {
        let addr = listener.local_addr()?;
        match &self.config.listener.tls_version_header {
            Some(header) => tracing::info!(
                address = %addr,
                tls_version_header = %header,
                "HTTP server starting behind TLS terminator"
            ),
            None => tracing::warn!(
                address = %addr,
                "HTTP server starting without TLS or a trusted TLS header; every request will be refused"
            ),
        }

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Run the server terminating TLS with `tls`.
    ///
    /// Plaintext clients and clients offering only TLS below 1.2 fail the
    /// rustls handshake and are disconnected without an HTTP response; the
    /// 403 body is only ever sent when TLS is terminated upstream.
    pub async fn run_with_tls(
        self,
        listener: TcpListener,
        tls: RustlsConfig,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTPS server starting");

        let handle = Handle::new();
        let grace = Duration::from_secs(self.config.timeouts.shutdown_grace_secs);
        let signal_handle = handle.clone();
        tokio::spawn(async move {
            let _ = shutdown.recv().await;
            tracing::info!(grace = ?grace, "Shutdown signal received, draining connections");
            signal_handle.graceful_shutdown(Some(grace));
        });

        axum_server::from_tcp(listener.into_std()?)
            .acceptor(TlsVersionAcceptor::new(tls))
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }
}
