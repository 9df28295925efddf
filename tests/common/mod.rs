//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum_server::tls_rustls::RustlsConfig;
use edge_gatekeeper::assets::{AssetStore, MemoryStore};
use edge_gatekeeper::config::GatekeeperConfig;
use edge_gatekeeper::http::GatekeeperServer;
use edge_gatekeeper::lifecycle::Shutdown;
use edge_gatekeeper::net::tls::install_crypto_provider;
use rustls::pki_types::{CertificateDer, ServerName};
use rustls::{ClientConfig, RootCertStore, SupportedProtocolVersion};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_rustls::TlsConnector;

/// Header the test terminator reports the TLS version in.
pub const TLS_HEADER: &str = "x-tls-version";

/// A running gatekeeper bound to an ephemeral port.
pub struct RunningGatekeeper {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub task: JoinHandle<std::io::Result<()>>,
}

impl RunningGatekeeper {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Store holding a small site.
pub fn site() -> Arc<dyn AssetStore> {
    let store = MemoryStore::new();
    store.insert("/index.html", "text/html; charset=utf-8", "<h1>hello</h1>");
    store.insert("/app.css", "text/css; charset=utf-8", "body{}");
    Arc::new(store)
}

/// Config for a gatekeeper sitting behind a TLS terminator.
pub fn fronted_config() -> GatekeeperConfig {
    let mut config = GatekeeperConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.listener.tls_version_header = Some(TLS_HEADER.into());
    config
}

/// Start a plain-HTTP gatekeeper with `config` on 127.0.0.1.
pub async fn start_gatekeeper(config: GatekeeperConfig, store: Arc<dyn AssetStore>) -> RunningGatekeeper {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();

    let server = GatekeeperServer::new(config, store);
    let task = tokio::spawn(async move { server.run(listener, receiver).await });

    RunningGatekeeper { addr, shutdown, task }
}

/// Self-signed certificate for `localhost`.
pub struct TestCertificate {
    pub cert_pem: String,
    pub key_pem: String,
    pub der: CertificateDer<'static>,
}

pub fn self_signed() -> TestCertificate {
    let certified = rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
    TestCertificate {
        cert_pem: certified.cert.pem(),
        key_pem: certified.key_pair.serialize_pem(),
        der: certified.cert.der().clone(),
    }
}

/// Start a gatekeeper terminating TLS itself.
pub async fn start_tls_gatekeeper(
    store: Arc<dyn AssetStore>,
    cert: &TestCertificate,
) -> RunningGatekeeper {
    install_crypto_provider();
    let tls = RustlsConfig::from_pem(cert.cert_pem.clone().into_bytes(), cert.key_pem.clone().into_bytes())
        .await
        .unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();

    let mut config = GatekeeperConfig::default();
    config.timeouts.shutdown_grace_secs = 1;
    let server = GatekeeperServer::new(config, store);
    let task = tokio::spawn(async move { server.run_with_tls(listener, tls, receiver).await });

    RunningGatekeeper { addr, shutdown, task }
}

/// Send one raw HTTP/1.1 request over TLS pinned to `versions`.
///
/// Returns the negotiated protocol and the raw response text.
pub async fn tls_exchange(
    addr: SocketAddr,
    cert: &TestCertificate,
    versions: &[&'static SupportedProtocolVersion],
    method: &str,
    path: &str,
) -> (String, String) {
    install_crypto_provider();
    let mut roots = RootCertStore::empty();
    roots.add(cert.der.clone()).unwrap();
    let config = ClientConfig::builder_with_protocol_versions(versions)
        .with_root_certificates(roots)
        .with_no_client_auth();
    let connector = TlsConnector::from(Arc::new(config));

    let tcp = TcpStream::connect(addr).await.unwrap();
    let server_name = ServerName::try_from("localhost").unwrap();
    let mut stream = connector.connect(server_name, tcp).await.unwrap();

    let negotiated = stream
        .get_ref()
        .1
        .protocol_version()
        .map(|v| format!("{v:?}"))
        .unwrap_or_default();

    let request = format!("{method} {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
    stream.write_all(request.as_bytes()).await.unwrap();

    // The server may close without close_notify; keep whatever arrived.
    let mut response = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        match stream.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => response.extend_from_slice(&buf[..n]),
        }
    }

    (negotiated, String::from_utf8_lossy(&response).into_owned())
}
