//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → tls.rs (optional TLS handshake, negotiated version captured)
//!     → connection.rs (ConnectionSecurity attached to each request)
//!     → Hand off to HTTP layer
//!
//! TLS terminated upstream:
//!     → connection.rs (version read from a trusted header)
//! ```
//!
//! # Design Decisions
//! - Transport facts travel as request extensions, never global state
//! - A request with no recorded TLS version is treated as plaintext

pub mod connection;
pub mod tls;

pub use connection::{ConnectionSecurity, ConnectionSecurityExt, TrustedTlsHeader};
pub use tls::{load_tls_config, TlsVersionAcceptor};
