//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, TLS or plain serving)
//!     → request.rs (add request ID)
//!     → gatekeeper (admission checks, delegation)
//!     → Send to client
//! ```

pub mod request;
pub mod server;

pub use request::{request_id_layer, RequestIdExt, X_REQUEST_ID};
pub use server::GatekeeperServer;
