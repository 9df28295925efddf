//! Edge gatekeeper library.
//!
//! Admits only GET requests arriving over TLS 1.2 or newer and delegates
//! them to an asset store; everything else is refused with 403 or 405.

pub mod assets;
pub mod config;
pub mod gatekeeper;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;

pub use assets::{build_store, AssetError, AssetStore};
pub use config::schema::GatekeeperConfig;
pub use gatekeeper::{GateError, Gatekeeper};
pub use http::GatekeeperServer;
pub use lifecycle::Shutdown;
