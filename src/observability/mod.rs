//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Gatekeeper decisions:
//!     → logging.rs (one structured event per rejection/failure)
//!     → metrics.rs (outcome counters)
//!
//! Consumers:
//!     → Log aggregation (stdout, pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```

pub mod logging;
pub mod metrics;
