//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! registry mutations, reloads, HTTP requests
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, optional Prometheus endpoint)
//! ```
//!
//! HTTP request spans and request IDs come from tower-http layers in `http::server`.

pub mod logging;
pub mod metrics;
