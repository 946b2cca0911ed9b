//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, timeout, trace)
//!     → admin router (auth, /configuration/ldap handlers)
//!     → response.rs (Accept negotiation, JSON / XML, error status mapping)
//!     → Send to client
//! ```

pub mod response;
pub mod server;

pub use response::{Document, Negotiated, Representation};
pub use server::{AppState, HttpServer};
