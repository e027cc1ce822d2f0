//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, dispatch)
//!     → request.rs (request ID)
//!     → routing layer classifies (migrate / list / lookup / none)
//!     → migrate.rs | registry resolver | forward.rs
//!     → response.rs (status, headers, body)
//!     → Send to client
//! ```

pub mod forward;
pub mod migrate;
pub mod request;
pub mod response;
pub mod server;

pub use forward::Forwarder;
pub use request::{RequestIdExt, X_REQUEST_ID};
pub use server::{dispatch, AppState, HttpServer};
