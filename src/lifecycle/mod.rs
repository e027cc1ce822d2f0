//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Connect cache → Connect store → Launch delegate → Bind listener → Serve
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain connections → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//!
//! Delegate (delegate.rs):
//!     Launch local server with PORT → Supervise → Unsuccessful exit is fatal
//! ```
//!
//! # Design Decisions
//! - Ordered startup: backends first, listener last
//! - Ordered shutdown: stop accept, drain, close

pub mod delegate;
pub mod shutdown;
pub mod signals;
pub mod startup;

pub use delegate::{DelegateProcess, LifecycleError};
pub use shutdown::Shutdown;
