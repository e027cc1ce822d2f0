//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, host, path)
//!     → router.rs (ordered rule scan)
//!     → matcher.rs (evaluate predicates)
//!     → Return: matched Rule or None (delegate)
//!
//! Rule Compilation (at startup):
//!     RegistryConfig
//!     → migrate, list, lookup (fixed order)
//!     → Freeze as immutable Router
//! ```
//!
//! # Design Decisions
//! - Rules compiled at startup, immutable at runtime
//! - No regex in hot path (prefix and exact matching only)
//! - Deterministic: same input always matches same rule
//! - First match wins (registration order)

pub mod matcher;
pub mod router;

pub use router::{Action, Router, Rule};
