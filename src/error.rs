//! Startup and process-level errors.
//!
//! Every variant is fatal: the process exits without retry.

use thiserror::Error;

use crate::config::ConfigError;
use crate::lifecycle::LifecycleError;
use crate::registry::{CacheError, StoreError};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("metadata store connection error: {0}")]
    Store(#[from] StoreError),

    #[error("list cache connection error: {0}")]
    Cache(#[from] CacheError),

    #[error("delegate error: {0}")]
    Delegate(#[from] LifecycleError),

    #[error("invalid delegate address `{0}`")]
    DelegateAddress(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
