//! Unified error handling.
//!
//! Provides a unified `AppError` type for the storefront controller. Cart and
//! storage problems are absorbed by the cart store and never show up here;
//! what remains are host mistakes (bad configuration, foreign node ids) and
//! failures opening durable storage.

use thiserror::Error;
use vitrina_core::StorageError;

use crate::config::ConfigError;
use crate::dom::DomError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration was rejected.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// A document operation failed.
    #[error("DOM error: {0}")]
    Dom(#[from] DomError),

    /// The storage backend could not be set up.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
