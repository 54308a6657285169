//! Failure classes reported by remote capability implementations.
//!
//! Backends sort their native errors into these buckets; the provisioning
//! and key-loading code turns them into user-facing [`AppError`]s with the
//! remediation text that fits the call being made.
//!
//! [`AppError`]: crate::error::AppError

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("access denied: {0}")]
    AccessDenied(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("no credentials available: {0}")]
    MissingCredentials(String),

    #[error("{0}")]
    Other(String),
}
