//! Core error type.
//!
//! Connection operations never fail with an error: stale references and
//! unsupported lanes come back as `false`/`None`.  `CoreError` covers the
//! places where a caller hands over something malformed.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),
}

/// Shorthand result type for `lc-core`.
pub type CoreResult<T> = Result<T, CoreError>;
