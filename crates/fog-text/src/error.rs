//! Error types for text measurement and layout.

use thiserror::Error;

/// Errors that can occur when measuring or laying out text.
#[derive(Debug, Error)]
pub enum Error {
    /// Font or font texture lookup failed.
    #[error("{0}")]
    Asset(#[from] fog_asset::Error),

    /// Text size is not a positive, finite number.
    #[error("invalid text size: {0}")]
    InvalidSize(f32),
}

/// Result type for text operations.
pub type Result<T> = std::result::Result<T, Error>;
