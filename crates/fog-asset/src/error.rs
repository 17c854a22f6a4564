//! Error types for archive loading and asset lookup.

use thiserror::Error;

use crate::{AssetId, AssetType};

/// Errors that can occur when loading an archive or looking up assets.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error.
    #[error("{0}")]
    Common(#[from] fog_common::Error),

    /// The declared sections do not add up to the buffer length.
    #[error("archive size mismatch: sections declare {declared} bytes, buffer holds {actual}")]
    SizeMismatch { declared: u64, actual: usize },

    /// The declared section sizes overflow a 64-bit length.
    #[error("archive section sizes overflow")]
    SectionOverflow,

    /// The header block size disagrees with the asset count.
    #[error("header block is {size_of_headers} bytes, expected {expected} for {number_of_assets} assets")]
    HeaderCountMismatch {
        number_of_assets: u64,
        size_of_headers: u64,
        expected: u64,
    },

    /// Unknown asset type tag.
    #[error("asset {index} has unknown type tag {tag}")]
    InvalidAssetType { index: usize, tag: u32 },

    /// A file path points outside the string table.
    #[error("asset {index} path {offset}+{length} is outside the string table ({size} bytes)")]
    PathOutOfBounds {
        index: usize,
        offset: u64,
        length: u64,
        size: usize,
    },

    /// An asset payload points outside the data segment.
    #[error("asset {id:#x} data {offset}+{size} is outside the data segment ({data_size} bytes)")]
    DataOutOfBounds {
        id: AssetId,
        offset: u64,
        size: u32,
        data_size: usize,
    },

    /// Two headers carry the same id.
    #[error("duplicate asset id {0:#x}")]
    DuplicateAssetId(AssetId),

    /// A header carries the reserved "no asset" id.
    #[error("asset {index} uses the reserved id {id:#x}")]
    ReservedAssetId { index: usize, id: AssetId },

    /// A payload does not match the layout of its asset type.
    #[error("asset {id:#x} ({asset_type}) has an invalid payload: {reason}")]
    InvalidPayload {
        id: AssetId,
        asset_type: AssetType,
        reason: String,
    },

    /// A font's kerning table is not strictly ascending.
    #[error("asset {id:#x} kerning table is not sorted at entry {index}")]
    UnsortedKernings { id: AssetId, index: usize },

    /// No asset with this id exists.
    #[error("asset not found: {0:#x}")]
    AssetNotFound(AssetId),

    /// The asset exists but has a different type.
    #[error("asset {id:#x} is {actual}, expected {expected}")]
    TypeMismatch {
        id: AssetId,
        expected: &'static str,
        actual: AssetType,
    },

    /// Character outside the 0-255 glyph table.
    #[error("character {0:?} has no glyph (only 0-255 are supported)")]
    GlyphOutOfRange(char),
}

impl Error {
    /// Whether this error means the archive itself is malformed.
    ///
    /// Format errors are fatal to a load. Lookup errors leave the registry
    /// untouched and can be handled by the caller.
    pub fn is_format_error(&self) -> bool {
        !matches!(
            self,
            Error::AssetNotFound(_) | Error::TypeMismatch { .. } | Error::GlyphOutOfRange(_)
        )
    }

    /// Whether this is a recoverable "asset not found" style lookup error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::AssetNotFound(_) | Error::TypeMismatch { .. })
    }
}

/// Result type for asset operations.
pub type Result<T> = std::result::Result<T, Error>;
