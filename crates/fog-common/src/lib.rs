//! Common utilities for Fog.
//!
//! This crate provides the foundational pieces shared by the Fog crates:
//!
//! - [`BinaryReader`] - Zero-copy little-endian reading from byte slices
//! - [`Error`] - Errors raised while reading raw bytes

mod error;
mod reader;

pub use error::{Error, Result};
pub use reader::{usize_from, BinaryReader};

/// Re-export zerocopy traits for convenience
pub use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};
