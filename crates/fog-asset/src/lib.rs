//! Packed asset archive loader for the Fog engine.
//!
//! An archive is one file holding every texture, font, sound and shader the
//! game needs, each addressed by a 64-bit id assigned when the archive was
//! packed. This crate parses the archive in place, checks every internal
//! offset once, and hands out borrowed views by id.
//!
//! # Quick Start
//!
//! ```no_run
//! use fog_asset::AssetRegistry;
//!
//! let registry = AssetRegistry::open("data.fog")?;
//!
//! if let Some(font) = registry.fetch_font(0x2A) {
//!     println!("line height {}, {} kerning pairs", font.height(), font.num_kernings());
//!     println!("AV kerning: {}", font.find_kerning(b'A', b'V'));
//! }
//!
//! for header in registry.headers() {
//!     println!("{:#x} {:8} {}", header.asset_id, header.asset_type, header.file_path);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Layers
//!
//! - **Parser** ([`RawArchive`]): splits the buffer into string table,
//!   header array and data segment
//! - **Rebuilder** ([`rebuild_pointers`]): turns raw offsets into checked
//!   paths and payload ranges
//! - **Registry** ([`AssetRegistry`]): owns the buffer and indexes assets by id
//! - **Payloads** ([`AssetData`], [`Image`], [`Font`], [`Sound`]): typed views
//!   over an asset's bytes
//!
//! # Low-Level Access
//!
//! Callers that manage the buffer themselves can skip the registry:
//!
//! ```no_run
//! use fog_asset::{rebuild_pointers, RawArchive};
//!
//! let bytes = std::fs::read("data.fog")?;
//! let archive = RawArchive::parse(&bytes)?;
//! for header in rebuild_pointers(&archive)? {
//!     println!("{} ({} bytes)", header.file_path, header.asset_size);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod builder;
mod config;
mod data;
mod error;
mod font;
mod parser;
mod rebuild;
mod registry;
mod types;

pub mod format;

// Primary API
pub use error::{Error, Result};
pub use registry::AssetRegistry;
pub use types::{AssetId, AssetType, NO_ASSET};

// Payload views
pub use data::{AssetData, Image, Sound};
pub use font::Font;
pub use format::{kerning_key, Glyph, Kerning, GLYPH_COUNT};

// Low-level access
pub use format::{FileHeader, RawHeader};
pub use parser::RawArchive;
pub use rebuild::{rebuild_pointers, Header};

// Builder API
pub use builder::{ArchiveBuilder, FontBuilder};

pub use config::{AssetsConfig, ARCHIVE_ENV};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rebuild_pointers_matches_registry() {
        let mut builder = ArchiveBuilder::new();
        builder
            .add_shader(1, "shaders/text.vert", "void main() {}")
            .add_asset(2, AssetType::Level, "levels/intro.lvl", 42, &[9; 5]);
        let bytes = builder.build().unwrap();

        let archive = RawArchive::parse(&bytes).unwrap();
        let headers = rebuild_pointers(&archive).unwrap();
        let registry = AssetRegistry::parse(&bytes).unwrap();

        assert_eq!(headers, registry.headers().collect::<Vec<_>>());
        assert_eq!(headers[1].file_path, "levels/intro.lvl");
        assert_eq!(headers[1].timestamp, 42);
        assert_eq!(headers[1].offset, 14);
    }
}
