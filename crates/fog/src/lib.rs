//! Fog - packed asset archives and bitmap text for the Fog engine.
//!
//! This crate provides a unified interface to the Fog library ecosystem.
//!
//! # Crates
//!
//! - [`fog_common`] - Common utilities (binary reading)
//! - [`fog_asset`] - Archive parsing, pointer rebuilding and the asset registry
//! - [`fog_text`] - Text measurement, layout and drawing
//!
//! # Example
//!
//! ```no_run
//! use fog::prelude::*;
//!
//! let registry = AssetRegistry::load(&AssetsConfig::new("data.fog"))?;
//!
//! if let Some(image) = registry.fetch_image(0x10) {
//!     println!("{}x{}", image.width, image.height);
//! }
//!
//! let size = measure_text(&registry, "Score: 100", 32.0, 0x2A)?;
//! println!("{} x {}", size.x, size.y);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Re-export all sub-crates
pub use fog_asset as asset;
pub use fog_common as common;
pub use fog_text as text;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use fog_asset::{
        AssetData, AssetId, AssetRegistry, AssetType, AssetsConfig, Font, Header, Image, Sound,
        NO_ASSET,
    };
    pub use fog_common::BinaryReader;
    pub use fog_text::{draw_text, layout_text, measure_text, GlyphQuad, TextRenderer, TextStyle};
}

// Re-export commonly used types at the crate root
pub use fog_asset::AssetRegistry;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
