//! Bitmap text for the Fog engine.
//!
//! Measures, lays out and draws single-byte text using the fonts stored in an
//! [`AssetRegistry`](fog_asset::AssetRegistry). Fonts scale linearly from
//! their line height to the requested size and apply pair kerning unless they
//! are monospace.
//!
//! # Example
//!
//! ```no_run
//! use fog_asset::AssetRegistry;
//! use fog_text::measure_text;
//!
//! let registry = AssetRegistry::open("data.fog")?;
//! let size = measure_text(&registry, "Hello\nworld", 24.0, 0x2A)?;
//! println!("{} x {}", size.x, size.y);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod draw;
mod error;
mod layout;

pub use draw::{draw_text, TextRenderer, TextStyle};
pub use error::{Error, Result};
pub use layout::{layout_text, layout_with_font, measure_text, measure_with_font, GlyphQuad};
