//! Pen walk shared by measurement and layout.

use fog_asset::{AssetId, AssetRegistry, Font, Glyph};
use glam::Vec2;

use crate::{Error, Result};

/// Byte drawn in place of characters the font can't hold.
const REPLACEMENT: u8 = b'?';

/// One glyph positioned on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphQuad {
    /// Character code of the glyph.
    pub ch: u8,
    /// Top-left corner on screen.
    pub position: Vec2,
    /// Size on screen.
    pub size: Vec2,
    /// Top-left corner inside the font texture, in texels.
    pub atlas_position: Vec2,
    /// Size inside the font texture, in texels.
    pub atlas_size: Vec2,
    /// Texture holding the glyph bitmaps.
    pub texture: AssetId,
}

/// A glyph placed by the pen walk, relative to the text's top-left corner.
struct Placement<'a> {
    ch: u8,
    glyph: &'a Glyph,
    line: usize,
    /// Pen position before this glyph's advance.
    pen: f32,
}

/// Walk `text` with `font` at `size`, calling `place` for every glyph.
///
/// Returns the widest pen position reached and the number of lines.
fn walk<'a>(font: &Font<'a>, text: &str, size: f32, mut place: impl FnMut(Placement<'a>)) -> Result<(f32, usize)> {
    if !(size.is_finite() && size > 0.0) {
        return Err(Error::InvalidSize(size));
    }
    if text.is_empty() {
        return Ok((0.0, 0));
    }

    let scale = font.scale_for(size);
    let kerned = !font.is_monospace();

    let mut width = 0.0f32;
    let mut line = 0;
    let mut pen = 0.0f32;
    let mut prev: Option<u8> = None;

    for ch in text.chars() {
        if ch == '\n' {
            line += 1;
            pen = 0.0;
            prev = None;
            continue;
        }

        let byte = u8::try_from(ch).unwrap_or_else(|_| {
            log::warn!("no glyph for {ch:?}, drawing {:?} instead", REPLACEMENT as char);
            REPLACEMENT
        });

        if let Some(prev) = prev.filter(|_| kerned) {
            pen += font.find_kerning(prev, byte) * scale;
        }

        let glyph = font.glyph(byte);
        place(Placement {
            ch: byte,
            glyph,
            line,
            pen,
        });

        pen += glyph.advance * scale;
        width = width.max(pen);
        prev = Some(byte);
    }

    Ok((width, line + 1))
}

/// Size `text` would take up when drawn with `font` at `size`.
///
/// The pen advances by each glyph's scaled advance, plus the kerning between
/// consecutive characters. Monospace fonts are not kerned. The width is the
/// furthest the pen gets on any line, so it never shrinks when characters are
/// appended. The height is one `size` per line; an empty string measures zero.
pub fn measure_with_font(font: &Font<'_>, text: &str, size: f32) -> Result<Vec2> {
    let (width, lines) = walk(font, text, size, |_| {})?;
    Ok(Vec2::new(width, lines as f32 * size))
}

/// Size `text` would take up when drawn in the font `font_id` at `size`.
///
/// See [`measure_with_font`]; monospace fonts ignore their kerning table.
pub fn measure_text(registry: &AssetRegistry, text: &str, size: f32, font_id: AssetId) -> Result<Vec2> {
    let font = registry.font(font_id)?;
    measure_with_font(&font, text, size)
}

/// Position every visible glyph of `text` with its top-left corner at `origin`.
///
/// Glyphs with an empty atlas rectangle (spaces) advance the pen but produce
/// no quad.
pub fn layout_with_font(font: &Font<'_>, text: &str, origin: Vec2, size: f32) -> Result<Vec<GlyphQuad>> {
    let scale = font.scale_for(size);
    let texture = font.texture();
    let mut quads = Vec::with_capacity(text.len());

    walk(font, text, size, |placement| {
        let glyph = placement.glyph;
        let atlas_size = Vec2::new(glyph.w, glyph.h);
        if atlas_size.x <= 0.0 || atlas_size.y <= 0.0 {
            return;
        }

        let line_top = origin.y + placement.line as f32 * size;
        let offset = Vec2::new(glyph.x_offset, glyph.y_offset) * scale;
        quads.push(GlyphQuad {
            ch: placement.ch,
            position: Vec2::new(origin.x + placement.pen, line_top) + offset,
            size: atlas_size * scale,
            atlas_position: Vec2::new(glyph.x, glyph.y),
            atlas_size,
            texture,
        });
    })?;

    Ok(quads)
}

/// Lay out `text` in the font `font_id`; see [`layout_with_font`].
pub fn layout_text(
    registry: &AssetRegistry,
    text: &str,
    origin: Vec2,
    size: f32,
    font_id: AssetId,
) -> Result<Vec<GlyphQuad>> {
    let font = registry.font(font_id)?;
    layout_with_font(&font, text, origin, size)
}
