//! Bitmap font view: a 256-entry glyph table and a sorted kerning table.
//!
//! Only single-byte characters are supported. Each byte value indexes its
//! glyph directly; anything outside 0-255 has no glyph.

use zerocopy::FromBytes;

use crate::format::{kerning_key, FontHeader, Glyph, Kerning, GLYPH_COUNT};
use crate::{AssetId, AssetType, Error, Result};

/// A font stored in the archive.
///
/// The glyph and kerning tables borrow the registry's buffer.
#[derive(Debug, Clone, Copy)]
pub struct Font<'a> {
    texture: AssetId,
    height: f32,
    monospace: bool,
    glyphs: &'a [Glyph; GLYPH_COUNT],
    kernings: &'a [Kerning],
}

impl<'a> Font<'a> {
    /// View a FONT payload.
    ///
    /// This only checks the layout, which is constant time. Call
    /// [`Font::validate`] to also check the metrics and kerning order.
    pub fn parse(id: AssetId, bytes: &'a [u8]) -> Result<Self> {
        let (header, rest) = FontHeader::read_from_prefix(bytes)
            .map_err(|_| invalid(id, "truncated font header"))?;
        let (glyphs, rest) = <[Glyph; GLYPH_COUNT]>::ref_from_prefix(rest)
            .map_err(|_| invalid(id, "truncated glyph table"))?;

        let num_kernings = usize::try_from(header.num_kernings)
            .map_err(|_| invalid(id, "kerning count overflows"))?;
        let (kernings, rest) = <[Kerning]>::ref_from_prefix_with_elems(rest, num_kernings)
            .map_err(|_| invalid(id, format!("truncated kerning table ({num_kernings} pairs)")))?;
        if !rest.is_empty() {
            return Err(invalid(id, format!("{} trailing bytes", rest.len())));
        }

        Ok(Self {
            texture: header.texture,
            height: header.height,
            monospace: header.monospace != 0,
            glyphs,
            kernings,
        })
    }

    /// Check the line height and that kerning keys are strictly ascending.
    pub fn validate(&self, id: AssetId) -> Result<()> {
        if !(self.height.is_finite() && self.height > 0.0) {
            return Err(invalid(id, format!("line height {} is not positive", self.height)));
        }

        if let Some(index) = self.kernings.windows(2).position(|pair| pair[0].key >= pair[1].key) {
            return Err(Error::UnsortedKernings { id, index: index + 1 });
        }

        Ok(())
    }

    /// Id of the texture holding the glyph bitmaps.
    #[inline]
    pub fn texture(&self) -> AssetId {
        self.texture
    }

    /// Line height in font pixels.
    #[inline]
    pub fn height(&self) -> f32 {
        self.height
    }

    #[inline]
    pub fn is_monospace(&self) -> bool {
        self.monospace
    }

    /// Scale factor from font pixels to a rendered size.
    #[inline]
    pub fn scale_for(&self, size: f32) -> f32 {
        size / self.height
    }

    /// Glyph for a byte value.
    #[inline]
    pub fn glyph(&self, ch: u8) -> &'a Glyph {
        &self.glyphs[ch as usize]
    }

    /// Glyph for a character, if it fits in a byte.
    pub fn glyph_for_char(&self, ch: char) -> Result<&'a Glyph> {
        u8::try_from(ch)
            .map(|byte| self.glyph(byte))
            .map_err(|_| Error::GlyphOutOfRange(ch))
    }

    /// All 256 glyphs, indexed by character code.
    #[inline]
    pub fn glyphs(&self) -> &'a [Glyph] {
        self.glyphs
    }

    /// The kerning table, ascending by key.
    #[inline]
    pub fn kernings(&self) -> &'a [Kerning] {
        self.kernings
    }

    #[inline]
    pub fn num_kernings(&self) -> usize {
        self.kernings.len()
    }

    /// Advance adjustment between `left` and `right`.
    ///
    /// Pairs without an entry have no adjustment and return `0.0`.
    pub fn find_kerning(&self, left: u8, right: u8) -> f32 {
        let key = kerning_key(left, right);
        self.kernings
            .binary_search_by_key(&key, |kerning| kerning.key)
            .map_or(0.0, |index| self.kernings[index].amount)
    }
}

fn invalid(id: AssetId, reason: impl Into<String>) -> Error {
    Error::InvalidPayload {
        id,
        asset_type: AssetType::Font,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::FontBuilder;

    fn abcde_font() -> Vec<u8> {
        let mut font = FontBuilder::new(7, 16.0);
        for (i, ch) in (b'A'..=b'E').enumerate() {
            font.glyph(ch, Glyph::new(ch, [i as f32 * 10.0, 0.0, 9.0, 16.0], [0.0, 0.0], 10.0));
        }
        font.kerning(b'A', b'B', -2.0);
        font.encode()
    }

    #[test]
    fn test_kerning_scenario() {
        let bytes = abcde_font();
        let font = Font::parse(1, &bytes).unwrap();
        font.validate(1).unwrap();

        assert_eq!(font.find_kerning(b'A', b'B'), -2.0);
        assert_eq!(font.find_kerning(b'B', b'A'), 0.0);
        assert_eq!(font.texture(), 7);
        assert_eq!({ font.glyph(b'C').advance }, 10.0);
    }

    #[test]
    fn test_empty_kerning_table() {
        let bytes = FontBuilder::new(0, 12.0).encode();
        let font = Font::parse(1, &bytes).unwrap();

        assert_eq!(font.num_kernings(), 0);
        for left in [0u8, b'A', 0xFF] {
            for right in [0u8, b'B', 0xFF] {
                assert_eq!(font.find_kerning(left, right), 0.0);
            }
        }
    }

    #[test]
    fn test_every_stored_pair_is_found() {
        let mut builder = FontBuilder::new(0, 12.0);
        let mut expected = Vec::new();
        for left in (0u8..=255).step_by(17) {
            for right in (3u8..=255).step_by(29) {
                let amount = f32::from(left) * 0.01 - f32::from(right) * 0.02;
                builder.kerning(left, right, amount);
                expected.push((left, right, amount));
            }
        }
        let bytes = builder.encode();
        let font = Font::parse(1, &bytes).unwrap();
        font.validate(1).unwrap();

        for (left, right, amount) in expected {
            assert_eq!(font.find_kerning(left, right), amount);
        }
        assert_eq!(font.find_kerning(1, 1), 0.0);
        assert_eq!(font.find_kerning(255, 255), 0.0);
        assert_eq!(font.find_kerning(0, 0), 0.0);
    }

    #[test]
    fn test_single_pair_table_edges() {
        let mut builder = FontBuilder::new(0, 12.0);
        builder.kerning(b'M', b'M', 1.5);
        let bytes = builder.encode();
        let font = Font::parse(1, &bytes).unwrap();

        assert_eq!(font.find_kerning(b'M', b'M'), 1.5);
        assert_eq!(font.find_kerning(b'M', b'L'), 0.0);
        assert_eq!(font.find_kerning(b'M', b'N'), 0.0);
    }

    #[test]
    fn test_glyph_for_char_range() {
        let bytes = abcde_font();
        let font = Font::parse(1, &bytes).unwrap();

        assert_eq!({ font.glyph_for_char('E').unwrap().id }, b'E');
        assert_eq!({ font.glyph_for_char('\u{FF}').unwrap().id }, 0xFF);
        assert!(matches!(
            font.glyph_for_char('\u{100}'),
            Err(Error::GlyphOutOfRange('\u{100}'))
        ));
    }

    #[test]
    fn test_truncated_and_trailing_payloads() {
        let bytes = abcde_font();

        assert!(Font::parse(1, &bytes[..bytes.len() - 1]).is_err());
        assert!(Font::parse(1, &bytes[..20]).is_err());

        let mut padded = bytes.clone();
        padded.push(0);
        assert!(matches!(
            Font::parse(1, &padded),
            Err(Error::InvalidPayload { asset_type: AssetType::Font, .. })
        ));
    }

    #[test]
    fn test_validate_rejects_unsorted_kernings() {
        let mut bytes = FontBuilder::new(0, 12.0).encode();
        // Patch in two kerning records in descending order.
        bytes[8..16].copy_from_slice(&2u64.to_le_bytes());
        bytes.extend_from_slice(zerocopy::IntoBytes::as_bytes(&Kerning::new(b'B', b'A', 1.0)));
        bytes.extend_from_slice(zerocopy::IntoBytes::as_bytes(&Kerning::new(b'A', b'B', 1.0)));

        let font = Font::parse(4, &bytes).unwrap();
        assert!(matches!(font.validate(4), Err(Error::UnsortedKernings { id: 4, index: 1 })));
    }

    #[test]
    fn test_validate_rejects_zero_height() {
        let bytes = FontBuilder::new(0, 0.0).encode();
        let font = Font::parse(1, &bytes).unwrap();
        assert!(font.validate(1).is_err());
    }
}
