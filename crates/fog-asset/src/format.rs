//! On-disk record layouts.
//!
//! An archive is laid out as:
//!
//! ```text
//! [FileHeader][string table][RawHeader; n][data segment]
//! ```
//!
//! All records are little-endian and packed, so they can be viewed in place
//! over any byte buffer.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Number of glyphs in every font, one per byte value.
pub const GLYPH_COUNT: usize = 256;

/// Archive file header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct FileHeader {
    /// Number of asset headers.
    pub number_of_assets: u64,
    /// Size of the header array in bytes.
    pub size_of_headers: u64,
    /// Size of the string table in bytes.
    pub size_of_strings: u64,
    /// Size of the data segment in bytes.
    pub size_of_data: u64,
}

impl FileHeader {
    /// Size of the file header in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();
}

/// Per-asset header as stored in the archive.
///
/// `file_path` is an offset relative to the string table, not a usable
/// reference. It only becomes a path once the header has been resolved.
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct RawHeader {
    /// Asset type tag.
    pub asset_type: u32,
    /// Offset of the path inside the string table.
    pub file_path: u64,
    /// Length of the path in bytes.
    pub file_path_length: u64,
    /// Source file modification time, used by the packer only.
    pub timestamp: u64,
    /// Offset of the payload inside the data segment.
    pub offset: u64,
    /// Payload size in bytes.
    pub asset_size: u32,
    /// Asset id.
    pub asset_id: u64,
}

impl RawHeader {
    /// Size of one header record in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();
}

/// Prefix of TEXTURE and ATLAS payloads, followed by the pixels.
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct ImageHeader {
    pub width: u32,
    pub height: u32,
    /// Bytes per pixel.
    pub components: u32,
    pub reserved: u32,
}

/// Prefix of SOUND payloads, followed by interleaved samples.
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct SoundHeader {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
    pub frame_count: u64,
}

/// Prefix of FONT payloads, followed by the glyph and kerning tables.
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct FontHeader {
    /// Id of the texture holding the glyph bitmaps.
    pub texture: u64,
    /// Number of kerning records after the glyph table.
    pub num_kernings: u64,
    /// Line height in font pixels.
    pub height: f32,
    /// Non-zero for monospace fonts.
    pub monospace: u32,
}

/// Metrics for one character, in font pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct Glyph {
    /// Character code this glyph renders.
    pub id: u8,
    pub reserved: [u8; 3],
    /// Position of the glyph inside the font texture.
    pub x: f32,
    pub y: f32,
    /// Size of the glyph inside the font texture.
    pub w: f32,
    pub h: f32,
    /// Offset from the pen position to the glyph's top-left corner.
    pub x_offset: f32,
    pub y_offset: f32,
    /// Horizontal pen advance after this glyph.
    pub advance: f32,
}

impl Glyph {
    /// Build a glyph from its atlas rectangle `[x, y, w, h]`, its
    /// `[x_offset, y_offset]` and its advance.
    pub fn new(id: u8, rect: [f32; 4], offset: [f32; 2], advance: f32) -> Self {
        let [x, y, w, h] = rect;
        let [x_offset, y_offset] = offset;
        Self {
            id,
            reserved: [0; 3],
            x,
            y,
            w,
            h,
            x_offset,
            y_offset,
            advance,
        }
    }
}

/// Advance adjustment for an ordered pair of characters.
#[derive(Debug, Clone, Copy, Default, PartialEq, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct Kerning {
    /// Left character in the high byte, right character in the low byte.
    pub key: u16,
    pub reserved: u16,
    pub amount: f32,
}

impl Kerning {
    /// Build a record for the pair `(left, right)`.
    pub fn new(left: u8, right: u8, amount: f32) -> Self {
        Self {
            key: kerning_key(left, right),
            reserved: 0,
            amount,
        }
    }
}

/// Pack a character pair into a kerning key.
#[inline]
pub const fn kerning_key(left: u8, right: u8) -> u16 {
    ((left as u16) << 8) | right as u16
}

const _: () = assert!(FileHeader::SIZE == 32);
const _: () = assert!(RawHeader::SIZE == 48);
const _: () = assert!(std::mem::size_of::<ImageHeader>() == 16);
const _: () = assert!(std::mem::size_of::<SoundHeader>() == 16);
const _: () = assert!(std::mem::size_of::<FontHeader>() == 24);
const _: () = assert!(std::mem::size_of::<Glyph>() == 32);
const _: () = assert!(std::mem::size_of::<Kerning>() == 8);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kerning_key_layout() {
        assert_eq!(kerning_key(b'A', b'B'), 0x4142);
        assert_eq!(kerning_key(0xFF, 0x00), 0xFF00);
        assert!(kerning_key(b'A', b'Z') < kerning_key(b'B', b'A'));
    }

    #[test]
    fn test_file_header_is_little_endian() {
        let header = FileHeader {
            number_of_assets: 1,
            size_of_headers: 48,
            size_of_strings: 0,
            size_of_data: 0,
        };
        let bytes = header.as_bytes();
        assert_eq!(bytes.len(), 32);
        assert_eq!(&bytes[0..8], &[1, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(bytes[8], 48);
    }
}
