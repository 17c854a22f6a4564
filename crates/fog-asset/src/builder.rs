//! Archive writer.
//!
//! This module writes the archive format from payloads that are already in
//! their runtime layout. It does not scan source folders or convert images;
//! that is the offline packer's job.
//!
//! # Example
//!
//! ```
//! use fog_asset::{ArchiveBuilder, AssetRegistry, FontBuilder, Glyph};
//!
//! let mut font = FontBuilder::new(1, 16.0);
//! font.glyph(b'A', Glyph::new(b'A', [0.0, 0.0, 8.0, 16.0], [0.0, 0.0], 9.0));
//! font.kerning(b'A', b'A', -1.0);
//!
//! let mut builder = ArchiveBuilder::new();
//! builder.add_texture(1, "res/font.png", 1, 1, 4, &[255; 4]);
//! builder.add_font(2, "res/font.fnt", &font);
//!
//! let registry = AssetRegistry::from_vec(builder.build()?)?;
//! assert_eq!(registry.fetch_font(2).unwrap().find_kerning(b'A', b'A'), -1.0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::io::{self, Write};
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};
use hashbrown::HashMap as FastHashMap;
use rustc_hash::FxHasher;
use std::hash::BuildHasherDefault;
use zerocopy::IntoBytes;

use crate::format::{
    FileHeader, FontHeader, Glyph, ImageHeader, Kerning, RawHeader, SoundHeader, GLYPH_COUNT,
};
use crate::{AssetId, AssetType};

type FxHashMap<K, V> = FastHashMap<K, V, BuildHasherDefault<FxHasher>>;

/// Path string table.
///
/// Identical paths share one entry. Each path is followed by a NUL that is
/// not counted in its length.
#[derive(Debug, Default)]
struct StringTable {
    data: Vec<u8>,
    offsets: FxHashMap<String, u64>,
}

impl StringTable {
    /// Add a string and return its offset.
    fn add(&mut self, s: &str) -> u64 {
        if let Some(&offset) = self.offsets.get(s) {
            return offset;
        }

        let offset = self.data.len() as u64;
        self.data.extend_from_slice(s.as_bytes());
        self.data.push(0);
        self.offsets.insert(s.to_string(), offset);
        offset
    }

    fn len(&self) -> usize {
        self.data.len()
    }
}

/// An asset waiting to be written.
#[derive(Debug, Clone)]
struct PendingAsset {
    asset_type: AssetType,
    asset_id: AssetId,
    path_offset: u64,
    path_length: u64,
    timestamp: u64,
    offset: u64,
    size: usize,
}

/// Builder for archive files.
///
/// Assets are written in the order they were added. Payloads are appended to
/// the data segment back to back.
#[derive(Debug, Default)]
pub struct ArchiveBuilder {
    strings: StringTable,
    assets: Vec<PendingAsset>,
    data: Vec<u8>,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of assets added so far.
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Add a payload that is already in its runtime layout.
    pub fn add_asset(
        &mut self,
        asset_id: AssetId,
        asset_type: AssetType,
        path: &str,
        timestamp: u64,
        payload: &[u8],
    ) -> &mut Self {
        let path_offset = self.strings.add(path);
        self.assets.push(PendingAsset {
            asset_type,
            asset_id,
            path_offset,
            path_length: path.len() as u64,
            timestamp,
            offset: self.data.len() as u64,
            size: payload.len(),
        });
        self.data.extend_from_slice(payload);
        self
    }

    /// Add an uncompressed texture.
    pub fn add_texture(
        &mut self,
        asset_id: AssetId,
        path: &str,
        width: u32,
        height: u32,
        components: u32,
        pixels: &[u8],
    ) -> &mut Self {
        let payload = image_payload(width, height, components, pixels);
        self.add_asset(asset_id, AssetType::Texture, path, 0, &payload)
    }

    /// Add an uncompressed atlas sheet.
    pub fn add_atlas(
        &mut self,
        asset_id: AssetId,
        path: &str,
        width: u32,
        height: u32,
        components: u32,
        pixels: &[u8],
    ) -> &mut Self {
        let payload = image_payload(width, height, components, pixels);
        self.add_asset(asset_id, AssetType::Atlas, path, 0, &payload)
    }

    /// Add a bitmap font.
    pub fn add_font(&mut self, asset_id: AssetId, path: &str, font: &FontBuilder) -> &mut Self {
        self.add_asset(asset_id, AssetType::Font, path, 0, &font.encode())
    }

    /// Add interleaved PCM samples.
    pub fn add_sound(
        &mut self,
        asset_id: AssetId,
        path: &str,
        sample_rate: u32,
        channels: u16,
        bits_per_sample: u16,
        samples: &[u8],
    ) -> &mut Self {
        let frame_bytes = usize::from(channels) * usize::from(bits_per_sample / 8);
        let frame_count = samples.len().checked_div(frame_bytes).unwrap_or(0) as u64;
        let header = SoundHeader {
            sample_rate,
            channels,
            bits_per_sample,
            frame_count,
        };
        let mut payload = header.as_bytes().to_vec();
        payload.extend_from_slice(samples);
        self.add_asset(asset_id, AssetType::Sound, path, 0, &payload)
    }

    /// Add shader source text.
    pub fn add_shader(&mut self, asset_id: AssetId, path: &str, source: &str) -> &mut Self {
        self.add_asset(asset_id, AssetType::Shader, path, 0, source.as_bytes())
    }

    /// Build the archive and write it to a file.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let data = self.build()?;
        std::fs::write(path, data)
    }

    /// Build the archive and return the raw bytes.
    pub fn build(&self) -> io::Result<Vec<u8>> {
        let mut output = Vec::with_capacity(
            FileHeader::SIZE + self.strings.len() + self.assets.len() * RawHeader::SIZE + self.data.len(),
        );
        self.write_to(&mut output)?;
        Ok(output)
    }

    /// Write the archive to a writer.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let headers = self
            .assets
            .iter()
            .map(|asset| {
                let asset_size = u32::try_from(asset.size).map_err(|_| {
                    io::Error::new(
                        io::ErrorKind::InvalidInput,
                        format!("asset {:#x} is larger than 4 GiB", asset.asset_id),
                    )
                })?;
                Ok(RawHeader {
                    asset_type: asset.asset_type.tag(),
                    file_path: asset.path_offset,
                    file_path_length: asset.path_length,
                    timestamp: asset.timestamp,
                    offset: asset.offset,
                    asset_size,
                    asset_id: asset.asset_id,
                })
            })
            .collect::<io::Result<Vec<_>>>()?;

        writer.write_u64::<LittleEndian>(headers.len() as u64)?;
        writer.write_u64::<LittleEndian>((headers.len() * RawHeader::SIZE) as u64)?;
        writer.write_u64::<LittleEndian>(self.strings.len() as u64)?;
        writer.write_u64::<LittleEndian>(self.data.len() as u64)?;

        writer.write_all(&self.strings.data)?;
        writer.write_all(headers.as_bytes())?;
        writer.write_all(&self.data)?;

        Ok(())
    }
}

fn image_payload(width: u32, height: u32, components: u32, pixels: &[u8]) -> Vec<u8> {
    let header = ImageHeader {
        width,
        height,
        components,
        reserved: 0,
    };
    let mut payload = header.as_bytes().to_vec();
    payload.extend_from_slice(pixels);
    payload
}

/// Builder for FONT payloads.
#[derive(Debug, Clone)]
pub struct FontBuilder {
    texture: AssetId,
    height: f32,
    monospace: bool,
    glyphs: Vec<Glyph>,
    kernings: FxHashMap<u16, Kerning>,
}

impl FontBuilder {
    /// Start a font drawn from `texture` with the given line height.
    ///
    /// Every glyph starts out empty with a zero advance.
    pub fn new(texture: AssetId, height: f32) -> Self {
        let glyphs = (0..GLYPH_COUNT)
            .map(|code| Glyph {
                id: code as u8,
                ..Glyph::default()
            })
            .collect();

        Self {
            texture,
            height,
            monospace: false,
            glyphs,
            kernings: FxHashMap::default(),
        }
    }

    pub fn monospace(&mut self, monospace: bool) -> &mut Self {
        self.monospace = monospace;
        self
    }

    /// Set the glyph for `ch`. The glyph's id is forced to `ch`.
    pub fn glyph(&mut self, ch: u8, glyph: Glyph) -> &mut Self {
        self.glyphs[ch as usize] = Glyph { id: ch, ..glyph };
        self
    }

    /// Set the adjustment for the pair `(left, right)`, replacing any earlier one.
    pub fn kerning(&mut self, left: u8, right: u8, amount: f32) -> &mut Self {
        let kerning = Kerning::new(left, right, amount);
        self.kernings.insert(kerning.key, kerning);
        self
    }

    /// Encode the payload, with the kerning table sorted by key.
    pub fn encode(&self) -> Vec<u8> {
        let mut kernings: Vec<Kerning> = self.kernings.values().copied().collect();
        kernings.sort_unstable_by_key(|kerning| kerning.key);

        let header = FontHeader {
            texture: self.texture,
            num_kernings: kernings.len() as u64,
            height: self.height,
            monospace: u32::from(self.monospace),
        };

        let mut payload = header.as_bytes().to_vec();
        payload.extend_from_slice(self.glyphs.as_bytes());
        payload.extend_from_slice(kernings.as_bytes());
        payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_table() {
        let mut table = StringTable::default();
        let offset1 = table.add("hello");
        let offset2 = table.add("world");
        let offset3 = table.add("hello"); // duplicate

        assert_eq!(offset1, 0);
        assert_eq!(offset2, 6); // "hello\0" = 6 bytes
        assert_eq!(offset3, offset1);
    }

    #[test]
    fn test_empty_archive_is_file_header_only() {
        let bytes = ArchiveBuilder::new().build().unwrap();
        assert_eq!(bytes, vec![0u8; FileHeader::SIZE]);
    }

    #[test]
    fn test_section_sizes_add_up() {
        let mut builder = ArchiveBuilder::new();
        builder
            .add_shader(1, "res/a.glsl", "void main() {}")
            .add_asset(2, AssetType::Config, "res/game.cfg", 99, b"fullscreen=1");
        let bytes = builder.build().unwrap();

        let header = FileHeader {
            number_of_assets: 2,
            size_of_headers: 96,
            size_of_strings: ("res/a.glsl".len() + "res/game.cfg".len() + 2) as u64,
            size_of_data: 26,
        };
        assert_eq!(&bytes[..FileHeader::SIZE], header.as_bytes());
        assert_eq!(bytes.len(), FileHeader::SIZE + 96 + 24 + 26);
    }

    #[test]
    fn test_font_encode_sorts_and_replaces() {
        let mut font = FontBuilder::new(3, 10.0);
        font.kerning(b'z', b'a', 1.0)
            .kerning(b'a', b'z', 2.0)
            .kerning(b'z', b'a', 3.0);
        let payload = font.encode();

        let expected_len = std::mem::size_of::<FontHeader>()
            + GLYPH_COUNT * std::mem::size_of::<Glyph>()
            + 2 * std::mem::size_of::<Kerning>();
        assert_eq!(payload.len(), expected_len);

        let kernings = &payload[expected_len - 16..];
        assert_eq!(kernings, [Kerning::new(b'a', b'z', 2.0), Kerning::new(b'z', b'a', 3.0)].as_bytes());
    }
}
