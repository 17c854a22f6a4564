//! Asset registry.
//!
//! The registry owns the archive buffer for its whole lifetime and indexes
//! every asset by id. It is immutable once built, so shared references can be
//! used from any number of threads without locking.

use std::fs::File;
use std::ops::{Deref, Range};
use std::path::Path;

use hashbrown::HashMap as FastHashMap;
use memmap2::Mmap;
use rustc_hash::FxHasher;

use crate::format::FileHeader;
use crate::parser::RawArchive;
use crate::rebuild::{self, ResolvedHeader};
use crate::{
    AssetData, AssetId, AssetType, AssetsConfig, Error, Font, Header, Image, Result, Sound, NO_ASSET,
};

type FxHashMap<K, V> = FastHashMap<K, V, std::hash::BuildHasherDefault<FxHasher>>;

/// Backing storage of a loaded archive.
enum AssetBytes {
    Owned(Vec<u8>),
    Mapped(Mmap),
}

impl Deref for AssetBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            AssetBytes::Owned(bytes) => bytes,
            AssetBytes::Mapped(mmap) => mmap,
        }
    }
}

/// A loaded archive with id lookup.
///
/// Every view handed out (`Header`, `Image`, `Font`, ...) borrows the registry
/// and can't outlive it.
pub struct AssetRegistry {
    bytes: AssetBytes,
    file_header: FileHeader,
    strings: Range<usize>,
    data: Range<usize>,
    headers: Vec<ResolvedHeader>,
    index: FxHashMap<AssetId, usize>,
}

impl AssetRegistry {
    /// Load the archive described by `config`.
    pub fn load(config: &AssetsConfig) -> Result<Self> {
        if config.memory_map {
            Self::open(&config.archive_path)
        } else {
            Self::read(&config.archive_path)
        }
    }

    /// Open an archive file (memory-mapped).
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("Mapping asset archive {}", path.display());

        let file = File::open(path)?;
        // SAFETY: the map is read-only and the archive is not expected to
        // change while the engine runs.
        let mmap = unsafe { Mmap::map(&file)? };
        Self::build(AssetBytes::Mapped(mmap))
    }

    /// Read an archive file onto the heap.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("Reading asset archive {}", path.display());
        Self::from_vec(std::fs::read(path)?)
    }

    /// Take ownership of an archive buffer.
    pub fn from_vec(bytes: Vec<u8>) -> Result<Self> {
        Self::build(AssetBytes::Owned(bytes))
    }

    /// Parse an archive from bytes, copying them.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        Self::from_vec(bytes.to_vec())
    }

    fn build(bytes: AssetBytes) -> Result<Self> {
        let archive = RawArchive::parse(&bytes)?;
        let file_header = archive.file_header();
        let strings = archive.string_table_range();
        let data = archive.data_range();
        let headers = rebuild::resolve_all(&archive)?;

        let mut index = FxHashMap::with_capacity_and_hasher(headers.len(), Default::default());
        for (i, header) in headers.iter().enumerate() {
            if index.insert(header.asset_id, i).is_some() {
                return Err(Error::DuplicateAssetId(header.asset_id));
            }
        }

        // Decode every payload once so a bad asset fails the load, not a
        // lookup in the middle of a frame.
        for header in &headers {
            let payload = header.payload(archive.data());
            if let AssetData::Font(font) = AssetData::decode(header.asset_id, header.asset_type, payload)? {
                font.validate(header.asset_id)?;
            }
        }

        log::debug!(
            "Loaded {} assets ({} bytes of strings, {} bytes of data)",
            headers.len(),
            strings.len(),
            data.len()
        );

        Ok(Self {
            bytes,
            file_header,
            strings,
            data,
            headers,
            index,
        })
    }

    /// The archive's file header.
    #[inline]
    pub fn file_header(&self) -> FileHeader {
        self.file_header
    }

    /// Number of assets.
    #[inline]
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    #[inline]
    pub fn contains(&self, id: AssetId) -> bool {
        self.resolved(id).is_some()
    }

    /// Type of the asset with this id.
    pub fn asset_type(&self, id: AssetId) -> Option<AssetType> {
        self.resolved(id).map(|header| header.asset_type)
    }

    /// Header of the asset with this id.
    pub fn header(&self, id: AssetId) -> Option<Header<'_>> {
        self.resolved(id).map(|header| header.view(self.string_table()))
    }

    /// All headers, in archive order.
    pub fn headers(&self) -> impl ExactSizeIterator<Item = Header<'_>> + '_ {
        let strings = self.string_table();
        self.headers.iter().map(move |header| header.view(strings))
    }

    /// Find an asset by its source path.
    ///
    /// This walks every header; runtime code should look assets up by id.
    pub fn find_by_path(&self, path: &str) -> Option<Header<'_>> {
        self.headers().find(|header| header.file_path == path)
    }

    /// Raw payload bytes of an asset.
    pub fn payload(&self, id: AssetId) -> Option<&[u8]> {
        self.resolved(id).map(|header| header.payload(self.data_segment()))
    }

    /// Decoded payload of an asset.
    ///
    /// Every payload was checked when the archive loaded, so this only
    /// re-reads fixed-size prefixes.
    pub fn data(&self, id: AssetId) -> Result<AssetData<'_>> {
        let header = self.resolved(id).ok_or(Error::AssetNotFound(id))?;
        let bytes = header.payload(self.data_segment());
        if header.asset_type == AssetType::Shader {
            // SAFETY: `build` decoded every shader payload as UTF-8 and the
            // buffer is never mutated after load.
            return Ok(AssetData::Shader(unsafe { std::str::from_utf8_unchecked(bytes) }));
        }
        AssetData::decode(id, header.asset_type, bytes)
    }

    /// Look up a TEXTURE or ATLAS asset.
    pub fn image(&self, id: AssetId) -> Result<Image<'_>> {
        match self.data(id)? {
            AssetData::Texture(image) | AssetData::Atlas(image) => Ok(image),
            other => Err(mismatch(id, "image", other.asset_type())),
        }
    }

    /// Look up a FONT asset.
    pub fn font(&self, id: AssetId) -> Result<Font<'_>> {
        match self.data(id)? {
            AssetData::Font(font) => Ok(font),
            other => Err(mismatch(id, "font", other.asset_type())),
        }
    }

    /// Look up a SOUND asset.
    pub fn sound(&self, id: AssetId) -> Result<Sound<'_>> {
        match self.data(id)? {
            AssetData::Sound(sound) => Ok(sound),
            other => Err(mismatch(id, "sound", other.asset_type())),
        }
    }

    /// Look up the source text of a SHADER asset.
    pub fn shader(&self, id: AssetId) -> Result<&str> {
        match self.data(id)? {
            AssetData::Shader(source) => Ok(source),
            other => Err(mismatch(id, "shader", other.asset_type())),
        }
    }

    /// The image mapped to `id`, if `id` is a TEXTURE or ATLAS.
    ///
    /// The returned view is read-only; it may be read from several threads at
    /// once.
    #[inline]
    pub fn fetch_image(&self, id: AssetId) -> Option<Image<'_>> {
        self.image(id).ok()
    }

    /// The font mapped to `id`, if `id` is a FONT.
    #[inline]
    pub fn fetch_font(&self, id: AssetId) -> Option<Font<'_>> {
        self.font(id).ok()
    }

    #[inline]
    pub fn fetch_sound(&self, id: AssetId) -> Option<Sound<'_>> {
        self.sound(id).ok()
    }

    #[inline]
    pub fn fetch_shader(&self, id: AssetId) -> Option<&str> {
        self.shader(id).ok()
    }

    fn resolved(&self, id: AssetId) -> Option<&ResolvedHeader> {
        if id == NO_ASSET {
            return None;
        }
        self.index.get(&id).map(|&i| &self.headers[i])
    }

    #[inline]
    fn string_table(&self) -> &[u8] {
        &self.bytes[self.strings.clone()]
    }

    #[inline]
    fn data_segment(&self) -> &[u8] {
        &self.bytes[self.data.clone()]
    }
}

impl std::fmt::Debug for AssetRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetRegistry")
            .field("assets", &self.headers.len())
            .field("bytes", &self.bytes.len())
            .field("mapped", &matches!(self.bytes, AssetBytes::Mapped(_)))
            .finish()
    }
}

fn mismatch(id: AssetId, expected: &'static str, actual: AssetType) -> Error {
    Error::TypeMismatch { id, expected, actual }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{ArchiveBuilder, FontBuilder};
    use crate::format::{Glyph, RawHeader};
    use zerocopy::IntoBytes;

    const TEXTURE: AssetId = 10;
    const ATLAS: AssetId = 11;
    const FONT: AssetId = 20;
    const SHADER: AssetId = 30;

    fn sample_archive() -> Vec<u8> {
        let mut font = FontBuilder::new(TEXTURE, 16.0);
        for ch in b'A'..=b'E' {
            font.glyph(ch, Glyph::new(ch, [0.0, 0.0, 8.0, 16.0], [0.0, 0.0], 9.0));
        }
        font.kerning(b'A', b'B', -2.0);

        let mut builder = ArchiveBuilder::new();
        builder
            .add_texture(TEXTURE, "res/font.png", 2, 2, 4, &[0xAB; 16])
            .add_atlas(ATLAS, "res/sprites.png", 1, 1, 1, &[1])
            .add_font(FONT, "res/font.fnt", &font)
            .add_shader(SHADER, "res/text.glsl", "void main() {}");
        builder.build().unwrap()
    }

    #[test]
    fn test_fetch_by_type() {
        let registry = AssetRegistry::from_vec(sample_archive()).unwrap();
        assert_eq!(registry.len(), 4);

        let image = registry.fetch_image(TEXTURE).unwrap();
        assert_eq!((image.width, image.height), (2, 2));
        assert_eq!(image.pixels, &[0xAB; 16]);
        assert_eq!(registry.fetch_image(ATLAS).unwrap().pixels, &[1]);

        let font = registry.fetch_font(FONT).unwrap();
        assert_eq!(font.texture(), TEXTURE);
        assert_eq!(font.find_kerning(b'A', b'B'), -2.0);
        assert_eq!(font.find_kerning(b'B', b'A'), 0.0);

        assert_eq!(registry.fetch_shader(SHADER), Some("void main() {}"));
    }

    #[test]
    fn test_unknown_and_mismatched_ids() {
        let registry = AssetRegistry::from_vec(sample_archive()).unwrap();

        assert!(registry.fetch_image(999).is_none());
        assert!(registry.fetch_font(999).is_none());
        assert!(registry.fetch_image(FONT).is_none());
        assert!(registry.fetch_font(TEXTURE).is_none());
        assert!(registry.fetch_font(NO_ASSET).is_none());

        assert!(matches!(registry.font(999), Err(Error::AssetNotFound(999))));
        let err = registry.font(SHADER).unwrap_err();
        assert!(matches!(
            err,
            Error::TypeMismatch { id: SHADER, expected: "font", actual: AssetType::Shader }
        ));
        assert!(err.is_not_found());
        assert!(!err.is_format_error());
    }

    #[test]
    fn test_headers_match_what_was_packed() {
        let mut builder = ArchiveBuilder::new();
        let mut expected = Vec::new();
        let mut offset = 0u64;
        for i in 0..32u64 {
            let asset_type = AssetType::ALL[(i % 8) as usize];
            let payload = vec![i as u8; (i * 3) as usize];
            let id = 0x1000_0000_0000 + i * 7;
            let payload = match asset_type {
                AssetType::Texture | AssetType::Atlas => {
                    let mut bytes = crate::format::ImageHeader {
                        width: i as u32,
                        height: 1,
                        components: 3,
                        reserved: 0,
                    }
                    .as_bytes()
                    .to_vec();
                    bytes.extend_from_slice(&payload);
                    bytes
                }
                AssetType::Font => FontBuilder::new(1, 8.0).encode(),
                AssetType::Sound => {
                    let mut bytes = crate::format::SoundHeader {
                        sample_rate: 44100,
                        channels: 1,
                        bits_per_sample: 8,
                        frame_count: payload.len() as u64,
                    }
                    .as_bytes()
                    .to_vec();
                    bytes.extend_from_slice(&payload);
                    bytes
                }
                AssetType::Shader => "x".repeat(i as usize).into_bytes(),
                AssetType::None | AssetType::Config | AssetType::Level => payload,
            };
            let path = format!("res/{i}.bin");
            builder.add_asset(id, asset_type, &path, i, &payload);
            expected.push((asset_type, id, payload.len() as u32, offset, path));
            offset += payload.len() as u64;
        }

        let bytes = builder.build().unwrap();
        let registry = AssetRegistry::parse(&bytes).unwrap();
        let header = registry.file_header();
        assert_eq!(
            FileHeader::SIZE as u64 + header.size_of_headers + header.size_of_strings + header.size_of_data,
            bytes.len() as u64
        );
        assert_eq!({ header.number_of_assets }, 32);

        let headers: Vec<_> = registry.headers().collect();
        assert_eq!(headers.len(), expected.len());
        for (header, (asset_type, id, size, offset, path)) in headers.iter().zip(&expected) {
            assert_eq!(header.asset_type, *asset_type);
            assert_eq!(header.asset_id, *id);
            assert_eq!(header.asset_size, *size);
            assert_eq!(header.offset, *offset);
            assert_eq!(header.file_path, path);
            assert!(header.offset + u64::from(header.asset_size) <= { registry.file_header().size_of_data });
            assert_eq!(registry.header(*id), Some(*header));
        }
    }

    #[test]
    fn test_empty_archive() {
        let registry = AssetRegistry::from_vec(ArchiveBuilder::new().build().unwrap()).unwrap();

        assert!(registry.is_empty());
        assert_eq!(registry.headers().count(), 0);
        for id in [0, 1, NO_ASSET, u64::MAX] {
            assert!(registry.fetch_image(id).is_none());
            assert!(registry.fetch_font(id).is_none());
            assert!(registry.header(id).is_none());
        }
    }

    #[test]
    fn test_duplicate_ids_fail_the_load() {
        let mut builder = ArchiveBuilder::new();
        builder
            .add_shader(5, "a.glsl", "a")
            .add_shader(5, "b.glsl", "b");
        assert!(matches!(
            AssetRegistry::from_vec(builder.build().unwrap()),
            Err(Error::DuplicateAssetId(5))
        ));
    }

    #[test]
    fn test_reserved_id_fails_the_load() {
        let mut builder = ArchiveBuilder::new();
        builder.add_shader(NO_ASSET, "a.glsl", "a");
        let err = AssetRegistry::from_vec(builder.build().unwrap()).unwrap_err();
        assert!(matches!(err, Error::ReservedAssetId { index: 0, .. }));
        assert!(err.is_format_error());
    }

    #[test]
    fn test_bad_payload_fails_the_load() {
        let mut builder = ArchiveBuilder::new();
        builder.add_asset(1, AssetType::Font, "broken.fnt", 0, &[0u8; 10]);
        assert!(matches!(
            AssetRegistry::from_vec(builder.build().unwrap()),
            Err(Error::InvalidPayload { id: 1, asset_type: AssetType::Font, .. })
        ));
    }

    #[test]
    fn test_corrupted_header_range_fails_the_load() {
        let mut bytes = sample_archive();
        let strings = {
            let header = RawArchive::parse(&bytes).unwrap().file_header();
            header.size_of_strings as usize
        };

        // Point the first asset's payload past the end of the data segment.
        let first = FileHeader::SIZE + strings;
        let mut raw = *RawArchive::parse(&bytes).unwrap().raw_headers().first().unwrap();
        raw.offset = u64::MAX - 1;
        bytes[first..first + RawHeader::SIZE].copy_from_slice(raw.as_bytes());

        let err = AssetRegistry::from_vec(bytes).unwrap_err();
        assert!(matches!(err, Error::DataOutOfBounds { id: TEXTURE, .. }));
    }

    #[test]
    fn test_sounds_and_membership() {
        const STEREO: AssetId = 40;
        const MONO_24: AssetId = 41;

        let mut builder = ArchiveBuilder::new();
        builder
            .add_sound(STEREO, "sfx/hit.wav", 8000, 2, 16, &[0x11; 100 * 4])
            .add_sound(MONO_24, "sfx/beep.wav", 48000, 1, 24, &[0x22; 10 * 3])
            .add_shader(SHADER, "res/text.glsl", "void main() {}");
        let registry = AssetRegistry::from_vec(builder.build().unwrap()).unwrap();

        let stereo = registry.fetch_sound(STEREO).unwrap();
        assert_eq!(stereo.frame_count, 100);
        assert_eq!((stereo.channels, stereo.bits_per_sample), (2, 16));
        assert_eq!(stereo.duration_secs(), 0.0125);
        assert_eq!(registry.sound(MONO_24).unwrap().frame_count, 10);

        assert!(registry.contains(STEREO));
        assert!(!registry.contains(999));
        assert!(!registry.contains(NO_ASSET));
        assert_eq!(registry.asset_type(STEREO), Some(AssetType::Sound));
        assert_eq!(registry.asset_type(999), None);
        assert_eq!(registry.asset_type(NO_ASSET), None);

        assert!(registry.fetch_shader(STEREO).is_none());
        assert!(registry.fetch_sound(SHADER).is_none());
        assert!(matches!(
            registry.sound(SHADER),
            Err(Error::TypeMismatch { expected: "sound", actual: AssetType::Shader, .. })
        ));
    }

    #[test]
    fn test_shader_lookup_borrows_payload() {
        let registry = AssetRegistry::from_vec(sample_archive()).unwrap();

        let source = registry.shader(SHADER).unwrap();
        let payload = registry.payload(SHADER).unwrap();
        assert_eq!(source, "void main() {}");
        assert!(std::ptr::eq(source.as_bytes(), payload));
        assert!(matches!(registry.data(SHADER).unwrap(), AssetData::Shader("void main() {}")));
    }

    #[test]
    fn test_write_to_file_round_trip() {
        let path = std::env::temp_dir().join(format!("fog-builder-{}.fog", std::process::id()));
        let mut builder = ArchiveBuilder::new();
        builder
            .add_shader(SHADER, "res/text.glsl", "void main() {}")
            .add_sound(40, "sfx/hit.wav", 8000, 1, 8, &[0; 16]);
        builder.write_to_file(&path).unwrap();

        let registry = AssetRegistry::read(&path).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), builder.build().unwrap());
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.fetch_shader(SHADER), Some("void main() {}"));
        assert_eq!(registry.fetch_sound(40).unwrap().frame_count, 16);

        drop(registry);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_find_by_path() {
        let registry = AssetRegistry::from_vec(sample_archive()).unwrap();
        assert_eq!(registry.find_by_path("res/font.fnt").map(|h| h.asset_id), Some(FONT));
        assert!(registry.find_by_path("res/font").is_none());
    }

    #[test]
    fn test_open_and_read_from_disk() {
        let path = std::env::temp_dir().join(format!("fog-registry-{}.fog", std::process::id()));
        std::fs::write(&path, sample_archive()).unwrap();

        let mapped = AssetRegistry::load(&AssetsConfig::new(&path)).unwrap();
        let heap = AssetRegistry::load(&AssetsConfig::new(&path).with_memory_map(false)).unwrap();
        assert_eq!(mapped.headers().collect::<Vec<_>>(), heap.headers().collect::<Vec<_>>());
        assert_eq!(mapped.fetch_font(FONT).unwrap().height(), 16.0);

        drop((mapped, heap));
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_registry_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AssetRegistry>();

        let registry = AssetRegistry::from_vec(sample_archive()).unwrap();
        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    assert_eq!(registry.fetch_font(FONT).unwrap().find_kerning(b'A', b'B'), -2.0);
                });
            }
        });
    }
}
