//! Typed payload views.

use zerocopy::FromBytes;

use crate::format::{ImageHeader, SoundHeader};
use crate::{AssetId, AssetType, Error, Font, Result};

/// Decoded payload of one asset.
///
/// Which variant is live is decided by the header's [`AssetType`]; every
/// variant borrows the registry's buffer.
#[derive(Debug, Clone, Copy)]
pub enum AssetData<'a> {
    /// Untyped payload.
    None(&'a [u8]),
    Texture(Image<'a>),
    Atlas(Image<'a>),
    Font(Font<'a>),
    Sound(Sound<'a>),
    /// Shader source text.
    Shader(&'a str),
    Config(&'a [u8]),
    Level(&'a [u8]),
}

impl<'a> AssetData<'a> {
    /// Decode a payload according to its type.
    pub fn decode(id: AssetId, asset_type: AssetType, bytes: &'a [u8]) -> Result<Self> {
        Ok(match asset_type {
            AssetType::None => AssetData::None(bytes),
            AssetType::Texture => AssetData::Texture(Image::parse(id, asset_type, bytes)?),
            AssetType::Atlas => AssetData::Atlas(Image::parse(id, asset_type, bytes)?),
            AssetType::Font => AssetData::Font(Font::parse(id, bytes)?),
            AssetType::Sound => AssetData::Sound(Sound::parse(id, bytes)?),
            AssetType::Shader => AssetData::Shader(
                std::str::from_utf8(bytes)
                    .map_err(|e| invalid(id, asset_type, format!("shader source: {e}")))?,
            ),
            AssetType::Config => AssetData::Config(bytes),
            AssetType::Level => AssetData::Level(bytes),
        })
    }

    /// The type this payload was decoded as.
    pub fn asset_type(&self) -> AssetType {
        match self {
            AssetData::None(_) => AssetType::None,
            AssetData::Texture(_) => AssetType::Texture,
            AssetData::Atlas(_) => AssetType::Atlas,
            AssetData::Font(_) => AssetType::Font,
            AssetData::Sound(_) => AssetType::Sound,
            AssetData::Shader(_) => AssetType::Shader,
            AssetData::Config(_) => AssetType::Config,
            AssetData::Level(_) => AssetType::Level,
        }
    }
}

/// Uncompressed pixel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Image<'a> {
    pub width: u32,
    pub height: u32,
    /// Bytes per pixel.
    pub components: u32,
    /// Row-major pixels, `width * height * components` bytes.
    pub pixels: &'a [u8],
}

impl<'a> Image<'a> {
    pub(crate) fn parse(id: AssetId, asset_type: AssetType, bytes: &'a [u8]) -> Result<Self> {
        let (header, pixels) = ImageHeader::read_from_prefix(bytes)
            .map_err(|_| invalid(id, asset_type, "truncated image header"))?;

        let expected = u64::from(header.width)
            .checked_mul(u64::from(header.height))
            .and_then(|n| n.checked_mul(u64::from(header.components)));
        if expected != Some(pixels.len() as u64) {
            return Err(invalid(
                id,
                asset_type,
                format!(
                    "{}x{}x{} image holds {} pixel bytes",
                    { header.width },
                    { header.height },
                    { header.components },
                    pixels.len()
                ),
            ));
        }

        Ok(Self {
            width: header.width,
            height: header.height,
            components: header.components,
            pixels,
        })
    }

    /// Bytes in one row of pixels.
    #[inline]
    pub fn stride(&self) -> usize {
        self.width as usize * self.components as usize
    }
}

/// Interleaved PCM samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sound<'a> {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
    pub frame_count: u64,
    pub samples: &'a [u8],
}

impl<'a> Sound<'a> {
    pub(crate) fn parse(id: AssetId, bytes: &'a [u8]) -> Result<Self> {
        let (header, samples) = SoundHeader::read_from_prefix(bytes)
            .map_err(|_| invalid(id, AssetType::Sound, "truncated sound header"))?;

        let bits = header.bits_per_sample;
        let channels = header.channels;
        if bits == 0 || bits % 8 != 0 || channels == 0 {
            return Err(invalid(
                id,
                AssetType::Sound,
                format!("unsupported format: {channels} channels, {bits} bits"),
            ));
        }

        let expected = header
            .frame_count
            .checked_mul(u64::from(channels) * u64::from(bits / 8));
        if expected != Some(samples.len() as u64) {
            return Err(invalid(
                id,
                AssetType::Sound,
                format!("{} frames do not match {} sample bytes", { header.frame_count }, samples.len()),
            ));
        }

        Ok(Self {
            sample_rate: header.sample_rate,
            channels,
            bits_per_sample: bits,
            frame_count: header.frame_count,
            samples,
        })
    }

    /// Playback length in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frame_count as f64 / f64::from(self.sample_rate)
    }
}

fn invalid(id: AssetId, asset_type: AssetType, reason: impl Into<String>) -> Error {
    Error::InvalidPayload {
        id,
        asset_type,
        reason: reason.into(),
    }
}
