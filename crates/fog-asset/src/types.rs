//! Asset identifiers and type tags.

use std::fmt;

/// Unique identifier assigned to every asset when the archive is packed.
pub type AssetId = u64;

/// Id that never maps to an asset.
///
/// The packer reserves the narrow value `0xFFFF`, so this is not `u64::MAX`.
pub const NO_ASSET: AssetId = 0xFFFF;

/// Kind of payload stored for an asset.
///
/// The discriminants are the on-disk type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u32)]
pub enum AssetType {
    None = 0,
    Texture = 1,
    Font = 2,
    Atlas = 3,
    Sound = 4,
    Shader = 5,
    Config = 6,
    Level = 7,
}

impl AssetType {
    /// Every type, in tag order.
    pub const ALL: [AssetType; 8] = [
        AssetType::None,
        AssetType::Texture,
        AssetType::Font,
        AssetType::Atlas,
        AssetType::Sound,
        AssetType::Shader,
        AssetType::Config,
        AssetType::Level,
    ];

    /// Decode an on-disk type tag.
    pub fn from_tag(tag: u32) -> Option<Self> {
        Self::ALL.get(tag as usize).copied()
    }

    /// The on-disk type tag.
    #[inline]
    pub fn tag(self) -> u32 {
        self as u32
    }

    /// Lowercase name, as printed by tooling.
    pub fn as_str(self) -> &'static str {
        match self {
            AssetType::None => "none",
            AssetType::Texture => "texture",
            AssetType::Font => "font",
            AssetType::Atlas => "atlas",
            AssetType::Sound => "sound",
            AssetType::Shader => "shader",
            AssetType::Config => "config",
            AssetType::Level => "level",
        }
    }

    /// Whether payloads of this type decode as an [`Image`](crate::Image).
    #[inline]
    pub fn is_image(self) -> bool {
        matches!(self, AssetType::Texture | AssetType::Atlas)
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}
