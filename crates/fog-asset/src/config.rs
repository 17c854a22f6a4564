//! Load configuration.

use std::path::PathBuf;

/// Environment variable naming the archive to load.
pub const ARCHIVE_ENV: &str = "FOG_ARCHIVE";

/// Where and how to load the asset archive.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AssetsConfig {
    /// Path of the packed archive.
    pub archive_path: PathBuf,
    /// Map the file read-only instead of reading it onto the heap.
    #[cfg_attr(feature = "serde", serde(default = "default_memory_map"))]
    pub memory_map: bool,
}

impl AssetsConfig {
    pub fn new(archive_path: impl Into<PathBuf>) -> Self {
        Self {
            archive_path: archive_path.into(),
            memory_map: true,
        }
    }

    pub fn with_memory_map(mut self, memory_map: bool) -> Self {
        self.memory_map = memory_map;
        self
    }

    /// Read the archive path from `FOG_ARCHIVE`, if set.
    pub fn from_env() -> Option<Self> {
        std::env::var_os(ARCHIVE_ENV).map(Self::new)
    }
}

#[cfg(feature = "serde")]
fn default_memory_map() -> bool {
    true
}
