//! Pointer rebuilding.
//!
//! A [`RawHeader`] stores its path as an offset into the string table and its
//! payload as an unchecked range. Rebuilding checks every range once and turns
//! the raw record into a [`ResolvedHeader`]; only resolved headers are ever
//! handed to lookups, so a lookup can't observe an unrebuilt path.

use crate::format::RawHeader;
use crate::parser::RawArchive;
use crate::{AssetId, AssetType, Error, Result, NO_ASSET};

/// A header whose path and payload ranges have been validated.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ResolvedHeader {
    pub asset_type: AssetType,
    pub asset_id: AssetId,
    pub timestamp: u64,
    /// Path range, relative to the string table. Always valid UTF-8.
    pub path_start: usize,
    pub path_len: usize,
    /// Payload range, relative to the data segment.
    pub data_start: usize,
    pub data_len: usize,
}

impl ResolvedHeader {
    /// Check a raw header against the sections it points into.
    pub fn resolve(index: usize, raw: &RawHeader, strings: &[u8], data_size: usize) -> Result<Self> {
        let tag = raw.asset_type;
        let asset_type = AssetType::from_tag(tag).ok_or(Error::InvalidAssetType { index, tag })?;

        let asset_id = raw.asset_id;
        if asset_id == NO_ASSET {
            return Err(Error::ReservedAssetId { index, id: asset_id });
        }

        let path_offset = raw.file_path;
        let path_length = raw.file_path_length;
        let path = checked_range(path_offset, path_length, strings.len()).ok_or(
            Error::PathOutOfBounds {
                index,
                offset: path_offset,
                length: path_length,
                size: strings.len(),
            },
        )?;
        std::str::from_utf8(&strings[path.clone()]).map_err(fog_common::Error::Utf8)?;

        let offset = raw.offset;
        let asset_size = raw.asset_size;
        let data = checked_range(offset, u64::from(asset_size), data_size).ok_or(
            Error::DataOutOfBounds {
                id: asset_id,
                offset,
                size: asset_size,
                data_size,
            },
        )?;

        Ok(Self {
            asset_type,
            asset_id,
            timestamp: raw.timestamp,
            path_start: path.start,
            path_len: path.len(),
            data_start: data.start,
            data_len: data.len(),
        })
    }

    /// Borrow this header against the string table it was resolved with.
    pub fn view<'a>(&self, strings: &'a [u8]) -> Header<'a> {
        let bytes = &strings[self.path_start..self.path_start + self.path_len];
        // SAFETY: the range was checked to be in bounds and valid UTF-8 in
        // `resolve`, and the string table is never mutated after load.
        let file_path = unsafe { std::str::from_utf8_unchecked(bytes) };

        Header {
            asset_type: self.asset_type,
            file_path,
            timestamp: self.timestamp,
            offset: self.data_start as u64,
            asset_size: self.data_len as u32,
            asset_id: self.asset_id,
        }
    }

    /// The payload bytes inside `data`.
    #[inline]
    pub fn payload<'a>(&self, data: &'a [u8]) -> &'a [u8] {
        &data[self.data_start..self.data_start + self.data_len]
    }
}

/// Resolved per-asset metadata.
///
/// `file_path` borrows the archive's string table and is exactly
/// `file_path_length` bytes long; it carries no terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Header<'a> {
    pub asset_type: AssetType,
    pub file_path: &'a str,
    pub timestamp: u64,
    /// Offset of the payload inside the data segment.
    pub offset: u64,
    pub asset_size: u32,
    pub asset_id: AssetId,
}

impl Header<'_> {
    /// Length of the path in bytes.
    #[inline]
    pub fn file_path_length(&self) -> usize {
        self.file_path.len()
    }
}

/// Resolve every header of a parsed archive.
///
/// This is the borrowed counterpart of what
/// [`AssetRegistry`](crate::AssetRegistry) does at load time, for callers that
/// keep the buffer themselves.
pub fn rebuild_pointers<'a>(archive: &RawArchive<'a>) -> Result<Vec<Header<'a>>> {
    resolve_all(archive).map(|resolved| {
        resolved
            .iter()
            .map(|header| header.view(archive.strings()))
            .collect()
    })
}

pub(crate) fn resolve_all(archive: &RawArchive<'_>) -> Result<Vec<ResolvedHeader>> {
    let strings = archive.strings();
    let data_size = archive.data().len();

    archive
        .raw_headers()
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            let resolved = ResolvedHeader::resolve(index, raw, strings, data_size)?;
            log::trace!(
                "resolved asset {:#x} ({}) at {}+{}",
                resolved.asset_id,
                resolved.asset_type,
                resolved.data_start,
                resolved.data_len
            );
            Ok(resolved)
        })
        .collect()
}

/// `offset..offset + len` if it fits inside `size`.
fn checked_range(offset: u64, len: u64, size: usize) -> Option<std::ops::Range<usize>> {
    let end = offset.checked_add(len)?;
    if end > size as u64 {
        return None;
    }
    Some(offset as usize..end as usize)
}
