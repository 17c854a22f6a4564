//! Archive section parser.
//!
//! Splits a byte buffer into its string table, header array and data segment
//! without copying anything. The headers are still raw at this point: their
//! paths are offsets and their ranges are unchecked. See [`crate::rebuild`].

use std::ops::Range;

use fog_common::{usize_from, BinaryReader};

use crate::format::{FileHeader, RawHeader};
use crate::{Error, Result};

/// Zero-copy view of an archive's sections.
#[derive(Debug, Clone, Copy)]
pub struct RawArchive<'a> {
    file_header: FileHeader,
    strings: &'a [u8],
    headers: &'a [RawHeader],
    data: &'a [u8],
}

impl<'a> RawArchive<'a> {
    /// Parse the section layout of an archive.
    ///
    /// The four declared sizes must add up to exactly `bytes.len()` and the
    /// header block must hold exactly `number_of_assets` records.
    pub fn parse(bytes: &'a [u8]) -> Result<Self> {
        let mut reader = BinaryReader::new(bytes);
        let file_header: FileHeader = reader.read_struct()?;

        let number_of_assets = file_header.number_of_assets;
        let size_of_headers = file_header.size_of_headers;
        let size_of_strings = file_header.size_of_strings;
        let size_of_data = file_header.size_of_data;

        let expected_headers = number_of_assets
            .checked_mul(RawHeader::SIZE as u64)
            .ok_or(Error::SectionOverflow)?;
        if expected_headers != size_of_headers {
            return Err(Error::HeaderCountMismatch {
                number_of_assets,
                size_of_headers,
                expected: expected_headers,
            });
        }

        let declared = [size_of_headers, size_of_strings, size_of_data]
            .into_iter()
            .try_fold(FileHeader::SIZE as u64, u64::checked_add)
            .ok_or(Error::SectionOverflow)?;
        if declared != bytes.len() as u64 {
            return Err(Error::SizeMismatch {
                declared,
                actual: bytes.len(),
            });
        }

        let strings = reader.read_bytes(usize_from(size_of_strings)?)?;
        let headers = reader.read_slice::<RawHeader>(usize_from(number_of_assets)?)?;
        let data = reader.read_bytes(usize_from(size_of_data)?)?;
        debug_assert!(reader.is_empty());

        Ok(Self {
            file_header,
            strings,
            headers,
            data,
        })
    }

    /// The file header.
    #[inline]
    pub fn file_header(&self) -> FileHeader {
        self.file_header
    }

    /// The string table.
    #[inline]
    pub fn strings(&self) -> &'a [u8] {
        self.strings
    }

    /// The raw header records, in archive order.
    #[inline]
    pub fn raw_headers(&self) -> &'a [RawHeader] {
        self.headers
    }

    /// The data segment.
    #[inline]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Byte range of the string table inside the parsed buffer.
    pub fn string_table_range(&self) -> Range<usize> {
        let start = FileHeader::SIZE;
        start..start + self.strings.len()
    }

    /// Byte range of the data segment inside the parsed buffer.
    pub fn data_range(&self) -> Range<usize> {
        let start = FileHeader::SIZE + self.strings.len() + std::mem::size_of_val(self.headers);
        start..start + self.data.len()
    }
}
