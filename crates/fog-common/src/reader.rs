//! Binary reader for zero-copy parsing of byte slices.
//!
//! This module provides [`BinaryReader`], a cursor-like type that splits a
//! byte slice into sections and packed records without copying.

use zerocopy::{FromBytes, Immutable, KnownLayout};

use crate::{Error, Result};

/// A binary reader that provides zero-copy reading from a byte slice.
///
/// Every slice it hands out borrows the original buffer, so records read with
/// [`BinaryReader::read_slice`] live exactly as long as the bytes they view.
///
/// # Example
///
/// ```
/// use fog_common::BinaryReader;
///
/// let data = [0x01, 0x00, 0x00, 0x00, b'f', b'o', b'g'];
/// let mut reader = BinaryReader::new(&data);
///
/// assert_eq!(reader.read_struct::<u32>().unwrap(), 1);
/// assert_eq!(reader.read_bytes(3).unwrap(), b"fog");
/// assert!(reader.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct BinaryReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> BinaryReader<'a> {
    /// Create a new reader from a byte slice.
    #[inline]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Get the number of bytes remaining to read.
    #[inline]
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Check if there are no more bytes to read.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.position >= self.data.len()
    }

    /// Peek at bytes without advancing the position.
    #[inline]
    pub fn peek_bytes(&self, count: usize) -> Result<&'a [u8]> {
        if self.remaining() < count {
            return Err(Error::UnexpectedEof {
                needed: count,
                available: self.remaining(),
            });
        }
        Ok(&self.data[self.position..self.position + count])
    }

    /// Read bytes and advance the position.
    #[inline]
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        let bytes = self.peek_bytes(count)?;
        self.position += count;
        Ok(bytes)
    }

    /// Read a struct using zerocopy.
    ///
    /// The struct must implement `FromBytes` from the zerocopy crate.
    #[inline]
    pub fn read_struct<T: FromBytes>(&mut self) -> Result<T> {
        let size = std::mem::size_of::<T>();
        let bytes = self.read_bytes(size)?;
        T::read_from_bytes(bytes).map_err(|_| Error::UnexpectedEof {
            needed: size,
            available: bytes.len(),
        })
    }

    /// Borrow `count` consecutive records without copying them.
    ///
    /// `T` is expected to be a `#[repr(C, packed)]` record so the cast never
    /// fails on alignment.
    pub fn read_slice<T>(&mut self, count: usize) -> Result<&'a [T]>
    where
        T: FromBytes + Immutable + KnownLayout,
    {
        let size = count
            .checked_mul(std::mem::size_of::<T>())
            .ok_or(Error::LengthOverflow(count as u64))?;
        let bytes = self.read_bytes(size)?;
        <[T]>::ref_from_bytes(bytes).map_err(|_| Error::UnexpectedEof {
            needed: size,
            available: bytes.len(),
        })
    }
}

/// Convert an on-disk 64-bit length into a `usize`.
#[inline]
pub fn usize_from(value: u64) -> Result<usize> {
    usize::try_from(value).map_err(|_| Error::LengthOverflow(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use zerocopy::IntoBytes;

    #[derive(Debug, Clone, Copy, PartialEq, FromBytes, IntoBytes, Immutable, KnownLayout)]
    #[repr(C, packed)]
    struct Pair {
        key: u16,
        value: u32,
    }

    #[test]
    fn test_read_slice_borrows_records() {
        let records = [Pair { key: 1, value: 10 }, Pair { key: 2, value: 20 }];
        let mut data = records.as_bytes().to_vec();
        data.push(0xAA);

        let mut reader = BinaryReader::new(&data);
        let slice = reader.read_slice::<Pair>(2).unwrap();

        assert_eq!(slice, &records[..]);
        assert_eq!(reader.remaining(), 1);
        assert_eq!(reader.read_bytes(1).unwrap(), &[0xAA]);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_read_empty_slice() {
        let mut reader = BinaryReader::new(&[]);
        assert!(reader.read_slice::<Pair>(0).unwrap().is_empty());
    }

    #[test]
    fn test_eof_error() {
        let data = [0x01, 0x02];
        let mut reader = BinaryReader::new(&data);

        assert!(reader.read_struct::<u32>().is_err());
        assert!(reader.read_slice::<Pair>(1).is_err());
        assert_eq!(reader.remaining(), 2);
        assert_eq!(reader.peek_bytes(2).unwrap(), &[0x01, 0x02]);
    }

    #[test]
    fn test_usize_from() {
        assert_eq!(usize_from(42).unwrap(), 42);
    }
}
