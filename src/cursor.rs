//! Bounds-checked random-access reads over an immutable ROM image.
//!
//! Every accessor either returns exactly the bytes it promises or fails with
//! [`Error::OutOfBounds`] - there is no partial-read ambiguity and no interior
//! state. Both supported cartridge formats are little-endian, so only LE
//! integer readers are provided.

use crate::{Error, Result};

/// Read-only view over a ROM image.
///
/// Purely a borrow; constructing one never copies the buffer.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RomCursor<'a> {
    buf: &'a [u8],
}

impl<'a> RomCursor<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    /// Total length of the underlying image.
    pub(crate) fn len(&self) -> usize {
        self.buf.len()
    }

    /// Borrow `len` bytes starting at `offset`.
    ///
    /// Fails if `offset + len` overflows or reaches past the buffer.
    pub(crate) fn read_bytes(&self, offset: usize, len: usize) -> Result<&'a [u8]> {
        let end = offset.checked_add(len).ok_or(Error::OutOfBounds)?;
        self.buf.get(offset..end).ok_or(Error::OutOfBounds)
    }

    /// Read one byte at `offset`.
    pub(crate) fn read_u8(&self, offset: usize) -> Result<u8> {
        self.buf.get(offset).copied().ok_or(Error::OutOfBounds)
    }

    /// Read a little-endian `u16` at `offset`.
    pub(crate) fn read_u16_le(&self, offset: usize) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array::<2>(offset)?))
    }

    /// Read a little-endian `u32` at `offset`.
    pub(crate) fn read_u32_le(&self, offset: usize) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array::<4>(offset)?))
    }

    /// Read exactly `N` bytes at `offset` into a fixed-size array.
    pub(crate) fn read_array<const N: usize>(&self, offset: usize) -> Result<[u8; N]> {
        let slice = self.read_bytes(offset, N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        Ok(out)
    }
}

/// Decode a fixed-size, space- or null-padded ASCII field for presentation.
///
/// Trailing padding is stripped; non-UTF-8 bytes are replaced.
pub(crate) fn padded_string(raw: &[u8]) -> String {
    let end = raw
        .iter()
        .rposition(|&b| b != 0 && b != b' ')
        .map_or(0, |p| p + 1);
    String::from_utf8_lossy(&raw[..end]).into_owned()
}
