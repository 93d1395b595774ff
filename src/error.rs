//! Library-wide error and result types.

use std::fmt;

/// Result alias used throughout romkit.
pub type Result<T> = std::result::Result<T, Error>;

/// All errors the library can produce.
///
/// Every error is local to a single load call; a failed load never yields a
/// partially constructed [`crate::LoadResult`]. Callers that need richer
/// context should wrap `Error` in their own type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The buffer is shorter than the minimum header size for the format
    /// being tried.
    Truncated {
        /// Minimum number of bytes the format requires.
        needed: usize,
        /// Bytes actually available.
        actual: usize,
    },
    /// A derived offset or length reaches past the buffer (or overflows).
    OutOfBounds,
    /// A magic or fixed-value field did not match the expected constant.
    BadMagic,
    /// A stored checksum disagrees with the recomputed value.
    ChecksumMismatch {
        /// Checksum stored in the header.
        stored: u32,
        /// Checksum recomputed over the documented span.
        computed: u32,
    },
    /// A declared rom-offset + size pair exceeds the buffer length.
    SegmentOutOfBounds {
        /// Declared offset into the ROM image.
        offset: u32,
        /// Declared byte count.
        size: u32,
        /// Actual image length.
        rom_len: usize,
    },
    /// Two constructed segments' address ranges intersect.
    SegmentOverlap {
        /// Label of the lower-addressed segment.
        first: String,
        /// Label of the higher-addressed segment.
        second: String,
    },
    /// A structural constraint was violated (message describes which one).
    Parse(&'static str),
    /// No format probe matched; carries the per-probe failure reasons in
    /// probe order.
    Unrecognized(Vec<(&'static str, Error)>),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Truncated { needed, actual } => {
                write!(f, "buffer truncated: need {needed} bytes, have {actual}")
            }
            Error::OutOfBounds => write!(f, "read outside the image bounds"),
            Error::BadMagic => write!(f, "bad magic or fixed value"),
            Error::ChecksumMismatch { stored, computed } => {
                write!(
                    f,
                    "checksum mismatch: stored {stored:#x}, computed {computed:#x}"
                )
            }
            Error::SegmentOutOfBounds {
                offset,
                size,
                rom_len,
            } => write!(
                f,
                "segment data out of bounds: offset {offset:#x} + size {size:#x} exceeds image length {rom_len:#x}"
            ),
            Error::SegmentOverlap { first, second } => {
                write!(f, "segments '{first}' and '{second}' overlap")
            }
            Error::Parse(s) => write!(f, "parse error: {s}"),
            Error::Unrecognized(reasons) => {
                write!(f, "unrecognized format")?;
                for (name, err) in reasons {
                    write!(f, "; {name}: {err}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for Error {}
