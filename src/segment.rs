//! Loadable memory segments and the overlap invariant.
//!
//! A [`Segment`] describes one contiguous region of the target address space:
//! where it loads, how large it is in memory, its permissions, and which byte
//! range of the ROM image (if any) backs it. Memory beyond the backing range
//! is zero-filled (bss); a segment with no backing range is bss-only.
//!
//! Within one load result segments must never overlap. [`check_overlaps`]
//! enforces this after the full list is built: sort by load address, then a
//! single adjacent-pair scan over half-open `[addr, addr + size)` intervals.

use std::fmt;
use std::ops::Range;

use bitflags::bitflags;

use crate::{Error, Result};

bitflags! {
    /// Memory permissions of a segment.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Perm: u8 {
        /// Readable.
        const R = 1 << 0;
        /// Writable.
        const W = 1 << 1;
        /// Executable.
        const X = 1 << 2;
    }
}

impl fmt::Display for Perm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut put = |flag, c| f.write_str(if self.contains(flag) { c } else { "-" });
        put(Perm::R, "r")?;
        put(Perm::W, "w")?;
        put(Perm::X, "x")
    }
}

/// One loadable region of the target memory map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Load address in the target address space.
    pub addr: u32,
    /// In-memory size in bytes, including any zero-filled bss tail.
    pub size: u32,
    /// Permission set.
    pub perm: Perm,
    /// Backing byte range within the ROM image, or `None` for bss-only
    /// regions. May be shorter than `size`; the remainder is zero-filled.
    pub source: Option<Range<usize>>,
    /// Short human-readable label ("rom", "arm9", "overlay9 3", ...).
    pub label: String,
}

impl Segment {
    /// Build a segment, enforcing the per-segment invariants: `size` is
    /// nonzero and `addr + size` stays within the 32-bit address space.
    pub(crate) fn new(
        addr: u32,
        size: u32,
        perm: Perm,
        source: Option<Range<usize>>,
        label: String,
    ) -> Result<Self> {
        if size == 0 {
            return Err(Error::Parse("segment size is zero"));
        }
        if u64::from(addr) + u64::from(size) > 1 << 32 {
            return Err(Error::OutOfBounds);
        }
        Ok(Self {
            addr,
            size,
            perm,
            source,
            label,
        })
    }

    /// Exclusive end address of the segment.
    pub fn end(&self) -> u64 {
        u64::from(self.addr) + u64::from(self.size)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<12} {:#010x}..{:#010x} {}",
            self.label,
            self.addr,
            self.end(),
            self.perm
        )
    }
}

/// Sort `segments` by load address and reject any intersecting pair.
///
/// The comparison is over half-open intervals: two segments where one ends
/// exactly where the next begins do not overlap.
pub(crate) fn check_overlaps(segments: &mut [Segment]) -> Result<()> {
    segments.sort_by_key(|s| s.addr);
    for pair in segments.windows(2) {
        if pair[0].end() > u64::from(pair[1].addr) {
            return Err(Error::SegmentOverlap {
                first: pair[0].label.clone(),
                second: pair[1].label.clone(),
            });
        }
    }
    Ok(())
}
