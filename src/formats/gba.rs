//! GBA (Game Boy Advance) cartridge images.
//!
//! A GBA cartridge is a flat ROM mapped at a fixed bus address; the header
//! occupies the first 192 bytes and the rest of the image is program data.
//! The BIOS verifies the logo bitmap and the complement checksum before
//! jumping to the entry branch at offset 0.
//!
//! ## Header layout (192 bytes at offset 0)
//! ```text
//! [0x00] Entry branch instruction (ARM b/bl)   (u32 LE)
//! [0x04] Nintendo logo bitmap                  (156 bytes)
//! [0xA0] Game title (ASCII, space/null padded) (12 bytes)
//! [0xAC] Game code                             (4 bytes)
//! [0xB0] Maker code                            (2 bytes)
//! [0xB2] Fixed value (must equal 0x96)         (1 byte)
//! [0xB3] Unit code                             (1 byte)
//! [0xB4] Device type                           (1 byte)
//! [0xB5] Reserved                              (7 bytes)
//! [0xBC] Software version                      (1 byte)
//! [0xBD] Complement checksum                   (1 byte)
//! [0xBE] Reserved                              (2 bytes)
//! ```
//!
//! ## Validation
//! * The fixed value at 0xB2 must equal 0x96.
//! * The bytes in `[0xA0, 0xBC)` plus the stored checksum byte must sum to
//!   zero modulo 256.
//! * A logo bitmap that differs from the stock table is tolerated with a
//!   warning when the complement checksum passes - homebrew images routinely
//!   alter it.

use crate::arch::{Arch, EntryPoint};
use crate::cursor::{RomCursor, padded_string};
use crate::registry::{FormatKind, LoadResult, RomHeader};
use crate::segment::{self, Perm, Segment};
use crate::{Error, Result};

/// Fixed bus address GBA cartridge ROM is mapped at.
pub const ROM_BASE: u32 = 0x0800_0000;

/// Header size; also the minimum size of a plausible image.
pub const HEADER_SIZE: usize = 0xC0;

/// Required value of the fixed byte at offset 0xB2.
const FIXED_VALUE: u8 = 0x96;

/// Byte span covered by the complement checksum.
const CHECKSUM_SPAN: std::ops::Range<usize> = 0xA0..0xBC;

/// Stock Nintendo logo bitmap carried by licensed cartridges.
const NINTENDO_LOGO: [u8; 156] = [
    0x24, 0xFF, 0xAE, 0x51, 0x69, 0x9A, 0xA2, 0x21, 0x3D, 0x84, 0x82, 0x0A, 0x84, 0xE4, 0x09,
    0xAD, 0x11, 0x24, 0x8B, 0x98, 0xC0, 0x81, 0x7F, 0x21, 0xA3, 0x52, 0xBE, 0x19, 0x93, 0x09,
    0xCE, 0x20, 0x10, 0x46, 0x4A, 0x4A, 0xF8, 0x27, 0x31, 0xEC, 0x58, 0xC7, 0xE8, 0x33, 0x82,
    0xE3, 0xCE, 0xBF, 0x85, 0xF4, 0xDF, 0x94, 0xCE, 0x4B, 0x09, 0xC1, 0x94, 0x56, 0x8A, 0xC0,
    0x13, 0x72, 0xA7, 0xFC, 0x9F, 0x84, 0x4D, 0x73, 0xA3, 0xCA, 0x9A, 0x61, 0x58, 0x97, 0xA3,
    0x27, 0xFC, 0x03, 0x98, 0x76, 0x23, 0x1D, 0xC7, 0x61, 0x03, 0x04, 0xAE, 0x56, 0xBF, 0x38,
    0x84, 0x00, 0x40, 0xA7, 0x0E, 0xFD, 0xFF, 0x52, 0xFE, 0x03, 0x6F, 0x95, 0x30, 0xF1, 0x97,
    0xFB, 0xC0, 0x85, 0x60, 0xD6, 0x80, 0x25, 0xA9, 0x63, 0xBE, 0x03, 0x01, 0x4E, 0x38, 0xE2,
    0xF9, 0xA2, 0x34, 0xFF, 0xBB, 0x3E, 0x03, 0x44, 0x78, 0x00, 0x90, 0xCB, 0x88, 0x11, 0x3A,
    0x94, 0x65, 0xC0, 0x7C, 0x63, 0x87, 0xF0, 0x3C, 0xAF, 0xD6, 0x25, 0xE4, 0x8B, 0x38, 0x0A,
    0xAC, 0x72, 0x21, 0xD4, 0xF8, 0x07,
];

/// Parsed GBA cartridge header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GbaHeader {
    /// Raw entry branch word at offset 0.
    pub entry_word: u32,
    /// Logo bitmap as stored in the image.
    pub logo: [u8; 156],
    /// Game title decoded for presentation.
    pub title: String,
    /// Four-character game code.
    pub game_code: String,
    /// Two-character maker code.
    pub maker_code: String,
    /// Fixed value byte (0x96 on valid images).
    pub fixed_value: u8,
    /// Unit code.
    pub unit_code: u8,
    /// Device type.
    pub device_type: u8,
    /// Software version.
    pub version: u8,
    /// Stored complement checksum.
    pub checksum: u8,
}

impl GbaHeader {
    /// Entry point address, decoded from the branch word at offset 0.
    ///
    /// Cartridges start with an ARM `b`/`bl` to the real entry; its target is
    /// `ROM_BASE + 8 + signed24 * 4`. Images whose first word is not a branch
    /// fall back to the ROM base itself.
    pub fn entry_point(&self) -> u32 {
        if (self.entry_word >> 25) & 0b111 == 0b101 {
            // Sign-extend the 24-bit word offset; PC is 8 bytes ahead.
            let offset = ((self.entry_word << 8) as i32) >> 8;
            ROM_BASE
                .wrapping_add(8)
                .wrapping_add((offset as u32) << 2)
        } else {
            ROM_BASE
        }
    }
}

/// Parse the fixed-offset header fields from `buf`.
///
/// Fails with [`Error::Truncated`] when the buffer cannot hold the 192-byte
/// header; no checksum or constant verification happens here.
pub fn parse(buf: &[u8]) -> Result<GbaHeader> {
    if buf.len() < HEADER_SIZE {
        return Err(Error::Truncated {
            needed: HEADER_SIZE,
            actual: buf.len(),
        });
    }
    let cur = RomCursor::new(buf);

    Ok(GbaHeader {
        entry_word: cur.read_u32_le(0x00)?,
        logo: cur.read_array::<156>(0x04)?,
        title: padded_string(cur.read_bytes(0xA0, 12)?),
        game_code: padded_string(cur.read_bytes(0xAC, 4)?),
        maker_code: padded_string(cur.read_bytes(0xB0, 2)?),
        fixed_value: cur.read_u8(0xB2)?,
        unit_code: cur.read_u8(0xB3)?,
        device_type: cur.read_u8(0xB4)?,
        version: cur.read_u8(0xBC)?,
        checksum: cur.read_u8(0xBD)?,
    })
}

/// Complement checksum such that span + checksum sums to zero modulo 256.
pub(crate) fn complement_checksum(buf: &[u8]) -> u8 {
    buf[CHECKSUM_SPAN]
        .iter()
        .fold(0u8, |acc, &b| acc.wrapping_add(b))
        .wrapping_neg()
}

/// Verify the fixed byte and complement checksum of a parsed header.
///
/// A logo bitmap differing from the stock table only produces a warning; the
/// checksum byte is the authoritative integrity check.
pub fn validate(buf: &[u8], header: &GbaHeader) -> Result<()> {
    if buf.len() < HEADER_SIZE {
        return Err(Error::Truncated {
            needed: HEADER_SIZE,
            actual: buf.len(),
        });
    }
    // The complement checksum is checked first: a corrupted span must always
    // surface as ChecksumMismatch, even when the corrupted byte happens to be
    // the fixed value itself.
    let computed = complement_checksum(buf);
    if header.checksum != computed {
        return Err(Error::ChecksumMismatch {
            stored: u32::from(header.checksum),
            computed: u32::from(computed),
        });
    }

    if header.fixed_value != FIXED_VALUE {
        return Err(Error::BadMagic);
    }

    if header.logo != NINTENDO_LOGO {
        log::warn!(
            "GBA logo bitmap does not match the stock table (homebrew image?); \
             continuing since the complement checksum passes"
        );
    }
    Ok(())
}

/// Cheap format sniff: big enough for a header and carries the fixed byte.
pub(crate) fn sniff(buf: &[u8]) -> bool {
    buf.len() >= HEADER_SIZE && buf[0xB2] == FIXED_VALUE
}

/// Derive the memory map: one read+write+execute segment mapping the whole
/// image at the fixed cartridge base.
pub fn build_segments(buf: &[u8]) -> Result<Vec<Segment>> {
    let size = u32::try_from(buf.len()).map_err(|_| Error::OutOfBounds)?;
    let segment = Segment::new(
        ROM_BASE,
        size,
        Perm::R | Perm::W | Perm::X,
        Some(0..buf.len()),
        "rom".to_owned(),
    )?;
    Ok(vec![segment])
}

/// Full load pipeline for one GBA image.
pub(crate) fn load(buf: &[u8]) -> Result<LoadResult> {
    let header = parse(buf)?;
    validate(buf, &header)?;

    let entries = vec![EntryPoint {
        arch: Arch::Armv4T,
        addr: header.entry_point(),
        label: "rom",
    }];

    let mut segments = build_segments(buf)?;
    segment::check_overlaps(&mut segments)?;

    Ok(LoadResult {
        kind: FormatKind::Gba,
        header: RomHeader::Gba(header),
        entries,
        segments,
    })
}
