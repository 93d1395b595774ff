//! NDS (Nintendo DS) cartridge images.
//!
//! A DS cartridge carries two independently relocatable binaries in one
//! image: the ARM9 (ARMv5TE) main program and the ARM7 (ARMv4T) coprocessor
//! program, each described by a {rom-offset, entry, load-address, size}
//! quadruple in the header. Games may additionally ship overlays - code/data
//! blocks loaded on demand - described by per-CPU overlay tables whose file
//! ranges are resolved through the file allocation table (FAT).
//!
//! ## Header layout (leading fields of the 0x4000-byte header area)
//! ```text
//! [0x000] Game title (ASCII, null padded)      (12 bytes)
//! [0x00C] Game code                            (4 bytes)
//! [0x010] Maker code                           (2 bytes)
//! [0x012] Unit code                            (1 byte)
//! [0x020] ARM9 rom offset                      (u32 LE)
//! [0x024] ARM9 entry address                   (u32 LE)
//! [0x028] ARM9 load address                    (u32 LE)
//! [0x02C] ARM9 size                            (u32 LE)
//! [0x030] ARM7 rom offset                      (u32 LE)
//! [0x034] ARM7 entry address                   (u32 LE)
//! [0x038] ARM7 load address                    (u32 LE)
//! [0x03C] ARM7 size                            (u32 LE)
//! [0x048] FAT offset                           (u32 LE)
//! [0x04C] FAT size                             (u32 LE)
//! [0x050] ARM9 overlay table offset            (u32 LE)
//! [0x054] ARM9 overlay table size              (u32 LE)
//! [0x058] ARM7 overlay table offset            (u32 LE)
//! [0x05C] ARM7 overlay table size              (u32 LE)
//! [0x068] Icon/title offset                    (u32 LE)
//! [0x06C] Secure area checksum (CRC-16)        (u16 LE)
//! [0x06E] Secure area delay                    (u16 LE)
//! [0x15C] Logo checksum (CRC-16 of 0xC0..0x15C)(u16 LE)
//! [0x15E] Header checksum (CRC-16 of 0..0x15E) (u16 LE)
//! [0x160] Debug rom offset (0 on retail carts) (u16 LE)
//! ```
//!
//! ## Overlay table entry (0x20 bytes)
//! ```text
//! [0x00] Overlay id                            (u32 LE)
//! [0x04] RAM address                           (u32 LE)
//! [0x08] RAM size                              (u32 LE)
//! [0x0C] BSS size                              (u32 LE)
//! [0x10] Static initializer start address      (u32 LE)
//! [0x14] Static initializer end address        (u32 LE)
//! [0x18] File id (index into the FAT)          (u32 LE)
//! [0x1C] Reserved                              (u32 LE)
//! ```
//! FAT entries are {start, end} `u32` pairs of absolute image offsets, `end`
//! exclusive.
//!
//! ## Validation
//! * CRC-16 (poly 0xA001, init 0xFFFF) over the leading 0x15E bytes must
//!   match the stored header checksum.
//! * The ARM9 and ARM7 {rom-offset, size} pairs must lie within the image.
//! * A logo region whose CRC disagrees with the stored value is tolerated
//!   with a warning (homebrew images rarely bother with it).

use crate::arch::{Arch, EntryPoint};
use crate::cursor::{RomCursor, padded_string};
use crate::registry::{FormatKind, LoadResult, RomHeader};
use crate::segment::{self, Perm, Segment};
use crate::{Error, Result};

/// Minimum image size: the DS header area occupies the first 0x4000 bytes.
pub const MIN_SIZE: usize = 0x4000;

/// Byte span covered by the header checksum.
const HEADER_CHECKSUM_SPAN: std::ops::Range<usize> = 0x00..0x15E;

/// Byte span covered by the logo checksum.
const LOGO_SPAN: std::ops::Range<usize> = 0xC0..0x15C;

/// Size of one overlay table entry.
const OVERLAY_ENTRY_SIZE: u32 = 0x20;

/// Size of one FAT entry ({start, end} pair).
const FAT_ENTRY_SIZE: u32 = 8;

/// Load parameters of one of the two CPU binaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NdsBinary {
    /// Offset of the binary within the image.
    pub rom_offset: u32,
    /// Address execution starts at.
    pub entry: u32,
    /// Address the binary is loaded to.
    pub load_addr: u32,
    /// Size of the binary in bytes.
    pub size: u32,
}

/// Offset/size pair locating a table within the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RomRegion {
    /// Absolute image offset.
    pub offset: u32,
    /// Size in bytes; zero means the table is absent.
    pub size: u32,
}

impl RomRegion {
    /// Whether the region describes anything at all.
    pub fn is_present(&self) -> bool {
        self.size != 0
    }
}

/// Parsed DS cartridge header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NdsHeader {
    /// Game title decoded for presentation.
    pub title: String,
    /// Four-character game code.
    pub game_code: String,
    /// Two-character maker code.
    pub maker_code: String,
    /// Unit code (0 = NDS).
    pub unit_code: u8,
    /// ARM9 (main CPU) load parameters.
    pub arm9: NdsBinary,
    /// ARM7 (coprocessor) load parameters.
    pub arm7: NdsBinary,
    /// File allocation table location.
    pub fat: RomRegion,
    /// ARM9 overlay table location.
    pub arm9_overlays: RomRegion,
    /// ARM7 overlay table location.
    pub arm7_overlays: RomRegion,
    /// Icon/title block offset.
    pub icon_offset: u32,
    /// Stored secure-area CRC-16.
    pub secure_area_crc: u16,
    /// Secure-area load delay.
    pub secure_area_delay: u16,
    /// Stored logo CRC-16.
    pub logo_crc: u16,
    /// Stored header CRC-16.
    pub header_crc: u16,
    /// Debug rom offset word; 0 on retail images. Diagnostic only - the
    /// header checksum always covers the fixed leading span.
    pub debug_rom_offset: u16,
}

/// One overlay table entry with its FAT-resolved file range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overlay {
    /// Overlay id.
    pub id: u32,
    /// RAM address the overlay is loaded to.
    pub ram_addr: u32,
    /// Loaded size in RAM.
    pub ram_size: u32,
    /// Zero-initialized region following the loaded data.
    pub bss_size: u32,
    /// FAT index of the backing file.
    pub file_id: u32,
    /// Absolute image offset of the backing file.
    pub file_offset: u32,
    /// Backing file size in bytes.
    pub file_size: u32,
}

/// CRC-16 as the DS BIOS computes it: polynomial 0xA001, initial 0xFFFF.
pub(crate) fn crc16(data: &[u8]) -> u16 {
    let mut crc = 0xFFFFu16;
    for &byte in data {
        crc ^= u16::from(byte);
        for _ in 0..8 {
            crc = if crc & 1 != 0 {
                (crc >> 1) ^ 0xA001
            } else {
                crc >> 1
            };
        }
    }
    crc
}

fn read_binary(cur: &RomCursor<'_>, offset: usize) -> Result<NdsBinary> {
    Ok(NdsBinary {
        rom_offset: cur.read_u32_le(offset)?,
        entry: cur.read_u32_le(offset + 4)?,
        load_addr: cur.read_u32_le(offset + 8)?,
        size: cur.read_u32_le(offset + 12)?,
    })
}

fn read_region(cur: &RomCursor<'_>, offset: usize) -> Result<RomRegion> {
    Ok(RomRegion {
        offset: cur.read_u32_le(offset)?,
        size: cur.read_u32_le(offset + 4)?,
    })
}

/// Parse the fixed-offset header fields from `buf`.
///
/// Fails with [`Error::Truncated`] when the buffer cannot hold the 0x4000-byte
/// header area; no checksum or bounds verification happens here.
pub fn parse(buf: &[u8]) -> Result<NdsHeader> {
    if buf.len() < MIN_SIZE {
        return Err(Error::Truncated {
            needed: MIN_SIZE,
            actual: buf.len(),
        });
    }
    let cur = RomCursor::new(buf);

    Ok(NdsHeader {
        title: padded_string(cur.read_bytes(0x00, 12)?),
        game_code: padded_string(cur.read_bytes(0x0C, 4)?),
        maker_code: padded_string(cur.read_bytes(0x10, 2)?),
        unit_code: cur.read_u8(0x12)?,
        arm9: read_binary(&cur, 0x20)?,
        arm7: read_binary(&cur, 0x30)?,
        fat: read_region(&cur, 0x48)?,
        arm9_overlays: read_region(&cur, 0x50)?,
        arm7_overlays: read_region(&cur, 0x58)?,
        icon_offset: cur.read_u32_le(0x68)?,
        secure_area_crc: cur.read_u16_le(0x6C)?,
        secure_area_delay: cur.read_u16_le(0x6E)?,
        logo_crc: cur.read_u16_le(0x15C)?,
        header_crc: cur.read_u16_le(0x15E)?,
        debug_rom_offset: cur.read_u16_le(0x160)?,
    })
}

fn check_binary_bounds(bin: &NdsBinary, rom_len: usize) -> Result<()> {
    let end = u64::from(bin.rom_offset) + u64::from(bin.size);
    if end > rom_len as u64 {
        return Err(Error::SegmentOutOfBounds {
            offset: bin.rom_offset,
            size: bin.size,
            rom_len,
        });
    }
    Ok(())
}

/// Verify the header checksum and the structural sanity of a parsed header.
///
/// The header CRC is authoritative; a mismatching logo CRC only produces a
/// warning.
pub fn validate(buf: &[u8], header: &NdsHeader) -> Result<()> {
    if buf.len() < MIN_SIZE {
        return Err(Error::Truncated {
            needed: MIN_SIZE,
            actual: buf.len(),
        });
    }

    let computed = crc16(&buf[HEADER_CHECKSUM_SPAN]);
    if header.header_crc != computed {
        return Err(Error::ChecksumMismatch {
            stored: u32::from(header.header_crc),
            computed: u32::from(computed),
        });
    }

    let logo_computed = crc16(&buf[LOGO_SPAN]);
    if header.logo_crc != logo_computed {
        log::warn!(
            "NDS logo checksum mismatch: stored {:#06x}, computed {logo_computed:#06x} \
             (homebrew image?); continuing since the header checksum passes",
            header.logo_crc
        );
    }

    if header.arm9.size == 0 {
        return Err(Error::Parse("arm9 size is zero"));
    }
    if header.arm7.size == 0 {
        return Err(Error::Parse("arm7 size is zero"));
    }
    check_binary_bounds(&header.arm9, buf.len())?;
    check_binary_bounds(&header.arm7, buf.len())?;
    Ok(())
}

/// Cheap format sniff: header area present and header CRC self-consistent.
///
/// The DS header has no magic constant, so the sniff recomputes the CRC over
/// the typical span - still a few hundred bytes, no full validation.
pub(crate) fn sniff(buf: &[u8]) -> bool {
    if buf.len() < MIN_SIZE {
        return false;
    }
    let stored = u16::from_le_bytes([buf[0x15E], buf[0x15F]]);
    crc16(&buf[HEADER_CHECKSUM_SPAN]) == stored
}

/// Resolve one overlay table into [`Overlay`] records via the FAT.
fn parse_overlay_table(
    cur: &RomCursor<'_>,
    table: RomRegion,
    fat: RomRegion,
) -> Result<Vec<Overlay>> {
    if table.size % OVERLAY_ENTRY_SIZE != 0 {
        return Err(Error::Parse("overlay table size not a multiple of 0x20"));
    }
    let count = table.size / OVERLAY_ENTRY_SIZE;
    let mut overlays = Vec::with_capacity(count as usize);

    for i in 0..count {
        let at = table.offset as usize + (i * OVERLAY_ENTRY_SIZE) as usize;
        let id = cur.read_u32_le(at)?;
        let ram_addr = cur.read_u32_le(at + 0x04)?;
        let ram_size = cur.read_u32_le(at + 0x08)?;
        let bss_size = cur.read_u32_le(at + 0x0C)?;
        // Static initializer range at +0x10/+0x14 is irrelevant for mapping.
        let file_id = cur.read_u32_le(at + 0x18)?;

        if u64::from(file_id) * u64::from(FAT_ENTRY_SIZE) + u64::from(FAT_ENTRY_SIZE)
            > u64::from(fat.size)
        {
            return Err(Error::Parse("overlay file id outside the FAT"));
        }
        let fat_at = fat.offset as usize + (file_id as u64 * u64::from(FAT_ENTRY_SIZE)) as usize;
        let start = cur.read_u32_le(fat_at)?;
        let end = cur.read_u32_le(fat_at + 4)?;
        if end < start {
            return Err(Error::Parse("overlay file range inverted"));
        }
        if end as usize > cur.len() {
            return Err(Error::SegmentOutOfBounds {
                offset: start,
                size: end - start,
                rom_len: cur.len(),
            });
        }

        overlays.push(Overlay {
            id,
            ram_addr,
            ram_size,
            bss_size,
            file_id,
            file_offset: start,
            file_size: end - start,
        });
    }
    Ok(overlays)
}

fn overlay_segment(overlay: &Overlay, cpu: &str) -> Result<Segment> {
    // BSS beyond the file data is a zero-filled extension of the same
    // segment, not a separate one.
    let size = overlay
        .file_size
        .checked_add(overlay.bss_size)
        .ok_or(Error::OutOfBounds)?;
    let source = (overlay.file_size != 0)
        .then(|| overlay.file_offset as usize..(overlay.file_offset + overlay.file_size) as usize);
    Segment::new(
        overlay.ram_addr,
        size,
        Perm::R | Perm::W | Perm::X,
        source,
        format!("{cpu} {}", overlay.id),
    )
}

/// Derive the memory map from a validated header: one segment per CPU binary
/// plus one per overlay entry, then reject any overlapping pair.
pub fn build_segments(buf: &[u8], header: &NdsHeader) -> Result<Vec<Segment>> {
    let cur = RomCursor::new(buf);
    let mut segments = Vec::new();

    for (bin, label) in [(&header.arm9, "arm9"), (&header.arm7, "arm7")] {
        let start = bin.rom_offset as usize;
        segments.push(Segment::new(
            bin.load_addr,
            bin.size,
            Perm::R | Perm::W | Perm::X,
            Some(start..start + bin.size as usize),
            label.to_owned(),
        )?);
    }

    for (table, cpu) in [
        (header.arm9_overlays, "overlay9"),
        (header.arm7_overlays, "overlay7"),
    ] {
        if !table.is_present() {
            continue;
        }
        for overlay in parse_overlay_table(&cur, table, header.fat)? {
            if overlay.file_size == 0 && overlay.bss_size == 0 {
                continue;
            }
            segments.push(overlay_segment(&overlay, cpu)?);
        }
    }

    segment::check_overlaps(&mut segments)?;
    Ok(segments)
}

/// Full load pipeline for one NDS image.
///
/// Both CPUs always execute in a DS cartridge, so the result always reports
/// both architecture variants.
pub(crate) fn load(buf: &[u8]) -> Result<LoadResult> {
    let header = parse(buf)?;
    validate(buf, &header)?;

    let entries = vec![
        EntryPoint {
            arch: Arch::Armv5Te,
            addr: header.arm9.entry,
            label: "arm9",
        },
        EntryPoint {
            arch: Arch::Armv4T,
            addr: header.arm7.entry,
            label: "arm7",
        },
    ];

    let segments = build_segments(buf, &header)?;

    Ok(LoadResult {
        kind: FormatKind::Nds,
        header: RomHeader::Nds(header),
        entries,
        segments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARM9: NdsBinary = NdsBinary {
        rom_offset: 0x4000,
        entry: 0x0200_0000,
        load_addr: 0x0200_0000,
        size: 0x1000,
    };
    const ARM7: NdsBinary = NdsBinary {
        rom_offset: 0x5000,
        entry: 0x0380_0000,
        load_addr: 0x0380_0000,
        size: 0x1000,
    };

    fn put_u32(buf: &mut [u8], at: usize, val: u32) {
        buf[at..at + 4].copy_from_slice(&val.to_le_bytes());
    }

    fn put_u16(buf: &mut [u8], at: usize, val: u16) {
        buf[at..at + 2].copy_from_slice(&val.to_le_bytes());
    }

    fn put_binary(buf: &mut [u8], at: usize, bin: &NdsBinary) {
        put_u32(buf, at, bin.rom_offset);
        put_u32(buf, at + 4, bin.entry);
        put_u32(buf, at + 8, bin.load_addr);
        put_u32(buf, at + 12, bin.size);
    }

    /// Recompute and store the logo and header checksums. Call last.
    fn finalize(buf: &mut [u8]) {
        let logo = crc16(&buf[0xC0..0x15C]);
        put_u16(buf, 0x15C, logo);
        let header = crc16(&buf[..0x15E]);
        put_u16(buf, 0x15E, header);
    }

    /// Helper: build a minimal valid NDS image with the given CPU binaries.
    fn build_nds(arm9: &NdsBinary, arm7: &NdsBinary) -> Vec<u8> {
        let mut buf = vec![0u8; 0x6000];
        buf[0x00..0x0A].copy_from_slice(b"HELLOWORLD");
        buf[0x0C..0x10].copy_from_slice(b"AHDE");
        buf[0x10..0x12].copy_from_slice(b"01");
        put_binary(&mut buf, 0x20, arm9);
        put_binary(&mut buf, 0x30, arm7);
        finalize(&mut buf);
        buf
    }

    /// Helper: extend `build_nds` with one ARM9 overlay.
    ///
    /// Overlay table at 0x1000 (one entry), FAT at 0x2000 (one file), overlay
    /// data at 0x3000.
    fn build_nds_with_overlay(ram_addr: u32, file_len: u32, bss_size: u32) -> Vec<u8> {
        let mut buf = build_nds(&ARM9, &ARM7);
        put_u32(&mut buf, 0x50, 0x1000); // arm9 overlay table offset
        put_u32(&mut buf, 0x54, 0x20); // one entry
        put_u32(&mut buf, 0x48, 0x2000); // fat offset
        put_u32(&mut buf, 0x4C, 0x8); // one fat entry

        // Overlay entry 0.
        put_u32(&mut buf, 0x1000, 7); // id
        put_u32(&mut buf, 0x1004, ram_addr);
        put_u32(&mut buf, 0x1008, file_len); // ram_size
        put_u32(&mut buf, 0x100C, bss_size);
        put_u32(&mut buf, 0x1018, 0); // file id

        // FAT entry 0.
        put_u32(&mut buf, 0x2000, 0x3000);
        put_u32(&mut buf, 0x2004, 0x3000 + file_len);

        finalize(&mut buf);
        buf
    }

    #[test]
    fn parses_header_fields() {
        let data = build_nds(&ARM9, &ARM7);
        let header = parse(&data).unwrap();

        assert_eq!(header.title, "HELLOWORLD");
        assert_eq!(header.game_code, "AHDE");
        assert_eq!(header.maker_code, "01");
        assert_eq!(header.arm9, ARM9);
        assert_eq!(header.arm7, ARM7);
        assert!(!header.arm9_overlays.is_present());
        assert_eq!(header.debug_rom_offset, 0);
    }

    #[test]
    fn crc16_matches_reference_values() {
        // CRC-16/MODBUS (init 0xFFFF) of "123456789" has check value 0x4B37.
        assert_eq!(crc16(b"123456789"), 0x4B37);
        assert_eq!(crc16(b""), 0xFFFF);
    }

    #[test]
    fn validates_good_image() {
        let data = build_nds(&ARM9, &ARM7);
        let header = parse(&data).unwrap();
        validate(&data, &header).unwrap();
    }

    #[test]
    fn header_mutation_is_detected() {
        // Flip one bit inside the checksummed span without fixing the CRC.
        for offset in [0x00usize, 0x21, 0x3F, 0xC0, 0x15D] {
            let mut data = build_nds(&ARM9, &ARM7);
            data[offset] ^= 0x01;
            let header = parse(&data).unwrap();
            let err = validate(&data, &header).unwrap_err();
            assert!(
                matches!(err, Error::ChecksumMismatch { .. }),
                "mutation at {offset:#x} not detected"
            );
        }
    }

    #[test]
    fn truncated_buffer_is_rejected_at_parse() {
        for len in [0usize, 0x160, 0x1000, MIN_SIZE - 1] {
            let err = parse(&vec![0u8; len]).unwrap_err();
            assert_eq!(
                err,
                Error::Truncated {
                    needed: MIN_SIZE,
                    actual: len,
                }
            );
        }
    }

    #[test]
    fn debug_rom_offset_does_not_affect_the_checksum_span() {
        // Retail images leave 0x160 at zero; debug builds store an offset
        // there. Neither changes the span the header CRC covers, so both
        // variants must load and agree with the sniff.
        for debug_word in [0u16, 0x8000] {
            let mut data = build_nds(&ARM9, &ARM7);
            put_u16(&mut data, 0x160, debug_word);
            // 0x160 sits outside the checksummed span; no re-seal needed.
            assert!(sniff(&data));
            let result = load(&data).unwrap();
            assert_eq!(result.segments.len(), 2);
            let RomHeader::Nds(header) = &result.header else {
                panic!("expected NDS header");
            };
            assert_eq!(header.debug_rom_offset, debug_word);
        }
    }

    #[test]
    fn binary_past_the_image_is_rejected() {
        let oversized = NdsBinary {
            rom_offset: 0x5800,
            size: 0x1000, // ends at 0x6800, image is 0x6000
            ..ARM7
        };
        let data = build_nds(&ARM9, &oversized);
        let header = parse(&data).unwrap();
        assert_eq!(
            validate(&data, &header).unwrap_err(),
            Error::SegmentOutOfBounds {
                offset: 0x5800,
                size: 0x1000,
                rom_len: 0x6000,
            }
        );
    }

    #[test]
    fn zero_size_binary_is_rejected() {
        let empty = NdsBinary { size: 0, ..ARM9 };
        let data = build_nds(&empty, &ARM7);
        let header = parse(&data).unwrap();
        assert_eq!(
            validate(&data, &header).unwrap_err(),
            Error::Parse("arm9 size is zero")
        );
    }

    #[test]
    fn logo_mismatch_is_tolerated() {
        let mut data = build_nds(&ARM9, &ARM7);
        // Corrupt the stored logo CRC, then re-seal the header CRC only.
        put_u16(&mut data, 0x15C, 0xDEAD);
        let header_crc = crc16(&data[..0x15E]);
        put_u16(&mut data, 0x15E, header_crc);

        let header = parse(&data).unwrap();
        validate(&data, &header).unwrap();
    }

    #[test]
    fn loads_both_cpus() {
        let result = load(&build_nds(&ARM9, &ARM7)).unwrap();

        assert_eq!(result.kind, FormatKind::Nds);
        assert_eq!(result.entries.len(), 2);
        assert_eq!(result.entries[0].arch, Arch::Armv5Te);
        assert_eq!(result.entries[0].addr, 0x0200_0000);
        assert_eq!(result.entries[0].label, "arm9");
        assert_eq!(result.entries[1].arch, Arch::Armv4T);
        assert_eq!(result.entries[1].addr, 0x0380_0000);
        assert_eq!(result.entries[1].label, "arm7");

        assert_eq!(result.segments.len(), 2);
        let arm9 = &result.segments[0];
        assert_eq!(arm9.addr, 0x0200_0000);
        assert_eq!(arm9.size, 0x1000);
        assert_eq!(arm9.source, Some(0x4000..0x5000));
        let arm7 = &result.segments[1];
        assert_eq!(arm7.addr, 0x0380_0000);
        assert_eq!(arm7.source, Some(0x5000..0x6000));
    }

    #[test]
    fn overlapping_load_addresses_are_rejected() {
        // ARM7 loads into the middle of the ARM9 range.
        let clashing = NdsBinary {
            load_addr: 0x0200_0800,
            ..ARM7
        };
        let err = load(&build_nds(&ARM9, &clashing)).unwrap_err();
        assert_eq!(
            err,
            Error::SegmentOverlap {
                first: "arm9".to_owned(),
                second: "arm7".to_owned(),
            }
        );
    }

    #[test]
    fn adjacent_binaries_are_accepted() {
        // ARM7 starts exactly where ARM9 ends; half-open ranges do not clash.
        let adjacent = NdsBinary {
            load_addr: 0x0200_1000,
            ..ARM7
        };
        let result = load(&build_nds(&ARM9, &adjacent)).unwrap();
        assert_eq!(result.segments.len(), 2);
    }

    #[test]
    fn overlay_becomes_its_own_segment() {
        let data = build_nds_with_overlay(0x0210_0000, 0x400, 0x100);
        let result = load(&data).unwrap();

        assert_eq!(result.segments.len(), 3);
        let overlay = result
            .segments
            .iter()
            .find(|s| s.label == "overlay9 7")
            .unwrap();
        assert_eq!(overlay.addr, 0x0210_0000);
        // File data plus zero-filled bss tail, one segment.
        assert_eq!(overlay.size, 0x500);
        assert_eq!(overlay.source, Some(0x3000..0x3400));
    }

    #[test]
    fn overlay_clashing_with_arm9_is_rejected() {
        let data = build_nds_with_overlay(0x0200_0FFF, 0x400, 0);
        let err = load(&data).unwrap_err();
        assert!(matches!(err, Error::SegmentOverlap { .. }));
    }

    #[test]
    fn overlay_file_id_outside_fat_is_rejected() {
        let mut data = build_nds_with_overlay(0x0210_0000, 0x400, 0);
        put_u32(&mut data, 0x1018, 9); // file id with no FAT entry
        finalize(&mut data);
        let err = load(&data).unwrap_err();
        assert_eq!(err, Error::Parse("overlay file id outside the FAT"));
    }

    #[test]
    fn overlay_file_past_the_image_is_rejected() {
        let mut data = build_nds_with_overlay(0x0210_0000, 0x400, 0);
        put_u32(&mut data, 0x2004, 0x9000); // FAT end beyond the image
        finalize(&mut data);
        let err = load(&data).unwrap_err();
        assert!(matches!(err, Error::SegmentOutOfBounds { .. }));
    }

    #[test]
    fn disjoint_layouts_always_load_overlap_free() {
        // Deterministic pseudo-random layouts constrained to disjoint
        // regions: every accepted result must be pairwise disjoint.
        let mut state = 0x2468_ACE1u32;
        let mut rand = move || {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state
        };

        for _ in 0..32 {
            let arm9 = NdsBinary {
                load_addr: 0x0200_0000 + (rand() % 0x100) * 0x1000,
                ..ARM9
            };
            let arm7 = NdsBinary {
                load_addr: 0x0380_0000 + (rand() % 0x100) * 0x1000,
                ..ARM7
            };
            let result = load(&build_nds(&arm9, &arm7)).unwrap();
            for pair in result.segments.windows(2) {
                assert!(pair[0].end() <= u64::from(pair[1].addr));
            }
        }
    }

    #[test]
    fn clashing_layouts_always_fail() {
        // Adversarial counterpart: force ARM7 inside the ARM9 range.
        let mut state = 0x1357_9BDFu32;
        let mut rand = move || {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state
        };

        for _ in 0..32 {
            let arm9 = NdsBinary {
                load_addr: 0x0200_0000,
                size: 0x1000,
                ..ARM9
            };
            let arm7 = NdsBinary {
                load_addr: 0x0200_0000 + rand() % 0x1000,
                ..ARM7
            };
            let err = load(&build_nds(&arm9, &arm7)).unwrap_err();
            assert!(matches!(err, Error::SegmentOverlap { .. }));
        }
    }
}
