//! Parsers for game-console cartridge formats.
//!
//! Each submodule targets one ROM family. All parsers follow the same
//! conventions:
//!
//! * **Slices in, records out** - parsing reads fixed offsets from a borrowed
//!   `&[u8]` and builds a typed header record. The image is never copied
//!   wholesale; only small fixed-size presentation fields (titles, codes) are
//!   materialized.
//! * **Parsing never validates** - a parser accepts any structurally complete
//!   byte layout, including garbage, and only fails when the buffer is too
//!   short. Checksum and sanity verification live in each module's `validate`,
//!   so the dispatcher can cheaply distinguish "too short to be this format"
//!   from "right shape, wrong checksum".
//! * **Segments are checked, not trusted** - every `build_segments` output
//!   goes through the overlap scan in [`crate::segment`] before a load result
//!   is handed out.
//!
//! ## Format overview
//!
//! | Module  | Format | Description |
//! |---------|--------|-------------|
//! | [`gba`] | GBA    | Game Boy Advance cartridge; single ARMv4T binary mapped at a fixed base |
//! | [`nds`] | NDS    | Nintendo DS cartridge; independent ARM9 (ARMv5TE) and ARM7 (ARMv4T) binaries plus optional overlays |

pub mod gba;
pub mod nds;
