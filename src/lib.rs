//! **romkit** - a game-console ROM loading library for disassembly front ends.
//!
//! Given an in-memory ROM image, romkit identifies the format, validates the
//! header, and produces what a static-analysis tool needs to begin
//! disassembly: the instruction-set variant(s), the entry point(s), and a
//! complete, non-overlapping memory map of loadable segments. It performs no
//! disassembly itself.
//!
//! # Supported formats
//! | Module | Format |
//! |--------|--------|
//! | [`formats::gba`] | GBA - Game Boy Advance cartridge image |
//! | [`formats::nds`] | NDS - Nintendo DS cartridge image |
//!
//! # Usage
//! The whole surface is two functions: [`probe`] for a cheap format sniff and
//! [`load`] for the full parse + validate + build pipeline.
//!
//! ```no_run
//! let image = std::fs::read("game.nds")?;
//! if romkit::probe(&image) {
//!     let result = romkit::load(&image)?;
//!     for entry in &result.entries {
//!         println!("{entry}");
//!     }
//!     for segment in &result.segments {
//!         println!("{segment}");
//!     }
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Loading is synchronous and stateless: one call transforms one immutable
//! buffer into one [`LoadResult`] or an error, so independent loads may run
//! in parallel with no coordination.

pub mod arch;
mod cursor;
pub mod error;
pub mod formats;
pub mod registry;
pub mod segment;

pub use arch::{Arch, EntryPoint};
pub use error::{Error, Result};
pub use registry::{FormatKind, LoadResult, RomHeader, load, probe};
pub use segment::{Perm, Segment};
