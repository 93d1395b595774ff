//! Format registry and dispatch.
//!
//! The registry holds a fixed, ordered table of format probes; each probe is
//! a pure `(sniff, load)` function pair. [`load`] tries each probe's full
//! pipeline in table order and returns the first success; the order is part
//! of the contract (GBA before NDS) so detection stays deterministic even
//! against buffers that would satisfy more than one validator. There is no
//! hidden state: probing the same buffer twice yields identical results.

use std::fmt;

use crate::arch::EntryPoint;
use crate::formats::gba::{self, GbaHeader};
use crate::formats::nds::{self, NdsHeader};
use crate::segment::Segment;
use crate::{Error, Result};

/// Supported ROM families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatKind {
    /// Game Boy Advance cartridge image.
    Gba,
    /// Nintendo DS cartridge image.
    Nds,
}

impl FormatKind {
    /// Human-readable format name.
    pub fn name(&self) -> &'static str {
        match self {
            FormatKind::Gba => "gba",
            FormatKind::Nds => "nds",
        }
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parsed header record kept for diagnostic display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RomHeader {
    /// GBA header.
    Gba(GbaHeader),
    /// NDS header.
    Nds(NdsHeader),
}

/// Everything a disassembly front end needs to start walking an image.
///
/// Immutable once constructed; a failed load produces no partial result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadResult {
    /// Which format matched.
    pub kind: FormatKind,
    /// Parsed header record, for diagnostics.
    pub header: RomHeader,
    /// Entry points with their instruction-set variants; one for GBA, two
    /// (ARM9 then ARM7) for NDS.
    pub entries: Vec<EntryPoint>,
    /// Loadable segments, sorted by load address, pairwise disjoint.
    pub segments: Vec<Segment>,
}

/// One registered format: a cheap sniff and the full load pipeline.
struct Probe {
    name: &'static str,
    sniff: fn(&[u8]) -> bool,
    load: fn(&[u8]) -> Result<LoadResult>,
}

/// Probe order is fixed: GBA before NDS.
const PROBES: &[Probe] = &[
    Probe {
        name: "gba",
        sniff: gba::sniff,
        load: gba::load,
    },
    Probe {
        name: "nds",
        sniff: nds::sniff,
        load: nds::load,
    },
];

/// Cheap format sniff: does any registered probe recognize `buf`?
///
/// Only fixed bytes and header-local checks run here; no segment
/// construction. A `true` answer does not guarantee [`load`] will succeed.
pub fn probe(buf: &[u8]) -> bool {
    PROBES.iter().any(|p| (p.sniff)(buf))
}

/// Run the full parse + validate + build pipeline against each registered
/// format in order, returning the first success.
///
/// When every probe fails the error is [`Error::Unrecognized`] carrying each
/// probe's failure reason in probe order.
pub fn load(buf: &[u8]) -> Result<LoadResult> {
    let mut reasons = Vec::with_capacity(PROBES.len());
    for probe in PROBES {
        match (probe.load)(buf) {
            Ok(result) => return Ok(result),
            Err(err) => reasons.push((probe.name, err)),
        }
    }
    Err(Error::Unrecognized(reasons))
}
