//! Instruction-set variants and entry points reported to the host.
//!
//! Architecture selection is deterministic: it follows from which format
//! validator matched, never from instruction heuristics. A GBA image always
//! yields a single ARMv4T entry; an NDS image always yields both an ARMv5TE
//! (ARM9) and an ARMv4T (ARM7) entry, since both processors execute in every
//! DS cartridge.

use std::fmt;

/// Instruction-set variant of a reported entry point.
///
/// Closed set: the GBA's ARM7TDMI and the NDS ARM7 are both `Armv4T`; the NDS
/// ARM9 (ARM946E-S) is `Armv5Te`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    /// ARMv4T (ARM7TDMI-class core).
    Armv4T,
    /// ARMv5TE (ARM9E-class core).
    Armv5Te,
}

impl Arch {
    /// Human-readable architecture name, suitable for host UI display.
    pub fn name(&self) -> &'static str {
        match self {
            Arch::Armv4T => "armv4t",
            Arch::Armv5Te => "armv5te",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One entry point of a loaded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryPoint {
    /// Instruction-set variant executing at this entry.
    pub arch: Arch,
    /// Address execution starts at.
    pub addr: u32,
    /// Short label naming the processor ("rom", "arm9", "arm7").
    pub label: &'static str,
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) @ {:#010x}", self.label, self.arch, self.addr)
    }
}
