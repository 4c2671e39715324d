use super::cdl::Range;
use super::labels::{Label, LabelTable};

/// CHR data window at the tail of the ROM file, copied into the rebuilt
/// ROM verbatim. `size == 0` means the cartridge uses CHR-RAM.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ChrWindow {
    pub offset: usize,
    pub size: usize,
}

/// One PRG bank, fully resolved: where it sits in the ROM file, where it
/// was mapped at runtime, and what the trace says about its bytes.
#[derive(Clone, Debug)]
pub struct Bank {
    pub index: usize,
    /// Offset of the bank's first byte in the ROM file (header included).
    pub rom_offset: usize,
    pub size_bytes: usize,
    /// Resolved CPU address of the bank's first byte.
    pub start_addr: u16,
    pub ranges: Vec<Range>,
    pub labels: Vec<Label>,
}

/// Everything one analysis run produced, handed to the emitter as-is.
#[derive(Clone, Debug)]
pub struct ProjectModel {
    pub prg_page_count: u8,
    pub banksize: usize,
    pub banks: Vec<Bank>,
    pub chr: ChrWindow,
    pub labels: LabelTable,
}
