use bitflags::bitflags;

bitflags! {
    /* FCEUX CDL byte, one per PRG ROM offset:
        7  bit  0
        ---- ----
        xxxx BBDC
             |||+- Executed as code
             ||+-- Read as data
             ++--- Last-seen bank-select value, CPU window $8000 + BB * $2000
                   (only meaningful once bit 0 or bit 1 is set)
     */
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CdlFlags: u8 {
        const CODE =    0b0000_0001;
        const DATA =    0b0000_0010;
        const BANK_LO = 0b0000_0100;
        const BANK_HI = 0b0000_1000;
    }
}

impl CdlFlags {
    pub fn classified(self) -> bool {
        self.intersects(CdlFlags::CODE | CdlFlags::DATA)
    }

    /// Bank-select value (bits 2-3). Garbage unless `classified()`.
    pub fn bank_select(self) -> u8 {
        (self.bits() >> 2) & 0b11
    }

    // Low-2-bit pattern; adjacent bytes sharing it belong to one run.
    fn run_key(self) -> u8 {
        self.bits() & 0b11
    }

    // Code bit wins over the data bit when both are set
    fn kind(self) -> RangeKind {
        if self.contains(CdlFlags::CODE) {
            RangeKind::Code
        } else {
            RangeKind::ByteTable
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RangeKind {
    Code,
    ByteTable,
}

/// One classified span of a bank's CPU address window, end inclusive.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Range {
    pub start: u16,
    pub end: u16,
    pub kind: RangeKind,
}

/// Run-length compress one bank's trace bytes into typed ranges.
///
/// The output is contiguous, ordered, and covers `[bank_start,
/// bank_start + trace.len())` exactly; runs break whenever the low-2-bit
/// pattern of the trace byte changes. `bank_start` must leave room for the
/// whole bank below $10000 (guaranteed by the address resolver).
pub fn classify_bank(trace: &[u8], bank_start: u16) -> Vec<Range> {
    let mut ranges = Vec::new();
    if trace.is_empty() {
        return ranges;
    }

    let mut run = CdlFlags::from_bits_truncate(trace[0]);
    let mut run_start = 0usize;
    for (i, &byte) in trace.iter().enumerate().skip(1) {
        let flags = CdlFlags::from_bits_truncate(byte);
        if flags.run_key() != run.run_key() {
            ranges.push(Range {
                start: bank_start + run_start as u16,
                end: bank_start + (i - 1) as u16,
                kind: run.kind(),
            });
            run_start = i;
        }
        run = flags;
    }
    ranges.push(Range {
        start: bank_start + run_start as u16,
        end: bank_start + (trace.len() - 1) as u16,
        kind: run.kind(),
    });
    ranges
}
