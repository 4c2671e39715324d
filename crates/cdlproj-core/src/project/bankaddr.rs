use log::{debug, warn};

use super::cdl::CdlFlags;

/// One banksize unit is 4 KiB; `--banksize 4` means 16 KiB banks.
pub const BANK_UNIT: usize = 0x1000;

// Bank-select bits address the $8000-$FFFF window in 8 KiB steps
const CPU_WINDOW_BASE: usize = 0x8000;
const BANK_SELECT_STEP: usize = 0x2000;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AddressPolicy {
    /// Round the bank-select address down to a banksize boundary.
    Rounded,
    /// Use the bank-select address verbatim and report the mapping of
    /// every bank, including the fallback cases.
    Exact,
}

/// Where a bank lands if the trace never saw it mapped anywhere: banks
/// laid out linearly across the 32 KiB CPU window, wrapping every
/// `8 / banksize` banks.
pub fn default_bank_start(banksize: usize, bank_index: usize) -> u16 {
    (CPU_WINDOW_BASE + (BANK_UNIT * banksize) * (bank_index % (8 / banksize))) as u16
}

/// Infer the CPU address a bank was mapped to at runtime from its trace
/// bytes. Never fails: with no classified byte, or with a candidate that
/// would run past $FFFF, the default linear layout wins.
pub fn resolve_bank_start(
    trace: &[u8],
    banksize: usize,
    bank_index: usize,
    policy: AddressPolicy,
) -> u16 {
    let bank_bytes = banksize * BANK_UNIT;
    let fallback = default_bank_start(banksize, bank_index);

    let observed = trace
        .iter()
        .map(|&b| CdlFlags::from_bits_truncate(b))
        .find(|flags| flags.classified())
        .map(|flags| flags.bank_select());

    let candidate = match observed {
        Some(sel) => {
            let addr = CPU_WINDOW_BASE + sel as usize * BANK_SELECT_STEP;
            match policy {
                // Location in memory from the cdl file, rounded down to the bank size
                AddressPolicy::Rounded => addr / bank_bytes * bank_bytes,
                AddressPolicy::Exact => {
                    debug!("bank #{bank_index}: cdl bank-select {sel} maps it to ${addr:04x}");
                    addr
                }
            }
        }
        None => {
            if policy == AddressPolicy::Exact {
                debug!("bank #{bank_index}: no classified bytes in cdl, assuming ${fallback:04x}");
            }
            return fallback;
        }
    };

    if candidate + bank_bytes - 1 > 0xFFFF {
        warn!(
            "bank #{} in cdl is banked into {:04x}, but with banksize {} it would overflow (to {:04x}), using {:04x} instead.",
            bank_index,
            candidate,
            banksize,
            candidate + bank_bytes,
            fallback
        );
        return fallback;
    }
    candidate as u16
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_default_layout_wraps_across_the_cpu_window() {
        assert_eq!(default_bank_start(4, 0), 0x8000);
        assert_eq!(default_bank_start(4, 1), 0xC000);
        assert_eq!(default_bank_start(4, 2), 0x8000);
        assert_eq!(default_bank_start(2, 3), 0xE000);
        // 32 KiB banks always cover the whole window
        assert_eq!(default_bank_start(8, 5), 0x8000);
    }

    #[test]
    fn test_untouched_bank_falls_back_to_default() {
        let trace = [0u8; 0x1000];
        assert_eq!(resolve_bank_start(&trace, 4, 3, AddressPolicy::Rounded), 0xC000);
        assert_eq!(resolve_bank_start(&trace, 4, 3, AddressPolicy::Exact), 0xC000);
    }

    #[test]
    fn test_bank_select_without_classification_is_ignored() {
        // 0x04 carries bank-select bits but no code/data bit; the first
        // classified byte decides
        let mut trace = [0u8; 0x1000];
        trace[0] = 0x04;
        trace[1] = 0x01;
        assert_eq!(resolve_bank_start(&trace, 2, 0, AddressPolicy::Rounded), 0x8000);
    }

    #[test]
    fn test_rounded_policy_snaps_to_bank_boundary() {
        // Bank-select 1 -> $A000, rounded down to a 16 KiB boundary -> $8000
        let mut trace = [0u8; 0x4000];
        trace[0x10] = 0x05;
        assert_eq!(resolve_bank_start(&trace, 4, 0, AddressPolicy::Rounded), 0x8000);
    }

    #[test]
    fn test_exact_policy_keeps_the_address_verbatim() {
        let mut trace = [0u8; 0x4000];
        trace[0x10] = 0x05;
        assert_eq!(resolve_bank_start(&trace, 4, 0, AddressPolicy::Exact), 0xA000);
    }

    #[test]
    fn test_overflowing_candidate_is_replaced_by_default() {
        // Bank-select 3 -> $E000; a 32 KiB bank there would run past $FFFF
        let mut trace = [0u8; 0x8000];
        trace[0] = 0x0D;
        assert_eq!(resolve_bank_start(&trace, 8, 0, AddressPolicy::Rounded), 0x8000);
        assert_eq!(resolve_bank_start(&trace, 8, 0, AddressPolicy::Exact), 0x8000);
    }

    #[test]
    fn test_last_bank_select_values_do_not_matter() {
        // Only the first classified byte decides the mapping
        let mut trace = [0u8; 0x2000];
        trace[0] = 0x09; // select 2 -> $C000
        trace[1] = 0x05; // select 1, ignored
        assert_eq!(resolve_bank_start(&trace, 2, 0, AddressPolicy::Rounded), 0xC000);
    }
}
