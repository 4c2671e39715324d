pub mod bankaddr;
pub mod cdl;
pub mod error;
pub mod header;
pub mod labels;
pub mod model;

use bankaddr::{AddressPolicy, BANK_UNIT, resolve_bank_start};
use cdl::classify_bank;
use error::ProjectError;
use header::{HEADER_LEN, RomHeader};
use labels::LabelTable;
use model::{Bank, ProjectModel};

#[derive(Copy, Clone, Debug)]
pub struct AnalysisOptions {
    /// PRG bank size in 4 KiB units: 2 (8 KiB), 4 (16 KiB) or 8 (32 KiB).
    pub banksize: usize,
    pub policy: AddressPolicy,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            banksize: 4,
            policy: AddressPolicy::Rounded,
        }
    }
}

/// Run the whole analysis: header, then banks strictly in index order,
/// each bank classified, address-resolved and labeled from its own CDL
/// slice before the next one starts.
pub fn analyze(
    rom: &[u8],
    cdl: &[u8],
    labels: LabelTable,
    opts: AnalysisOptions,
) -> Result<ProjectModel, ProjectError> {
    if !matches!(opts.banksize, 2 | 4 | 8) {
        return Err(ProjectError::UnsupportedBankSize(opts.banksize));
    }

    let header = RomHeader::parse(rom)?;
    header.check_trace_len(rom.len(), cdl.len())?;
    let chr = header.chr_window(rom.len())?;

    let bank_bytes = opts.banksize * BANK_UNIT;
    // Integer truncation is load-bearing: one lone 16 KiB page with
    // banksize 4 yields zero banks, same as the original tooling.
    let total_banks = (header.prg_page_count as usize / 2 * 8) / opts.banksize;

    let mut banks = Vec::with_capacity(total_banks);
    for index in 0..total_banks {
        let prg_offset = index * bank_bytes;
        let trace = cdl
            .get(prg_offset..prg_offset + bank_bytes)
            .ok_or_else(|| {
                ProjectError::InvalidFormat(format!("CDL log ends inside bank {index}"))
            })?;

        let start_addr = resolve_bank_start(trace, opts.banksize, index, opts.policy);
        let ranges = classify_bank(trace, start_addr);
        let attributed = labels.labels_in_window(prg_offset, prg_offset + bank_bytes, start_addr);

        banks.push(Bank {
            index,
            rom_offset: HEADER_LEN + prg_offset,
            size_bytes: bank_bytes,
            start_addr,
            ranges,
            labels: attributed,
        });
    }

    Ok(ProjectModel {
        prg_page_count: header.prg_page_count,
        banksize: opts.banksize,
        banks,
        chr,
        labels,
    })
}
