use log::warn;

use super::error::ProjectError;
use super::model::ChrWindow;

const NES_MAGIC_BYTES: &[u8; 4] = b"NES\x1A";
pub const HEADER_LEN: usize = 0x10;
pub const PRG_ROM_PAGE_SIZE: usize = 0x4000;

/// Facts extracted from the 16-byte iNES header.
#[derive(Copy, Clone, Debug)]
pub struct RomHeader {
    /// PRG ROM size in 16 KiB pages (header byte 4).
    pub prg_page_count: u8,
}

impl RomHeader {
    pub fn parse(raw: &[u8]) -> Result<RomHeader, ProjectError> {
        // Check NES magic bytes
        if raw.len() < HEADER_LEN || &raw[0..4] != NES_MAGIC_BYTES {
            return Err(ProjectError::InvalidFormat("Not an iNES file".into()));
        }

        let prg_page_count = raw[4];
        if prg_page_count == 0 {
            return Err(ProjectError::InvalidFormat(
                "iNES header declares zero PRG pages".into(),
            ));
        }

        Ok(RomHeader { prg_page_count })
    }

    /// CHR data window at the tail of the ROM file. `size` of zero is fine
    /// (CHR-RAM cartridges); a file too small to hold the declared PRG
    /// pages is not.
    pub fn chr_window(&self, file_size: usize) -> Result<ChrWindow, ProjectError> {
        let offset = HEADER_LEN + self.prg_page_count as usize * PRG_ROM_PAGE_SIZE;
        if file_size < offset {
            return Err(ProjectError::InvalidFormat(format!(
                "ROM file is {} bytes but the header declares {} PRG pages ({} bytes)",
                file_size, self.prg_page_count, offset
            )));
        }
        Ok(ChrWindow {
            offset,
            size: file_size - offset,
        })
    }

    /// The CDL log carries one byte per ROM byte past the header. A shorter
    /// log is fatal; a longer one only gets a warning (the log may have been
    /// captured against a different build of the same ROM).
    pub fn check_trace_len(&self, file_size: usize, cdl_len: usize) -> Result<(), ProjectError> {
        let expected = file_size.saturating_sub(HEADER_LEN);
        if cdl_len < expected {
            return Err(ProjectError::InvalidFormat(format!(
                "CDL file is smaller than ROM ({cdl_len} bytes, expected {expected})"
            )));
        }
        if cdl_len != expected {
            warn!("CDL file does not match ROM size, that might be bad");
        }
        Ok(())
    }
}
