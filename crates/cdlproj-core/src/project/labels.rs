use log::warn;

use super::error::ProjectError;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LabelKind {
    /// CPU-address label ('R'), attributed to every bank as-is.
    Ram,
    /// PRG ROM-offset label ('P'), attributed to the bank whose window
    /// covers it.
    Prg,
    /// Anything else: kept, but never matched by bank lookup.
    Other(char),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Label {
    pub kind: LabelKind,
    pub addr: usize,
    pub size: usize,
    pub name: String,
}

/// Labels from a Mesen/FCEUX MLB file, in file order.
#[derive(Clone, Debug, Default)]
pub struct LabelTable {
    labels: Vec<Label>,
}

impl LabelTable {
    /// Parse an MLB stream, one `type:addr[-addr2]:name:comment` record per
    /// line. Malformed lines are reported and skipped; a line too short to
    /// hold a record ends the list.
    pub fn parse(text: &str) -> LabelTable {
        // BOM allowed on the first line only
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);

        let mut labels = Vec::new();
        for (lineno, line) in text.lines().enumerate() {
            if line.len() < 4 {
                break;
            }
            match parse_line(line) {
                Ok(Some(label)) => labels.push(label),
                Ok(None) => {}
                Err(err) => warn!("skipping MLB line {}: {}", lineno + 1, err),
            }
        }
        LabelTable { labels }
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Label> {
        self.labels.iter()
    }

    /// Labels a bank with PRG window `[rom_start, rom_end)` (offsets into
    /// PRG ROM) should carry: every `Ram` label unchanged, every `Prg` label
    /// inside the window re-expressed at the bank's resolved CPU address.
    /// File order is preserved so output stays deterministic.
    pub fn labels_in_window(&self, rom_start: usize, rom_end: usize, bank_start: u16) -> Vec<Label> {
        self.labels
            .iter()
            .filter_map(|label| match label.kind {
                LabelKind::Ram => Some(label.clone()),
                LabelKind::Prg if rom_start <= label.addr && label.addr < rom_end => Some(Label {
                    addr: bank_start as usize + (label.addr - rom_start),
                    ..label.clone()
                }),
                _ => None,
            })
            .collect()
    }
}

fn parse_line(line: &str) -> Result<Option<Label>, ProjectError> {
    let mut fields = line.splitn(4, ':');
    let kind = match fields.next().unwrap_or("") {
        "R" => LabelKind::Ram,
        "P" => LabelKind::Prg,
        other => LabelKind::Other(other.chars().next().unwrap_or('?')),
    };

    let addr_spec = fields
        .next()
        .ok_or_else(|| ProjectError::InvalidFormat(format!("missing address field in {line:?}")))?;
    let (addr, size) = match addr_spec.split_once('-') {
        Some((start, end)) => {
            let start = parse_hex(start)?;
            let end = parse_hex(end)?;
            if end <= start {
                return Err(ProjectError::InvalidFormat(format!(
                    "empty address range {addr_spec:?}"
                )));
            }
            (start, end - start)
        }
        None => (parse_hex(addr_spec)?, 1),
    };

    // Nameless records carry no information for da65
    let name = fields.next().unwrap_or("");
    if name.is_empty() {
        return Ok(None);
    }

    Ok(Some(Label {
        kind,
        addr,
        size,
        name: name.to_string(),
    }))
}

fn parse_hex(field: &str) -> Result<usize, ProjectError> {
    usize::from_str_radix(field.trim(), 16)
        .map_err(|_| ProjectError::InvalidFormat(format!("bad hex address {field:?}")))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_single_address_record() {
        let table = LabelTable::parse("R:0012:player_hp:current hit points");
        assert_eq!(table.len(), 1);
        let label = table.iter().next().unwrap();
        assert_eq!(label.kind, LabelKind::Ram);
        assert_eq!(label.addr, 0x12);
        assert_eq!(label.size, 1);
        assert_eq!(label.name, "player_hp");
    }

    #[test]
    fn test_address_range_sets_size() {
        let table = LabelTable::parse("P:8000-8010:foo:");
        let label = table.iter().next().unwrap();
        assert_eq!(label.kind, LabelKind::Prg);
        assert_eq!(label.addr, 0x8000);
        assert_eq!(label.size, 0x10);
        assert_eq!(label.name, "foo");
    }

    #[test]
    fn test_bom_on_first_line_is_skipped() {
        let table = LabelTable::parse("\u{feff}P:0010:reset:");
        assert_eq!(table.len(), 1);
        assert_eq!(table.iter().next().unwrap().name, "reset");
    }

    #[test]
    fn test_nameless_records_are_dropped() {
        let table = LabelTable::parse("P:0010::\nP:0020:kept:");
        assert_eq!(table.len(), 1);
        assert_eq!(table.iter().next().unwrap().name, "kept");
    }

    #[test]
    fn test_malformed_address_skips_only_that_line() {
        let table = LabelTable::parse("P::broken:\nP:zz:also_broken:\nR:0040:fine:");
        assert_eq!(table.len(), 1);
        assert_eq!(table.iter().next().unwrap().name, "fine");
    }

    #[test]
    fn test_short_line_ends_the_list() {
        let table = LabelTable::parse("R:0010:a:\nzz\nR:0020:b:");
        assert_eq!(table.len(), 1);
        assert_eq!(table.iter().next().unwrap().name, "a");
    }

    #[test]
    fn test_record_without_comment_field_parses() {
        let table = LabelTable::parse("P:0030:no_comment");
        assert_eq!(table.len(), 1);
        assert_eq!(table.iter().next().unwrap().name, "no_comment");
    }

    #[test]
    fn test_unknown_kind_is_kept_but_never_matched() {
        let table = LabelTable::parse("X:0010:weird:");
        assert_eq!(table.len(), 1);
        assert_eq!(table.iter().next().unwrap().kind, LabelKind::Other('X'));
        assert!(table.labels_in_window(0, 0x4000, 0x8000).is_empty());
    }

    #[test]
    fn test_window_lookup_readdresses_prg_labels() {
        let table = LabelTable::parse("P:4000:in_bank1:\nP:0000:in_bank0:\nR:00FE:zp_tmp:");
        let bank1 = table.labels_in_window(0x4000, 0x8000, 0xC000);
        assert_eq!(bank1.len(), 2);
        // File order preserved: the PRG hit comes before the RAM label
        assert_eq!(bank1[0].name, "in_bank1");
        assert_eq!(bank1[0].addr, 0xC000);
        assert_eq!(bank1[1].name, "zp_tmp");
        assert_eq!(bank1[1].addr, 0x00FE);

        let bank0 = table.labels_in_window(0, 0x4000, 0x8000);
        assert_eq!(bank0.len(), 2);
        assert_eq!(bank0[0].name, "in_bank0");
        assert_eq!(bank0[0].addr, 0x8000);
    }

    #[test]
    fn test_window_end_is_exclusive() {
        let table = LabelTable::parse("P:4000:boundary:");
        assert!(table.labels_in_window(0, 0x4000, 0x8000).is_empty());
        assert_eq!(table.labels_in_window(0x4000, 0x8000, 0x8000).len(), 1);
    }
}
