//! Renders a `ProjectModel` into the on-disk da65 project: one infofile per
//! bank plus `ines.infofile`, `entry.asm`, the ld65 `layout` and a
//! `Makefile`. The record text is consumed by da65/ld65 and stays
//! byte-identical across runs for identical inputs.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use cdlproj_core::project::cdl::RangeKind;
use cdlproj_core::project::model::{Bank, ProjectModel};

pub fn write_project(rom_path: &Path, model: &ProjectModel) -> Result<()> {
    let rom_name = rom_path.to_string_lossy();

    write_file("ines.infofile", &render_ines_infofile(&rom_name))?;
    for bank in &model.banks {
        write_file(
            &format!("bank{}.infofile", bank.index),
            &render_bank_infofile(&rom_name, bank),
        )?;
    }
    write_file("entry.asm", &render_entry(&rom_name, model))?;
    write_file("layout", &render_layout(model))?;
    write_file("Makefile", &render_makefile(&rom_name, model))?;
    Ok(())
}

fn write_file(name: &str, contents: &str) -> Result<()> {
    fs::write(name, contents).with_context(|| format!("Could not create {name}"))
}

// The header itself disassembles as a 16-byte table at address 0
fn render_ines_infofile(rom_name: &str) -> String {
    format!(
        "GLOBAL {{ \
         \n  INPUTNAME \"{rom_name}\"; \
         \n  OUTPUTNAME \"ines.asm\"; \
         \n  INPUTOFFS $0; \
         \n  INPUTSIZE $10; \
         \n  STARTADDR $0; \
         \n}}; \
         \nRANGE {{ \
         \n  START $0; \
         \n  END $10; \
         \n  TYPE BYTETABLE; \
         \n}}; \
         \n"
    )
}

fn render_bank_infofile(rom_name: &str, bank: &Bank) -> String {
    let mut out = format!(
        "GLOBAL {{ \
         \n  INPUTNAME \"{rom_name}\"; \
         \n  OUTPUTNAME \"bank{index}.asm\"; \
         \n  INPUTOFFS ${offset:04x}; \
         \n  INPUTSIZE ${size:04x}; \
         \n  COMMENTS $4; \
         \n  STARTADDR ${start:04x}; \
         \n  LABELBREAK $1; \
         \n}};",
        index = bank.index,
        offset = bank.rom_offset,
        size = bank.size_bytes,
        start = bank.start_addr,
    );

    // LABEL addresses are uppercase, everything else lowercase
    for label in &bank.labels {
        let _ = write!(
            out,
            "\nLABEL {{ \
             \n  ADDR ${:04X}; \
             \n  NAME \"{}\"; \
             \n  SIZE ${:X}; \
             \n}};",
            label.addr, label.name, label.size,
        );
    }

    for range in &bank.ranges {
        let _ = write!(
            out,
            "\nRANGE {{ \
             \n  START ${:04x}; \
             \n  END ${:04x}; \
             \n  TYPE {}; \
             \n}};",
            range.start,
            range.end,
            range_type(range.kind),
        );
    }
    out
}

fn range_type(kind: RangeKind) -> &'static str {
    match kind {
        RangeKind::Code => "CODE",
        RangeKind::ByteTable => "BYTETABLE",
    }
}

fn render_entry(rom_name: &str, model: &ProjectModel) -> String {
    let mut out = String::from(".segment \"INES\"\n.include \"ines.asm\"");
    for bank in &model.banks {
        let _ = write!(
            out,
            "\n.scope bank{i} \
             \n.segment \"PRG{i}\" \
             \n.include \"bank{i}.asm\" \
             \n.endscope \
             \n",
            i = bank.index,
        );
    }
    if model.chr.size != 0 {
        let _ = write!(
            out,
            "\n.segment \"CHR\" \
             \n.incbin \"{rom_name}\", ${:04x}, ${:x} \
             \n",
            model.chr.offset, model.chr.size,
        );
    }
    out
}

fn render_layout(model: &ProjectModel) -> String {
    let mut out = String::from("MEMORY {");
    out.push_str("\nINES: start = 0, size = $10;");
    for bank in &model.banks {
        let _ = write!(
            out,
            "\nPRG{}: start = ${:04x}, size = ${:04x};",
            bank.index, bank.start_addr, bank.size_bytes,
        );
    }
    if model.chr.size > 0 {
        let _ = write!(out, "\nCHR: start = 0, size = ${:04x};", model.chr.size);
    }
    out.push_str("\n}\nSEGMENTS {");
    out.push_str("\nINES: load = INES, type = ro;");
    for bank in &model.banks {
        let _ = write!(out, "\nPRG{i}: load = PRG{i}, type = ro;", i = bank.index);
    }
    if model.chr.size > 0 {
        out.push_str("\nCHR: load = CHR, type = ro;");
    }
    out.push_str("\n}\n");
    out
}

fn render_makefile(rom_name: &str, model: &ProjectModel) -> String {
    let mut out = String::new();
    out.push_str("\n.PHONY: clean");
    out.push('\n');
    out.push_str("\nbuild: main.nes");
    out.push('\n');
    out.push_str("\nintegritycheck: main.nes");
    let _ = write!(out, "\n\tradiff2 -x main.nes \"{rom_name}\" | head -n 100");
    out.push('\n');
    out.push_str("\ndisassembly:");
    out.push_str("\n\tda65 -i ines.infofile");
    for bank in &model.banks {
        let _ = write!(out, "\n\tda65 -i bank{}.infofile", bank.index);
    }
    out.push('\n');
    out.push_str("\n%.o: %.asm");
    out.push_str("\n\tca65 --create-dep \"$@.dep\" -g --debug-info $< -o $@");
    out.push('\n');
    out.push_str("\nmain.nes: layout entry.o");
    out.push_str("\n\tld65  --dbgfile $@.dbg -C $^ -o $@");
    out.push('\n');
    out.push_str("\nclean:");
    out.push_str("\n\trm -f ./main.nes ./*.nes.dbg ./*.o ./*.dep");
    out.push('\n');
    out.push_str("\ninclude $(wildcard ./*.dep ./*/*.dep)");
    out
}
