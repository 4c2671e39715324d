use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, CommandFactory, Parser};

use cdlproj_core::{AddressPolicy, AnalysisOptions, LabelTable, analyze};

mod emit;

const AFTER_HELP: &str = "\
When the program finishes it will create a \"Makefile\" and several \".infofile\"s
'make disassembly' will run the disassembly with da65
'make' will build the NES rom
'make clean' will remove temporary build files";

#[derive(Parser, Debug)]
#[command(
    name = "cdlproj",
    version,
    about = "Converts an NES rom + FCEUX CDL file into a DA65 project",
    after_help = AFTER_HELP
)]
struct Cli {
    /// ROM file, then CDL file
    #[arg(value_name = "FILE", num_args = 0..=2)]
    files: Vec<PathBuf>,

    /// Filename of the ROM file to load
    #[arg(long = "rom", value_name = "FILE")]
    rom: Option<PathBuf>,

    /// Filename of the CDL file to load
    #[arg(long = "cdl", value_name = "FILE")]
    cdl: Option<PathBuf>,

    /// Size of PRG banks, 8=32kb, 4=16kb, 2=8kb
    #[arg(long, value_name = "NUMBER", default_value_t = 4, value_parser = parse_banksize)]
    banksize: usize,

    /// Mesen MLB label file to fold into the generated project
    #[arg(long, value_name = "FILE")]
    mlb: Option<PathBuf>,

    /// Use each bank's CDL bank-select address verbatim instead of
    /// rounding it down to a bank boundary
    #[arg(long = "exact-banks", action = ArgAction::SetTrue)]
    exact_banks: bool,
}

fn parse_banksize(field: &str) -> Result<usize, String> {
    match field {
        "2" | "4" | "8" => field.parse().map_err(|_| "unreachable".to_string()),
        _ => Err("bank size must be 2, 4 or 8".to_string()),
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Flags win; leftover positionals fill whichever of rom/cdl is unset,
    // in that order
    let mut files = cli.files.into_iter();
    let rom_path = cli.rom.or_else(|| files.next());
    let cdl_path = cli.cdl.or_else(|| files.next());
    let (Some(rom_path), Some(cdl_path)) = (rom_path, cdl_path) else {
        let _ = Cli::command().print_help();
        return ExitCode::from(2);
    };

    let policy = if cli.exact_banks {
        AddressPolicy::Exact
    } else {
        AddressPolicy::Rounded
    };
    let opts = AnalysisOptions { banksize: cli.banksize, policy };

    match run(&rom_path, &cdl_path, cli.mlb.as_deref(), opts) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err:#}");
            ExitCode::from(1)
        }
    }
}

fn run(rom_path: &Path, cdl_path: &Path, mlb_path: Option<&Path>, opts: AnalysisOptions) -> Result<()> {
    let rom = fs::read(rom_path)
        .with_context(|| format!("Could not open ROM file {}", rom_path.display()))?;
    let cdl = fs::read(cdl_path)
        .with_context(|| format!("Could not open CDL file {}", cdl_path.display()))?;
    let labels = match mlb_path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Could not open MLB file {}", path.display()))?;
            LabelTable::parse(&text)
        }
        None => LabelTable::default(),
    };

    let model = analyze(&rom, &cdl, labels, opts)?;
    emit::write_project(rom_path, &model)?;

    println!(
        "Finished creating project files.\n\
         \nIf all went well, you should be able to run \"make disassembly\" to create the assembly files\
         \nand then \"make\" to build the rom file."
    );
    Ok(())
}
