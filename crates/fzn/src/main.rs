use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use env_logger::Env;

mod catalog;
mod report;

/// Where distribution packages install the Fritzing part library.
const DEFAULT_PARTS_ROOT: &str = "/usr/share/fritzing/parts";

#[derive(Parser)]
#[command(name = "fzn")]
#[command(about = "Extract netlists from Fritzing sketches", long_about = None)]
#[command(version)]
struct Cli {
    /// Sketch to read: a .fzz archive or a bare .fz document
    #[arg(value_name = "INPUT", value_hint = clap::ValueHint::FilePath)]
    input: PathBuf,

    /// Fritzing part library holding obsolete/, contrib/, core/ and user/
    #[arg(long, value_name = "DIR", default_value = DEFAULT_PARTS_ROOT)]
    parts_root: PathBuf,

    /// Extra part directories, loaded after the part library (later wins)
    #[arg(long = "parts-dir", value_name = "DIR")]
    parts_dirs: Vec<PathBuf>,

    /// Print a bill of materials instead of the netlist
    #[arg(short, long)]
    bom: bool,

    /// Enable debug logging
    #[arg(short = 'd', long = "debug", hide = true)]
    debug: bool,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {e}", "Error:".red());
        for cause in e.chain().skip(1) {
            eprintln!("  {cause}");
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Default level depends on --debug; RUST_LOG overrides either way.
    let env = if cli.debug {
        Env::default().default_filter_or("debug")
    } else {
        Env::default().default_filter_or("error")
    };
    env_logger::Builder::from_env(env).init();

    let registry = catalog::load_catalog(&cli.parts_root, &cli.parts_dirs)?;
    log::debug!("Part catalog holds {} parts", registry.len());

    let is_bare_document = cli
        .input
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("fz"));
    let schematic = if is_bare_document {
        let xml = std::fs::read_to_string(&cli.input)
            .with_context(|| format!("Failed to read {}", cli.input.display()))?;
        fzn_sch::parse_sketch(&registry, &xml)
    } else {
        fzn_sch::load_sketch(&registry, &cli.input)
    }
    .with_context(|| format!("Failed to extract netlist from {}", cli.input.display()))?;

    let mut writer = io::stdout().lock();
    if cli.bom {
        report::write_bom_table(&schematic, &mut writer)?;
    } else {
        report::write_netlist(&schematic, &mut writer)?;
    }
    writer.flush()?;

    Ok(())
}
