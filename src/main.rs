use std::{
    fs, io,
    path::{Path, PathBuf},
};

use adduct::{AbbreviationTable, AdductResolver};
use anyhow::{Result, anyhow, bail};
use clap::Parser;
use molmass::AtomicDatabase;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Calculates the parent mass multiplier and mass correction of mass spectrometry adducts, like [M+H]+
///
/// Each adduct is printed as `adduct,multiplier,correction_mass`, where the precursor m/z is given by
/// `multiplier * parent_mass + correction_mass`. Adducts that can't be interpreted are printed with empty fields.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Adducts to interpret, like "[M+Na]+" or "[2M-H]-"
    adducts: Vec<String>,
    /// A file of newline-separated adducts
    #[arg(short, long)]
    input: Option<PathBuf>,
    /// A KDL file of abbreviations to use instead of the built-in table
    #[arg(long)]
    abbreviations: Option<PathBuf>,
    /// A KDL atomic database to use instead of the built-in one
    #[arg(long)]
    atomic_db: Option<PathBuf>,
}

fn configure_log() {
    tracing_subscriber::registry()
        .with(
            fmt::layer().compact().with_writer(io::stderr).with_filter(
                EnvFilter::builder()
                    .with_default_directive(tracing::Level::WARN.into())
                    .from_env_lossy(),
            ),
        )
        .init();
}

fn main() -> Result<()> {
    configure_log();
    let args = Args::parse();

    let atomic_db = match &args.atomic_db {
        Some(path) => {
            info!("Loading atomic database from {}", path.display());
            load_kdl(path, AtomicDatabase::new)?
        }
        None => AtomicDatabase::default(),
    };
    let abbreviations = match &args.abbreviations {
        Some(path) => {
            info!("Loading abbreviations from {}", path.display());
            load_kdl(path, AbbreviationTable::new)?
        }
        None => AbbreviationTable::default(),
    };

    let mut adducts = args.adducts;
    if let Some(path) = &args.input {
        let file = fs::read_to_string(path)?;
        adducts.extend(
            file.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_owned),
        );
    }
    if adducts.is_empty() {
        bail!("no adducts were given, pass some as arguments or with --input");
    }

    let resolver = AdductResolver::new(&atomic_db, &abbreviations);
    for adduct in &adducts {
        match resolver.resolve(adduct) {
            Ok(resolved) => println!(
                "{adduct},{},{}",
                resolved.multiplier().normalize(),
                resolved.correction_mass().normalize()
            ),
            Err(error) => {
                warn!("{error}");
                println!("{adduct},,");
            }
        }
    }

    Ok(())
}

fn load_kdl<T>(path: &Path, parse: impl FnOnce(String, String) -> miette::Result<T>) -> Result<T> {
    let kdl = fs::read_to_string(path)?;
    // NOTE: `miette::Report` isn't a `std::error::Error`, so it's rendered up front instead
    parse(path.display().to_string(), kdl).map_err(|e| anyhow!("{e:?}"))
}
