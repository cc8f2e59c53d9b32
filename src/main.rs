//! xapk2apk - rebuild a single APK from a split `.xapk` bundle.
//!
//! Requires apktool and zipalign, plus apksigner when a sign config is
//! present. Tool paths can be overridden with `APKTOOL`, `ZIPALIGN` and
//! `APKSIGNER` (environment or `.env`).

use anyhow::Result;
use clap::error::ErrorKind;
use clap::Parser;
use std::path::PathBuf;
use std::process;

use xapk2apk::error::exit_code_for;
use xapk2apk::{preflight, ApkTools, Bundle, Config, Conversion, Error, Pipeline};

#[derive(Parser)]
#[command(name = "xapk2apk", version)]
#[command(about = "Rebuild a single installable APK from a split .xapk bundle")]
#[command(
    after_help = "The output <name>.apk is written to the current directory.\nSigning is configured in xapktoapk.sign.properties (current or home directory)."
)]
struct Cli {
    /// Split bundle to convert (.xapk)
    bundle: PathBuf,

    /// Keep the .xapktoapk working directory after a successful run
    #[arg(long)]
    keep_work_dir: bool,

    /// Leave the output unsigned even if a sign config is present
    #[arg(long)]
    no_sign: bool,

    /// Print debug diagnostics
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            _ => {
                let _ = e.print();
                process::exit(exit_code_for(&usage_error(&e)));
            }
        },
    };

    // Load .env if present
    dotenvy::dotenv().ok();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {:#}", e);
        process::exit(exit_code_for(&e));
    }
}

/// Wrap a command-line parse failure so it maps to the usage exit code.
fn usage_error(e: &clap::Error) -> anyhow::Error {
    let reason = e.kind().as_str().unwrap_or("invalid usage");
    Error::InvalidArguments(reason.to_string()).into()
}

fn run(cli: &Cli) -> Result<()> {
    let working_dir = std::env::current_dir()?;
    let config = Config::load(&working_dir);
    if cli.verbose {
        config.print();
    }

    let bundle = Bundle::open(&cli.bundle)?;

    let sign = if cli.no_sign { None } else { config.sign.clone() };
    let paths = preflight::run_preflight_or_fail(&config.tools, sign.is_some())?;

    println!("=== Converting {} ===", bundle.path.display());
    let conversion = Pipeline::new(ApkTools::new(paths), sign, &working_dir)
        .keep_work_dir(cli.keep_work_dir)
        .run(&bundle)?;

    print_summary(&conversion);
    Ok(())
}

fn print_summary(conversion: &Conversion) {
    println!("\n=== Conversion Complete ===");
    println!("  Output:  {}", conversion.output.display());
    println!("  SHA-256: {}", conversion.sha256);
    println!(
        "  Splits:  {} ({} files merged, {} kept from base)",
        conversion.variants, conversion.stats.copied, conversion.stats.conflicts
    );
    if !conversion.signed {
        println!("  [WARN] Output is unsigned");
    }
}
