//! Convert command - turn a single NFS-e into a TISS document.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info, warn};

use guia_core::{InvoiceParser, NfseParser, TissGenerator};

use super::{load_config, OverrideArgs};

/// Arguments for the convert command.
#[derive(Args)]
pub struct ConvertArgs {
    /// Input NFS-e XML file
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long, conflicts_with = "output_dir")]
    output: Option<PathBuf>,

    /// Write to tiss-<timestamp>.xml inside this directory
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Print the integrity hash after writing
    #[arg(long)]
    show_hash: bool,

    #[command(flatten)]
    manual: OverrideArgs,
}

pub fn run(args: ConvertArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Converting file: {}", args.input.display());

    let manual = args.manual.into_override()?;
    let bytes = fs::read(&args.input)?;

    let parser = NfseParser::new().with_config(config.extraction.clone());
    let result = parser.parse_bytes(&bytes)?;
    for warning in &result.warnings {
        warn!("{}: {}", args.input.display(), warning);
    }

    let document = TissGenerator::new()
        .with_config(config.tiss)
        .generate(&result.record, &manual)?;

    let target = match (&args.output, &args.output_dir) {
        (Some(path), _) => Some(path.clone()),
        (None, Some(dir)) => {
            fs::create_dir_all(dir)?;
            let stamp = chrono::Local::now().format("%Y%m%d%H%M%S");
            Some(dir.join(format!("tiss-{}.xml", stamp)))
        }
        (None, None) => None,
    };

    match target {
        Some(path) => {
            fs::write(&path, &document.xml)?;
            println!(
                "{} Output written to {}",
                style("✓").green(),
                path.display()
            );
            if args.show_hash {
                println!("{} Hash: {}", style("ℹ").blue(), document.hash);
            }
        }
        None => {
            println!("{}", document.xml);
            if args.show_hash {
                eprintln!("Hash: {}", document.hash);
            }
        }
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}
