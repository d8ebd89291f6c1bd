//! Batch conversion of multiple NFS-e files.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use guia_core::{
    ExtractedInvoiceRecord, InvoiceParser, ManualOverride, NfseParser, TissDocument, TissGenerator,
};

use super::{load_config, OverrideArgs};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern matching NFS-e XML files
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long, required = true)]
    output_dir: PathBuf,

    /// Also write a summary CSV
    #[arg(long)]
    summary: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,

    #[command(flatten)]
    manual: OverrideArgs,
}

/// Result of converting a single file.
struct ConvertResult {
    path: PathBuf,
    record: Option<ExtractedInvoiceRecord>,
    hash: Option<String>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;
    let manual = args.manual.clone().into_override()?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            ext.eq_ignore_ascii_case("xml")
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to convert",
        style("ℹ").blue(),
        files.len()
    );

    fs::create_dir_all(&args.output_dir)?;

    let progress = ProgressBar::new(files.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let parser = NfseParser::new().with_config(config.extraction.clone());
    let generator = TissGenerator::new().with_config(config.tiss.clone());

    let mut results = Vec::with_capacity(files.len());
    for path in files {
        let file_start = Instant::now();
        let converted = convert_file(&path, &parser, &generator, &manual);
        let processing_time_ms = file_start.elapsed().as_millis() as u64;

        match converted {
            Ok((record, document)) => {
                let output_path = output_path_for(&path, &args.output_dir);
                fs::write(&output_path, &document.xml)?;
                debug!("Wrote output to {}", output_path.display());

                results.push(ConvertResult {
                    path,
                    record: Some(record),
                    hash: Some(document.hash),
                    error: None,
                    processing_time_ms,
                });
            }
            Err(e) => {
                let error_msg = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to convert {}: {}", path.display(), error_msg);
                    results.push(ConvertResult {
                        path,
                        record: None,
                        hash: None,
                        error: Some(error_msg),
                        processing_time_ms,
                    });
                } else {
                    progress.abandon();
                    error!("Failed to convert {}: {}", path.display(), error_msg);
                    anyhow::bail!("Conversion of {} failed: {}", path.display(), error_msg);
                }
            }
        }

        progress.inc(1);
    }

    progress.finish_with_message("Complete");

    if args.summary {
        let summary_path = args.output_dir.join("summary.csv");
        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    println!();
    println!(
        "{} Converted {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(results.len() - failed.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn convert_file(
    path: &Path,
    parser: &NfseParser,
    generator: &TissGenerator,
    manual: &ManualOverride,
) -> anyhow::Result<(ExtractedInvoiceRecord, TissDocument)> {
    let bytes = fs::read(path)?;
    let result = parser.parse_bytes(&bytes)?;
    for warning in &result.warnings {
        debug!("{}: {}", path.display(), warning);
    }

    let document = generator.generate(&result.record, manual)?;
    Ok((result.record, document))
}

fn output_path_for(input: &Path, output_dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("nfse");
    output_dir.join(format!("{}-tiss.xml", stem))
}

fn write_summary(path: &Path, results: &[ConvertResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "invoice_number",
        "patient_name",
        "total_value",
        "hash",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");
        let elapsed = result.processing_time_ms.to_string();

        match &result.record {
            Some(record) => wtr.write_record([
                filename,
                "success",
                record.invoice_number.as_deref().unwrap_or(""),
                record.patient_name.as_deref().unwrap_or(""),
                record.total_value.as_deref().unwrap_or(""),
                result.hash.as_deref().unwrap_or(""),
                elapsed.as_str(),
                "",
            ])?,
            None => wtr.write_record([
                filename,
                "error",
                "",
                "",
                "",
                "",
                elapsed.as_str(),
                result.error.as_deref().unwrap_or(""),
            ])?,
        }
    }

    wtr.flush()?;
    Ok(())
}
