//! Inspect command - show what was extracted from an NFS-e.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;

use guia_core::{ExtractedInvoiceRecord, ExtractionResult, InvoiceParser, NfseParser};

use super::load_config;

/// Arguments for the inspect command.
#[derive(Args)]
pub struct InspectArgs {
    /// Input NFS-e XML file
    #[arg(required = true)]
    input: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

pub fn run(args: InspectArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let bytes = fs::read(&args.input)?;
    let result = NfseParser::new()
        .with_config(config.extraction)
        .parse_bytes(&bytes)?;

    let output = match args.format {
        OutputFormat::Json => format_json(&result.record)?,
        OutputFormat::Csv => format_csv(&result.record)?,
        OutputFormat::Text => format_text(&result),
    };
    println!("{}", output);

    Ok(())
}

fn format_json(record: &ExtractedInvoiceRecord) -> anyhow::Result<String> {
    let mut value = serde_json::to_value(record)?;
    // the raw document is not useful on screen
    if let Some(obj) = value.as_object_mut() {
        obj.remove("raw_source");
    }
    Ok(serde_json::to_string_pretty(&value)?)
}

fn opt(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn format_csv(record: &ExtractedInvoiceRecord) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "invoice_number",
        "issue_date",
        "provider_tax_id",
        "provider_name",
        "client_tax_id",
        "total_value",
        "patient_name",
        "billing_period",
        "period_start",
        "period_end",
        "daily_rate_quantity",
        "daily_rate_unit_value",
    ])?;

    wtr.write_record([
        opt(&record.invoice_number),
        record.issue_date.map(|d| d.to_string()).unwrap_or_default(),
        opt(&record.provider_tax_id),
        opt(&record.provider_name),
        opt(&record.client_tax_id),
        opt(&record.total_value),
        opt(&record.patient_name),
        opt(&record.billing_period_label),
        record.period_start.map(|d| d.to_string()).unwrap_or_default(),
        record.period_end.map(|d| d.to_string()).unwrap_or_default(),
        record
            .daily_rate_quantity
            .map(|q| q.to_string())
            .unwrap_or_default(),
        opt(&record.daily_rate_unit_value),
    ])?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(result: &ExtractionResult) -> String {
    let record = &result.record;
    let show = |value: Option<&str>| value.unwrap_or("-").to_string();
    let mut output = String::new();

    output.push_str(&format!("NFS-e: {}\n", show(record.invoice_number.as_deref())));
    output.push_str(&format!(
        "Issued: {}\n",
        record
            .issue_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string())
    ));
    output.push('\n');

    output.push_str("Provider:\n");
    output.push_str(&format!("  {}\n", show(record.provider_name.as_deref())));
    output.push_str(&format!("  Tax id: {}\n", show(record.provider_tax_id.as_deref())));
    output.push_str(&format!(
        "Client tax id: {}\n",
        show(record.client_tax_id.as_deref())
    ));
    output.push('\n');

    output.push_str("Internment:\n");
    output.push_str(&format!("  Patient: {}\n", show(record.patient_name.as_deref())));
    output.push_str(&format!(
        "  Period:  {}\n",
        show(record.billing_period_label.as_deref())
    ));
    if let (Some(start), Some(end)) = (record.period_start, record.period_end) {
        output.push_str(&format!("           {} .. {}\n", start, end));
    }
    if let Some(quantity) = record.daily_rate_quantity {
        output.push_str(&format!(
            "  Daily rates: {} x {}\n",
            quantity,
            show(record.daily_rate_unit_value.as_deref())
        ));
    }
    output.push_str(&format!("  Total: {}\n", show(record.total_value.as_deref())));

    if !result.applied_rules.is_empty() {
        output.push('\n');
        output.push_str("Matched rules:\n");
        for found in &result.applied_rules {
            output.push_str(&format!("  {} {:?}", found.rule, found.text));
            if let Some((start, end)) = found.span {
                output.push_str(&format!(" at {}..{}", start, end));
            }
            output.push('\n');
        }
    }

    if !result.warnings.is_empty() {
        output.push('\n');
        output.push_str(&format!("{}\n", style("Warnings:").yellow()));
        for warning in &result.warnings {
            output.push_str(&format!("  - {}\n", warning));
        }
    }

    output
}
