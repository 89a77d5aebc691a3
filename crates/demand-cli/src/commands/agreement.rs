//! Agreement command - extract fields from a single agreement.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use serde_json::json;
use tracing::info;

use demand_core::{AgreementExtraction, AgreementExtractor, AgreementField};

use super::{load_config, write_output, OutputFormat};

/// Arguments for the agreement command.
#[derive(Args)]
pub struct AgreementArgs {
    /// Agreement file (PDF or DOCX)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,
}

pub fn run(args: AgreementArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing agreement: {}", args.input.display());

    let data = fs::read(&args.input)?;
    let filename = args
        .input
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();

    let extractor = AgreementExtractor::new(&config.extraction)?;
    let extraction = extractor.extract_document(&data, filename)?;

    let missing = extraction.missing_required();
    if !missing.is_empty() {
        eprintln!(
            "{} Not found: {}",
            style("!").yellow(),
            missing.iter().map(|f| f.key()).collect::<Vec<_>>().join(", ")
        );
    }

    let output = match args.format {
        OutputFormat::Json => format_json(&extraction)?,
        OutputFormat::Text => format_text(&extraction),
    };

    write_output(args.output.as_deref(), &output)
}

pub fn format_json(extraction: &AgreementExtraction) -> anyhow::Result<String> {
    let report = json!({
        "ok": true,
        "extracted": extraction.fields,
        "sources": extraction.sources,
        "panel_found": extraction.panel_found,
        "warnings": extraction.warnings,
        "text_strategy": extraction.text_strategy,
    });
    Ok(serde_json::to_string_pretty(&report)?)
}

pub fn format_text(extraction: &AgreementExtraction) -> String {
    let mut output = String::new();

    for field in AgreementField::ALL {
        let value = extraction.fields.display(field);
        output.push_str(&format!(
            "{:<24} {}\n",
            field.key(),
            value.as_deref().unwrap_or("-")
        ));
    }

    if !extraction.warnings.is_empty() {
        output.push_str("\nWarnings:\n");
        for warning in &extraction.warnings {
            output.push_str(&format!("  - {}\n", warning));
        }
    }

    output
}
