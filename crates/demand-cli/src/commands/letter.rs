//! Letter command - resolve letter fields and render the demand letter.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::Args;
use console::style;
use serde_json::json;
use tracing::{debug, info};

use demand_core::{
    AgreementExtractor, DemandConfig, DemandLetterBuilder, DemandLetterInput, LetterField,
    StatementAggregator, StatementOptions,
};

use super::{load_config, write_output, OutputFormat};

/// Arguments for the letter command.
#[derive(Args)]
pub struct LetterArgs {
    /// Letter inputs as a JSON object (short keys or form labels)
    input: Option<PathBuf>,

    /// Agreement (PDF or DOCX) used to fill blank agreement fields
    #[arg(short, long)]
    agreement: Option<PathBuf>,

    /// Statement CSV used to fill blank revenue and payment fields
    #[arg(short, long)]
    statement: Option<PathBuf>,

    /// Letter date (default: today)
    #[arg(long)]
    today: Option<String>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

pub fn run(args: LetterArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    let mut input = match &args.input {
        Some(path) => {
            let json = fs::read_to_string(path)
                .map_err(|e| anyhow::anyhow!("Cannot read {}: {}", path.display(), e))?;
            DemandLetterInput::from_json(&json)?
        }
        None => DemandLetterInput::new(),
    };

    if let Some(path) = &args.agreement {
        merge_agreement(&mut input, path, &config)?;
    }

    if let Some(path) = &args.statement {
        merge_statement(&mut input, path, &config)?;
    }

    if let Some(today) = &args.today {
        input.set(LetterField::Today, today.as_str());
    }

    let builder = DemandLetterBuilder::new(&config.letter);
    let letter = builder.build(&input, Utc::now().date_naive());

    let blank = letter.blank_fields();
    if !blank.is_empty() {
        eprintln!(
            "{} Blank in letter: {}",
            style("!").yellow(),
            blank.iter().map(|f| f.key()).collect::<Vec<_>>().join(", ")
        );
    }

    let output = match args.format {
        OutputFormat::Text => builder.render_text(&letter),
        OutputFormat::Json => serde_json::to_string_pretty(&json!({
            "ok": true,
            "file_name": letter.file_name("txt"),
            "fields": letter,
            "text": builder.render_text(&letter),
        }))?,
    };

    write_output(args.output.as_deref(), &output)
}

fn merge_agreement(
    input: &mut DemandLetterInput,
    path: &Path,
    config: &DemandConfig,
) -> anyhow::Result<()> {
    info!("Reading agreement: {}", path.display());

    let data = fs::read(path)?;
    let filename = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    let extraction = AgreementExtractor::new(&config.extraction)?.extract_document(&data, filename)?;

    let filled = input.merge_agreement(&extraction.fields);
    debug!("Agreement filled {} blank fields", filled);
    Ok(())
}

fn merge_statement(
    input: &mut DemandLetterInput,
    path: &Path,
    config: &DemandConfig,
) -> anyhow::Result<()> {
    info!("Reading statement: {}", path.display());

    let mut options = StatementOptions::new();
    options.effective_date = input.get(LetterField::EffectiveDate).map(str::to_string);
    options.rr_percent = input.get(LetterField::RrPercent).map(str::to_string);

    let data = fs::read(path)?;
    let aggregate = StatementAggregator::new(&config.statement).aggregate_csv(&data, &options)?;

    let filled = input.merge_statement(&aggregate);
    debug!("Statement filled {} blank fields", filled);
    Ok(())
}
