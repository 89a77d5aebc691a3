//! Statement command - total a CSV payment ledger.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use tracing::info;

use demand_core::{StatementAggregate, StatementAggregator, StatementOptions};

use super::{load_config, write_output, OutputFormat};

/// Arguments for the statement command.
#[derive(Args)]
pub struct StatementArgs {
    /// Statement file (CSV)
    #[arg(required = true)]
    input: PathBuf,

    /// Only count revenue on or after this date
    #[arg(short, long)]
    effective_date: Option<String>,

    /// Revenue-share percentage used for the amount due
    #[arg(short, long)]
    rr_percent: Option<String>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,
}

pub fn run(args: StatementArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let is_csv = args
        .input
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
    if !is_csv {
        anyhow::bail!("Upload a .csv statement: {}", args.input.display());
    }

    info!("Processing statement: {}", args.input.display());

    let mut options = StatementOptions::new();
    options.effective_date = args.effective_date;
    options.rr_percent = args.rr_percent;

    let data = fs::read(&args.input)?;
    let aggregate = StatementAggregator::new(&config.statement).aggregate_csv(&data, &options)?;

    let output = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&aggregate.report())?,
        OutputFormat::Text => format_text(&aggregate),
    };

    write_output(args.output.as_deref(), &output)
}

fn format_text(aggregate: &StatementAggregate) -> String {
    let mut output = String::new();
    let or_dash = |value: Option<String>| value.unwrap_or_else(|| "-".to_string());

    output.push_str(&format!(
        "Rows:                {} ({} counted, {} before effective date, {} skipped)\n",
        aggregate.rows_processed,
        aggregate.rows_counted,
        aggregate.rows_filtered,
        aggregate.rows_skipped
    ));
    output.push_str(&format!(
        "Effective date:      {}\n",
        or_dash(aggregate.effective_date_applied.map(|d| d.to_string()))
    ));
    output.push_str("\n");
    output.push_str(&format!("Total revenue:       {}\n", aggregate.total_revenue));
    output.push_str(&format!("Successful payments: {}\n", aggregate.total_collected));
    output.push_str(&format!(
        "Revenue share:       {}\n",
        or_dash(aggregate.rr_percent.display_opt())
    ));
    output.push_str(&format!(
        "Amount due:          {}\n",
        or_dash(aggregate.rr_amount.map(|m| m.to_string()))
    ));
    output.push_str(&format!(
        "Shortfall:           {}\n",
        or_dash(aggregate.shortfall.map(|m| m.to_string()))
    ));
    output.push_str(&format!(
        "Last payment:        {}\n",
        or_dash(aggregate.last_collection_date.map(|d| d.to_string()))
    ));

    if !aggregate.collected_by_status.is_empty() {
        output.push_str("\nCollected by status:\n");
        for (status, amount) in &aggregate.collected_by_status {
            output.push_str(&format!("  {:<18} {}\n", status, amount));
        }
    }

    output
}
