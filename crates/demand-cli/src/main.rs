//! CLI application for merchant cash advance demand letters.

mod commands;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use console::style;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use demand_core::{DemandError, DocumentError, StatementError};

use commands::{agreement, batch, config, letter, statement};

/// Demand letters - extract agreement terms, total statements, draft letters
#[derive(Parser)]
#[command(name = "demand")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract fields from an agreement (PDF or DOCX)
    Agreement(agreement::AgreementArgs),

    /// Total a CSV payment statement
    Statement(statement::StatementArgs),

    /// Draft a demand letter from JSON inputs
    Letter(letter::LetterArgs),

    /// Extract fields from many agreements
    Batch(batch::BatchArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to install logger: {}", e);
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", style("✗").red(), e);
            ExitCode::from(exit_code(&e))
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Agreement(args) => agreement::run(args, config_path),
        Commands::Statement(args) => statement::run(args, config_path),
        Commands::Letter(args) => letter::run(args, config_path),
        Commands::Batch(args) => batch::run(args, config_path),
        Commands::Config(args) => config::run(args),
    }
}

/// Unreadable documents exit with 22, malformed statements with 2.
fn exit_code(err: &anyhow::Error) -> u8 {
    if let Some(e) = err.downcast_ref::<DemandError>() {
        return e.exit_code() as u8;
    }
    if err.downcast_ref::<StatementError>().is_some() {
        return 2;
    }
    if let Some(DocumentError::Unreadable) = err.downcast_ref::<DocumentError>() {
        return 22;
    }
    1
}
