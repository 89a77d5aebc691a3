//! Subcommands.

pub mod agreement;
pub mod batch;
pub mod config;
pub mod letter;
pub mod statement;

use std::fs;
use std::path::{Path, PathBuf};

use console::style;
use tracing::debug;

use demand_core::DemandConfig;

/// Output format for single-document commands.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Plain text summary
    Text,
}

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("demand")
        .join("config.json")
}

/// `--config` when given, else the default file when it exists, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<DemandConfig> {
    if let Some(path) = config_path {
        return Ok(DemandConfig::from_file(Path::new(path))?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Using config file {}", default_path.display());
        Ok(DemandConfig::from_file(&default_path)?)
    } else {
        Ok(DemandConfig::default())
    }
}

/// Write to a file (with a confirmation line) or to stdout.
pub fn write_output(output: Option<&Path>, content: &str) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            fs::write(path, content)?;
            println!("{} Output written to {}", style("✓").green(), path.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}
