//! Command-line arguments.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use stockcast_observability::LogFormat;

/// Demand forecasting over inventory snapshots.
#[derive(Parser, Debug)]
#[command(name = "stockcast", version, about, long_about = None)]
pub struct Cli {
    /// Path to a TOML settings file.
    #[arg(short, long, env = "STOCKCAST_SETTINGS", global = true)]
    pub settings: Option<PathBuf>,

    /// Log output format (`json` or `pretty`).
    #[arg(long, env = "STOCKCAST_LOG_FORMAT", default_value_t = LogFormat::Json, global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fit the demand model and replace the stored artifact.
    Train {
        /// Inventory snapshot (JSON: products, outflows, inflows).
        #[arg(short, long)]
        data: PathBuf,

        /// Zero the promotional-outflow feature instead of using it.
        #[arg(long)]
        exclude_promotions: bool,
    },

    /// Generate forecasts for the configured horizon.
    Run {
        #[arg(short, long)]
        data: PathBuf,

        /// Forecast configuration (JSON).
        #[arg(short, long)]
        config: PathBuf,

        /// Forecast table (JSON). Existing rows are updated in place.
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Summarize stored forecasts over an inclusive date range.
    Summary {
        #[arg(short, long)]
        data: PathBuf,

        #[arg(short, long)]
        forecasts: PathBuf,

        #[arg(long)]
        start: NaiveDate,

        #[arg(long)]
        end: NaiveDate,
    },
}

impl Cli {
    pub fn import() -> Result<Self, clap::Error> {
        Self::try_parse()
    }
}
