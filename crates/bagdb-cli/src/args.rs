use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for bagdb-cli
#[derive(Debug, Parser)]
#[command(
    name = "bagdb",
    version,
    about = "Build small, referentially closed samples of a BAG address database"
)]
pub struct CliArgs {
    /// Emit log lines as JSON instead of plain text
    #[arg(long = "log-json", global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Build a sample database from the full dataset
    Extract(ExtractArgs),

    /// Run the post-build checks against a dataset and print the results
    Validate {
        /// Dataset to check
        #[arg(env = "BAG_SAMPLE_DB")]
        db: PathBuf,
    },

    /// Look up the coordinates of a postcode
    Lookup {
        /// Postcode, e.g. 3511AB or "3511 ab"
        postcode: String,

        /// Dataset to query
        #[arg(short = 'd', long = "db", env = "BAG_SAMPLE_DB")]
        db: PathBuf,
    },
}

#[derive(Debug, Args)]
pub struct ExtractArgs {
    /// Full BAG dataset (opened read-only)
    #[arg(short = 's', long = "source", env = "BAG_SOURCE_DB")]
    pub source: PathBuf,

    /// Sample database to write; replaced if it exists
    #[arg(short = 't', long = "target", env = "BAG_SAMPLE_DB")]
    pub target: PathBuf,

    /// Total number of root postcodes
    #[arg(short = 'n', long = "total", default_value_t = bagdb_core::DEFAULT_TOTAL_POSTCODES)]
    pub total: usize,

    /// Region that must be covered, as LABEL=PREFIX (e.g. Utrecht=35); repeatable
    #[arg(short = 'r', long = "region", value_name = "LABEL=PREFIX", conflicts_with = "coverage")]
    pub regions: Vec<String>,

    /// Postcodes guaranteed per region (default: 41, or 250 spread over the given regions)
    #[arg(long = "per-region", conflicts_with = "coverage")]
    pub per_region: Option<usize>,

    /// Coverage spec as JSON: {"per_region": N, "regions": [{"label": .., "prefix": ..}]}
    #[arg(short = 'c', long = "coverage", value_name = "FILE")]
    pub coverage: Option<PathBuf>,

    /// Write the run report as JSON to this file
    #[arg(long = "report", value_name = "FILE")]
    pub report: Option<PathBuf>,
}
