use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use cvalign::io::DataFormat;

mod average;
mod config;
mod demo;
mod info;

/// cvalign - Replicate averaging for cyclic voltammetry curves
#[derive(Parser)]
#[command(name = "cvalign")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Output format override.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum FormatArg {
    /// Columnar JSON
    Json,
    /// voltage,mean,sem CSV
    Csv,
    /// Parquet long table
    Parquet,
}

impl From<FormatArg> for DataFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => DataFormat::Json,
            FormatArg::Csv => DataFormat::Csv,
            FormatArg::Parquet => DataFormat::Parquet,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Average replicate curves onto a common voltage grid
    Average {
        /// Input curve files (JSON or CSV); each may hold several curves
        #[arg(value_name = "INPUT", required = true)]
        inputs: Vec<PathBuf>,

        /// Output file (format from extension); prints JSON to stdout when omitted
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// Voltage matching tolerance in volts (default: 0.02)
        #[arg(short, long)]
        tolerance: Option<f64>,

        /// Output format, overriding the file extension
        #[arg(short, long, value_enum)]
        format: Option<FormatArg>,

        /// Load settings from a TOML config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Include per-point sample counts and match statistics in JSON output
        #[arg(long)]
        summary: bool,

        /// Average each curve label (e.g. scan rate) as its own replicate set
        #[arg(short, long)]
        group: bool,
    },

    /// Display information about a curve or averaged-curve file
    Info {
        /// Input file path
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Generate synthetic replicate CV curves for trying the tool
    Demo {
        /// Output file path (.json or .csv)
        #[arg(value_name = "OUTPUT", default_value = "demo_replicates.json")]
        output: PathBuf,

        /// Replicates per scan rate
        #[arg(short, long, default_value = "3")]
        replicates: usize,

        /// Points in the longest replicate
        #[arg(short, long, default_value = "400")]
        points: usize,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Average {
            inputs,
            output,
            tolerance,
            format,
            config,
            summary,
            group,
        } => average::run(average::AverageOptions {
            inputs,
            output,
            tolerance,
            format: format.map(DataFormat::from),
            config,
            summary,
            group,
        }),
        Commands::Info { file } => info::run(file),
        Commands::Demo {
            output,
            replicates,
            points,
        } => demo::run(output, replicates, points),
    }
}
