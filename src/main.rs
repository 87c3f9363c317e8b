//! # cvalign
//!
//! Command-line front end for averaging replicate cyclic-voltammetry curves.
//!
//! ## Usage
//!
//! ```bash
//! # Generate demo replicates at two scan rates
//! cvalign demo replicates.json
//!
//! # Average each scan rate separately and write Parquet
//! cvalign average --group replicates.json -o averaged.parquet
//!
//! # Inspect inputs or outputs
//! cvalign info averaged.parquet
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
