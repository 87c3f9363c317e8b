use anyhow::{Context, Result};
use std::path::PathBuf;

use cvalign::io::{self, DataFormat};

#[cfg(feature = "colorized_output")]
fn heading(text: &str) -> String {
    console::style(text).bold().cyan().to_string()
}

#[cfg(not(feature = "colorized_output"))]
fn heading(text: &str) -> String {
    text.to_string()
}

fn format_range(range: Option<(f64, f64)>) -> String {
    match range {
        Some((lo, hi)) => format!("{:>9.4} .. {:<9.4}", lo, hi),
        None => "-".to_string(),
    }
}

/// Display information about a curve or averaged-curve file
pub fn run(file: PathBuf) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {}", file.display());
    }

    let format = DataFormat::from_path(&file)?;

    println!("{}", heading("cvalign File Information"));
    println!("{}", heading("========================"));
    println!("File: {}", file.display());
    println!("Format: {}", format);
    println!();

    if format == DataFormat::Parquet {
        let averaged = io::parquet::read_averaged(&file).context("Failed to read Parquet file")?;
        let meta = &averaged.metadata;

        println!("{}", heading("Provenance:"));
        if let Some(writer) = &meta.writer {
            println!("  Writer: {}", writer);
        }
        if let Some(created) = &meta.created {
            println!("  Created: {}", created);
        }
        if let Some(count) = meta.replicate_count {
            println!("  Replicates: {}", count);
        }
        if let Some(tolerance) = meta.voltage_tolerance {
            println!("  Voltage tolerance: {} V", tolerance);
        }
        for source in &meta.source_files {
            println!("  Source: {}", source);
        }
        println!();

        println!("{}", heading("Averaged curves:"));
        for (label, curve) in &averaged.curves {
            let max_sem = curve.sem().iter().copied().fold(0.0, f64::max);
            println!(
                "  {:<20} {:>7} points  max SEM {:.4}",
                label.as_deref().unwrap_or("<unlabelled>"),
                curve.len(),
                max_sem
            );
        }
        return Ok(());
    }

    let curves = io::read_curves(&file).context("Failed to read curves")?;

    println!("{}", heading("Curves:"));
    println!(
        "  {:<20} {:>7}  {:^22}  {:^22}  {:>8}",
        "label", "points", "voltage (V)", "current", "segments"
    );
    for curve in &curves {
        println!(
            "  {:<20} {:>7}  {:^22}  {:^22}  {:>8}",
            curve.label.as_deref().unwrap_or("<unlabelled>"),
            curve.len(),
            format_range(curve.voltage_range()),
            format_range(curve.current_range()),
            curve.sweep_segments()
        );
    }
    println!();
    println!(
        "Total: {} curves, {} points",
        curves.len(),
        curves.iter().map(|c| c.len()).sum::<usize>()
    );

    Ok(())
}
