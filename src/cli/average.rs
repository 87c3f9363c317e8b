use anyhow::{Context, Result};
use log::{info, warn};
use std::io::Write;
use std::path::{Path, PathBuf};

use cvalign::aligner::{AlignmentSummary, ReplicateAligner, DEFAULT_VOLTAGE_TOLERANCE};
use cvalign::averaged::AveragedCurve;
use cvalign::curve::Curve;
use cvalign::grouping::ReplicateGroups;
use cvalign::io::json::AveragedDocument;
use cvalign::io::parquet::{AveragedCurveWriter, ParquetWriterConfig};
use cvalign::io::{self, DataFormat};
use cvalign::metadata::AveragingMetadata;

use super::config::Config;

/// Options for the average command, after flag parsing.
pub struct AverageOptions {
    pub inputs: Vec<PathBuf>,
    pub output: Option<PathBuf>,
    pub tolerance: Option<f64>,
    pub format: Option<DataFormat>,
    pub config: Option<PathBuf>,
    pub summary: bool,
    pub group: bool,
}

struct AveragedGroup {
    label: Option<String>,
    averaged: AveragedCurve,
    summary: AlignmentSummary,
}

/// Average replicate curves read from one or more files
pub fn run(options: AverageOptions) -> Result<()> {
    let config = Config::load(options.config.as_deref())?;

    let tolerance = resolve_tolerance(options.tolerance, &config)?;
    let format = resolve_format(options.format, &config, options.output.as_deref())?;

    let summary = options.summary || config.output.summary.unwrap_or(false);
    let group = options.group || config.output.group_by_label.unwrap_or(false);

    info!("cvalign - replicate averaging");
    info!("=============================");
    info!("Inputs: {}", options.inputs.len());
    info!("Voltage tolerance: {} V", tolerance);
    info!("Output format: {}", format);

    let mut curves: Vec<Curve> = Vec::new();
    for input in &options.inputs {
        if !input.exists() {
            anyhow::bail!("Input file does not exist: {}", input.display());
        }
        let read = io::read_curves(input)
            .with_context(|| format!("Failed to read curves from {}", input.display()))?;
        info!("  {}: {} curves", input.display(), read.len());
        curves.extend(read);
    }

    let aligner = ReplicateAligner::with_tolerance(tolerance);
    let replicate_count = curves.len();
    let results = if group {
        ReplicateGroups::from_labelled(curves)
            .average(&aligner)?
            .into_iter()
            .map(|r| AveragedGroup {
                label: Some(r.label),
                averaged: r.averaged,
                summary: r.summary,
            })
            .collect::<Vec<_>>()
    } else {
        let (averaged, summary) = aligner
            .align_with_summary(&curves)
            .context("Failed to average replicate set")?;
        vec![AveragedGroup {
            label: None,
            averaged,
            summary,
        }]
    };

    for result in &results {
        info!("{}", result.summary);
        if result.summary.coverage() < 1.0 {
            warn!(
                "{}: {} replicate samples fell outside the {} V tolerance",
                result.label.as_deref().unwrap_or("replicate set"),
                result.summary.skipped,
                tolerance
            );
        }
    }

    let metadata = AveragingMetadata {
        replicate_count: Some(replicate_count),
        voltage_tolerance: Some(tolerance),
        source_files: options
            .inputs
            .iter()
            .map(|p| p.display().to_string())
            .collect(),
        ..Default::default()
    };

    match &options.output {
        Some(path) => {
            write_results(path, format, &results, &metadata, summary, &config)?;
            info!("Wrote {}", path.display());
        }
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            write_text(&mut lock, format, &results, summary)?;
            lock.flush()?;
        }
    }

    Ok(())
}

/// Tolerance from the flag, then the config file, then the default
fn resolve_tolerance(flag: Option<f64>, config: &Config) -> Result<f64> {
    let tolerance = flag
        .or(config.alignment.tolerance)
        .unwrap_or(DEFAULT_VOLTAGE_TOLERANCE);
    if !tolerance.is_finite() || tolerance <= 0.0 {
        anyhow::bail!("Voltage tolerance must be a positive number, got {}", tolerance);
    }
    Ok(tolerance)
}

/// Output format from the flag, then the config file, then the output
/// extension, falling back to JSON
fn resolve_format(
    flag: Option<DataFormat>,
    config: &Config,
    output: Option<&Path>,
) -> Result<DataFormat> {
    let format = match (flag, config.output.format, output) {
        (Some(format), _, _) => format,
        (None, Some(format), _) => format,
        (None, None, Some(path)) => DataFormat::from_path(path)
            .with_context(|| format!("Cannot infer output format from {}", path.display()))?,
        (None, None, None) => DataFormat::Json,
    };
    if format == DataFormat::Parquet && output.is_none() {
        anyhow::bail!("Parquet output needs an output path (-o FILE)");
    }
    Ok(format)
}

fn write_results(
    path: &Path,
    format: DataFormat,
    results: &[AveragedGroup],
    metadata: &AveragingMetadata,
    summary: bool,
    config: &Config,
) -> Result<()> {
    if format == DataFormat::Parquet {
        let writer_config = ParquetWriterConfig {
            compression_level: config.output.compression_level.unwrap_or(3),
            ..Default::default()
        };
        let mut writer = AveragedCurveWriter::new_file(path, metadata, writer_config)
            .context("Failed to create Parquet writer")?;
        for result in results {
            writer.write_curve(result.label.as_deref(), &result.averaged)?;
        }
        let stats = writer.finish().context("Failed to finalize Parquet file")?;
        info!("{}", stats);
        return Ok(());
    }

    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    let mut writer = std::io::BufWriter::new(file);
    write_text(&mut writer, format, results, summary)?;
    writer.flush()?;
    Ok(())
}

fn write_text<W: Write>(
    writer: W,
    format: DataFormat,
    results: &[AveragedGroup],
    summary: bool,
) -> Result<()> {
    match format {
        DataFormat::Json => {
            let documents: Vec<AveragedDocument<'_>> = results
                .iter()
                .map(|r| AveragedDocument {
                    label: r.label.as_deref(),
                    averaged: &r.averaged,
                    summary: summary.then_some(&r.summary),
                })
                .collect();
            io::json::write_averaged(writer, &documents)?;
        }
        DataFormat::Csv => match results {
            [AveragedGroup {
                label: None,
                averaged,
                ..
            }] => io::csv::write_averaged(writer, averaged)?,
            _ => {
                let groups: Vec<(&str, &AveragedCurve)> = results
                    .iter()
                    .map(|r| (r.label.as_deref().unwrap_or(""), &r.averaged))
                    .collect();
                io::csv::write_labelled(writer, &groups)?;
            }
        },
        DataFormat::Parquet => anyhow::bail!("Parquet output cannot be written as text"),
    }
    Ok(())
}
