use anyhow::{Context, Result};
use log::info;
use std::io::Write;
use std::path::PathBuf;

use cvalign::curve::{Curve, CurvePoint};
use cvalign::io::{self, DataFormat};

/// Scan rates generated by the demo, in mV/s
const SCAN_RATES_MV_S: [f64; 2] = [50.0, 100.0];

const LOWER_VERTEX_V: f64 = -0.2;
const UPPER_VERTEX_V: f64 = 0.6;
/// Formal potential of the simulated redox couple
const FORMAL_POTENTIAL_V: f64 = 0.2;
/// Anodic/cathodic peak separation of a reversible one-electron couple
const PEAK_SEPARATION_V: f64 = 0.059;

/// Generate deterministic demo replicate curves
pub fn run(output: PathBuf, replicates: usize, points: usize) -> Result<()> {
    if replicates == 0 {
        anyhow::bail!("At least one replicate is required");
    }
    if points < 4 {
        anyhow::bail!("At least 4 points per curve are required, got {}", points);
    }

    info!("cvalign demo - synthetic cyclic voltammetry replicates");
    info!("=======================================================");

    let format = DataFormat::from_path(&output)?;
    if format == DataFormat::Parquet {
        anyhow::bail!("Demo curves are written as JSON or CSV");
    }

    let mut curves = Vec::with_capacity(SCAN_RATES_MV_S.len() * replicates);
    for &scan_rate in &SCAN_RATES_MV_S {
        for replicate in 0..replicates {
            // Later replicates lose a few points to mimic interrupted acquisitions.
            let len = points.saturating_sub(replicate * 3).max(4);
            curves.push(synthetic_cv(scan_rate, replicate, len));
        }
    }

    info!(
        "Writing {} curves ({} scan rates x {} replicates) to {}",
        curves.len(),
        SCAN_RATES_MV_S.len(),
        replicates,
        output.display()
    );

    let file = std::fs::File::create(&output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    let mut writer = std::io::BufWriter::new(file);
    if format == DataFormat::Csv {
        io::csv::write_curves(&mut writer, &curves)?;
    } else {
        io::json::write_curves(&mut writer, &curves)?;
    }
    writer.flush()?;

    info!("Done. Try: cvalign average --group {}", output.display());
    Ok(())
}

/// One forward + reverse sweep with a capacitive baseline and Gaussian-shaped
/// faradaic peaks. Peak height scales with the square root of the scan rate.
fn synthetic_cv(scan_rate_mv_s: f64, replicate: usize, len: usize) -> Curve {
    let phase = replicate as f64;
    let amplitude = 10.0 * (scan_rate_mv_s / 100.0).sqrt() * (1.0 + 0.03 * phase.sin());
    let capacitive = 0.5 * scan_rate_mv_s / 100.0;
    let offset = 0.002 * phase.cos();
    let width = 0.05;

    let half = len / 2;
    let span = UPPER_VERTEX_V - LOWER_VERTEX_V;

    let curve = (0..len)
        .map(|i| {
            let forward = i < half;
            let fraction = if forward {
                i as f64 / half as f64
            } else {
                (i - half) as f64 / (len - half) as f64
            };
            let sweep = if forward {
                LOWER_VERTEX_V + span * fraction
            } else {
                UPPER_VERTEX_V - span * fraction
            };
            let voltage = sweep + offset;

            let current = if forward {
                let x = (voltage - FORMAL_POTENTIAL_V - PEAK_SEPARATION_V / 2.0) / width;
                capacitive + amplitude * (-x * x).exp()
            } else {
                let x = (voltage - FORMAL_POTENTIAL_V + PEAK_SEPARATION_V / 2.0) / width;
                -capacitive - amplitude * (-x * x).exp()
            };

            CurvePoint::new(voltage, current)
        })
        .collect::<Curve>();

    curve.with_label(format!("{} mV/s", scan_rate_mv_s))
}
