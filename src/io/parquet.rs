//! Parquet output for averaged curves.
//!
//! Each grid point becomes one row of the long table described in
//! [`crate::schema`]. Several groups can share one file; they are told apart by
//! the `label` column.

use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use ::parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use ::parquet::arrow::ArrowWriter;
use ::parquet::basic::{Compression, ZstdLevel};
use ::parquet::file::properties::{EnabledStatistics, WriterProperties};
use ::parquet::format::KeyValue;
use arrow::array::{Array, ArrayRef, Float64Array, StringArray};
use arrow::datatypes::Schema;
use arrow::record_batch::RecordBatch;
use log::debug;

use super::IoError;
use crate::averaged::AveragedCurve;
use crate::metadata::AveragingMetadata;
use crate::schema::{averaged_columns, create_averaged_schema_arc};

/// Configuration for the averaged curve writer
#[derive(Debug, Clone)]
pub struct ParquetWriterConfig {
    /// ZSTD compression level (1-22)
    pub compression_level: i32,

    /// Maximum rows per row group
    pub row_group_size: usize,

    /// Whether to write column statistics
    pub write_statistics: bool,
}

impl Default for ParquetWriterConfig {
    fn default() -> Self {
        Self {
            compression_level: 3,
            row_group_size: 100_000,
            write_statistics: true,
        }
    }
}

impl ParquetWriterConfig {
    fn to_writer_properties(&self, metadata: &HashMap<String, String>) -> WriterProperties {
        let compression = Compression::ZSTD(
            ZstdLevel::try_new(self.compression_level).unwrap_or_default(),
        );

        let statistics = if self.write_statistics {
            EnabledStatistics::Chunk
        } else {
            EnabledStatistics::None
        };

        let kv_metadata: Vec<KeyValue> = metadata
            .iter()
            .map(|(k, v)| KeyValue {
                key: k.clone(),
                value: Some(v.clone()),
            })
            .collect();

        WriterProperties::builder()
            .set_compression(compression)
            .set_statistics_enabled(statistics)
            .set_max_row_group_size(self.row_group_size)
            .set_key_value_metadata(Some(kv_metadata))
            .build()
    }
}

/// Writer for averaged curve Parquet files
pub struct AveragedCurveWriter<W: Write + Send> {
    writer: ArrowWriter<W>,
    schema: Arc<Schema>,
    curves_written: usize,
    points_written: usize,
}

impl AveragedCurveWriter<File> {
    /// Create a new writer to a file path
    pub fn new_file<P: AsRef<Path>>(
        path: P,
        metadata: &AveragingMetadata,
        config: ParquetWriterConfig,
    ) -> Result<Self, IoError> {
        let file = File::create(path)?;
        Self::new(file, metadata, config)
    }
}

impl<W: Write + Send> AveragedCurveWriter<W> {
    /// Create a new writer to any Write implementation
    pub fn new(
        writer: W,
        metadata: &AveragingMetadata,
        config: ParquetWriterConfig,
    ) -> Result<Self, IoError> {
        let schema = create_averaged_schema_arc();
        let props = config.to_writer_properties(&metadata.to_parquet_metadata()?);
        let writer = ArrowWriter::try_new(writer, schema.clone(), Some(props))?;

        Ok(Self {
            writer,
            schema,
            curves_written: 0,
            points_written: 0,
        })
    }

    /// Append one averaged curve under an optional label
    pub fn write_curve(
        &mut self,
        label: Option<&str>,
        averaged: &AveragedCurve,
    ) -> Result<(), IoError> {
        if averaged.is_empty() {
            return Ok(());
        }

        let arrays: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(vec![label; averaged.len()])),
            Arc::new(Float64Array::from(averaged.voltage().to_vec())),
            Arc::new(Float64Array::from(averaged.mean().to_vec())),
            Arc::new(Float64Array::from(averaged.sem().to_vec())),
        ];

        let batch = RecordBatch::try_new(self.schema.clone(), arrays)?;
        self.writer.write(&batch)?;

        self.curves_written += 1;
        self.points_written += averaged.len();
        Ok(())
    }

    /// Flush buffered rows and finalize the file
    pub fn finish(self) -> Result<AveragedWriterStats, IoError> {
        let file_metadata = self.writer.close()?;

        Ok(AveragedWriterStats {
            curves_written: self.curves_written,
            points_written: self.points_written,
            row_groups_written: file_metadata.row_groups.len(),
        })
    }
}

/// Statistics from a completed write
#[derive(Debug, Clone)]
pub struct AveragedWriterStats {
    /// Number of curves (groups) written
    pub curves_written: usize,
    /// Number of grid points written
    pub points_written: usize,
    /// Number of Parquet row groups
    pub row_groups_written: usize,
}

impl std::fmt::Display for AveragedWriterStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Wrote {} averaged curves ({} points) in {} row groups",
            self.curves_written, self.points_written, self.row_groups_written
        )
    }
}

/// Averaged curves read back from a Parquet file
#[derive(Debug, Clone, Default)]
pub struct AveragedFile {
    /// Footer provenance
    pub metadata: AveragingMetadata,
    /// Curves in file order, split on label changes
    pub curves: Vec<(Option<String>, AveragedCurve)>,
}

fn float_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a Float64Array, IoError> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<Float64Array>())
        .ok_or_else(|| IoError::MissingColumn(name.to_string()))
}

/// Read an averaged curve Parquet file
pub fn read_averaged<P: AsRef<Path>>(path: P) -> Result<AveragedFile, IoError> {
    let file = File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;

    let kv: HashMap<String, String> = builder
        .metadata()
        .file_metadata()
        .key_value_metadata()
        .map(|entries| {
            entries
                .iter()
                .filter_map(|kv| kv.value.clone().map(|v| (kv.key.clone(), v)))
                .collect()
        })
        .unwrap_or_default();
    let metadata = AveragingMetadata::from_parquet_metadata(&kv)?;

    let mut curves: Vec<(Option<String>, AveragedCurve)> = Vec::new();
    let mut current: Option<(Option<String>, Vec<f64>, Vec<f64>, Vec<f64>)> = None;

    for batch in builder.build()? {
        let batch = batch?;
        let labels = batch
            .column_by_name(averaged_columns::LABEL)
            .and_then(|c| c.as_any().downcast_ref::<StringArray>())
            .ok_or_else(|| IoError::MissingColumn(averaged_columns::LABEL.to_string()))?;
        let voltage = float_column(&batch, averaged_columns::VOLTAGE)?;
        let mean = float_column(&batch, averaged_columns::MEAN)?;
        let sem = float_column(&batch, averaged_columns::SEM)?;

        for row in 0..batch.num_rows() {
            let label = (!labels.is_null(row)).then(|| labels.value(row).to_string());

            let same_group = matches!(&current, Some((l, ..)) if *l == label);
            if !same_group {
                if let Some((l, v, m, s)) = current.take() {
                    curves.push((l, AveragedCurve::new(v, m, s)?));
                }
                current = Some((label, Vec::new(), Vec::new(), Vec::new()));
            }

            if let Some((_, v, m, s)) = current.as_mut() {
                v.push(voltage.value(row));
                m.push(mean.value(row));
                s.push(sem.value(row));
            }
        }
    }

    if let Some((l, v, m, s)) = current {
        curves.push((l, AveragedCurve::new(v, m, s)?));
    }

    debug!("Read {} averaged curves from Parquet", curves.len());
    Ok(AveragedFile { metadata, curves })
}
