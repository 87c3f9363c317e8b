//! CSV curve input and averaged curve output.
//!
//! Input needs a header row with `voltage` and `current` columns (matched case
//! insensitively; other columns are ignored). Optional `label` and `replicate`
//! columns split the rows into one curve per distinct `(label, replicate)` pair,
//! in order of first appearance, so a whole session export can be read in one
//! go. Empty label or replicate fields count as absent.

use std::collections::BTreeMap;
use std::io::{Read, Write};

use ::csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};

use super::IoError;
use crate::averaged::AveragedCurve;
use crate::curve::{Curve, CurvePoint};

const VOLTAGE_COLUMN: &str = "voltage";
const CURRENT_COLUMN: &str = "current";
const LABEL_COLUMN: &str = "label";
const REPLICATE_COLUMN: &str = "replicate";

fn find_column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.eq_ignore_ascii_case(name))
}

fn optional_field(record: &StringRecord, index: Option<usize>) -> Option<String> {
    index
        .and_then(|i| record.get(i))
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn parse_field(record: &StringRecord, index: usize, column: &str, row: usize) -> Result<f64, IoError> {
    let raw = record.get(index).unwrap_or("");
    raw.parse().map_err(|_| IoError::InvalidValue {
        column: column.to_string(),
        row,
        value: raw.to_string(),
    })
}

/// Parse curves from CSV with a header row
pub fn read_curves<R: Read>(reader: R) -> Result<Vec<Curve>, IoError> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let voltage_index = find_column(&headers, VOLTAGE_COLUMN)
        .ok_or_else(|| IoError::MissingColumn(VOLTAGE_COLUMN.to_string()))?;
    let current_index = find_column(&headers, CURRENT_COLUMN)
        .ok_or_else(|| IoError::MissingColumn(CURRENT_COLUMN.to_string()))?;
    let label_index = find_column(&headers, LABEL_COLUMN);
    let replicate_index = find_column(&headers, REPLICATE_COLUMN);

    let mut keys: Vec<(Option<String>, Option<String>)> = Vec::new();
    let mut curves: Vec<Curve> = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        let row = row + 1;
        let point = CurvePoint::new(
            parse_field(&record, voltage_index, VOLTAGE_COLUMN, row)?,
            parse_field(&record, current_index, CURRENT_COLUMN, row)?,
        );

        let key = (
            optional_field(&record, label_index),
            optional_field(&record, replicate_index),
        );
        let slot = match keys.iter().position(|k| *k == key) {
            Some(slot) => slot,
            None => {
                curves.push(Curve {
                    label: key.0.clone(),
                    points: Vec::new(),
                });
                keys.push(key);
                curves.len() - 1
            }
        };
        curves[slot].points.push(point);
    }

    if curves.is_empty() {
        // A header-only file is one empty curve; the aligner reports it.
        curves.push(Curve::default());
    }

    Ok(curves)
}

/// Write an averaged curve as `voltage,mean,sem`
pub fn write_averaged<W: Write>(writer: W, averaged: &AveragedCurve) -> Result<(), IoError> {
    let mut writer = WriterBuilder::new().from_writer(writer);
    writer.write_record(["voltage", "mean", "sem"])?;
    for (voltage, mean, sem) in averaged.rows() {
        writer.serialize((voltage, mean, sem))?;
    }
    writer.flush()?;
    Ok(())
}

/// Write several labelled averaged curves as `label,voltage,mean,sem`
pub fn write_labelled<W: Write>(
    writer: W,
    groups: &[(&str, &AveragedCurve)],
) -> Result<(), IoError> {
    let mut writer = WriterBuilder::new().from_writer(writer);
    writer.write_record(["label", "voltage", "mean", "sem"])?;
    for (label, averaged) in groups {
        for (voltage, mean, sem) in averaged.rows() {
            writer.serialize((label, voltage, mean, sem))?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Write curves as `label,replicate,voltage,current`.
///
/// Replicates are numbered from 1 within each label, so curves sharing a label
/// read back as separate curves.
pub fn write_curves<W: Write>(writer: W, curves: &[Curve]) -> Result<(), IoError> {
    let mut writer = WriterBuilder::new().from_writer(writer);
    writer.write_record(["label", "replicate", "voltage", "current"])?;
    let mut replicates: BTreeMap<&str, usize> = BTreeMap::new();
    for curve in curves {
        let label = curve.label.as_deref().unwrap_or("");
        let replicate = replicates.entry(label).or_insert(0);
        *replicate += 1;
        for point in &curve.points {
            writer.serialize((label, *replicate, point.voltage, point.current))?;
        }
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_simple() {
        let data = "Time,Voltage,Current\n0,-0.1,10\n1, 0.0 ,20\n";
        let curves = read_curves(data.as_bytes()).unwrap();
        assert_eq!(curves.len(), 1);
        assert_eq!(curves[0].voltages(), vec![-0.1, 0.0]);
        assert_eq!(curves[0].currents(), vec![10.0, 20.0]);
    }

    #[test]
    fn test_read_split_by_label() {
        let data = "label,voltage,current\nb,0.0,1\na,0.0,2\nb,0.1,3\n";
        let curves = read_curves(data.as_bytes()).unwrap();
        assert_eq!(curves.len(), 2);
        assert_eq!(curves[0].label.as_deref(), Some("b"));
        assert_eq!(curves[0].currents(), vec![1.0, 3.0]);
        assert_eq!(curves[1].label.as_deref(), Some("a"));
    }

    #[test]
    fn test_missing_column() {
        let result = read_curves("voltage,amps\n0.0,1.0\n".as_bytes());
        assert!(matches!(result, Err(IoError::MissingColumn(c)) if c == "current"));
    }

    #[test]
    fn test_invalid_value() {
        let result = read_curves("voltage,current\n0.0,1.0\n0.1,abc\n".as_bytes());
        match result {
            Err(IoError::InvalidValue { column, row, value }) => {
                assert_eq!(column, "current");
                assert_eq!(row, 2);
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_header_only_is_empty_curve() {
        let curves = read_curves("voltage,current\n".as_bytes()).unwrap();
        assert_eq!(curves.len(), 1);
        assert!(curves[0].is_empty());
    }

    #[test]
    fn test_write_averaged() {
        let averaged = AveragedCurve::new(vec![0.0, 0.1], vec![1.0, 2.5], vec![0.0, 0.5]).unwrap();
        let mut buffer = Vec::new();
        write_averaged(&mut buffer, &averaged).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text, "voltage,mean,sem\n0.0,1.0,0.0\n0.1,2.5,0.5\n");
    }

    #[test]
    fn test_write_curves_reads_back() {
        let curves = vec![
            Curve::from(vec![(0.0, 1.0), (0.1, 2.0)]).with_label("x"),
            Curve::from(vec![(0.0, 3.0)]).with_label("y"),
        ];
        let mut buffer = Vec::new();
        write_curves(&mut buffer, &curves).unwrap();

        let parsed = read_curves(buffer.as_slice()).unwrap();
        assert_eq!(parsed, curves);
    }

    #[test]
    fn test_same_label_replicates_stay_separate() {
        let curves = vec![
            Curve::from(vec![(0.0, 1.0), (0.1, 2.0)]).with_label("50 mV/s"),
            Curve::from(vec![(0.0, 3.0), (0.1, 4.0)]).with_label("50 mV/s"),
        ];
        let mut buffer = Vec::new();
        write_curves(&mut buffer, &curves).unwrap();

        let text = String::from_utf8(buffer.clone()).unwrap();
        assert!(text.starts_with("label,replicate,voltage,current\n50 mV/s,1,"));

        let parsed = read_curves(buffer.as_slice()).unwrap();
        assert_eq!(parsed, curves);

        let averaged = crate::aligner::align(&parsed).unwrap();
        assert_eq!(averaged.mean(), &[2.0, 3.0]);
        assert!(averaged.sem().iter().all(|&s| s > 0.0));
    }

    #[test]
    fn test_split_by_label_and_replicate() {
        let data = "label,replicate,voltage,current\n\
                    a,1,0.0,1\na,1,0.1,2\na,2,0.0,3\nb,1,0.0,4\na,2,0.1,5\n";
        let curves = read_curves(data.as_bytes()).unwrap();
        assert_eq!(curves.len(), 3);
        assert_eq!(curves[1].label.as_deref(), Some("a"));
        assert_eq!(curves[1].currents(), vec![3.0, 5.0]);
        assert_eq!(curves[2].label.as_deref(), Some("b"));
    }

    #[test]
    fn test_empty_label_reads_as_unlabelled() {
        let curves = vec![Curve::from(vec![(0.0, 1.0), (0.1, 2.0)])];
        let mut buffer = Vec::new();
        write_curves(&mut buffer, &curves).unwrap();

        let parsed = read_curves(buffer.as_slice()).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].label, None);

        let parsed = read_curves("label,voltage,current\n,0.0,1.0\n".as_bytes()).unwrap();
        assert_eq!(parsed[0].label, None);
    }
}
