use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{
    Array, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::model::{ColumnData, Dataset};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a sensor dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one hydraulic cycle per record
/// * `.parquet` – flat primitive columns (no nested types)
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one cycle per record.
/// Column types are inferred from the values: all-integer → Int,
/// otherwise all-float (empty cells become NaN) → Float, otherwise Text.
fn load_csv(path: &Path) -> Result<Dataset> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut raw: Vec<Vec<String>> = vec![Vec::new(); headers.len()];

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        if record.len() != headers.len() {
            bail!(
                "CSV row {row_no}: {} fields, expected {}",
                record.len(),
                headers.len()
            );
        }
        for (col_idx, field) in record.iter().enumerate() {
            raw[col_idx].push(field.trim().to_string());
        }
    }

    let ordered = headers
        .into_iter()
        .zip(raw)
        .map(|(name, values)| (name, infer_column(values)))
        .collect();

    Dataset::new(ordered)
}

/// Infer the narrowest column type that holds every value.
fn infer_column(values: Vec<String>) -> ColumnData {
    if !values.is_empty() && values.iter().all(|v| v.parse::<i64>().is_ok()) {
        return ColumnData::Int(values.iter().map(|v| v.parse().unwrap_or(0)).collect());
    }
    if values
        .iter()
        .all(|v| v.is_empty() || v.parse::<f64>().is_ok())
    {
        return ColumnData::Float(
            values
                .iter()
                .map(|v| v.parse::<f64>().unwrap_or(f64::NAN))
                .collect(),
        );
    }
    ColumnData::Text(values)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with flat primitive columns.
///
/// Supported column types: Int32/Int64, Float32/Float64, Utf8/LargeUtf8 and
/// Boolean (read as 0/1). Null floats become NaN; nulls in any other column
/// type are load errors – the monitoring datasets have no missing values.
fn load_parquet(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut column_names: Vec<String> = Vec::new();
    let mut columns: Vec<ColumnData> = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        if column_names.is_empty() {
            for field in schema.fields() {
                column_names.push(field.name().clone());
                columns.push(empty_column_for(field.data_type(), field.name())?);
            }
        }

        for (idx, name) in column_names.iter().enumerate() {
            let array = batch.column(idx);
            append_column(&mut columns[idx], array, name)?;
        }
    }

    if column_names.is_empty() {
        bail!("parquet file contains no record batches");
    }

    Dataset::new(column_names.into_iter().zip(columns).collect())
}

fn empty_column_for(dt: &DataType, name: &str) -> Result<ColumnData> {
    match dt {
        DataType::Float32 | DataType::Float64 => Ok(ColumnData::Float(Vec::new())),
        DataType::Int32 | DataType::Int64 | DataType::Boolean => Ok(ColumnData::Int(Vec::new())),
        DataType::Utf8 | DataType::LargeUtf8 => Ok(ColumnData::Text(Vec::new())),
        other => bail!("column '{name}' has unsupported parquet type {other:?}"),
    }
}

/// Append one record batch's worth of values to an accumulating column.
fn append_column(col: &mut ColumnData, array: &Arc<dyn Array>, name: &str) -> Result<()> {
    match (col, array.data_type()) {
        (ColumnData::Float(out), DataType::Float64) => {
            let arr = array
                .as_any()
                .downcast_ref::<Float64Array>()
                .context("expected Float64Array")?;
            out.extend(arr.iter().map(|v| v.unwrap_or(f64::NAN)));
        }
        (ColumnData::Float(out), DataType::Float32) => {
            let arr = array
                .as_any()
                .downcast_ref::<Float32Array>()
                .context("expected Float32Array")?;
            out.extend(arr.iter().map(|v| v.map(f64::from).unwrap_or(f64::NAN)));
        }
        (ColumnData::Int(out), DataType::Int64) => {
            let arr = array
                .as_any()
                .downcast_ref::<Int64Array>()
                .context("expected Int64Array")?;
            for v in arr {
                out.push(v.with_context(|| format!("null value in integer column '{name}'"))?);
            }
        }
        (ColumnData::Int(out), DataType::Int32) => {
            let arr = array
                .as_any()
                .downcast_ref::<Int32Array>()
                .context("expected Int32Array")?;
            for v in arr {
                let v = v.with_context(|| format!("null value in integer column '{name}'"))?;
                out.push(i64::from(v));
            }
        }
        (ColumnData::Int(out), DataType::Boolean) => {
            let arr = array
                .as_any()
                .downcast_ref::<BooleanArray>()
                .context("expected BooleanArray")?;
            for v in arr {
                let v = v.with_context(|| format!("null value in boolean column '{name}'"))?;
                out.push(i64::from(v));
            }
        }
        (ColumnData::Text(out), DataType::Utf8) => {
            let arr = array
                .as_any()
                .downcast_ref::<StringArray>()
                .context("expected StringArray")?;
            for v in arr {
                let v = v.with_context(|| format!("null value in string column '{name}'"))?;
                out.push(v.to_string());
            }
        }
        (ColumnData::Text(out), DataType::LargeUtf8) => {
            use arrow::array::AsArray;
            let arr = array.as_string::<i64>();
            for v in arr {
                let v = v.with_context(|| format!("null value in string column '{name}'"))?;
                out.push(v.to_string());
            }
        }
        (_, other) => bail!("column '{name}': inconsistent batch type {other:?}"),
    }
    Ok(())
}
