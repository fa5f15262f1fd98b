use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use arrow::array::{
    Array, BooleanArray, Date32Array, Float32Array, Float64Array, Int32Array, Int64Array,
    LargeStringArray, StringArray,
};
use arrow::datatypes::DataType;
use calamine::{open_workbook_auto, Data, Reader};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, RawTable};
use crate::error::SnapshotError;

/// Spreadsheet extensions handled by calamine.
const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Per-sheet file extensions accepted inside a directory workbook, in lookup order.
const SHEET_FILE_EXTENSIONS: &[&str] = &["parquet", "pq", "csv", "json"];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load one sheet of a workbook.
///
/// `path` is either a spreadsheet file (`.xlsx`, `.xls`, `.ods`, ...) or a
/// directory holding one file per sheet (`<sheet>.parquet`, `<sheet>.csv`
/// or `<sheet>.json`). The first row of a spreadsheet is the header row.
pub fn load_sheet(path: &Path, sheet: &str) -> crate::error::Result<RawTable> {
    let loaded = if path.is_dir() {
        load_directory_sheet(path, sheet)
    } else if path.is_file() {
        load_workbook_sheet(path, sheet)
    } else {
        return Err(SnapshotError::data_source(path, sheet, "no such file or directory"));
    };

    match loaded {
        Ok(table) => {
            log::debug!(
                "Loaded sheet '{sheet}' from {}: {} rows, columns {:?}",
                path.display(),
                table.len(),
                table.columns
            );
            Ok(table)
        }
        Err(e) => Err(SnapshotError::data_source(path, sheet, format!("{e:#}"))),
    }
}

// ---------------------------------------------------------------------------
// Spreadsheet loader
// ---------------------------------------------------------------------------

fn load_workbook_sheet(path: &Path, sheet: &str) -> Result<RawTable> {
    let ext = extension_of(path);
    if !WORKBOOK_EXTENSIONS.contains(&ext.as_str()) {
        bail!("Unsupported workbook extension: .{ext}");
    }

    let mut workbook = open_workbook_auto(path).context("opening workbook")?;
    if !workbook.sheet_names().iter().any(|name| name == sheet) {
        bail!(
            "sheet not found (available: {})",
            workbook.sheet_names().join(", ")
        );
    }
    let range = workbook
        .worksheet_range(sheet)
        .with_context(|| format!("reading sheet '{sheet}'"))?;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(RawTable::new(sheet, Vec::new(), Vec::new()));
    };

    let columns: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(i, cell)| match cell {
            Data::Empty => format!("Unnamed: {i}"),
            other => other.to_string(),
        })
        .collect();

    let records = rows
        .map(|cells| cells.iter().map(data_to_cell).collect::<Vec<_>>())
        .filter(|cells| !cells.iter().all(CellValue::is_null));

    Ok(RawTable::from_records(sheet, columns, records))
}

fn data_to_cell(data: &Data) -> CellValue {
    match data {
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ts) => CellValue::Date(ts.format("%Y-%m-%d").to_string()),
            None => CellValue::Float(dt.as_f64()),
        },
        Data::DateTimeIso(s) => CellValue::Date(s.chars().take(10).collect()),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) | Data::Empty => CellValue::Null,
    }
}

// ---------------------------------------------------------------------------
// Directory workbook: one file per sheet
// ---------------------------------------------------------------------------

fn load_directory_sheet(dir: &Path, sheet: &str) -> Result<RawTable> {
    let file = sheet_file(dir, sheet).with_context(|| {
        format!(
            "no {} file for this sheet",
            SHEET_FILE_EXTENSIONS
                .iter()
                .map(|e| format!("'{sheet}.{e}'"))
                .collect::<Vec<_>>()
                .join(" / ")
        )
    })?;

    match extension_of(&file).as_str() {
        "parquet" | "pq" => load_parquet(&file, sheet),
        "json" => load_json(&file, sheet),
        "csv" => load_csv(&file, sheet),
        other => bail!("Unsupported sheet file extension: .{other}"),
    }
}

fn sheet_file(dir: &Path, sheet: &str) -> Option<PathBuf> {
    SHEET_FILE_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{sheet}.{ext}")))
        .find(|candidate| candidate.is_file())
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one sheet row per record.
/// Cell types are guessed (integer, float, bool, otherwise text), so
/// currency text such as `"$1,234"` stays text.
fn load_csv(path: &Path, sheet: &str) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .context("opening CSV")?;
    let columns: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut records = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        records.push(record.iter().map(guess_cell_type).collect::<Vec<_>>());
    }

    Ok(RawTable::from_records(sheet, columns, records))
}

fn guess_cell_type(s: &str) -> CellValue {
    if s.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    if s == "true" || s == "false" {
        return CellValue::Bool(s == "true");
    }
    CellValue::Text(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Support Category": "All", "State/Territory": "All Australia", "Period": "2025-Q2", ... },
///   ...
/// ]
/// ```
///
/// Column order follows the keys of the first record.
fn load_json(path: &Path, sheet: &str) -> Result<RawTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut columns: Vec<String> = Vec::new();
    let mut rows = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        for key in obj.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
        rows.push(obj);
    }

    let records = rows.into_iter().map(|obj| {
        columns
            .iter()
            .map(|col| obj.get(col).map(json_to_cell).unwrap_or(CellValue::Null))
            .collect::<Vec<_>>()
    });
    Ok(RawTable::from_records(sheet, columns.clone(), records))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet sheet. Every column becomes a sheet column; strings,
/// integers, floats, booleans and `Date32` values are understood.
///
/// Works with files written by **Pandas** (`df.to_parquet()`), **Polars**
/// and the bundled `generate_sample` binary.
fn load_parquet(path: &Path, sheet: &str) -> Result<RawTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            records.push(
                batch
                    .columns()
                    .iter()
                    .map(|col| extract_cell(col.as_ref(), row))
                    .collect::<Vec<_>>(),
            );
        }
    }

    Ok(RawTable::from_records(sheet, columns, records))
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &dyn Array, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    let any = col.as_any();
    let cell = match col.data_type() {
        DataType::Utf8 => any
            .downcast_ref::<StringArray>()
            .map(|a| CellValue::Text(a.value(row).to_string())),
        DataType::LargeUtf8 => any
            .downcast_ref::<LargeStringArray>()
            .map(|a| CellValue::Text(a.value(row).to_string())),
        DataType::Int32 => any
            .downcast_ref::<Int32Array>()
            .map(|a| CellValue::Integer(a.value(row) as i64)),
        DataType::Int64 => any
            .downcast_ref::<Int64Array>()
            .map(|a| CellValue::Integer(a.value(row))),
        DataType::Float32 => any
            .downcast_ref::<Float32Array>()
            .map(|a| CellValue::Float(a.value(row) as f64)),
        DataType::Float64 => any
            .downcast_ref::<Float64Array>()
            .map(|a| CellValue::Float(a.value(row))),
        DataType::Boolean => any
            .downcast_ref::<BooleanArray>()
            .map(|a| CellValue::Bool(a.value(row))),
        DataType::Date32 => any
            .downcast_ref::<Date32Array>()
            .and_then(|a| a.value_as_date(row))
            .map(|d| CellValue::Date(d.format("%Y-%m-%d").to_string())),
        other => Some(CellValue::Text(format!("{other:?}"))),
    };
    cell.unwrap_or(CellValue::Null)
}
