use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use calamine::{Data, Reader, open_workbook_auto};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{FacilityRecord, FacilityTable, number_cell, text_cell};
use crate::config::ColumnNames;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a facility table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xls` / `.xlsb` / `.ods` – first worksheet, header in row 1
/// * `.csv` / `.tsv`  – header row with column names
/// * `.json`          – `[{ "Site name": "...", "Ward": 1, ... }, ...]`
/// * `.parquet`       – flat columns of strings / numbers / bools
pub fn load_file(path: &Path, columns: &ColumnNames) -> Result<FacilityTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let raw = match ext.as_str() {
        "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => read_spreadsheet(path)?,
        "csv" => read_delimited(path, b',')?,
        "tsv" => read_delimited(path, b'\t')?,
        "json" => read_json(path)?,
        "parquet" | "pq" => read_parquet(path)?,
        other => bail!("Unsupported file extension: .{other}"),
    };

    build_table(raw, columns).with_context(|| format!("loading {}", path.display()))
}

// ---------------------------------------------------------------------------
// Format-independent intermediate table
// ---------------------------------------------------------------------------

/// Header names plus rows of optional cell text, as read from any format.
#[derive(Debug, Default)]
struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

/// Map raw columns onto facility fields by header name.
///
/// `Site name` and `Coordinates` (or their configured equivalents) are
/// required; any other missing column is logged and left empty.
fn build_table(raw: RawTable, columns: &ColumnNames) -> Result<FacilityTable> {
    let find = |name: &str| raw.headers.iter().position(|h| h.trim() == name);

    let name_idx = find(&columns.name).with_context(|| format!("missing '{}' column", columns.name))?;
    let coord_idx = find(&columns.coordinates)
        .with_context(|| format!("missing '{}' column", columns.coordinates))?;

    let optional = |name: &str| {
        let idx = find(name);
        if idx.is_none() {
            log::warn!("Column '{name}' not found; its values are treated as empty");
        }
        idx
    };
    let address_idx = optional(&columns.address);
    let district_idx = optional(&columns.district);
    let insurance_idx = optional(&columns.insurance);
    let services_idx = optional(&columns.services);
    let populations_idx = optional(&columns.populations);
    let walk_in_idx = optional(&columns.walk_in);

    let mapped = [
        Some(name_idx),
        Some(coord_idx),
        address_idx,
        district_idx,
        insurance_idx,
        services_idx,
        populations_idx,
        walk_in_idx,
    ];
    let extra_cols: Vec<(usize, String)> = raw
        .headers
        .iter()
        .enumerate()
        .filter(|(i, h)| !mapped.contains(&Some(*i)) && !h.trim().is_empty())
        .map(|(i, h)| (i, h.clone()))
        .collect();

    let mut records = Vec::with_capacity(raw.rows.len());
    for row in &raw.rows {
        let cell = |idx: Option<usize>| idx.and_then(|i| row.get(i).cloned().flatten());

        // Fully blank rows are spreadsheet padding.
        if row.iter().all(Option::is_none) {
            continue;
        }

        let mut extra = BTreeMap::new();
        for (i, header) in &extra_cols {
            if let Some(value) = cell(Some(*i)) {
                extra.insert(header.clone(), value);
            }
        }

        records.push(FacilityRecord {
            name: cell(Some(name_idx)),
            address: cell(address_idx),
            coordinates: cell(Some(coord_idx)),
            district: cell(district_idx),
            insurance: cell(insurance_idx),
            services: cell(services_idx),
            populations: cell(populations_idx),
            walk_in: cell(walk_in_idx),
            extra,
        });
    }

    let extra_columns = extra_cols.into_iter().map(|(_, h)| h).collect();
    Ok(FacilityTable::new(records, extra_columns))
}

// ---------------------------------------------------------------------------
// Spreadsheet loader
// ---------------------------------------------------------------------------

/// First worksheet of the workbook; row 1 holds the column names.
fn read_spreadsheet(path: &Path) -> Result<RawTable> {
    let mut workbook = open_workbook_auto(path).context("opening workbook")?;
    let range = workbook
        .worksheet_range_at(0)
        .context("workbook has no worksheets")?
        .context("reading first worksheet")?;

    let mut rows = range.rows();
    let headers = rows
        .next()
        .context("worksheet is empty")?
        .iter()
        .map(|c| c.to_string())
        .collect();

    let rows = rows
        .map(|row| row.iter().map(spreadsheet_cell).collect())
        .collect();

    Ok(RawTable { headers, rows })
}

fn spreadsheet_cell(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => text_cell(s),
        Data::Float(f) => number_cell(*f),
        Data::Int(i) => Some(i.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        Data::Error(e) => {
            log::warn!("Spreadsheet cell error {e:?} treated as empty");
            None
        }
        other => text_cell(&other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Delimited text loader
// ---------------------------------------------------------------------------

fn read_delimited(path: &Path, delimiter: u8) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_path(path)
        .context("opening delimited file")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("row {row_no}"))?;
        rows.push(record.iter().map(text_cell).collect());
    }

    Ok(RawTable { headers, rows })
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Site name": "Unity Health", "Ward": 8, "Coordinates": "(38.83, -77.0)" },
///   ...
/// ]
/// ```
fn read_json(path: &Path) -> Result<RawTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut headers: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let rows = records
        .iter()
        .filter_map(JsonValue::as_object)
        .map(|obj| {
            headers
                .iter()
                .map(|h| obj.get(h).and_then(json_cell))
                .collect()
        })
        .collect();

    Ok(RawTable { headers, rows })
}

fn json_cell(val: &JsonValue) -> Option<String> {
    match val {
        JsonValue::String(s) => text_cell(s),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else {
                n.as_f64().and_then(number_cell)
            }
        }
        JsonValue::Bool(b) => Some(b.to_string()),
        JsonValue::Null => None,
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of facility rows.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`). Every column becomes text.
fn read_parquet(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            let cells = (0..batch.num_columns())
                .map(|col| parquet_cell(batch.column(col), row))
                .collect();
            rows.push(cells);
        }
    }

    Ok(RawTable { headers, rows })
}

/// Extract a single cell from an Arrow column at a given row.
fn parquet_cell(col: &Arc<dyn Array>, row: usize) -> Option<String> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Utf8 => text_cell(col.as_string::<i32>().value(row)),
        DataType::LargeUtf8 => text_cell(col.as_string::<i64>().value(row)),
        DataType::Int32 => Some(col.as_primitive::<Int32Type>().value(row).to_string()),
        DataType::Int64 => Some(col.as_primitive::<Int64Type>().value(row).to_string()),
        DataType::Float32 => number_cell(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => number_cell(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => Some(col.as_boolean().value(row).to_string()),
        other => {
            log::debug!("Unsupported parquet column type {other:?} treated as empty");
            None
        }
    }
}
