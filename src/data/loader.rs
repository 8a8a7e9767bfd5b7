use std::fs::File;
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::error::LoadError;
use super::model::{
    normalize_column_name, parse_number, Column, ColumnKind, Record, Table, Value,
    NUMERIC_COLUMNS, REQUIRED_COLUMNS, TEXT_COLUMNS,
};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Field separator for files that are neither `.tsv`, `.json` nor Parquet.
    pub delimiter: u8,
    /// Fail unless every column in [`REQUIRED_COLUMNS`] is present.
    pub require_columns: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            require_columns: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a listings table with default options.
pub fn load(path: &Path) -> Result<Table, LoadError> {
    load_with(path, &LoadOptions::default())
}

/// Load a listings table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / anything else – delimited text with a header row
/// * `.tsv`                 – tab-separated text with a header row
/// * `.json`                – `[{ "brand": "...", "model": "...", ... }, ...]`
/// * `.parquet` / `.pq`     – flat Parquet file, one listing per row
pub fn load_with(path: &Path, options: &LoadOptions) -> Result<Table, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let raw = match ext.as_str() {
        "parquet" | "pq" => read_parquet(path)?,
        "json" => read_json(path)?,
        "tsv" => read_delimited(path, b'\t')?,
        _ => read_delimited(path, options.delimiter)?,
    };

    let (table, failed_cells) = coerce_table(raw);

    if options.require_columns {
        if let Some(missing) = REQUIRED_COLUMNS
            .iter()
            .find(|name| table.column_index(name).is_err())
        {
            return Err(LoadError::MissingColumn(missing.to_string()));
        }
    }

    if failed_cells > 0 {
        log::warn!(
            "{failed_cells} cell(s) in {} could not be parsed as numbers and were set to null",
            path.display()
        );
    }
    log::info!(
        "Loaded {} listings from {} ({} columns)",
        table.len(),
        path.display(),
        table.columns().len()
    );
    log::debug!("Schema: {:?}", table.columns());

    Ok(table)
}

// ---------------------------------------------------------------------------
// Raw (uncoerced) representation shared by all readers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum RawCell {
    Missing,
    Text(String),
    Integer(i64),
    Number(f64),
    Bool(bool),
}

struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<RawCell>>,
}

fn open(path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Delimited text loader
// ---------------------------------------------------------------------------

/// Header row followed by one listing per line.  Every row must have as
/// many fields as the header.
fn read_delimited(path: &Path, delimiter: u8) -> Result<RawTable, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_reader(open(path)?);

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let row = record
            .iter()
            .map(|field| {
                if field.is_empty() {
                    RawCell::Missing
                } else {
                    RawCell::Text(field.to_string())
                }
            })
            .collect();
        rows.push(row);
    }

    Ok(RawTable { headers, rows })
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "brand": "SAMSUNG", "model": "Galaxy F13", "ratings": 4.3, ... },
///   ...
/// ]
/// ```
///
/// Columns are the union of keys; a key missing from a row reads as missing.
fn read_json(path: &Path) -> Result<RawTable, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let root: JsonValue = serde_json::from_str(&text)?;

    let records = root
        .as_array()
        .ok_or_else(|| LoadError::InvalidShape("expected a top-level JSON array".into()))?;

    let mut headers: Vec<String> = Vec::new();
    let mut objects = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| LoadError::InvalidShape(format!("row {i} is not a JSON object")))?;
        for key in obj.keys() {
            if !headers.iter().any(|h| h == key) {
                headers.push(key.clone());
            }
        }
        objects.push(obj);
    }

    let rows = objects
        .into_iter()
        .map(|obj| {
            headers
                .iter()
                .map(|h| obj.get(h).map_or(RawCell::Missing, json_to_cell))
                .collect()
        })
        .collect();

    Ok(RawTable { headers, rows })
}

fn json_to_cell(val: &JsonValue) -> RawCell {
    match val {
        JsonValue::String(s) => RawCell::Text(s.clone()),
        JsonValue::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => RawCell::Integer(i),
            (None, Some(f)) => RawCell::Number(f),
            (None, None) => RawCell::Text(n.to_string()),
        },
        JsonValue::Bool(b) => RawCell::Bool(*b),
        JsonValue::Null => RawCell::Missing,
        other => RawCell::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a flat Parquet file.  Works with files written by both **Pandas**
/// (`df.to_parquet()`) and **Polars** (`df.write_parquet()`).
fn read_parquet(path: &Path) -> Result<RawTable, LoadError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(open(path)?)?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build()?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        let columns = batch.columns();
        for row in 0..batch.num_rows() {
            rows.push(columns.iter().map(|col| arrow_cell(col, row)).collect());
        }
    }

    Ok(RawTable { headers, rows })
}

/// Extract a single cell from an Arrow column at a given row.
fn arrow_cell(col: &ArrayRef, row: usize) -> RawCell {
    if col.is_null(row) {
        return RawCell::Missing;
    }
    let typed = match col.data_type() {
        DataType::Utf8 => col
            .as_string_opt::<i32>()
            .map(|a| RawCell::Text(a.value(row).to_string())),
        DataType::LargeUtf8 => col
            .as_string_opt::<i64>()
            .map(|a| RawCell::Text(a.value(row).to_string())),
        DataType::Int32 => col
            .as_primitive_opt::<Int32Type>()
            .map(|a| RawCell::Integer(i64::from(a.value(row)))),
        DataType::Int64 => col
            .as_primitive_opt::<Int64Type>()
            .map(|a| RawCell::Integer(a.value(row))),
        DataType::Float32 => col
            .as_primitive_opt::<Float32Type>()
            .map(|a| RawCell::Number(a.value(row) as f64)),
        DataType::Float64 => col
            .as_primitive_opt::<Float64Type>()
            .map(|a| RawCell::Number(a.value(row))),
        DataType::Boolean => col.as_boolean_opt().map(|a| RawCell::Bool(a.value(row))),
        _ => None,
    };
    // Everything else (small ints, dates, decimals...) goes through its display form.
    typed.unwrap_or_else(|| {
        array_value_to_string(col.as_ref(), row)
            .map(RawCell::Text)
            .unwrap_or(RawCell::Missing)
    })
}

// ---------------------------------------------------------------------------
// Coercion
// ---------------------------------------------------------------------------

/// Normalise headers, decide each column's kind and coerce every cell.
/// Returns the table and the number of cells that failed numeric parsing.
fn coerce_table(raw: RawTable) -> (Table, usize) {
    let columns: Vec<Column> = raw
        .headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            let name = normalize_column_name(header);
            let kind = column_kind(&name, raw.rows.iter().map(|r| r.get(idx)));
            Column::new(name, kind)
        })
        .collect();

    let mut failed = 0;
    let records = raw
        .rows
        .into_iter()
        .map(|row| {
            let mut cells = row.into_iter();
            let values = columns
                .iter()
                .map(|col| {
                    let cell = cells.next().unwrap_or(RawCell::Missing);
                    let (value, ok) = coerce_cell(col.kind, cell);
                    if !ok {
                        failed += 1;
                    }
                    value
                })
                .collect();
            Record::new(values)
        })
        .collect();

    (Table::new(columns, records), failed)
}

fn column_kind<'a>(name: &str, cells: impl Iterator<Item = Option<&'a RawCell>>) -> ColumnKind {
    if NUMERIC_COLUMNS.contains(&name) {
        return ColumnKind::Numeric;
    }
    if TEXT_COLUMNS.contains(&name) {
        return ColumnKind::Text;
    }

    let mut any = false;
    for cell in cells.flatten() {
        match cell {
            RawCell::Missing => {}
            RawCell::Integer(_) => any = true,
            RawCell::Number(v) if v.is_finite() => any = true,
            RawCell::Text(s) if parse_number(s).is_some() => any = true,
            _ => return ColumnKind::Text,
        }
    }
    if any {
        ColumnKind::Numeric
    } else {
        ColumnKind::Text
    }
}

/// Coerce one cell.  The flag is false when a non-empty cell failed numeric parsing.
fn coerce_cell(kind: ColumnKind, cell: RawCell) -> (Value, bool) {
    match kind {
        ColumnKind::Numeric => match cell {
            RawCell::Missing => (Value::Null, true),
            RawCell::Integer(i) => (Value::Number(i as f64), true),
            RawCell::Number(v) => (Value::number(v), v.is_finite()),
            RawCell::Bool(b) => (Value::Number(if b { 1.0 } else { 0.0 }), true),
            RawCell::Text(s) if s.trim().is_empty() => (Value::Null, true),
            RawCell::Text(s) => match parse_number(&s) {
                Some(v) => (Value::Number(v), true),
                None => (Value::Null, false),
            },
        },
        ColumnKind::Text => {
            let text = match cell {
                RawCell::Missing => String::new(),
                RawCell::Text(s) => s,
                RawCell::Integer(i) => i.to_string(),
                RawCell::Number(v) => float_text(v),
                RawCell::Bool(b) => b.to_string(),
            };
            (Value::Text(text), true)
        }
    }
}

/// Whole floats keep a trailing `.0` (`4.0`, not `4`) so a float cell never
/// reads like an integer one.
fn float_text(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 {
        format!("{v:.1}")
    } else {
        v.to_string()
    }
}
