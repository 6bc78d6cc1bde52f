use std::path::Path;

use calamine::{Data, ExcelDateTime, Reader, open_workbook_auto};
use chrono::NaiveTime;
use serde_json::{Number, Value};

use crate::error::SpreadsheetError;
use crate::models::batch::Row;

const WORKBOOK_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xls", "xlsb", "ods"];

/// Loads the first sheet into memory, one object per row keyed by the header
/// row. Blank rows are dropped.
pub fn read_rows(path: &Path) -> Result<Vec<Row>, SpreadsheetError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    if extension == "csv" {
        read_csv_rows(path)
    } else if WORKBOOK_EXTENSIONS.contains(&extension.as_str()) {
        read_workbook_rows(path)
    } else {
        Err(SpreadsheetError::UnsupportedFormat(path.to_path_buf()))
    }
}

fn read_workbook_rows(path: &Path) -> Result<Vec<Row>, SpreadsheetError> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| SpreadsheetError::NoWorksheet(path.to_path_buf()))??;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header) => header.iter().map(|cell| cell.to_string()).collect(),
        None => return Err(SpreadsheetError::MissingHeader(path.to_path_buf())),
    };

    Ok(rows
        .map(|cells| build_row(&headers, cells.iter().map(cell_to_value)))
        .filter(|row| !is_blank(row))
        .collect())
}

fn read_csv_rows(path: &Path) -> Result<Vec<Row>, SpreadsheetError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.is_empty() {
        return Err(SpreadsheetError::MissingHeader(path.to_path_buf()));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row = build_row(
            &headers,
            record.iter().map(|field| {
                if field.trim().is_empty() {
                    Value::Null
                } else {
                    Value::String(field.to_string())
                }
            }),
        );
        if !is_blank(&row) {
            rows.push(row);
        }
    }
    Ok(rows)
}

// Short rows are padded with nulls so every row carries every header.
fn build_row(headers: &[String], values: impl Iterator<Item = Value>) -> Row {
    let mut values = values;
    headers
        .iter()
        .map(|header| (header.clone(), values.next().unwrap_or(Value::Null)))
        .collect()
}

fn is_blank(row: &Row) -> bool {
    row.values().all(Value::is_null)
}

fn cell_to_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::Int(i) => Value::from(*i),
        Data::Float(f) => float_to_value(*f),
        Data::Bool(b) => Value::Bool(*b),
        Data::String(s) if s.trim().is_empty() => Value::Null,
        Data::String(s) => Value::String(s.clone()),
        Data::DateTime(dt) => Value::String(excel_datetime_to_string(dt)),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Value::String(s.clone()),
        other => Value::String(other.to_string()),
    }
}

// ISO-8601; midnight collapses to a plain date. Durations keep the serial.
fn excel_datetime_to_string(dt: &ExcelDateTime) -> String {
    if dt.is_duration() {
        return dt.to_string();
    }
    match dt.as_datetime() {
        Some(datetime) if datetime.time() == NaiveTime::MIN => datetime.format("%Y-%m-%d").to_string(),
        Some(datetime) => datetime.format("%Y-%m-%dT%H:%M:%S").to_string(),
        None => dt.to_string(),
    }
}

fn float_to_value(f: f64) -> Value {
    if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        return Value::from(f as i64);
    }
    Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
}
