//! Workbook/CSV decoding
//!
//! Turns uploaded file bytes into a header row plus data rows of
//! [`CellValue`]s. Only the first worksheet of a workbook is read; the first
//! row is always treated as headers.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};

use super::cell::CellValue;
use super::ImportError;

/// Decoded sheet: header row and data rows, in file order.
#[derive(Debug)]
pub struct Sheet {
    pub headers: Vec<CellValue>,
    pub rows: Vec<Vec<CellValue>>,
}

/// Decode an uploaded file by extension.
///
/// `.csv` goes through the CSV reader; `.xlsx`/`.xls`/`.xlsm` through
/// calamine. Anything else is rejected before decoding is attempted.
pub fn decode(file_name: &str, bytes: &[u8]) -> Result<Sheet, ImportError> {
    let lower = file_name.to_lowercase();

    let mut all_rows = if lower.ends_with(".csv") {
        decode_csv(bytes)?
    } else if lower.ends_with(".xlsx") || lower.ends_with(".xls") || lower.ends_with(".xlsm") {
        decode_workbook(bytes)?
    } else {
        return Err(ImportError::UnreadableFile(format!(
            "unsupported file type: {file_name}"
        )));
    };

    if all_rows.len() < 2 {
        return Err(ImportError::NoDataRows);
    }

    let headers = all_rows.remove(0);
    Ok(Sheet {
        headers,
        rows: all_rows,
    })
}

fn decode_workbook(bytes: &[u8]) -> Result<Vec<Vec<CellValue>>, ImportError> {
    let cursor = Cursor::new(bytes);
    let mut workbook = open_workbook_auto_from_rs(cursor)
        .map_err(|e| ImportError::UnreadableFile(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ImportError::UnreadableFile("workbook has no sheets".to_string()))?
        .map_err(|e| ImportError::UnreadableFile(e.to_string()))?;

    let rows = range
        .rows()
        .map(|row| row.iter().map(cell_from_data).collect())
        .collect();

    Ok(rows)
}

fn cell_from_data(data: &Data) -> CellValue {
    match data {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Text(b.to_string()),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

fn decode_csv(bytes: &[u8]) -> Result<Vec<Vec<CellValue>>, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ImportError::UnreadableFile(e.to_string()))?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        CellValue::Empty
                    } else {
                        CellValue::Text(field.to_string())
                    }
                })
                .collect(),
        );
    }

    Ok(rows)
}
