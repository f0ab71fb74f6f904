//! Cell values and value parsers
//!
//! Spreadsheet cells arrive as an untyped union of string, number, or blank.
//! `CellValue` makes that explicit so the parsers can be exhaustive. The
//! parsers never fail: an unparseable date is `None`, an unparseable number
//! is `0.0` (a missing financial figure defaults to zero).

use chrono::{Duration, NaiveDate};

/// A raw spreadsheet cell as decoded from the workbook or CSV.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Empty,
}

/// Excel 1900-system date epoch. Serial 1 is 1900-01-01; using day 0 at
/// 1899-12-30 absorbs Excel's phantom 1900-02-29.
const EXCEL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// Largest serial Excel itself will represent (9999-12-31).
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

impl CellValue {
    /// The cell rendered as a trimmed string, the way a spreadsheet would
    /// display it. Integral numbers drop their fractional part so a numeric
    /// case number cell yields "2024", not "2024.0".
    pub fn as_trimmed(&self) -> String {
        match self {
            CellValue::Text(s) => s.trim().to_string(),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            CellValue::Empty => String::new(),
        }
    }

    /// True for blank cells and whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(_) => false,
            CellValue::Empty => true,
        }
    }
}

/// Parse a cell into a calendar date.
///
/// Text cells are tried against the formats human-maintained exports
/// actually contain; numeric cells are decoded as Excel date serials.
/// Failure is always `None`, never an error — the caller decides whether a
/// missing date matters for the field at hand.
pub fn parse_date(value: &CellValue) -> Option<NaiveDate> {
    match value {
        CellValue::Text(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            for format in ["%Y-%m-%d", "%m/%d/%Y", "%m/%d/%y", "%Y/%m/%d"] {
                if let Ok(date) = NaiveDate::parse_from_str(s, format) {
                    return Some(date);
                }
            }
            None
        }
        CellValue::Number(serial) => excel_serial_to_date(*serial),
        CellValue::Empty => None,
    }
}

/// Decode an Excel 1900-system date serial.
fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 || serial > MAX_EXCEL_SERIAL {
        return None;
    }
    let (y, m, d) = EXCEL_EPOCH;
    let epoch = NaiveDate::from_ymd_opt(y, m, d)?;
    epoch.checked_add_signed(Duration::days(serial.trunc() as i64))
}

/// Parse a cell into a decimal amount.
///
/// Currency text is cleaned of `$` and thousands separators first. Anything
/// unparseable, including blanks, yields `0.0`.
pub fn parse_number(value: &CellValue) -> f64 {
    match value {
        CellValue::Number(n) => *n,
        CellValue::Text(s) => {
            let cleaned = s.trim().replace(['$', ','], "");
            cleaned.parse::<f64>().unwrap_or(0.0)
        }
        CellValue::Empty => 0.0,
    }
}
