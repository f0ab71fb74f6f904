//! Column mapper
//!
//! Uploaded sheets name their columns inconsistently ("Case Nbr",
//! "Case Number", "CASE NUMBER "). The mapper normalizes each header cell
//! and runs it through an ordered rule table; the first matching rule wins
//! per cell. If two columns map to the same field, the later column wins —
//! duplicate semantic columns are an accepted source-sheet ambiguity, not
//! something to repair here.

use std::collections::HashMap;

use super::cell::CellValue;
use super::ImportError;

/// Canonical fields of the case-record sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaseField {
    CaseNumber,
    SaleType,
    Director,
    DateOfDeath,
    CustomerFirstName,
    CustomerLastName,
    ServiceType,
    TotalSale,
    PaymentsReceived,
    DatePaidInFull,
    Aging,
}

/// Ordered header-matching rules. Order matters: "sale type" must be
/// claimed before the bare "service"/"sale" style rules get a chance.
const HEADER_RULES: &[(fn(&str) -> bool, CaseField)] = &[
    (
        |h| h.contains("case") && (h.contains("number") || h.contains("nbr")),
        CaseField::CaseNumber,
    ),
    (
        |h| h.contains("sale") && h.contains("type"),
        CaseField::SaleType,
    ),
    (|h| h.contains("director"), CaseField::Director),
    (
        |h| h.contains("date") && h.contains("death"),
        CaseField::DateOfDeath,
    ),
    (
        |h| h.contains("customer") && h.contains("first"),
        CaseField::CustomerFirstName,
    ),
    (
        |h| h.contains("customer") && (h.contains("last") || h == "customer"),
        CaseField::CustomerLastName,
    ),
    (|h| h.contains("service"), CaseField::ServiceType),
    (
        |h| h.contains("total") && h.contains("sale"),
        CaseField::TotalSale,
    ),
    (|h| h.contains("payment"), CaseField::PaymentsReceived),
    (
        |h| h.contains("date") && h.contains("pif"),
        CaseField::DatePaidInFull,
    ),
    (
        |h| h == "ag" || h.contains("aging") || h.contains("age"),
        CaseField::Aging,
    ),
];

/// Field-name → column-index map built once per import from the header row.
#[derive(Debug, Clone)]
pub struct ColumnMap {
    indices: HashMap<CaseField, usize>,
}

impl ColumnMap {
    /// Build the map from the header row.
    ///
    /// A sheet without a recognizable case-number column is rejected here,
    /// before any data row is touched.
    pub fn from_headers(headers: &[CellValue]) -> Result<Self, ImportError> {
        let mut indices = HashMap::new();

        for (index, header) in headers.iter().enumerate() {
            let normalized = header.as_trimmed().to_lowercase();
            if normalized.is_empty() {
                continue;
            }
            for (matches, field) in HEADER_RULES {
                if matches(&normalized) {
                    indices.insert(*field, index);
                    break;
                }
            }
        }

        if !indices.contains_key(&CaseField::CaseNumber) {
            return Err(ImportError::NoCaseNumberColumn);
        }

        Ok(Self { indices })
    }

    pub fn get(&self, field: CaseField) -> Option<usize> {
        self.indices.get(&field).copied()
    }

    /// The cell mapped to `field` in `row`, or a blank cell if the field is
    /// unmapped or the row is short.
    pub fn cell<'a>(&self, row: &'a [CellValue], field: CaseField) -> &'a CellValue {
        self.get(field)
            .and_then(|index| row.get(index))
            .unwrap_or(&CellValue::Empty)
    }
}
