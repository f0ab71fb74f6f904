//! Row validation and transformation
//!
//! One pass per data row, sequential checks, first failure wins. Rows are
//! processed in file order so error messages carry the spreadsheet row
//! number the user sees (data index + 2, accounting for the header row).

use std::collections::HashSet;

use chrono::Utc;
use uuid::Uuid;

use super::cell::{self, CellValue};
use super::columns::{CaseField, ColumnMap};
use super::lookups::LookupCache;
use crate::types::{LookupKind, NewCase};

/// Outcome of validating one data row.
#[derive(Debug)]
pub enum RowOutcome {
    /// A validated record ready for batching.
    Case(NewCase),
    /// Row-level failure; one human-readable message, processing continues.
    Error(String),
    /// Every cell blank — trailing spreadsheet rows, not counted at all.
    Blank,
    /// Case number already stored (or already accepted earlier in this
    /// file). Counted as skipped, no message.
    Duplicate,
}

pub fn process_row(
    row: &[CellValue],
    columns: &ColumnMap,
    lookups: &LookupCache,
    existing_case_numbers: &HashSet<String>,
    row_number: usize,
) -> RowOutcome {
    if row.iter().all(CellValue::is_blank) {
        return RowOutcome::Blank;
    }

    let case_number = columns.cell(row, CaseField::CaseNumber).as_trimmed();
    if case_number.is_empty() {
        return RowOutcome::Error(format!("Row {row_number}: Missing case number"));
    }

    // Duplicates are skipped before any further validation, so re-importing
    // a file never re-reports errors for rows that are already stored.
    if existing_case_numbers.contains(&case_number) {
        return RowOutcome::Duplicate;
    }

    let director_name = columns.cell(row, CaseField::Director).as_trimmed();
    if director_name.is_empty() {
        return RowOutcome::Error(format!("Row {row_number}: Missing director name"));
    }

    let service_type_name = columns.cell(row, CaseField::ServiceType).as_trimmed();
    if service_type_name.is_empty() {
        return RowOutcome::Error(format!("Row {row_number}: Missing service type"));
    }

    let director_id = lookups.resolve(LookupKind::Director, &director_name);
    let service_type_id = lookups.resolve(LookupKind::ServiceType, &service_type_name);

    // Sale type is optional; a blank cell is a legitimate absence.
    let sale_type_name = columns.cell(row, CaseField::SaleType).as_trimmed();
    let sale_type_id = lookups.resolve(LookupKind::SaleType, &sale_type_name);

    let (Some(director_id), Some(service_type_id)) = (director_id, service_type_id) else {
        return RowOutcome::Error(format!(
            "Row {row_number}: Could not find director or service type"
        ));
    };

    let Some(date_of_death) = cell::parse_date(columns.cell(row, CaseField::DateOfDeath)) else {
        return RowOutcome::Error(format!("Row {row_number}: Invalid date of death"));
    };

    let customer_first_name = columns.cell(row, CaseField::CustomerFirstName).as_trimmed();
    let customer_last_name = columns.cell(row, CaseField::CustomerLastName).as_trimmed();
    if customer_first_name.is_empty() && customer_last_name.is_empty() {
        return RowOutcome::Error(format!("Row {row_number}: Missing customer name"));
    }

    let date_paid_in_full = cell::parse_date(columns.cell(row, CaseField::DatePaidInFull));

    RowOutcome::Case(NewCase {
        id: Uuid::new_v4(),
        case_number,
        date_of_death,
        customer_first_name,
        customer_last_name,
        service_type_id,
        sale_type_id,
        director_id,
        date_paid_in_full,
        payments_received: cell::parse_number(columns.cell(row, CaseField::PaymentsReceived)),
        average_age: cell::parse_number(columns.cell(row, CaseField::Aging)),
        total_sale: cell::parse_number(columns.cell(row, CaseField::TotalSale)),
        created_at: Utc::now(),
    })
}
