//! Spreadsheet import pipeline
//!
//! Turns an uploaded Excel/CSV export of historical case records into rows
//! in the case store:
//!
//! 1. decode the workbook, first row as headers ([`sheet`]);
//! 2. map variably-named columns to canonical fields ([`columns`]);
//! 3. pre-scan for unknown director/service-type/sale-type names and
//!    bulk-create them ([`lookups`]);
//! 4. validate and transform each row in file order ([`rows`]);
//! 5. dedup against stored case numbers and insert in batches ([`writer`]).
//!
//! Row-level and batch-level failures are collected into the result and
//! never stop the loop; only file-level failures ([`ImportError`]) abort.
//!
//! All state (column map, lookup cache, dedup set) is local to one call of
//! [`run_import`]. Concurrent imports are not guarded against duplicate
//! lookup creation or duplicate case races; imports are expected to run one
//! at a time.

pub mod cell;
pub mod columns;
pub mod lookups;
pub mod rows;
pub mod sheet;
pub mod store;
pub mod writer;

use thiserror::Error;
use tracing::info;

use self::columns::ColumnMap;
use self::lookups::LookupCache;
use self::rows::RowOutcome;
use self::store::{CaseStore, LookupStore};
use self::writer::PendingCase;
use crate::types::ImportResult;

/// Fatal, file-level import failures. These abort the import before (or
/// instead of) row processing; per-row problems go into
/// [`ImportResult::errors`] instead.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("could not read file: {0}")]
    UnreadableFile(String),

    #[error("file is empty or has no data rows")]
    NoDataRows,

    #[error("could not find a 'Case Number' or 'Case Nbr' column in the file")]
    NoCaseNumberColumn,

    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

/// Run one import invocation over the uploaded file bytes.
pub async fn run_import(
    lookup_store: &dyn LookupStore,
    case_store: &dyn CaseStore,
    file_name: &str,
    bytes: &[u8],
) -> Result<ImportResult, ImportError> {
    let sheet = sheet::decode(file_name, bytes)?;
    info!(
        "Decoded '{}': {} data rows",
        file_name,
        sheet.rows.len()
    );

    let columns = ColumnMap::from_headers(&sheet.headers)?;
    let lookups = LookupCache::prepare(lookup_store, &sheet.rows, &columns).await?;
    let mut existing_case_numbers = case_store.fetch_case_numbers().await?;

    let mut result = ImportResult::default();
    let mut pending: Vec<PendingCase> = Vec::new();

    for (index, row) in sheet.rows.iter().enumerate() {
        // +2: spreadsheet rows are 1-based and row 1 is the header.
        let row_number = index + 2;

        match rows::process_row(row, &columns, &lookups, &existing_case_numbers, row_number) {
            RowOutcome::Case(record) => {
                // Accepted case numbers join the dedup set so a second
                // occurrence in the same file is skipped, not double-written.
                existing_case_numbers.insert(record.case_number.clone());
                pending.push(PendingCase { row_number, record });
            }
            RowOutcome::Error(message) => result.errors.push(message),
            RowOutcome::Duplicate => result.skipped += 1,
            RowOutcome::Blank => {}
        }
    }

    result.imported =
        writer::write_batches(case_store, &pending, writer::BATCH_SIZE, &mut result.errors).await;

    info!(
        "Import of '{}' finished: {} imported, {} skipped, {} errors",
        file_name,
        result.imported,
        result.skipped,
        result.errors.len()
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use chrono::Utc;
    use uuid::Uuid;

    use crate::types::{LookupEntity, LookupKind, NewCase};

    /// In-memory lookup store mirroring the case-insensitive name identity
    /// of the real tables.
    #[derive(Default)]
    struct MemLookupStore {
        entities: Mutex<Vec<(LookupKind, LookupEntity)>>,
    }

    #[async_trait]
    impl store::LookupStore for MemLookupStore {
        async fn fetch_all(&self, kind: LookupKind) -> Result<Vec<LookupEntity>> {
            let entities = self.entities.lock().unwrap();
            Ok(entities
                .iter()
                .filter(|(k, _)| *k == kind)
                .map(|(_, e)| e.clone())
                .collect())
        }

        async fn create_many(
            &self,
            kind: LookupKind,
            names: &[String],
        ) -> Result<Vec<LookupEntity>> {
            let mut entities = self.entities.lock().unwrap();
            let created: Vec<LookupEntity> =
                names.iter().map(LookupEntity::new).collect();
            for entity in &created {
                entities.push((kind, entity.clone()));
            }
            Ok(created)
        }
    }

    /// In-memory case store; can be told to fail from the Nth insert batch.
    #[derive(Default)]
    struct MemCaseStore {
        cases: Mutex<Vec<NewCase>>,
        batches_seen: AtomicUsize,
        fail_from_batch: Option<usize>,
    }

    impl MemCaseStore {
        fn failing_from(batch_index: usize) -> Self {
            Self {
                fail_from_batch: Some(batch_index),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl store::CaseStore for MemCaseStore {
        async fn fetch_case_numbers(&self) -> Result<HashSet<String>> {
            let cases = self.cases.lock().unwrap();
            Ok(cases.iter().map(|c| c.case_number.clone()).collect())
        }

        async fn insert_batch(&self, batch: &[NewCase]) -> Result<()> {
            let index = self.batches_seen.fetch_add(1, Ordering::SeqCst);
            if self.fail_from_batch.is_some_and(|from| index >= from) {
                return Err(anyhow!("connection reset by peer"));
            }
            self.cases.lock().unwrap().extend_from_slice(batch);
            Ok(())
        }
    }

    const CSV_HEADERS: &str =
        "Case Number,Director,Service Type,Sale Type,Date of Death,Customer First Name,Customer Last Name,Total Sale,Payments Received,Date PIF,Aging\n";

    fn csv_file(rows: &[&str]) -> Vec<u8> {
        let mut out = CSV_HEADERS.to_string();
        for row in rows {
            out.push_str(row);
            out.push('\n');
        }
        out.into_bytes()
    }

    fn sample_file() -> Vec<u8> {
        csv_file(&[
            "101,Sam Hale,Cremation,At-Need,2023-03-15,Jane,Doe,\"$4,500.00\",\"$1,000\",,78",
            "102,Sam Hale,Burial,,2023-04-01,John,Smith,6200,0,2023-06-01,81",
            "103,Rae Otis,Cremation,Pre-Need,2023-05-20,,Miller,3100,3100,2023-05-25,",
        ])
    }

    #[tokio::test]
    async fn test_import_happy_path() {
        let lookups = MemLookupStore::default();
        let cases = MemCaseStore::default();

        let result = run_import(&lookups, &cases, "cases.csv", &sample_file())
            .await
            .unwrap();

        assert_eq!(result.imported, 3);
        assert_eq!(result.skipped, 0);
        assert!(result.errors.is_empty());

        let stored = cases.cases.lock().unwrap();
        assert_eq!(stored.len(), 3);
        // Row 102 has no sale type.
        assert!(stored[1].sale_type_id.is_none());
        assert_eq!(stored[0].total_sale, 4500.0);
    }

    #[tokio::test]
    async fn test_import_is_idempotent() {
        let lookups = MemLookupStore::default();
        let cases = MemCaseStore::default();

        let first = run_import(&lookups, &cases, "cases.csv", &sample_file())
            .await
            .unwrap();
        assert_eq!(first.imported, 3);

        let second = run_import(&lookups, &cases, "cases.csv", &sample_file())
            .await
            .unwrap();
        assert_eq!(second.imported, 0);
        assert_eq!(second.skipped, 3);
        assert!(second.errors.is_empty());
        assert_eq!(cases.cases.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_new_lookups_created_once_and_shared() {
        let lookups = MemLookupStore::default();
        let cases = MemCaseStore::default();

        // Two rows, same unknown director with different casing.
        let file = csv_file(&[
            "201,Lee Quinn,Cremation,,2023-03-15,Ann,Lee,100,0,,",
            "202,LEE QUINN,Cremation,,2023-03-16,Bob,Ray,200,0,,",
        ]);
        let result = run_import(&lookups, &cases, "cases.csv", &file)
            .await
            .unwrap();
        assert_eq!(result.imported, 2);

        let directors = lookups.fetch_all(LookupKind::Director).await.unwrap();
        assert_eq!(directors.len(), 1);
        assert_eq!(directors[0].name, "Lee Quinn");
        assert!(directors[0].is_active);

        let stored = cases.cases.lock().unwrap();
        assert_eq!(stored[0].director_id, stored[1].director_id);
        assert_eq!(stored[0].director_id, directors[0].id);
    }

    #[tokio::test]
    async fn test_row_errors_do_not_stop_the_import() {
        let lookups = MemLookupStore::default();
        let cases = MemCaseStore::default();

        let file = csv_file(&[
            ",Sam Hale,Cremation,,2023-03-15,Jane,Doe,100,0,,",
            "302,Sam Hale,Cremation,,bad date,Jane,Doe,100,0,,",
            "303,Sam Hale,Cremation,,2023-03-17,Jane,Doe,100,0,,",
        ]);
        let result = run_import(&lookups, &cases, "cases.csv", &file)
            .await
            .unwrap();

        assert_eq!(result.imported, 1);
        assert_eq!(result.skipped, 0);
        assert_eq!(
            result.errors,
            vec![
                "Row 2: Missing case number".to_string(),
                "Row 3: Invalid date of death".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_within_file_duplicate_is_skipped() {
        let lookups = MemLookupStore::default();
        let cases = MemCaseStore::default();

        let file = csv_file(&[
            "401,Sam Hale,Cremation,,2023-03-15,Jane,Doe,100,0,,",
            "401,Sam Hale,Cremation,,2023-03-15,Jane,Doe,100,0,,",
        ]);
        let result = run_import(&lookups, &cases, "cases.csv", &file)
            .await
            .unwrap();

        assert_eq!(result.imported, 1);
        assert_eq!(result.skipped, 1);
        assert!(result.errors.is_empty());
    }

    #[tokio::test]
    async fn test_blank_trailing_rows_are_not_counted() {
        let lookups = MemLookupStore::default();
        let cases = MemCaseStore::default();

        let file = csv_file(&[
            "501,Sam Hale,Cremation,,2023-03-15,Jane,Doe,100,0,,",
            ",,,,,,,,,,",
            ",,,,,,,,,,",
        ]);
        let result = run_import(&lookups, &cases, "cases.csv", &file)
            .await
            .unwrap();

        assert_eq!(result.imported, 1);
        assert_eq!(result.skipped, 0);
        assert!(result.errors.is_empty());
    }

    #[tokio::test]
    async fn test_partial_batch_failure_is_isolated() {
        let cases = MemCaseStore::failing_from(1);

        let pending: Vec<PendingCase> = (0..4)
            .map(|i| PendingCase {
                row_number: i + 2,
                record: NewCase {
                    id: Uuid::new_v4(),
                    case_number: format!("60{i}"),
                    date_of_death: chrono::NaiveDate::from_ymd_opt(2023, 3, 15).unwrap(),
                    customer_first_name: "Jane".into(),
                    customer_last_name: "Doe".into(),
                    service_type_id: Uuid::new_v4(),
                    sale_type_id: None,
                    director_id: Uuid::new_v4(),
                    date_paid_in_full: None,
                    payments_received: 0.0,
                    average_age: 0.0,
                    total_sale: 0.0,
                    created_at: Utc::now(),
                },
            })
            .collect();

        let mut errors = Vec::new();
        let imported = writer::write_batches(&cases, &pending, 2, &mut errors).await;

        assert_eq!(imported, 2);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Batch error (rows 4 to 5):"), "{}", errors[0]);
        // Batch 1 landed exactly once.
        let stored = cases.cases.lock().unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].case_number, "600");
        assert_eq!(stored[1].case_number, "601");
    }

    #[tokio::test]
    async fn test_missing_case_number_column_is_fatal() {
        let lookups = MemLookupStore::default();
        let cases = MemCaseStore::default();

        let file = b"Director,Service Type\nSam Hale,Cremation\n";
        let result = run_import(&lookups, &cases, "cases.csv", file).await;
        assert!(matches!(result, Err(ImportError::NoCaseNumberColumn)));
        assert!(cases.cases.lock().unwrap().is_empty());
    }
}
