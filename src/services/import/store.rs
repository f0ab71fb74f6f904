//! Storage seams for the import pipeline
//!
//! The pipeline talks to the lookup and case stores through these traits so
//! the core logic stays testable without a database. The Postgres
//! implementations delegate to `db::queries`.

use std::collections::HashSet;

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;

use crate::db::queries;
use crate::types::{LookupEntity, LookupKind, NewCase};

/// Read/create access to the lookup tables.
#[async_trait]
pub trait LookupStore: Send + Sync {
    /// All entities of one kind.
    async fn fetch_all(&self, kind: LookupKind) -> Result<Vec<LookupEntity>>;

    /// Bulk-create entities for the given names (original casing preserved,
    /// `is_active = true`). Returns the created entities.
    async fn create_many(&self, kind: LookupKind, names: &[String]) -> Result<Vec<LookupEntity>>;
}

/// Append-only access to the case store.
#[async_trait]
pub trait CaseStore: Send + Sync {
    /// Every case number currently stored, for dedup.
    async fn fetch_case_numbers(&self) -> Result<HashSet<String>>;

    /// Insert one batch of validated records. All-or-nothing per batch.
    async fn insert_batch(&self, cases: &[NewCase]) -> Result<()>;
}

pub struct PgLookupStore {
    pool: PgPool,
}

impl PgLookupStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LookupStore for PgLookupStore {
    async fn fetch_all(&self, kind: LookupKind) -> Result<Vec<LookupEntity>> {
        queries::lookup::list_entities(&self.pool, kind).await
    }

    async fn create_many(&self, kind: LookupKind, names: &[String]) -> Result<Vec<LookupEntity>> {
        queries::lookup::create_entities(&self.pool, kind, names).await
    }
}

pub struct PgCaseStore {
    pool: PgPool,
}

impl PgCaseStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CaseStore for PgCaseStore {
    async fn fetch_case_numbers(&self) -> Result<HashSet<String>> {
        let numbers = queries::case::list_case_numbers(&self.pool).await?;
        Ok(numbers.into_iter().collect())
    }

    async fn insert_batch(&self, cases: &[NewCase]) -> Result<()> {
        queries::case::insert_case_batch(&self.pool, cases).await
    }
}
