//! Lookup table queries (directors, service types, sale types)
//!
//! The three lookup tables share one shape, so queries are written once and
//! parameterized by [`LookupKind`]. Table names come from `kind.table()`,
//! a closed enum, never from user input.

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::types::{LookupEntity, LookupKind};

/// List all entities of one kind
pub async fn list_entities(pool: &PgPool, kind: LookupKind) -> Result<Vec<LookupEntity>> {
    let entities = sqlx::query_as::<_, LookupEntity>(&format!(
        "SELECT id, name, is_active FROM {} ORDER BY name",
        kind.table()
    ))
    .fetch_all(pool)
    .await?;

    Ok(entities)
}

/// Bulk-create entities with the given names, active by default.
/// Runs in one transaction so a failed import never leaves a partial set.
pub async fn create_entities(
    pool: &PgPool,
    kind: LookupKind,
    names: &[String],
) -> Result<Vec<LookupEntity>> {
    let mut tx = pool.begin().await?;
    let mut created = Vec::with_capacity(names.len());

    let sql = format!(
        "INSERT INTO {} (id, name, is_active) VALUES ($1, $2, TRUE)",
        kind.table()
    );

    for name in names {
        let id = Uuid::new_v4();
        sqlx::query(&sql)
            .bind(id)
            .bind(name)
            .execute(&mut *tx)
            .await?;

        created.push(LookupEntity {
            id,
            name: name.clone(),
            is_active: true,
        });
    }

    tx.commit().await?;
    Ok(created)
}
