//! Case table queries

use anyhow::Result;
use sqlx::PgPool;

use crate::types::NewCase;

/// All stored case numbers, used to dedup incoming imports
pub async fn list_case_numbers(pool: &PgPool) -> Result<Vec<String>> {
    let numbers = sqlx::query_scalar::<_, String>("SELECT case_number FROM cases")
        .fetch_all(pool)
        .await?;

    Ok(numbers)
}

/// Insert a batch of cases in one transaction. All-or-nothing: if any row
/// fails, the whole batch rolls back and the error surfaces to the caller.
pub async fn insert_case_batch(pool: &PgPool, cases: &[NewCase]) -> Result<()> {
    let mut tx = pool.begin().await?;

    for case in cases {
        sqlx::query(
            r#"
            INSERT INTO cases (
                id, case_number, date_of_death,
                customer_first_name, customer_last_name,
                service_type_id, sale_type_id, director_id,
                date_paid_in_full, payments_received, average_age, total_sale,
                created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(case.id)
        .bind(&case.case_number)
        .bind(case.date_of_death)
        .bind(&case.customer_first_name)
        .bind(&case.customer_last_name)
        .bind(case.service_type_id)
        .bind(case.sale_type_id)
        .bind(case.director_id)
        .bind(case.date_paid_in_full)
        .bind(case.payments_received)
        .bind(case.average_age)
        .bind(case.total_sale)
        .bind(case.created_at)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}
