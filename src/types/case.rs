//! Case record types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A validated case record ready for insertion.
///
/// `case_number` is the natural key: at most one record per case across all
/// imports and manual entry. Duplicate imports are skipped, never overwritten.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCase {
    pub id: Uuid,
    pub case_number: String,
    pub date_of_death: NaiveDate,
    pub customer_first_name: String,
    pub customer_last_name: String,
    pub service_type_id: Uuid,
    pub sale_type_id: Option<Uuid>,
    pub director_id: Uuid,
    pub date_paid_in_full: Option<NaiveDate>,
    pub payments_received: f64,
    pub average_age: f64,
    pub total_sale: f64,
    pub created_at: DateTime<Utc>,
}
