//! Import request/response types

use serde::{Deserialize, Serialize};

/// Request to import a spreadsheet of case records.
///
/// The uploaded file travels base64-encoded inside the JSON payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportFileRequest {
    pub file_name: String,
    pub content_base64: String,
}

/// Aggregate outcome of one import invocation.
///
/// `errors` holds one human-readable string per failed row plus one per
/// failed insert batch, in file order. Skipped duplicates produce no message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub imported: u32,
    pub skipped: u32,
    pub errors: Vec<String>,
}
