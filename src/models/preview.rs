use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::filters::DataFilters;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewRequest {
    pub filters: DataFilters,
    #[serde(default)]
    pub limit: Option<u32>,
}

/// Result of running a filter set against the warehouse without saving it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewResult {
    pub fetch_id: String,
    pub record_count: u64,
    #[serde(default)]
    pub preview: Vec<Value>,
    #[serde(default)]
    pub cached: bool,
}
