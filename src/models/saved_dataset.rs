use serde::{Deserialize, Serialize};

use super::filters::DataFilters;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveDatasetRequest {
    pub fetch_id: String,
    pub dataset_name: String,
    pub filters: DataFilters,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedDataset {
    pub training_data_preparation_id: String,
    pub s3_root_path: String,
    pub record_count: u64,
}
