use serde::{Deserialize, Serialize};

/// Role a file plays inside a dataset preparation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Train,
    Test,
    Val,
    Origin,
    Processed,
}

impl FileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Train => "train",
            FileType::Test => "test",
            FileType::Val => "val",
            FileType::Origin => "origin",
            FileType::Processed => "processed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataFile {
    pub file_id: String,
    pub file_type: FileType,
    pub s3_path: String,
    pub file_name: String,
    #[serde(default)]
    pub record_count: Option<u64>,
}

/// A saved, filtered extraction of warehouse records plus its split files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetPreparation {
    pub training_data_preparation_id: String,
    pub dataset_name: String,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub tenant_id: Option<String>,
    pub s3_root_path: String,
    #[serde(default)]
    pub date_range_start: Option<String>,
    #[serde(default)]
    pub date_range_end: Option<String>,
    pub created_at: String,
    #[serde(default)]
    pub files: Vec<DataFile>,
}

impl DatasetPreparation {
    /// Paths of every file of the given split type, in file order.
    pub fn paths_for(&self, file_type: FileType) -> impl Iterator<Item = &str> {
        self.files
            .iter()
            .filter(move |f| f.file_type == file_type)
            .map(|f| f.s3_path.as_str())
    }

    pub fn record_count_for(&self, file_type: FileType) -> u64 {
        self.files
            .iter()
            .filter(|f| f.file_type == file_type)
            .filter_map(|f| f.record_count)
            .sum()
    }

    pub fn total_records(&self) -> u64 {
        [FileType::Train, FileType::Test, FileType::Val]
            .iter()
            .map(|t| self.record_count_for(*t))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(id: &str, file_type: FileType, records: Option<u64>) -> DataFile {
        DataFile {
            file_id: id.to_string(),
            file_type,
            s3_path: format!("s3://bucket/{}.csv", id),
            file_name: format!("{}.csv", id),
            record_count: records,
        }
    }

    #[test]
    fn total_records_ignores_origin_and_missing_counts() {
        let prep = DatasetPreparation {
            training_data_preparation_id: "p1".into(),
            dataset_name: "d".into(),
            customer_name: None,
            tenant_id: None,
            s3_root_path: "s3://bucket/".into(),
            date_range_start: None,
            date_range_end: None,
            created_at: "2025-01-01T00:00:00Z".into(),
            files: vec![
                file("train", FileType::Train, Some(100)),
                file("test", FileType::Test, None),
                file("val", FileType::Val, Some(10)),
                file("origin", FileType::Origin, Some(5000)),
            ],
        };
        assert_eq!(prep.total_records(), 110);
        assert_eq!(prep.paths_for(FileType::Test).count(), 1);
        assert_eq!(prep.paths_for(FileType::Processed).count(), 0);
    }

    #[test]
    fn file_type_uses_lowercase_wire_names() {
        let json = serde_json::to_string(&FileType::Val).unwrap();
        assert_eq!(json, "\"val\"");
    }
}
