use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, NaiveDate, Utc};

use super::source::{DataSource, RunCatalog};
use crate::error::FetchError;
use crate::models::{
    ArtifactType, DataFile, DataFilters, DatasetPreparation, FileType, ModelArtifact, PreviewRequest,
    PreviewResult, QualityFlag, RunFilters, RunStatus, SaveDatasetRequest, SavedDataset, Tenant,
    TrainingRun, TrainingRunCreated, TrainingRunRequest, Workflow,
};
use crate::utils::slugify;

/// Records the fixture warehouse yields per day of the requested range.
const RECORDS_PER_DAY: u64 = 150;
/// Range assumed when the filters carry no dates.
const DEFAULT_RANGE_DAYS: i64 = 90;
/// Size of the language catalogue the preview count is scaled against.
const LANGUAGE_CATALOGUE: u64 = 10;
const PREVIEW_SAMPLE_ROWS: usize = 3;

/// In-process fixture backend. Deterministic: identical call sequences
/// produce identical ids and record counts.
#[derive(Debug)]
pub struct MockBackend {
    tenants: Vec<Tenant>,
    workflows: HashMap<String, Vec<Workflow>>,
    models: Vec<ModelArtifact>,
    preparations: Mutex<Vec<DatasetPreparation>>,
    runs: Mutex<Vec<TrainingRun>>,
    fetches: Mutex<HashMap<String, u64>>,
    next_id: AtomicU64,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn model(
    id: &str,
    kind: ArtifactType,
    name: &str,
    s3_path: &str,
    tenant_id: Option<&str>,
    published: bool,
    created_at: &str,
) -> ModelArtifact {
    ModelArtifact {
        artifact_id: id.to_string(),
        artifact_type: kind,
        model_artifact_name: name.to_string(),
        s3_path: s3_path.to_string(),
        tenant_id: tenant_id.map(|t| t.to_string()),
        training_execution_id: None,
        model_size_mb: None,
        published,
        model_tag: None,
        created_at: created_at.to_string(),
    }
}

fn split_files(root: &str, prefix: &str, counts: [u64; 3]) -> Vec<DataFile> {
    [FileType::Train, FileType::Test, FileType::Val]
        .iter()
        .zip(counts)
        .enumerate()
        .map(|(i, (kind, records))| DataFile {
            file_id: format!("{}_{:03}", prefix, i + 1),
            file_type: *kind,
            s3_path: format!("{}{}.csv", root, kind.as_str()),
            file_name: format!("{}.csv", kind.as_str()),
            record_count: Some(records),
        })
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn preparation(
    id: &str,
    name: &str,
    customer: &str,
    tenant: &str,
    root: &str,
    range: (&str, &str),
    created_at: &str,
    counts: [u64; 3],
) -> DatasetPreparation {
    DatasetPreparation {
        training_data_preparation_id: id.to_string(),
        dataset_name: name.to_string(),
        customer_name: Some(customer.to_string()),
        tenant_id: Some(tenant.to_string()),
        s3_root_path: root.to_string(),
        date_range_start: Some(range.0.to_string()),
        date_range_end: Some(range.1.to_string()),
        created_at: created_at.to_string(),
        files: split_files(root, id, counts),
    }
}

fn run(id: &str, name: &str, status: RunStatus, customer: &str, tenant: &str, started: &str) -> TrainingRun {
    TrainingRun {
        training_execution_id: id.to_string(),
        training_execution_name: name.to_string(),
        status,
        customer_name: Some(customer.to_string()),
        tenant_id: Some(tenant.to_string()),
        started_at: Some(started.to_string()),
        completed_at: None,
        error_message: None,
        created_at: started.to_string(),
    }
}

fn parse_day(raw: &str) -> Option<NaiveDate> {
    DateTime::parse_from_rfc3339(raw)
        .map(|d| d.date_naive())
        .ok()
        .or_else(|| NaiveDate::parse_from_str(raw.get(..10)?, "%Y-%m-%d").ok())
}

impl MockBackend {
    pub fn new() -> Self {
        let tenants = vec![
            Tenant::new("tenant_001", "Customer A", Some("US-EAST")),
            Tenant::new("tenant_002", "Customer B", Some("EU-WEST")),
            Tenant::new("tenant_003", "Customer C", Some("US-WEST")),
            Tenant::new("tenant_004", "Customer D", Some("APAC")),
        ];

        let mut workflows = HashMap::new();
        workflows.insert(
            "tenant_001".to_string(),
            vec![
                Workflow::new("wf_12345", "Main Production Workflow"),
                Workflow::new("wf_12346", "Voice Recording Pipeline"),
                Workflow::new("wf_12347", "QA Testing Workflow"),
            ],
        );
        workflows.insert(
            "tenant_002".to_string(),
            vec![
                Workflow::new("wf_22345", "Multilingual Processing"),
                Workflow::new("wf_22346", "European Transcription"),
            ],
        );
        workflows.insert(
            "tenant_003".to_string(),
            vec![Workflow::new("wf_32345", "Customer Service Recording")],
        );
        workflows.insert(
            "tenant_004".to_string(),
            vec![
                Workflow::new("wf_42345", "APAC Voice Pipeline"),
                Workflow::new("wf_42346", "Japanese Transcription"),
                Workflow::new("wf_42347", "Korean ASR Pipeline"),
            ],
        );

        let models = vec![
            model("asr_001", ArtifactType::Trtllm, "Whisper V2.0", "s3://models/whisper-v2.0", None, true, "2024-12-01T10:00:00Z"),
            model("asr_002", ArtifactType::Trtllm, "Whisper V2.1", "s3://models/whisper-v2.1", None, true, "2025-01-01T10:00:00Z"),
            model("trtllm_001", ArtifactType::Trtllm, "Customer A TRTLLM v1", "s3://models/customer-a/trtllm-v1", Some("tenant_001"), true, "2025-01-15T14:30:00Z"),
            model("base_001", ArtifactType::RawWeight, "Whisper Large V2 Base", "s3://models/base/whisper-large-v2", None, true, "2024-06-01T10:00:00Z"),
            model("base_002", ArtifactType::RawWeight, "Whisper Large V3 Base", "s3://models/base/whisper-large-v3", None, true, "2024-10-01T10:00:00Z"),
            model("base_003", ArtifactType::RawWeight, "Customer A Fine-tuned v1", "s3://models/customer-a/finetuned-v1", Some("tenant_001"), false, "2025-01-05T10:00:00Z"),
        ];

        let preparations = vec![
            preparation(
                "660e8400-e29b-41d4-a716-446655440003",
                "Customer A - Q4 2024 Dataset",
                "Customer A",
                "tenant_001",
                "s3://datasets/customer-a/q4-2024/",
                ("2024-10-01", "2024-12-31"),
                "2025-01-10T12:00:00Z",
                [35_000, 10_000, 5_000],
            ),
            preparation(
                "660e8400-e29b-41d4-a716-446655440004",
                "Customer B - Multilingual Dataset",
                "Customer B",
                "tenant_002",
                "s3://datasets/customer-b/multilingual/",
                ("2024-11-01", "2025-01-15"),
                "2025-01-18T14:00:00Z",
                [56_000, 16_000, 8_000],
            ),
            preparation(
                "660e8400-e29b-41d4-a716-446655440005",
                "Customer A - January 2025 Update",
                "Customer A",
                "tenant_001",
                "s3://datasets/customer-a/jan-2025/",
                ("2025-01-01", "2025-01-15"),
                "2025-01-16T09:00:00Z",
                [8_400, 2_400, 1_200],
            ),
        ];

        let runs = vec![
            run("train_001", "Customer A ASR Model v2.1", RunStatus::Completed, "Customer A", "tenant_001", "2025-01-15T10:00:00Z"),
            run("train_002", "Customer B Multilingual Model", RunStatus::Running, "Customer B", "tenant_002", "2025-01-20T08:00:00Z"),
            run("train_003", "Customer A Quick Test", RunStatus::Failed, "Customer A", "tenant_001", "2025-01-18T12:00:00Z"),
        ];

        Self {
            tenants,
            workflows,
            models,
            preparations: Mutex::new(preparations),
            runs: Mutex::new(runs),
            fetches: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn tenant(&self, tenant_id: &str) -> Option<&Tenant> {
        self.tenants.iter().find(|t| t.tenant_id == tenant_id)
    }

    /// Record count the fixture warehouse reports for a filter set.
    pub fn estimate_records(&self, filters: &DataFilters) -> u64 {
        let known_tenant = filters
            .tenant_id
            .as_deref()
            .map_or(true, |t| self.tenant(t).is_some());
        if !known_tenant {
            return 0;
        }

        let start = filters.date_range_start.as_deref().and_then(parse_day);
        let end = filters.date_range_end.as_deref().and_then(parse_day);
        let days = match (start, end) {
            (Some(s), Some(e)) => (e - s).num_days() + 1,
            _ => DEFAULT_RANGE_DAYS,
        };
        if days <= 0 {
            return 0;
        }

        let mut count = days as u64 * RECORDS_PER_DAY;
        if !filters.workflow_ids.is_empty() {
            let available = filters
                .tenant_id
                .as_deref()
                .and_then(|t| self.workflows.get(t))
                .map_or(1, |w| w.len().max(1)) as u64;
            count = count * (filters.workflow_ids.len() as u64).min(available) / available;
        }
        if !filters.languages.is_empty() {
            count = count * (filters.languages.len() as u64).min(LANGUAGE_CATALOGUE) / LANGUAGE_CATALOGUE;
        }
        for flag in QualityFlag::ALL {
            if filters.flag(flag).is_some() {
                count /= 2;
            }
        }
        count
    }
}

impl DataSource for MockBackend {
    async fn list_tenants(&self) -> Result<Vec<Tenant>, FetchError> {
        Ok(self.tenants.clone())
    }

    async fn list_workflows(&self, tenant_id: &str) -> Result<Vec<Workflow>, FetchError> {
        Ok(self.workflows.get(tenant_id).cloned().unwrap_or_default())
    }

    async fn list_models(&self, tenant_id: &str, kind: ArtifactType) -> Result<Vec<ModelArtifact>, FetchError> {
        Ok(self
            .models
            .iter()
            .filter(|m| m.artifact_type == kind)
            .filter(|m| m.tenant_id.as_deref().map_or(true, |t| t == tenant_id))
            .cloned()
            .collect())
    }

    async fn list_dataset_preparations(&self, tenant_id: &str) -> Result<Vec<DatasetPreparation>, FetchError> {
        self.list_datasets(Some(tenant_id)).await
    }

    async fn preview_filtered_data(&self, request: &PreviewRequest) -> Result<PreviewResult, FetchError> {
        let record_count = self.estimate_records(&request.filters);
        let fetch_id = format!("fetch_{}", self.next_id());
        self.fetches.lock().unwrap().insert(fetch_id.clone(), record_count);

        let rows = (record_count as usize).min(PREVIEW_SAMPLE_ROWS);
        let preview = (1..=rows)
            .map(|i| {
                serde_json::json!({
                    "id": i.to_string(),
                    "audio_path": format!("s3://warehouse/{}/{}.wav", fetch_id, i),
                    "transcript": format!("Sample transcript {}", i),
                })
            })
            .collect();
        tracing::debug!(%fetch_id, record_count, "Fixture preview computed");
        Ok(PreviewResult {
            fetch_id,
            record_count,
            preview,
            cached: false,
        })
    }

    async fn save_dataset(&self, request: &SaveDatasetRequest) -> Result<SavedDataset, FetchError> {
        let record_count = self
            .fetches
            .lock()
            .unwrap()
            .get(&request.fetch_id)
            .copied()
            .ok_or_else(|| FetchError::NotFound(format!("fetch {}", request.fetch_id)))?;

        let id = format!("data_gen_{}", self.next_id());
        let root = format!("s3://datasets/{}/{}/", slugify(&request.dataset_name), id);
        let train = record_count * 7 / 10;
        let test = record_count * 2 / 10;
        let val = record_count - train - test;
        let prep = DatasetPreparation {
            training_data_preparation_id: id.clone(),
            dataset_name: request.dataset_name.clone(),
            customer_name: request.filters.customer_name.clone(),
            tenant_id: request.filters.tenant_id.clone(),
            s3_root_path: root.clone(),
            date_range_start: request.filters.date_range_start.clone(),
            date_range_end: request.filters.date_range_end.clone(),
            created_at: Utc::now().to_rfc3339(),
            files: split_files(&root, &id, [train, test, val]),
        };
        self.preparations.lock().unwrap().push(prep);

        Ok(SavedDataset {
            training_data_preparation_id: id,
            s3_root_path: root,
            record_count,
        })
    }

    async fn create_training_run(&self, request: &TrainingRunRequest) -> Result<TrainingRunCreated, FetchError> {
        let id = format!("train_{}", self.next_id());
        let now = Utc::now().to_rfc3339();
        self.runs.lock().unwrap().push(TrainingRun {
            training_execution_id: id.clone(),
            training_execution_name: request.training_execution_name.clone(),
            status: RunStatus::Pending,
            customer_name: request.customer_name.clone(),
            tenant_id: request.tenant_id.clone(),
            started_at: None,
            completed_at: None,
            error_message: None,
            created_at: now,
        });
        Ok(TrainingRunCreated {
            training_execution_id: id,
            training_execution_name: request.training_execution_name.clone(),
            status: RunStatus::Pending,
        })
    }
}

impl RunCatalog for MockBackend {
    async fn list_datasets(&self, tenant_id: Option<&str>) -> Result<Vec<DatasetPreparation>, FetchError> {
        Ok(self
            .preparations
            .lock()
            .unwrap()
            .iter()
            .filter(|p| tenant_id.map_or(true, |t| p.tenant_id.as_deref() == Some(t)))
            .cloned()
            .collect())
    }

    async fn get_dataset(&self, id: &str) -> Result<DatasetPreparation, FetchError> {
        self.preparations
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.training_data_preparation_id == id)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(format!("dataset {}", id)))
    }

    async fn delete_dataset(&self, id: &str) -> Result<(), FetchError> {
        let mut preps = self.preparations.lock().unwrap();
        let before = preps.len();
        preps.retain(|p| p.training_data_preparation_id != id);
        if preps.len() == before {
            return Err(FetchError::NotFound(format!("dataset {}", id)));
        }
        Ok(())
    }

    async fn list_training_runs(&self, filters: &RunFilters) -> Result<Vec<TrainingRun>, FetchError> {
        Ok(self
            .runs
            .lock()
            .unwrap()
            .iter()
            .filter(|r| filters.matches(r))
            .cloned()
            .collect())
    }

    async fn get_training_run(&self, id: &str) -> Result<TrainingRun, FetchError> {
        self.runs
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.training_execution_id == id)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(format!("training run {}", id)))
    }

    async fn abort_training_run(&self, id: &str, reason: Option<&str>) -> Result<(), FetchError> {
        let mut runs = self.runs.lock().unwrap();
        let run = runs
            .iter_mut()
            .find(|r| r.training_execution_id == id)
            .ok_or_else(|| FetchError::NotFound(format!("training run {}", id)))?;
        if !run.status.is_active() {
            return Err(FetchError::Status {
                status: 409,
                reason: format!("run is already {}", run.status),
            });
        }
        run.status = RunStatus::Cancelled;
        run.error_message = reason.map(|r| r.to_string());
        Ok(())
    }
}
