#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use tokio::sync::oneshot;
use trainboard::api::DataSource;
use trainboard::error::FetchError;
use trainboard::models::{
    ArtifactType, DataFile, DatasetPreparation, FileType, ModelArtifact, PreviewRequest,
    PreviewResult, RunStatus, SaveDatasetRequest, SavedDataset, Tenant, TrainingRunCreated,
    TrainingRunRequest, Workflow,
};

type Held<T> = oneshot::Receiver<Result<T, FetchError>>;

/// In-memory data source with canned answers. Individual responses can be
/// held back and released later to control arrival order.
pub struct ScriptedSource {
    pub tenants: Vec<Tenant>,
    workflows: Mutex<HashMap<String, Result<Vec<Workflow>, FetchError>>>,
    models: Mutex<HashMap<(String, ArtifactType), Result<Vec<ModelArtifact>, FetchError>>>,
    preparations: Mutex<HashMap<String, Result<Vec<DatasetPreparation>, FetchError>>>,
    held_workflows: Mutex<HashMap<String, Held<Vec<Workflow>>>>,
    held_preparations: Mutex<HashMap<String, Held<Vec<DatasetPreparation>>>>,
    preview: Mutex<Result<PreviewResult, FetchError>>,
    save: Mutex<Result<SavedDataset, FetchError>>,
    create: Mutex<Result<TrainingRunCreated, FetchError>>,
    pub preview_calls: Mutex<Vec<PreviewRequest>>,
    pub save_calls: Mutex<Vec<SaveDatasetRequest>>,
    pub create_calls: Mutex<Vec<TrainingRunRequest>>,
}

pub fn tenant(id: &str, name: &str) -> Tenant {
    Tenant::new(id, name, None)
}

pub fn workflows(prefix: &str, n: usize) -> Vec<Workflow> {
    (1..=n)
        .map(|i| Workflow::new(&format!("{}_wf_{}", prefix, i), &format!("{} workflow {}", prefix, i)))
        .collect()
}

pub fn model(id: &str, kind: ArtifactType, tenant_id: Option<&str>) -> ModelArtifact {
    ModelArtifact {
        artifact_id: id.to_string(),
        artifact_type: kind,
        model_artifact_name: format!("model {}", id),
        s3_path: format!("s3://models/{}", id),
        tenant_id: tenant_id.map(|t| t.to_string()),
        training_execution_id: None,
        model_size_mb: None,
        published: true,
        model_tag: None,
        created_at: "2025-01-01T00:00:00Z".to_string(),
    }
}

/// Preparation with one file per listed split.
pub fn preparation(id: &str, tenant_id: &str, splits: &[FileType]) -> DatasetPreparation {
    DatasetPreparation {
        training_data_preparation_id: id.to_string(),
        dataset_name: format!("dataset {}", id),
        customer_name: None,
        tenant_id: Some(tenant_id.to_string()),
        s3_root_path: format!("s3://datasets/{}/", id),
        date_range_start: None,
        date_range_end: None,
        created_at: "2025-01-01T00:00:00Z".to_string(),
        files: splits
            .iter()
            .map(|s| DataFile {
                file_id: format!("{}_{}", id, s.as_str()),
                file_type: *s,
                s3_path: format!("s3://datasets/{}/{}.csv", id, s.as_str()),
                file_name: format!("{}.csv", s.as_str()),
                record_count: Some(100),
            })
            .collect(),
    }
}

pub fn preview(fetch_id: &str, record_count: u64) -> PreviewResult {
    PreviewResult {
        fetch_id: fetch_id.to_string(),
        record_count,
        preview: Vec::new(),
        cached: false,
    }
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self {
            tenants: vec![tenant("tenant_001", "Customer A"), tenant("tenant_002", "Customer B")],
            workflows: Mutex::new(HashMap::new()),
            models: Mutex::new(HashMap::new()),
            preparations: Mutex::new(HashMap::new()),
            held_workflows: Mutex::new(HashMap::new()),
            held_preparations: Mutex::new(HashMap::new()),
            preview: Mutex::new(Ok(preview("fetch_1", 12345))),
            save: Mutex::new(Ok(SavedDataset {
                training_data_preparation_id: "data_gen_1".to_string(),
                s3_root_path: "s3://datasets/test-dataset/data_gen_1/".to_string(),
                record_count: 12345,
            })),
            create: Mutex::new(Ok(TrainingRunCreated {
                training_execution_id: "train_1".to_string(),
                training_execution_name: String::new(),
                status: RunStatus::Pending,
            })),
            preview_calls: Mutex::new(Vec::new()),
            save_calls: Mutex::new(Vec::new()),
            create_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn set_workflows(&self, tenant_id: &str, result: Result<Vec<Workflow>, FetchError>) {
        self.workflows.lock().unwrap().insert(tenant_id.to_string(), result);
    }

    pub fn set_models(&self, tenant_id: &str, kind: ArtifactType, models: Vec<ModelArtifact>) {
        self.models.lock().unwrap().insert((tenant_id.to_string(), kind), Ok(models));
    }

    pub fn fail_models(&self, tenant_id: &str, kind: ArtifactType, error: FetchError) {
        self.models.lock().unwrap().insert((tenant_id.to_string(), kind), Err(error));
    }

    pub fn set_preparations(&self, tenant_id: &str, result: Result<Vec<DatasetPreparation>, FetchError>) {
        self.preparations.lock().unwrap().insert(tenant_id.to_string(), result);
    }

    pub fn set_preview(&self, result: Result<PreviewResult, FetchError>) {
        *self.preview.lock().unwrap() = result;
    }

    pub fn set_save(&self, result: Result<SavedDataset, FetchError>) {
        *self.save.lock().unwrap() = result;
    }

    pub fn set_create(&self, result: Result<TrainingRunCreated, FetchError>) {
        *self.create.lock().unwrap() = result;
    }

    /// The next workflow request for `tenant_id` waits until the returned
    /// sender is used.
    pub fn hold_workflows(&self, tenant_id: &str) -> oneshot::Sender<Result<Vec<Workflow>, FetchError>> {
        let (tx, rx) = oneshot::channel();
        self.held_workflows.lock().unwrap().insert(tenant_id.to_string(), rx);
        tx
    }

    pub fn hold_preparations(
        &self,
        tenant_id: &str,
    ) -> oneshot::Sender<Result<Vec<DatasetPreparation>, FetchError>> {
        let (tx, rx) = oneshot::channel();
        self.held_preparations.lock().unwrap().insert(tenant_id.to_string(), rx);
        tx
    }
}

async fn release<T>(rx: Held<T>) -> Result<T, FetchError> {
    rx.await
        .unwrap_or_else(|_| Err(FetchError::Network("held response dropped".to_string())))
}

impl DataSource for ScriptedSource {
    async fn list_tenants(&self) -> Result<Vec<Tenant>, FetchError> {
        Ok(self.tenants.clone())
    }

    async fn list_workflows(&self, tenant_id: &str) -> Result<Vec<Workflow>, FetchError> {
        let held = self.held_workflows.lock().unwrap().remove(tenant_id);
        if let Some(rx) = held {
            return release(rx).await;
        }
        self.workflows
            .lock()
            .unwrap()
            .get(tenant_id)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn list_models(&self, tenant_id: &str, kind: ArtifactType) -> Result<Vec<ModelArtifact>, FetchError> {
        self.models
            .lock()
            .unwrap()
            .get(&(tenant_id.to_string(), kind))
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn list_dataset_preparations(&self, tenant_id: &str) -> Result<Vec<DatasetPreparation>, FetchError> {
        let held = self.held_preparations.lock().unwrap().remove(tenant_id);
        if let Some(rx) = held {
            return release(rx).await;
        }
        self.preparations
            .lock()
            .unwrap()
            .get(tenant_id)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn preview_filtered_data(&self, request: &PreviewRequest) -> Result<PreviewResult, FetchError> {
        self.preview_calls.lock().unwrap().push(request.clone());
        self.preview.lock().unwrap().clone()
    }

    async fn save_dataset(&self, request: &SaveDatasetRequest) -> Result<SavedDataset, FetchError> {
        self.save_calls.lock().unwrap().push(request.clone());
        self.save.lock().unwrap().clone()
    }

    async fn create_training_run(&self, request: &TrainingRunRequest) -> Result<TrainingRunCreated, FetchError> {
        self.create_calls.lock().unwrap().push(request.clone());
        self.create.lock().unwrap().clone().map(|mut created| {
            created.training_execution_name = request.training_execution_name.clone();
            created
        })
    }
}
