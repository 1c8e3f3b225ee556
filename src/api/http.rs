use reqwest::Method;
use serde::Deserialize;
use urlencoding::encode;

use super::client::ApiClient;
use super::source::{DataSource, RunCatalog};
use crate::error::FetchError;
use crate::models::{
    ArtifactType, DatasetPreparation, ModelArtifact, PreviewRequest, PreviewResult, RunFilters,
    SaveDatasetRequest, SavedDataset, Tenant, TrainingRun, TrainingRunCreated, TrainingRunRequest,
    Workflow,
};

const DATASET_PAGE_SIZE: &str = "500";

/// Envelope used by the backend's list endpoints.
#[derive(Debug, Deserialize)]
struct Page<T> {
    items: Vec<T>,
}

/// TRTLLM listings omit `artifact_type`; everything they return is TRTLLM.
#[derive(Debug, Deserialize)]
struct TrtllmModel {
    artifact_id: String,
    model_artifact_name: String,
    s3_path: String,
    #[serde(default)]
    training_execution_id: Option<String>,
    #[serde(default)]
    tenant_id: Option<String>,
    #[serde(default)]
    model_size_mb: Option<f64>,
    #[serde(default)]
    published: bool,
    #[serde(default)]
    model_tag: Option<String>,
    created_at: String,
}

impl From<TrtllmModel> for ModelArtifact {
    fn from(m: TrtllmModel) -> Self {
        ModelArtifact {
            artifact_id: m.artifact_id,
            artifact_type: ArtifactType::Trtllm,
            model_artifact_name: m.model_artifact_name,
            s3_path: m.s3_path,
            tenant_id: m.tenant_id,
            training_execution_id: m.training_execution_id,
            model_size_mb: m.model_size_mb,
            published: m.published,
            model_tag: m.model_tag,
            created_at: m.created_at,
        }
    }
}

/// Data source backed by the real training backend.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: ApiClient,
}

impl HttpBackend {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }
}

fn to_body<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, FetchError> {
    serde_json::to_value(value).map_err(|e| FetchError::Decode(e.to_string()))
}

impl DataSource for HttpBackend {
    async fn list_tenants(&self) -> Result<Vec<Tenant>, FetchError> {
        self.client.get("/training_data/tenant_ids_mapping", None).await
    }

    async fn list_workflows(&self, tenant_id: &str) -> Result<Vec<Workflow>, FetchError> {
        let endpoint = format!("/training/tenant/{}/workflow_ids", encode(tenant_id));
        self.client.get(&endpoint, None).await
    }

    async fn list_models(&self, tenant_id: &str, kind: ArtifactType) -> Result<Vec<ModelArtifact>, FetchError> {
        match kind {
            ArtifactType::Trtllm => {
                let endpoint = format!("/training/tenant/{}/trtllm_models", encode(tenant_id));
                let models: Vec<TrtllmModel> = self.client.get(&endpoint, None).await?;
                Ok(models.into_iter().map(ModelArtifact::from).collect())
            }
            ArtifactType::RawWeight => {
                let params = vec![("artifact_type".to_string(), kind.as_str().to_string())];
                let models: Vec<ModelArtifact> = self.client.get("/model_artifacts/by-type", Some(params)).await?;
                // Shared base models carry no tenant; tenant fine-tunes only show for their tenant.
                Ok(models
                    .into_iter()
                    .filter(|m| m.tenant_id.as_deref().map_or(true, |t| t == tenant_id))
                    .collect())
            }
        }
    }

    async fn list_dataset_preparations(&self, tenant_id: &str) -> Result<Vec<DatasetPreparation>, FetchError> {
        let datasets = self.list_datasets(Some(tenant_id)).await?;
        Ok(datasets
            .into_iter()
            .filter(|d| d.tenant_id.as_deref() == Some(tenant_id))
            .collect())
    }

    async fn preview_filtered_data(&self, request: &PreviewRequest) -> Result<PreviewResult, FetchError> {
        self.client.post("/training_data/filter", to_body(request)?).await
    }

    async fn save_dataset(&self, request: &SaveDatasetRequest) -> Result<SavedDataset, FetchError> {
        self.client.post("/training_data/save_fetched_data", to_body(request)?).await
    }

    async fn create_training_run(&self, request: &TrainingRunRequest) -> Result<TrainingRunCreated, FetchError> {
        self.client.post("/training/start", to_body(request)?).await
    }
}

/// Single-record lookups report a missing record as `NotFound`.
fn not_found_as(e: FetchError, what: impl FnOnce() -> String) -> FetchError {
    match e {
        FetchError::Status { status: 404, .. } => FetchError::NotFound(what()),
        other => other,
    }
}

impl RunCatalog for HttpBackend {
    async fn list_datasets(&self, tenant_id: Option<&str>) -> Result<Vec<DatasetPreparation>, FetchError> {
        let mut params = vec![("page_size".to_string(), DATASET_PAGE_SIZE.to_string())];
        if let Some(t) = tenant_id {
            params.push(("tenant_id".to_string(), t.to_string()));
        }
        let page: Page<DatasetPreparation> = self.client.get("/training_data/", Some(params)).await?;
        Ok(page.items)
    }

    async fn get_dataset(&self, id: &str) -> Result<DatasetPreparation, FetchError> {
        let endpoint = format!("/training_data/{}", encode(id));
        self.client
            .get(&endpoint, None)
            .await
            .map_err(|e| not_found_as(e, || format!("dataset {}", id)))
    }

    async fn delete_dataset(&self, id: &str) -> Result<(), FetchError> {
        let endpoint = format!("/training_data/{}", encode(id));
        self.client.send(Method::DELETE, &endpoint, None).await
    }

    async fn list_training_runs(&self, filters: &RunFilters) -> Result<Vec<TrainingRun>, FetchError> {
        let params = filters.to_query_pairs();
        let params = if params.is_empty() { None } else { Some(params) };
        let page: Page<TrainingRun> = self.client.get("/training/", params).await?;
        Ok(page.items)
    }

    async fn get_training_run(&self, id: &str) -> Result<TrainingRun, FetchError> {
        let endpoint = format!("/training/{}", encode(id));
        self.client
            .get(&endpoint, None)
            .await
            .map_err(|e| not_found_as(e, || format!("training run {}", id)))
    }

    async fn abort_training_run(&self, id: &str, reason: Option<&str>) -> Result<(), FetchError> {
        let body = serde_json::json!({
            "training_execution_id": id,
            "reason": reason,
        });
        self.client.send(Method::POST, "/training/abort", Some(body)).await
    }
}
