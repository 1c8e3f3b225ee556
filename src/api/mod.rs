// Data-access layer: HTTP client, fixture backend, and the switch between them
pub mod client;
pub mod source;
pub mod http;
pub mod mock;

pub use client::ApiClient;
pub use source::{DataSource, RunCatalog};
pub use http::HttpBackend;
pub use mock::MockBackend;

use crate::config::{AppConfig, DataMode};
use crate::error::FetchError;
use crate::models::{
    ArtifactType, DatasetPreparation, ModelArtifact, PreviewRequest, PreviewResult, RunFilters,
    SaveDatasetRequest, SavedDataset, Tenant, TrainingRun, TrainingRunCreated, TrainingRunRequest,
    Workflow,
};

/// The backing selected by configuration.
#[derive(Debug)]
pub enum Backend {
    Mock(MockBackend),
    Http(HttpBackend),
}

impl Backend {
    pub fn from_config(config: &AppConfig) -> Result<Self, FetchError> {
        match config.data_mode {
            DataMode::Dummy => Ok(Backend::Mock(MockBackend::new())),
            DataMode::Live => Ok(Backend::Http(HttpBackend::new(ApiClient::new(config)?))),
        }
    }

    pub fn mode(&self) -> DataMode {
        match self {
            Backend::Mock(_) => DataMode::Dummy,
            Backend::Http(_) => DataMode::Live,
        }
    }
}

impl DataSource for Backend {
    async fn list_tenants(&self) -> Result<Vec<Tenant>, FetchError> {
        match self {
            Backend::Mock(m) => m.list_tenants().await,
            Backend::Http(h) => h.list_tenants().await,
        }
    }

    async fn list_workflows(&self, tenant_id: &str) -> Result<Vec<Workflow>, FetchError> {
        match self {
            Backend::Mock(m) => m.list_workflows(tenant_id).await,
            Backend::Http(h) => h.list_workflows(tenant_id).await,
        }
    }

    async fn list_models(&self, tenant_id: &str, kind: ArtifactType) -> Result<Vec<ModelArtifact>, FetchError> {
        match self {
            Backend::Mock(m) => m.list_models(tenant_id, kind).await,
            Backend::Http(h) => h.list_models(tenant_id, kind).await,
        }
    }

    async fn list_dataset_preparations(&self, tenant_id: &str) -> Result<Vec<DatasetPreparation>, FetchError> {
        match self {
            Backend::Mock(m) => m.list_dataset_preparations(tenant_id).await,
            Backend::Http(h) => h.list_dataset_preparations(tenant_id).await,
        }
    }

    async fn preview_filtered_data(&self, request: &PreviewRequest) -> Result<PreviewResult, FetchError> {
        match self {
            Backend::Mock(m) => m.preview_filtered_data(request).await,
            Backend::Http(h) => h.preview_filtered_data(request).await,
        }
    }

    async fn save_dataset(&self, request: &SaveDatasetRequest) -> Result<SavedDataset, FetchError> {
        match self {
            Backend::Mock(m) => m.save_dataset(request).await,
            Backend::Http(h) => h.save_dataset(request).await,
        }
    }

    async fn create_training_run(&self, request: &TrainingRunRequest) -> Result<TrainingRunCreated, FetchError> {
        match self {
            Backend::Mock(m) => m.create_training_run(request).await,
            Backend::Http(h) => h.create_training_run(request).await,
        }
    }
}

impl RunCatalog for Backend {
    async fn list_datasets(&self, tenant_id: Option<&str>) -> Result<Vec<DatasetPreparation>, FetchError> {
        match self {
            Backend::Mock(m) => m.list_datasets(tenant_id).await,
            Backend::Http(h) => h.list_datasets(tenant_id).await,
        }
    }

    async fn get_dataset(&self, id: &str) -> Result<DatasetPreparation, FetchError> {
        match self {
            Backend::Mock(m) => m.get_dataset(id).await,
            Backend::Http(h) => h.get_dataset(id).await,
        }
    }

    async fn delete_dataset(&self, id: &str) -> Result<(), FetchError> {
        match self {
            Backend::Mock(m) => m.delete_dataset(id).await,
            Backend::Http(h) => h.delete_dataset(id).await,
        }
    }

    async fn list_training_runs(&self, filters: &RunFilters) -> Result<Vec<TrainingRun>, FetchError> {
        match self {
            Backend::Mock(m) => m.list_training_runs(filters).await,
            Backend::Http(h) => h.list_training_runs(filters).await,
        }
    }

    async fn get_training_run(&self, id: &str) -> Result<TrainingRun, FetchError> {
        match self {
            Backend::Mock(m) => m.get_training_run(id).await,
            Backend::Http(h) => h.get_training_run(id).await,
        }
    }

    async fn abort_training_run(&self, id: &str, reason: Option<&str>) -> Result<(), FetchError> {
        match self {
            Backend::Mock(m) => m.abort_training_run(id, reason).await,
            Backend::Http(h) => h.abort_training_run(id, reason).await,
        }
    }
}
