use std::future::Future;

use crate::error::FetchError;
use crate::models::{
    ArtifactType, DatasetPreparation, ModelArtifact, PreviewRequest, PreviewResult, RunFilters,
    SaveDatasetRequest, SavedDataset, Tenant, TrainingRun, TrainingRunCreated, TrainingRunRequest,
    Workflow,
};

/// Everything the wizards need from the outside world.
///
/// Implemented by the fixture backend, the HTTP backend, and the
/// [`Backend`](super::Backend) switch between them. Tests provide their own
/// scripted implementations.
pub trait DataSource: Send + Sync {
    fn list_tenants(&self) -> impl Future<Output = Result<Vec<Tenant>, FetchError>> + Send;

    fn list_workflows(
        &self,
        tenant_id: &str,
    ) -> impl Future<Output = Result<Vec<Workflow>, FetchError>> + Send;

    fn list_models(
        &self,
        tenant_id: &str,
        kind: ArtifactType,
    ) -> impl Future<Output = Result<Vec<ModelArtifact>, FetchError>> + Send;

    fn list_dataset_preparations(
        &self,
        tenant_id: &str,
    ) -> impl Future<Output = Result<Vec<DatasetPreparation>, FetchError>> + Send;

    fn preview_filtered_data(
        &self,
        request: &PreviewRequest,
    ) -> impl Future<Output = Result<PreviewResult, FetchError>> + Send;

    fn save_dataset(
        &self,
        request: &SaveDatasetRequest,
    ) -> impl Future<Output = Result<SavedDataset, FetchError>> + Send;

    fn create_training_run(
        &self,
        request: &TrainingRunRequest,
    ) -> impl Future<Output = Result<TrainingRunCreated, FetchError>> + Send;
}

/// Listing and management calls used by the catalogue pages and the CLI.
pub trait RunCatalog: Send + Sync {
    fn list_datasets(
        &self,
        tenant_id: Option<&str>,
    ) -> impl Future<Output = Result<Vec<DatasetPreparation>, FetchError>> + Send;

    fn get_dataset(&self, id: &str) -> impl Future<Output = Result<DatasetPreparation, FetchError>> + Send;

    fn delete_dataset(&self, id: &str) -> impl Future<Output = Result<(), FetchError>> + Send;

    fn list_training_runs(
        &self,
        filters: &RunFilters,
    ) -> impl Future<Output = Result<Vec<TrainingRun>, FetchError>> + Send;

    fn get_training_run(&self, id: &str) -> impl Future<Output = Result<TrainingRun, FetchError>> + Send;

    fn abort_training_run(
        &self,
        id: &str,
        reason: Option<&str>,
    ) -> impl Future<Output = Result<(), FetchError>> + Send;
}
