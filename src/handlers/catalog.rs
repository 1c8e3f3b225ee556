use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::api::{DataSource, RunCatalog};
use crate::models::{
    AppState, ArtifactType, DatasetPreparation, ModelArtifact, RunFilters, RunStatus, Tenant,
    TrainingRun, Workflow,
};
use crate::utils::{non_blank, parse_csv_list};

use super::helpers::ApiError;

pub async fn tenants_get(State(state): State<AppState>) -> Result<Json<Vec<Tenant>>, ApiError> {
    Ok(Json(state.backend.list_tenants().await?))
}

pub async fn workflows_get(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
) -> Result<Json<Vec<Workflow>>, ApiError> {
    Ok(Json(state.backend.list_workflows(&tenant_id).await?))
}

#[derive(Debug, Deserialize)]
pub struct ModelsQuery {
    #[serde(default)]
    pub kind: Option<String>,
}

pub async fn models_get(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
    Query(q): Query<ModelsQuery>,
) -> Result<Json<Vec<ModelArtifact>>, ApiError> {
    let kind = match q.kind.as_deref().and_then(non_blank) {
        Some(raw) => raw
            .parse::<ArtifactType>()
            .map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, e))?,
        None => ArtifactType::Trtllm,
    };
    Ok(Json(state.backend.list_models(&tenant_id, kind).await?))
}

#[derive(Debug, Deserialize)]
pub struct DatasetsQuery {
    #[serde(default)]
    pub tenant_id: Option<String>,
}

pub async fn datasets_get(
    State(state): State<AppState>,
    Query(q): Query<DatasetsQuery>,
) -> Result<Json<Vec<DatasetPreparation>>, ApiError> {
    let tenant = q.tenant_id.as_deref().and_then(non_blank);
    Ok(Json(state.backend.list_datasets(tenant.as_deref()).await?))
}

pub async fn dataset_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DatasetPreparation>, ApiError> {
    Ok(Json(state.backend.get_dataset(&id).await?))
}

pub async fn dataset_delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.backend.delete_dataset(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Query form of [`RunFilters`]; multi-valued keys are comma separated.
#[derive(Debug, Default, Deserialize)]
pub struct RunsQuery {
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl RunsQuery {
    pub fn into_filters(self) -> Result<RunFilters, String> {
        let status = match self.status.as_deref().and_then(non_blank) {
            Some(raw) => Some(raw.parse::<RunStatus>()?),
            None => None,
        };
        Ok(RunFilters {
            start_date: self.start_date.as_deref().and_then(non_blank),
            end_date: self.end_date.as_deref().and_then(non_blank),
            created_by: self.created_by.as_deref().map(parse_csv_list).unwrap_or_default(),
            tenant_id: self.tenant_id.as_deref().map(parse_csv_list).unwrap_or_default(),
            status,
            training_execution_name: self.name.as_deref().and_then(non_blank),
        })
    }
}

pub async fn training_runs_get(
    State(state): State<AppState>,
    Query(q): Query<RunsQuery>,
) -> Result<Json<Vec<TrainingRun>>, ApiError> {
    let filters = q
        .into_filters()
        .map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, e))?;
    Ok(Json(state.backend.list_training_runs(&filters).await?))
}

pub async fn training_run_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TrainingRun>, ApiError> {
    Ok(Json(state.backend.get_training_run(&id).await?))
}

#[derive(Debug, Default, Deserialize)]
pub struct AbortBody {
    #[serde(default)]
    pub reason: Option<String>,
}

pub async fn training_run_abort(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Option<Json<AbortBody>>,
) -> Result<StatusCode, ApiError> {
    let reason = body.and_then(|Json(b)| b.reason).and_then(|r| non_blank(&r));
    state.backend.abort_training_run(&id, reason.as_deref()).await?;
    Ok(StatusCode::ACCEPTED)
}
