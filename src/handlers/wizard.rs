use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::DataSource;
use crate::models::{AppState, SaveDatasetRequest, TrainingRunRequest};
use crate::services::WizardSession;
use crate::wizard::{
    DatasetEdit, DatasetWizard, PreviewLoad, TenantLoad, TrainingEdit, TrainingLoad, TrainingWizard,
};

use super::helpers::{resolve_tenant, ApiError};

fn wizard_view(state: &AppState, id: &str) -> Result<Json<Value>, ApiError> {
    let view = state
        .wizards
        .with(id, |session| session.view(id))
        .ok_or_else(|| ApiError::wizard_not_found(id))??;
    Ok(Json(view))
}

pub async fn dataset_wizard_create(State(state): State<AppState>) -> Result<(StatusCode, Json<Value>), ApiError> {
    let id = state.wizards.create(WizardSession::Dataset(DatasetWizard::new()));
    let Json(view) = wizard_view(&state, &id)?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn training_wizard_create(State(state): State<AppState>) -> Result<(StatusCode, Json<Value>), ApiError> {
    let id = state.wizards.create(WizardSession::Training(TrainingWizard::new()));
    let Json(view) = wizard_view(&state, &id)?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn wizard_get(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    wizard_view(&state, &id)
}

pub async fn wizard_delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode, ApiError> {
    if state.wizards.remove(&id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::wizard_not_found(&id))
    }
}

#[derive(Debug, Deserialize)]
pub struct TenantBody {
    pub tenant_id: String,
}

enum PendingTenantLoad {
    Dataset(TenantLoad),
    Training(TrainingLoad),
}

/// Select a tenant, then fetch its option sets outside the session lock.
/// A newer selection made meanwhile wins; this response is then dropped.
pub async fn wizard_tenant(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<TenantBody>,
) -> Result<Json<Value>, ApiError> {
    let tenant = resolve_tenant(state.backend.as_ref(), &body.tenant_id).await?;
    let pending = state
        .wizards
        .with(&id, |session| match session {
            WizardSession::Dataset(w) => PendingTenantLoad::Dataset(w.select_tenant(&tenant)),
            WizardSession::Training(w) => PendingTenantLoad::Training(w.select_tenant(&tenant)),
        })
        .ok_or_else(|| ApiError::wizard_not_found(&id))?;

    match pending {
        PendingTenantLoad::Dataset(load) => {
            let loaded = load.fetch(state.backend.as_ref()).await;
            state.wizards.with(&id, |session| {
                if let WizardSession::Dataset(w) = session {
                    w.apply_tenant_load(loaded);
                }
            });
        }
        PendingTenantLoad::Training(load) => {
            let loaded = load.fetch(state.backend.as_ref()).await;
            state.wizards.with(&id, |session| {
                if let WizardSession::Training(w) = session {
                    w.apply_tenant_load(loaded);
                }
            });
        }
    }
    wizard_view(&state, &id)
}

/// Apply one field edit. The body is a dataset or training edit depending
/// on the session kind, e.g. `{"op": "set_name", "name": "..."}`.
pub async fn wizard_fields(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    state
        .wizards
        .with(&id, |session| -> Result<(), ApiError> {
            match session {
                WizardSession::Dataset(w) => {
                    let edit: DatasetEdit = serde_json::from_value(body).map_err(bad_edit)?;
                    w.apply_edit(edit)?;
                }
                WizardSession::Training(w) => {
                    let edit: TrainingEdit = serde_json::from_value(body).map_err(bad_edit)?;
                    w.apply_edit(edit)?;
                }
            }
            Ok(())
        })
        .ok_or_else(|| ApiError::wizard_not_found(&id))??;
    wizard_view(&state, &id)
}

fn bad_edit(e: serde_json::Error) -> ApiError {
    ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, format!("Invalid edit: {}", e))
}

async fn run_preview(state: &AppState, id: &str, load: PreviewLoad) {
    let outcome = load.fetch(state.backend.as_ref()).await;
    state.wizards.with(id, |session| {
        if let WizardSession::Dataset(w) = session {
            w.apply_preview(outcome);
        }
    });
}

pub async fn wizard_next(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let pending = state
        .wizards
        .with(&id, |session| match session {
            WizardSession::Dataset(w) => w.advance(),
            WizardSession::Training(w) => w.advance().map(|_| None),
        })
        .ok_or_else(|| ApiError::wizard_not_found(&id))??;
    if let Some(load) = pending {
        run_preview(&state, &id, load).await;
    }
    wizard_view(&state, &id)
}

pub async fn wizard_back(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let moved = state
        .wizards
        .with(&id, |session| match session {
            WizardSession::Dataset(w) => w.retreat(),
            WizardSession::Training(w) => w.retreat(),
        })
        .ok_or_else(|| ApiError::wizard_not_found(&id))?;
    if !moved {
        return Err(ApiError::new(StatusCode::CONFLICT, "Cannot go back from this step"));
    }
    wizard_view(&state, &id)
}

/// Re-run the dataset preview for the current filters.
pub async fn wizard_preview(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let load = state
        .wizards
        .with(&id, |session| match session {
            WizardSession::Dataset(w) => Ok(w.begin_preview()),
            WizardSession::Training(_) => Err(ApiError::new(
                StatusCode::CONFLICT,
                "Only dataset wizards have a preview",
            )),
        })
        .ok_or_else(|| ApiError::wizard_not_found(&id))??;
    run_preview(&state, &id, load).await;
    wizard_view(&state, &id)
}

enum PendingSubmit {
    Dataset(SaveDatasetRequest),
    Training(TrainingRunRequest),
}

/// Close the submission gate, call the backend without holding the lock,
/// then report the outcome to the wizard.
pub async fn wizard_submit(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let pending = state
        .wizards
        .with(&id, |session| match session {
            WizardSession::Dataset(w) => w.begin_submit().map(PendingSubmit::Dataset),
            WizardSession::Training(w) => w.begin_submit().map(PendingSubmit::Training),
        })
        .ok_or_else(|| ApiError::wizard_not_found(&id))??;

    let result = match pending {
        PendingSubmit::Dataset(request) => {
            let outcome = state.backend.save_dataset(&request).await;
            state
                .wizards
                .with(&id, |session| match session {
                    WizardSession::Dataset(w) => Some(w.finish_submit(outcome).map(|saved| json!(saved))),
                    WizardSession::Training(_) => None,
                })
                .flatten()
                .ok_or_else(|| ApiError::wizard_not_found(&id))??
        }
        PendingSubmit::Training(request) => {
            let outcome = state.backend.create_training_run(&request).await;
            state
                .wizards
                .with(&id, |session| match session {
                    WizardSession::Training(w) => Some(w.finish_submit(outcome).map(|created| json!(created))),
                    WizardSession::Dataset(_) => None,
                })
                .flatten()
                .ok_or_else(|| ApiError::wizard_not_found(&id))??
        }
    };

    let Json(view) = wizard_view(&state, &id)?;
    Ok(Json(json!({ "result": result, "wizard": view })))
}
