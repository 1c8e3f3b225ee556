use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::api::DataSource;
use crate::error::{FetchError, WizardError};
use crate::models::Tenant;

/// Error body returned by every JSON endpoint: `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn wizard_not_found(id: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, format!("No wizard session '{}'", id))
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, message = %self.message, "Request failed");
        }
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<FetchError> for ApiError {
    fn from(e: FetchError) -> Self {
        let status = match &e {
            FetchError::NotFound(_) => StatusCode::NOT_FOUND,
            FetchError::Status { status, .. } if *status == 409 => StatusCode::CONFLICT,
            FetchError::Network(_) => StatusCode::SERVICE_UNAVAILABLE,
            FetchError::Status { .. } | FetchError::Decode(_) => StatusCode::BAD_GATEWAY,
        };
        Self::new(status, e.to_string())
    }
}

impl From<WizardError> for ApiError {
    fn from(e: WizardError) -> Self {
        match e {
            WizardError::Fetch(inner) => inner.into(),
            WizardError::InvalidField { .. } => Self::new(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
            WizardError::StepBlocked(_)
            | WizardError::NotOnFinalStep(_)
            | WizardError::SubmissionInFlight
            | WizardError::MissingPreview => Self::new(StatusCode::CONFLICT, e.to_string()),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        Self::internal(format!("Failed to encode response: {}", e))
    }
}

/// Look a tenant up by id in the backend's tenant list.
pub async fn resolve_tenant<S: DataSource>(source: &S, tenant_id: &str) -> Result<Tenant, ApiError> {
    let wanted = tenant_id.trim();
    if wanted.is_empty() {
        return Err(ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, "tenant_id is required"));
    }
    source
        .list_tenants()
        .await?
        .into_iter()
        .find(|t| t.tenant_id == wanted)
        .ok_or_else(|| FetchError::NotFound(format!("tenant {}", wanted)).into())
}
