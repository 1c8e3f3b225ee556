use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::models::AppState;

pub fn build_app(state: AppState) -> Router {
    let catalog = Router::new()
        .route("/tenants", get(handlers::catalog::tenants_get))
        .route("/tenants/:tenant_id/workflows", get(handlers::catalog::workflows_get))
        .route("/tenants/:tenant_id/models", get(handlers::catalog::models_get))
        .route("/datasets", get(handlers::catalog::datasets_get))
        .route(
            "/datasets/:id",
            get(handlers::catalog::dataset_get).delete(handlers::catalog::dataset_delete),
        )
        .route("/training-runs", get(handlers::catalog::training_runs_get))
        .route("/training-runs/:id", get(handlers::catalog::training_run_get))
        .route("/training-runs/:id/abort", post(handlers::catalog::training_run_abort));

    let wizards = Router::new()
        .route("/wizards/dataset", post(handlers::wizard::dataset_wizard_create))
        .route("/wizards/training", post(handlers::wizard::training_wizard_create))
        .route(
            "/wizards/:id",
            get(handlers::wizard::wizard_get).delete(handlers::wizard::wizard_delete),
        )
        .route("/wizards/:id/tenant", post(handlers::wizard::wizard_tenant))
        .route("/wizards/:id/fields", post(handlers::wizard::wizard_fields))
        .route("/wizards/:id/next", post(handlers::wizard::wizard_next))
        .route("/wizards/:id/back", post(handlers::wizard::wizard_back))
        .route("/wizards/:id/preview", post(handlers::wizard::wizard_preview))
        .route("/wizards/:id/submit", post(handlers::wizard::wizard_submit));

    Router::new()
        .nest("/api", catalog.merge(wizards))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
