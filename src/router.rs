use crate::handlers::{
    accounting::{classify_accounting_status, get_accounting_config, save_project_accounting_config},
    deposits::{create_deposit, delete_deposit, get_deposits},
    health::health_check,
    monthly::get_monthly_series,
    projections::{project_management_view, project_real_view},
    projects::get_projects,
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Deposit routes
        .route("/api/v1/deposits", post(create_deposit))
        .route("/api/v1/deposits", get(get_deposits))
        .route("/api/v1/deposits/:record_id", delete(delete_deposit))
        // Project and accounting configuration routes
        .route("/api/v1/projects", get(get_projects))
        .route("/api/v1/projects/accounting-config", put(save_project_accounting_config))
        .route("/api/v1/accounting-configs/:record_id", get(get_accounting_config))
        .route("/api/v1/accounting-status", post(classify_accounting_status))
        // Single deposit projections
        .route("/api/v1/projections/management", post(project_management_view))
        .route("/api/v1/projections/real", post(project_real_view))
        // Aggregated chart
        .route("/api/v1/monthly", get(get_monthly_series))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
