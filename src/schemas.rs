use common::{AccountingStatusLabel, AccountingView, MonthlyPoint, MonthlySeries, ProjectionPoint};
use compute::ProjectionEngine;
use moka::future::Cache;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use utoipa::{OpenApi, ToSchema};

pub use common::ApiResponse;

use crate::handlers::accounting::{
    AccountingConfigDto, AccountingStatusResponse, MonthlyExpenseDto, SaveProjectConfigRequest,
};
use crate::handlers::deposits::{CreateDepositRequest, DepositResponse};
use crate::handlers::projections::ProjectionRequest;
use crate::handlers::projects::{ProjectOverviewResponse, ProjectStatusResponse};

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Projection engine with its configuration cache
    pub engine: Arc<ProjectionEngine>,
    /// Cache for computed monthly series
    pub cache: Cache<String, CachedData>,
    /// Bumped after every write that changes the series; part of each cache key
    pub series_generation: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, engine: ProjectionEngine, cache: Cache<String, CachedData>) -> Self {
        Self {
            db,
            engine: Arc::new(engine),
            cache,
            series_generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Generation of the stored data that a series computed now reflects.
    pub fn series_generation(&self) -> u64 {
        self.series_generation.load(Ordering::SeqCst)
    }

    /// Call once a write has been committed. Series computed from earlier
    /// reads land under an older generation and are never served again.
    pub fn invalidate_series(&self) {
        self.series_generation.fetch_add(1, Ordering::SeqCst);
        self.cache.invalidate_all();
    }
}

/// Cached data types
#[derive(Clone, Debug)]
pub enum CachedData {
    Monthly(MonthlySeries),
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Health check response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::deposits::create_deposit,
        crate::handlers::deposits::get_deposits,
        crate::handlers::deposits::delete_deposit,
        crate::handlers::projects::get_projects,
        crate::handlers::accounting::get_accounting_config,
        crate::handlers::accounting::save_project_accounting_config,
        crate::handlers::accounting::classify_accounting_status,
        crate::handlers::projections::project_management_view,
        crate::handlers::projections::project_real_view,
        crate::handlers::monthly::get_monthly_series,
    ),
    components(
        schemas(
            ApiResponse<MonthlySeries>,
            ApiResponse<ProjectOverviewResponse>,
            ApiResponse<AccountingConfigDto>,
            ApiResponse<DepositResponse>,
            ApiResponse<Vec<DepositResponse>>,
            ApiResponse<Vec<ProjectionPoint>>,
            ApiResponse<AccountingStatusResponse>,
            ErrorResponse,
            HealthResponse,
            CreateDepositRequest,
            DepositResponse,
            ProjectOverviewResponse,
            ProjectStatusResponse,
            AccountingConfigDto,
            MonthlyExpenseDto,
            SaveProjectConfigRequest,
            AccountingStatusResponse,
            AccountingStatusLabel,
            ProjectionRequest,
            ProjectionPoint,
            MonthlySeries,
            MonthlyPoint,
            AccountingView,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "deposits", description = "Deposit records"),
        (name = "projects", description = "Accounting projects and their configuration"),
        (name = "projections", description = "Single deposit projections"),
        (name = "monthly", description = "Aggregated monthly series"),
    ),
    info(
        title = "DepositBoard API",
        description = "Deposit dashboard API - project accounting projections over incoming payments",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
