use crate::handlers::accounting::AccountingConfigDto;
use crate::helpers::converters::{compute_error_response, error_body, projection_to_point};
use crate::schemas::{ApiResponse, ErrorResponse};
use axum::{http::StatusCode, response::Json};
use common::{AccountingView, ProjectionPoint};
use compute::projection::calculator_for;
use model::accounting::ProjectAccountingConfig;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use utoipa::ToSchema;

/// Request body for projecting one deposit
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ProjectionRequest {
    /// Deposit amount to spread
    #[schema(value_type = String)]
    pub deposit_amount: Decimal,
    pub config: AccountingConfigDto,
}

type ProjectionResult = Result<Json<ApiResponse<Vec<ProjectionPoint>>>, (StatusCode, Json<ErrorResponse>)>;

fn project(view: AccountingView, request: ProjectionRequest) -> ProjectionResult {
    let Some(calculator) = calculator_for(view) else {
        return Err(error_body(
            StatusCode::BAD_REQUEST,
            "INVALID_VIEW",
            format!("The {} view does not project deposits", view),
        ));
    };

    let config = ProjectAccountingConfig::from(request.config);
    let points: Vec<ProjectionPoint> = calculator
        .project(request.deposit_amount, &config)
        .map_err(compute_error_response)?
        .iter()
        .map(projection_to_point)
        .collect();
    debug!("Projected deposit over {} months ({})", points.len(), calculator.view());

    Ok(Json(ApiResponse {
        data: points,
        message: format!("{} projection computed", view),
        success: true,
    }))
}

/// Project a deposit with management accounting
///
/// The amount is split evenly over the project months and the profit follows
/// the target margin rate. When a final month cost is set the last month
/// takes its revenue minus that cost instead.
#[utoipa::path(
    post,
    path = "/api/v1/projections/management",
    tag = "projections",
    request_body = ProjectionRequest,
    responses(
        (status = 200, description = "Projection computed", body = ApiResponse<Vec<ProjectionPoint>>),
        (status = 400, description = "Amounts out of range", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn project_management_view(Json(request): Json<ProjectionRequest>) -> ProjectionResult {
    project(AccountingView::Management, request)
}

/// Project a deposit with real accounting
///
/// The whole amount is recognized in the first project month and every month
/// carries its recorded expense.
#[utoipa::path(
    post,
    path = "/api/v1/projections/real",
    tag = "projections",
    request_body = ProjectionRequest,
    responses(
        (status = 200, description = "Projection computed", body = ApiResponse<Vec<ProjectionPoint>>),
        (status = 400, description = "Amounts out of range", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn project_real_view(Json(request): Json<ProjectionRequest>) -> ProjectionResult {
    project(AccountingView::Real, request)
}
