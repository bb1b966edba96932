use crate::helpers::converters::{compute_error_response, error_body, status_label};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use common::AccountingStatusLabel;
use compute::classify_status;
use model::accounting::{MonthlyExpenseEntry, ProjectAccountingConfig};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace, warn};
use utoipa::ToSchema;
use validator::Validate;

/// One month of actual project expense
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, PartialEq)]
pub struct MonthlyExpenseDto {
    /// Month as `YYMM`
    pub month: String,
    #[schema(value_type = String)]
    pub expense_amount: Decimal,
    pub expense_currency: String,
}

/// Accounting configuration of a project
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema, PartialEq)]
pub struct AccountingConfigDto {
    /// First month of the project as `YYMM`
    pub period_start: Option<String>,
    /// Last month of the project as `YYMM`
    pub period_end: Option<String>,
    /// Target margin rate in percent
    #[schema(value_type = Option<String>)]
    pub target_margin_rate: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub final_month_actual_cost: Option<Decimal>,
    pub final_month_actual_cost_currency: Option<String>,
    #[serde(default)]
    pub monthly_expenses: Vec<MonthlyExpenseDto>,
}

impl From<AccountingConfigDto> for ProjectAccountingConfig {
    fn from(dto: AccountingConfigDto) -> Self {
        Self {
            period_start: dto.period_start,
            period_end: dto.period_end,
            target_margin_rate: dto.target_margin_rate,
            final_month_actual_cost: dto.final_month_actual_cost,
            final_month_actual_cost_currency: dto.final_month_actual_cost_currency,
            monthly_expenses: dto
                .monthly_expenses
                .into_iter()
                .map(|e| MonthlyExpenseEntry {
                    month: e.month,
                    expense_amount: e.expense_amount,
                    expense_currency: e.expense_currency,
                })
                .collect(),
        }
    }
}

impl From<ProjectAccountingConfig> for AccountingConfigDto {
    fn from(config: ProjectAccountingConfig) -> Self {
        Self {
            period_start: config.period_start,
            period_end: config.period_end,
            target_margin_rate: config.target_margin_rate,
            final_month_actual_cost: config.final_month_actual_cost,
            final_month_actual_cost_currency: config.final_month_actual_cost_currency,
            monthly_expenses: config
                .monthly_expenses
                .into_iter()
                .map(|e| MonthlyExpenseDto {
                    month: e.month,
                    expense_amount: e.expense_amount,
                    expense_currency: e.expense_currency,
                })
                .collect(),
        }
    }
}

/// Request body for saving one configuration over a whole project
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct SaveProjectConfigRequest {
    /// Every record belonging to the project
    #[validate(length(min = 1))]
    pub record_ids: Vec<i32>,
    pub config: AccountingConfigDto,
}

/// Completeness of a supplied configuration
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AccountingStatusResponse {
    pub status: AccountingStatusLabel,
    /// Status as plain text, same as `status`
    pub label: String,
}

/// Get the accounting configuration stored for a deposit
#[utoipa::path(
    get,
    path = "/api/v1/accounting-configs/{record_id}",
    tag = "projects",
    params(
        ("record_id" = i32, Path, description = "Deposit record ID"),
    ),
    responses(
        (status = 200, description = "Configuration retrieved successfully", body = ApiResponse<AccountingConfigDto>),
        (status = 404, description = "No configuration stored for the deposit", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_accounting_config(
    Path(record_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<AccountingConfigDto>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering get_accounting_config function for ID: {}", record_id);

    let config = state
        .engine
        .accounting_config(record_id)
        .await
        .map_err(compute_error_response)?;

    match config {
        Some(config) => {
            debug!("Found accounting config for record {}", record_id);
            Ok(Json(ApiResponse {
                data: AccountingConfigDto::from(config),
                message: "Accounting config retrieved successfully".to_string(),
                success: true,
            }))
        }
        None => {
            warn!("No accounting config for record {}", record_id);
            Err(error_body(
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("No accounting config for record {}", record_id),
            ))
        }
    }
}

/// Save one accounting configuration for every record of a project
#[utoipa::path(
    put,
    path = "/api/v1/projects/accounting-config",
    tag = "projects",
    request_body = SaveProjectConfigRequest,
    responses(
        (status = 200, description = "Configuration saved successfully", body = ApiResponse<AccountingConfigDto>),
        (status = 400, description = "Invalid configuration", body = ErrorResponse),
        (status = 404, description = "Deposit not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn save_project_accounting_config(
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<SaveProjectConfigRequest>>,
) -> Result<Json<ApiResponse<AccountingConfigDto>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering save_project_accounting_config function");

    let config = ProjectAccountingConfig::from(request.config);
    state
        .engine
        .save_project_config(&request.record_ids, &config)
        .await
        .map_err(compute_error_response)?;

    // Every cached series may include one of these records
    state.invalidate_series();

    info!("Saved accounting config for records {:?}", request.record_ids);
    Ok(Json(ApiResponse {
        data: AccountingConfigDto::from(config),
        message: "Accounting config saved successfully".to_string(),
        success: true,
    }))
}

/// Classify the completeness of a supplied configuration
#[utoipa::path(
    post,
    path = "/api/v1/accounting-status",
    tag = "projects",
    request_body = AccountingConfigDto,
    responses(
        (status = 200, description = "Configuration classified", body = ApiResponse<AccountingStatusResponse>)
    )
)]
#[instrument]
pub async fn classify_accounting_status(
    Json(config): Json<AccountingConfigDto>,
) -> Json<ApiResponse<AccountingStatusResponse>> {
    let status = classify_status(&ProjectAccountingConfig::from(config));
    debug!("Classified accounting config as {}", status);

    Json(ApiResponse {
        data: AccountingStatusResponse {
            status: status_label(status),
            label: status.label().to_string(),
        },
        message: "Accounting status computed".to_string(),
        success: true,
    })
}
