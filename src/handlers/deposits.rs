use crate::helpers::converters::compute_error_response;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use compute::DepositFilter;
use model::deposit::{DepositRecord, NewDeposit};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Request body for recording a new deposit
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateDepositRequest {
    /// Deposited amount
    #[schema(value_type = String)]
    pub amount: Decimal,
    /// ISO 4217 currency code (e.g., "JPY", "USD")
    #[validate(length(min = 3, max = 3))]
    pub currency: String,
    pub category: Option<String>,
    pub project_category: Option<String>,
    pub project_name: Option<String>,
    pub company_name: Option<String>,
    pub team: Option<String>,
    /// Attribution month as `YYMM`
    #[validate(length(equal = 4))]
    pub attribution_month: String,
    #[schema(value_type = Option<String>)]
    pub one_time_expense_amount: Option<Decimal>,
    pub one_time_expense_currency: Option<String>,
    pub memo: Option<String>,
}

impl From<CreateDepositRequest> for NewDeposit {
    fn from(request: CreateDepositRequest) -> Self {
        Self {
            amount: request.amount,
            currency: request.currency,
            category: request.category,
            project_category: request.project_category,
            project_name: request.project_name,
            company_name: request.company_name,
            team: request.team,
            attribution_month: request.attribution_month,
            one_time_expense_amount: request.one_time_expense_amount,
            one_time_expense_currency: request.one_time_expense_currency,
            memo: request.memo,
        }
    }
}

/// Deposit response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DepositResponse {
    pub id: i32,
    #[schema(value_type = String)]
    pub amount: Decimal,
    pub currency: String,
    pub category: Option<String>,
    pub project_category: Option<String>,
    pub project_name: Option<String>,
    pub company_name: Option<String>,
    pub team: Option<String>,
    pub attribution_month: String,
    #[schema(value_type = Option<String>)]
    pub one_time_expense_amount: Option<Decimal>,
    pub one_time_expense_currency: Option<String>,
    pub memo: Option<String>,
}

impl From<DepositRecord> for DepositResponse {
    fn from(record: DepositRecord) -> Self {
        Self {
            id: record.id,
            amount: record.amount,
            currency: record.currency,
            category: record.category,
            project_category: record.project_category,
            project_name: record.project_name,
            company_name: record.company_name,
            team: record.team,
            attribution_month: record.attribution_month,
            one_time_expense_amount: record.one_time_expense_amount,
            one_time_expense_currency: record.one_time_expense_currency,
            memo: record.memo,
        }
    }
}

/// Query parameters for filtering deposits
#[derive(Debug, Default, Deserialize, ToSchema, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct DepositQuery {
    #[validate(length(min = 1))]
    pub team: Option<String>,
    #[validate(length(min = 1))]
    pub category: Option<String>,
    #[validate(length(min = 1))]
    pub company_name: Option<String>,
}

impl From<DepositQuery> for DepositFilter {
    fn from(query: DepositQuery) -> Self {
        Self {
            team: query.team,
            category: query.category,
            company_name: query.company_name,
        }
    }
}

/// Record a new deposit
#[utoipa::path(
    post,
    path = "/api/v1/deposits",
    tag = "deposits",
    request_body = CreateDepositRequest,
    responses(
        (status = 201, description = "Deposit created successfully", body = ApiResponse<DepositResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_deposit(
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<CreateDepositRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<DepositResponse>>), (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering create_deposit function");
    debug!(
        "Creating deposit of {} {} for month {}",
        request.amount, request.currency, request.attribution_month
    );

    let record = state
        .engine
        .add_deposit(NewDeposit::from(request))
        .await
        .map_err(compute_error_response)?;

    // Monthly series no longer reflect the stored deposits
    state.invalidate_series();

    info!("Deposit created successfully with ID: {}", record.id);
    let response = ApiResponse {
        data: DepositResponse::from(record),
        message: "Deposit created successfully".to_string(),
        success: true,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// List deposits
#[utoipa::path(
    get,
    path = "/api/v1/deposits",
    tag = "deposits",
    params(DepositQuery),
    responses(
        (status = 200, description = "Deposits retrieved successfully", body = ApiResponse<Vec<DepositResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_deposits(
    Valid(Query(query)): Valid<Query<DepositQuery>>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<DepositResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering get_deposits function");

    let filter = DepositFilter::from(query);
    let deposits = state
        .engine
        .deposits(&filter)
        .await
        .map_err(compute_error_response)?;

    info!("Retrieved {} deposits", deposits.len());
    let response = ApiResponse {
        data: deposits.into_iter().map(DepositResponse::from).collect(),
        message: "Deposits retrieved successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// Delete a deposit together with its accounting configuration
#[utoipa::path(
    delete,
    path = "/api/v1/deposits/{record_id}",
    tag = "deposits",
    params(
        ("record_id" = i32, Path, description = "Deposit record ID"),
    ),
    responses(
        (status = 204, description = "Deposit deleted successfully"),
        (status = 404, description = "Deposit not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_deposit(
    Path(record_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering delete_deposit function for ID: {}", record_id);

    state
        .engine
        .remove_deposit(record_id)
        .await
        .map_err(compute_error_response)?;
    state.invalidate_series();

    info!("Deposit {} deleted successfully", record_id);
    Ok(StatusCode::NO_CONTENT)
}
