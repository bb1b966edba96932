use crate::helpers::converters::{aggregate_to_series, compute_error_response, error_body, parse_excluded};
use crate::schemas::{ApiResponse, AppState, CachedData, ErrorResponse};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use common::{AccountingView, MonthlySeries};
use compute::DepositFilter;
use serde::Deserialize;
use tracing::{debug, instrument, warn};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Query parameters for the monthly series
#[derive(Debug, Default, Deserialize, ToSchema, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct MonthlyQuery {
    /// `default`, `management` or `real` (default: `default`)
    pub view: Option<String>,
    #[validate(length(min = 1))]
    pub team: Option<String>,
    #[validate(length(min = 1))]
    pub category: Option<String>,
    #[validate(length(min = 1))]
    pub company_name: Option<String>,
    /// Comma separated record IDs that stay in their attribution month
    pub excluded: Option<String>,
}

/// Get the monthly revenue, expense and profit series
#[utoipa::path(
    get,
    path = "/api/v1/monthly",
    tag = "monthly",
    params(MonthlyQuery),
    responses(
        (status = 200, description = "Monthly series computed successfully", body = ApiResponse<MonthlySeries>),
        (status = 400, description = "Invalid view or query", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_monthly_series(
    Valid(Query(query)): Valid<Query<MonthlyQuery>>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<MonthlySeries>>, (StatusCode, Json<ErrorResponse>)> {
    // Taken before reading so a save landing mid-computation retires this key
    let cache_key = format!("monthly_{}_{:?}", state.series_generation(), query);

    // Check cache first
    if let Some(CachedData::Monthly(series)) = state.cache.get(&cache_key).await {
        return Ok(Json(ApiResponse {
            data: series,
            message: "Monthly series retrieved from cache".to_string(),
            success: true,
        }));
    }

    let view = match query.view.as_deref() {
        Some(view) => view
            .parse::<AccountingView>()
            .map_err(|message| error_body(StatusCode::BAD_REQUEST, "INVALID_VIEW", message))?,
        None => AccountingView::Default,
    };
    let excluded = parse_excluded(query.excluded.as_deref())
        .map_err(|message| error_body(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message))?;

    let filter = DepositFilter {
        team: query.team.clone(),
        category: query.category.clone(),
        company_name: query.company_name.clone(),
    };
    let aggregate = state
        .engine
        .monthly_series(&filter, view, &excluded)
        .await
        .map_err(compute_error_response)?;

    for warning in &aggregate.warnings {
        warn!("{}", warning);
    }
    let series = aggregate_to_series(aggregate);
    debug!("Computed {} monthly points for the {} view", series.points.len(), view);

    // Cache the result
    state
        .cache
        .insert(cache_key, CachedData::Monthly(series.clone()))
        .await;

    Ok(Json(ApiResponse {
        data: series,
        message: "Monthly series computed successfully".to_string(),
        success: true,
    }))
}
