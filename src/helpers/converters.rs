use axum::{http::StatusCode, response::Json};
use common::{AccountingStatusLabel, MonthlyPoint, MonthlySeries, ProjectionPoint};
use compute::error::ComputeError;
use compute::{AccountingStatus, ExclusionSet, MonthlyAggregate, MonthlyProjection};
use tracing::error;

use crate::schemas::ErrorResponse;

/// Converts an aggregate into the transport series.
pub fn aggregate_to_series(aggregate: MonthlyAggregate) -> MonthlySeries {
    let points = aggregate
        .months
        .iter()
        .map(|(month, totals)| {
            MonthlyPoint::new(month.to_string(), totals.revenue, totals.expense, totals.profit)
        })
        .collect();
    let warnings = aggregate.warnings.iter().map(ToString::to_string).collect();
    MonthlySeries::new(aggregate.view, points, warnings)
}

pub fn projection_to_point(projection: &MonthlyProjection) -> ProjectionPoint {
    ProjectionPoint {
        month: projection.month.to_string(),
        revenue: projection.revenue,
        profit: projection.profit,
        expense: projection.expense,
    }
}

pub fn status_label(status: AccountingStatus) -> AccountingStatusLabel {
    match status {
        AccountingStatus::NotEntered => AccountingStatusLabel::NotEntered,
        AccountingStatus::InProgress => AccountingStatusLabel::InProgress,
        AccountingStatus::Complete => AccountingStatusLabel::Complete,
    }
}

/// Parses a comma separated list of record ids.
pub fn parse_excluded(excluded: Option<&str>) -> Result<ExclusionSet, String> {
    let Some(excluded) = excluded else {
        return Ok(ExclusionSet::new());
    };
    excluded
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| {
            id.parse::<i32>()
                .map_err(|_| format!("Invalid record id in excluded: {:?}", id))
        })
        .collect()
}

pub fn error_body(status: StatusCode, code: &str, message: String) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error: message,
            code: code.to_string(),
            success: false,
        }),
    )
}

/// Maps an engine error to the response sent to the client.
pub fn compute_error_response(err: ComputeError) -> (StatusCode, Json<ErrorResponse>) {
    if err.is_validation() {
        return error_body(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", err.to_string());
    }
    match err {
        ComputeError::NotFound(_) => error_body(StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string()),
        ComputeError::Database(_) => {
            error!("Database error: {}", err);
            error_body(StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR", err.to_string())
        }
        _ => {
            error!("Internal error: {}", err);
            error_body(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", err.to_string())
        }
    }
}
