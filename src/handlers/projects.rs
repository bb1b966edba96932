use crate::helpers::converters::{compute_error_response, error_body, parse_excluded, status_label};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use common::AccountingStatusLabel;
use compute::{DepositFilter, ProjectOverview, ProjectStatus};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Query parameters for listing projects
#[derive(Debug, Default, Deserialize, ToSchema, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct ProjectQuery {
    #[validate(length(min = 1))]
    pub team: Option<String>,
    #[validate(length(min = 1))]
    pub category: Option<String>,
    #[validate(length(min = 1))]
    pub company_name: Option<String>,
    /// Comma separated record IDs left out of every project
    pub excluded: Option<String>,
}

/// One project with the completeness of its accounting data
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProjectStatusResponse {
    pub category: String,
    pub project_category: String,
    pub project_name: String,
    pub company_name: String,
    /// Records sharing the project key, ascending
    pub record_ids: Vec<i32>,
    pub status: AccountingStatusLabel,
}

impl From<ProjectStatus> for ProjectStatusResponse {
    fn from(project: ProjectStatus) -> Self {
        Self {
            category: project.key.category,
            project_category: project.key.project_category,
            project_name: project.key.project_name,
            company_name: project.key.company_name,
            record_ids: project.record_ids,
            status: status_label(project.status),
        }
    }
}

/// Projects found among the deposits
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProjectOverviewResponse {
    pub projects: Vec<ProjectStatusResponse>,
    /// Records that cannot be grouped because a key field is missing
    pub missing_required_fields: Vec<i32>,
}

impl From<ProjectOverview> for ProjectOverviewResponse {
    fn from(overview: ProjectOverview) -> Self {
        Self {
            projects: overview
                .projects
                .into_iter()
                .map(ProjectStatusResponse::from)
                .collect(),
            missing_required_fields: overview.missing_required_fields,
        }
    }
}

/// List accounting projects with their status
#[utoipa::path(
    get,
    path = "/api/v1/projects",
    tag = "projects",
    params(ProjectQuery),
    responses(
        (status = 200, description = "Projects retrieved successfully", body = ApiResponse<ProjectOverviewResponse>),
        (status = 400, description = "Invalid query", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_projects(
    Valid(Query(query)): Valid<Query<ProjectQuery>>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ProjectOverviewResponse>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering get_projects function");

    let excluded = parse_excluded(query.excluded.as_deref())
        .map_err(|message| error_body(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message))?;
    debug!("Excluding {} records", excluded.len());

    let filter = DepositFilter {
        team: query.team,
        category: query.category,
        company_name: query.company_name,
    };
    let overview = state
        .engine
        .project_statuses(&filter, &excluded)
        .await
        .map_err(compute_error_response)?;

    info!(
        "Retrieved {} projects, {} records missing key fields",
        overview.projects.len(),
        overview.missing_required_fields.len()
    );
    Ok(Json(ApiResponse {
        data: ProjectOverviewResponse::from(overview),
        message: "Projects retrieved successfully".to_string(),
        success: true,
    }))
}
