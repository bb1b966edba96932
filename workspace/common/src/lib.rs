//! Common transport-layer types shared between the backend and any dashboard
//! front end. These structs mirror the handlers' request/response payloads so
//! clients can deserialize API responses without duplicating shapes.

pub mod currency;
mod monthly;

pub use monthly::{MonthlyPoint, MonthlySeries, ProjectionPoint};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Generic API response wrapper used by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success flag
    pub success: bool,
}

/// The three ways the monthly chart can be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AccountingView {
    /// Every deposit is bucketed in its own attribution month.
    #[default]
    Default,
    /// Eligible projects are spread with the even split + target margin convention.
    Management,
    /// Eligible projects are recognized in their first month, net of actual expenses.
    Real,
}

impl AccountingView {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountingView::Default => "default",
            AccountingView::Management => "management",
            AccountingView::Real => "real",
        }
    }
}

impl fmt::Display for AccountingView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountingView {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(AccountingView::Default),
            "management" => Ok(AccountingView::Management),
            "real" => Ok(AccountingView::Real),
            other => Err(format!("Invalid accounting view: {}", other)),
        }
    }
}

/// Completeness of a project's accounting data, as sent to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AccountingStatusLabel {
    NotEntered,
    InProgress,
    Complete,
}
