use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::AccountingView;

/// One calendar month of the aggregated chart.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct MonthlyPoint {
    /// Calendar month formatted as `YYYY-MM`
    pub calendar_month: String,
    #[schema(value_type = String)]
    pub revenue: Decimal,
    #[schema(value_type = String)]
    pub expense: Decimal,
    #[schema(value_type = String)]
    pub profit: Decimal,
}

impl MonthlyPoint {
    pub fn new(calendar_month: String, revenue: Decimal, expense: Decimal, profit: Decimal) -> Self {
        Self {
            calendar_month,
            revenue,
            expense,
            profit,
        }
    }
}

/// Month-by-month series for one accounting view.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct MonthlySeries {
    pub view: AccountingView,
    /// Points ordered by calendar month
    pub points: Vec<MonthlyPoint>,
    /// Data quality warnings (mixed currencies, unreadable months)
    pub warnings: Vec<String>,
}

impl MonthlySeries {
    pub fn new(view: AccountingView, points: Vec<MonthlyPoint>, warnings: Vec<String>) -> Self {
        Self {
            view,
            points,
            warnings,
        }
    }

    /// Total revenue over the whole series.
    pub fn total_revenue(&self) -> Decimal {
        self.points.iter().map(|p| p.revenue).sum()
    }

    /// Total profit over the whole series.
    pub fn total_profit(&self) -> Decimal {
        self.points.iter().map(|p| p.profit).sum()
    }
}

/// One month of a single-deposit projection.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ProjectionPoint {
    /// Period token (`YYMM`)
    pub month: String,
    #[schema(value_type = String)]
    pub revenue: Decimal,
    #[schema(value_type = String)]
    pub profit: Decimal,
    #[schema(value_type = String)]
    pub expense: Decimal,
}
