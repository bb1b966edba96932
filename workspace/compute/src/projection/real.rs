use common::AccountingView;
use model::accounting::ProjectAccountingConfig;
use rust_decimal::Decimal;
use tracing::{debug, instrument};

use super::{ExpenseLookup, MonthlyProjection, ProjectionCalculator};
use crate::error::{ComputeError, Result};
use crate::period;

/// Real accounting: the whole deposit is recognized in the first project
/// month, whenever it was actually received, and every month is charged its
/// actual expense.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealProjector;

impl ProjectionCalculator for RealProjector {
    #[instrument(level = "trace", skip(self, config), fields(start = ?config.period_start, end = ?config.period_end))]
    fn project(
        &self,
        deposit_amount: Decimal,
        config: &ProjectAccountingConfig,
    ) -> Result<Vec<MonthlyProjection>> {
        let months = period::range(config.period_start.as_deref(), config.period_end.as_deref());
        if months.is_empty() {
            debug!("No usable period, nothing to project");
            return Ok(Vec::new());
        }

        let expenses = ExpenseLookup::from_entries(&config.monthly_expenses)?;

        months
            .into_iter()
            .enumerate()
            .map(|(index, month)| {
                let revenue = if index == 0 { deposit_amount } else { Decimal::ZERO };
                let expense = expenses.get(month);
                let profit = revenue
                    .checked_sub(expense)
                    .ok_or_else(|| ComputeError::Overflow(format!("real profit of {}", month)))?;
                Ok(MonthlyProjection {
                    month,
                    revenue,
                    profit,
                    expense,
                })
            })
            .collect()
    }

    fn view(&self) -> AccountingView {
        AccountingView::Real
    }
}
