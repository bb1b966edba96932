use common::AccountingView;
use model::accounting::ProjectAccountingConfig;
use rust_decimal::Decimal;
use tracing::{debug, instrument};

use super::{MonthlyProjection, ProjectionCalculator};
use crate::error::{ComputeError, Result};
use crate::period;

/// Management accounting: the deposit is split evenly over the project
/// months and each month earns the target margin. When the actual cost of the
/// final month is known, the final month's profit is trued up to
/// `monthly revenue - final cost` instead.
///
/// The true-up replaces the margin formula for that month; it does not
/// reconcile against the profit already projected for earlier months.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManagementProjector;

impl ProjectionCalculator for ManagementProjector {
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

        let monthly_revenue = deposit_amount / Decimal::from(months.len());
        let margin_rate = config
            .target_margin_rate
            .map(|rate| rate / Decimal::ONE_HUNDRED)
            .unwrap_or(Decimal::ZERO);
        let last = months.len() - 1;

        months
            .into_iter()
            .enumerate()
            .map(|(index, month)| {
                let profit = match config.final_month_actual_cost {
                    Some(final_cost) if index == last => monthly_revenue.checked_sub(final_cost),
                    _ => monthly_revenue.checked_mul(margin_rate),
                }
                .ok_or_else(|| ComputeError::Overflow(format!("management profit of {}", month)))?;
                Ok(MonthlyProjection {
                    month,
                    revenue: monthly_revenue,
                    profit,
                    expense: Decimal::ZERO,
                })
            })
            .collect()
    }

    fn view(&self) -> AccountingView {
        AccountingView::Management
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::prelude::*;

    fn config(start: &str, end: &str, rate: Option<i64>, final_cost: Option<i64>) -> ProjectAccountingConfig {
        ProjectAccountingConfig::with_period(start, end)
            .with_management(rate.map(Decimal::from), final_cost.map(Decimal::from))
    }

    #[test]
    fn test_three_month_project_with_final_true_up() {
        let projection = ManagementProjector.project(
            Decimal::from(3_000_000),
            &config("2501", "2503", Some(20), Some(500_000)),
        )
        .unwrap();

        let months: Vec<String> = projection.iter().map(|p| p.month.to_string()).collect();
        assert_eq!(months, vec!["2501", "2502", "2503"]);

        let profits: Vec<Decimal> = projection.iter().map(|p| p.profit).collect();
        assert_eq!(
            profits,
            vec![Decimal::from(200_000), Decimal::from(200_000), Decimal::from(500_000)]
        );

        let revenue: Decimal = projection.iter().map(|p| p.revenue).sum();
        assert_eq!(revenue, Decimal::from(3_000_000));
        assert!(projection.iter().all(|p| p.expense.is_zero()));
    }

    #[test]
    fn test_final_month_falls_back_to_margin_without_cost() {
        let projection = ManagementProjector
            .project(Decimal::from(3_000_000), &config("2501", "2503", Some(20), None))
            .unwrap();
        assert!(projection.iter().all(|p| p.profit == Decimal::from(200_000)));
    }

    #[test]
    fn test_missing_margin_rate_means_zero_margin() {
        let projection = ManagementProjector
            .project(Decimal::from(1_200), &config("2501", "2504", None, None))
            .unwrap();
        assert_eq!(projection.len(), 4);
        assert!(projection.iter().all(|p| p.profit.is_zero()));
        assert!(projection.iter().all(|p| p.revenue == Decimal::from(300)));
    }

    #[test]
    fn test_single_month_project_uses_true_up() {
        let projection = ManagementProjector
            .project(Decimal::from(1_000), &config("2501", "2501", Some(10), Some(400)))
            .unwrap();
        assert_eq!(projection.len(), 1);
        assert_eq!(projection[0].profit, Decimal::from(600));
    }

    #[test]
    fn test_empty_range_gives_empty_projection() {
        assert!(
            ManagementProjector
                .project(Decimal::from(1_000), &config("2501", "2412", Some(10), Some(400)))
                .unwrap()
                .is_empty()
        );
        assert!(
            ManagementProjector
                .project(Decimal::from(1_000), &ProjectAccountingConfig::default())
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn test_revenue_is_conserved_for_uneven_splits() {
        for (deposit, end) in [(1_000, "2503"), (999_999, "2607"), (7, "2511")] {
            let deposit = Decimal::from(deposit);
            let projection = ManagementProjector
                .project(deposit, &config("2501", end, Some(15), None))
                .unwrap();
            let total: Decimal = projection.iter().map(|p| p.revenue).sum();
            let difference = (total - deposit).abs();
            assert!(difference < Decimal::from_str("0.000001").unwrap(), "difference {}", difference);
        }
    }

    #[test]
    fn test_fractional_margin_rate() {
        let projection = ManagementProjector.project(
            Decimal::from(1_000),
            &ProjectAccountingConfig::with_period("2501", "2501")
                .with_management(Some(Decimal::from_str("12.5").unwrap()), None),
        )
        .unwrap();
        assert_eq!(projection[0].profit, Decimal::from(125));
    }

    #[test]
    fn test_margin_out_of_range_is_an_error() {
        let err = ManagementProjector
            .project(Decimal::MAX, &config("2501", "2501", Some(1_000), None))
            .unwrap_err();
        assert!(matches!(err, ComputeError::Overflow(_)));

        let err = ManagementProjector
            .project(Decimal::MAX, &config("2501", "2501", Some(20), Some(-1)))
            .unwrap_err();
        assert!(err.is_validation());
    }
}
