use std::collections::HashMap;

use common::AccountingView;
use model::accounting::{MonthlyExpenseEntry, ProjectAccountingConfig};
use rust_decimal::Decimal;
use tracing::trace;

use crate::error::{ComputeError, Result};
use crate::period::Period;

pub mod management;
pub mod real;

pub use management::ManagementProjector;
pub use real::RealProjector;

/// Projected figures of one project month. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthlyProjection {
    pub month: Period,
    pub revenue: Decimal,
    pub profit: Decimal,
    /// Expense of the month. Always zero under management accounting.
    pub expense: Decimal,
}

/// Spreads a single deposit over the months of a project.
///
/// Implementations are pure: the same deposit and configuration always give
/// the same projection, and a configuration without a usable month range
/// gives an empty projection. Figures that do not fit a [`Decimal`] fail with
/// [`ComputeError::Overflow`].
pub trait ProjectionCalculator: Send + Sync {
    /// Projects `deposit_amount` over the period of `config`.
    fn project(
        &self,
        deposit_amount: Decimal,
        config: &ProjectAccountingConfig,
    ) -> Result<Vec<MonthlyProjection>>;

    /// The accounting view this calculator produces.
    fn view(&self) -> AccountingView;
}

/// Returns the calculator behind a view, or `None` for the default view,
/// which does not project at all.
pub fn calculator_for(view: AccountingView) -> Option<Box<dyn ProjectionCalculator>> {
    match view {
        AccountingView::Default => None,
        AccountingView::Management => Some(Box::new(ManagementProjector)),
        AccountingView::Real => Some(Box::new(RealProjector)),
    }
}

/// Management accounting projection of one deposit.
pub fn project_management(
    deposit_amount: Decimal,
    config: &ProjectAccountingConfig,
) -> Result<Vec<MonthlyProjection>> {
    ManagementProjector.project(deposit_amount, config)
}

/// Real accounting projection of one deposit.
pub fn project_real(
    deposit_amount: Decimal,
    config: &ProjectAccountingConfig,
) -> Result<Vec<MonthlyProjection>> {
    RealProjector.project(deposit_amount, config)
}

/// Month to expense lookup built from a monthly expense list.
///
/// Entries whose month is not a valid token are ignored. When the same month
/// appears more than once the amounts are summed; saving such a list is
/// rejected, so only data written around the store can contain duplicates.
#[derive(Debug, Clone, Default)]
pub struct ExpenseLookup {
    amounts: HashMap<Period, Decimal>,
}

impl ExpenseLookup {
    pub fn from_entries(entries: &[MonthlyExpenseEntry]) -> Result<Self> {
        let mut amounts: HashMap<Period, Decimal> = HashMap::new();
        for entry in entries {
            let Some(month) = Period::parse(&entry.month) else {
                trace!(month = %entry.month, "Ignoring expense with unreadable month");
                continue;
            };
            let total = amounts.entry(month).or_insert(Decimal::ZERO);
            *total = total
                .checked_add(entry.expense_amount)
                .ok_or_else(|| ComputeError::Overflow(format!("expenses of {}", month)))?;
        }
        Ok(Self { amounts })
    }

    /// Expense of `month`, zero when there is none.
    pub fn get(&self, month: Period) -> Decimal {
        self.amounts.get(&month).copied().unwrap_or(Decimal::ZERO)
    }

    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty()
    }
}
