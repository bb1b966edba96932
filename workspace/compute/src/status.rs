use std::fmt;

use model::accounting::ProjectAccountingConfig;
use rust_decimal::Decimal;

use crate::period::PeriodRange;
use crate::projection::ExpenseLookup;

/// How far the accounting data of a project has been filled in.
///
/// Derived from the configuration on every read and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountingStatus {
    NotEntered,
    InProgress,
    Complete,
}

impl AccountingStatus {
    /// Stable label used on the wire.
    pub fn label(&self) -> &'static str {
        match self {
            AccountingStatus::NotEntered => "not_entered",
            AccountingStatus::InProgress => "in_progress",
            AccountingStatus::Complete => "complete",
        }
    }
}

impl fmt::Display for AccountingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classifies a project's accounting configuration.
///
/// * `NotEntered` when either period token is missing or blank.
/// * `Complete` when the margin rate and final month cost are both set and
///   every month of a non-empty period has a positive expense.
/// * `InProgress` otherwise. A period whose end precedes its start has no
///   months, so it lands here rather than in `NotEntered`.
pub fn classify_status(config: &ProjectAccountingConfig) -> AccountingStatus {
    let (Some(start), Some(end)) = (
        present(config.period_start.as_deref()),
        present(config.period_end.as_deref()),
    ) else {
        return AccountingStatus::NotEntered;
    };

    let has_management =
        config.target_margin_rate.is_some() && config.final_month_actual_cost.is_some();

    // Expenses summing out of range cannot be checked month by month
    let Ok(expenses) = ExpenseLookup::from_entries(&config.monthly_expenses) else {
        return AccountingStatus::InProgress;
    };
    let mut months = PeriodRange::new(Some(start), Some(end)).peekable();
    let has_real =
        months.peek().is_some() && months.all(|month| expenses.get(month) > Decimal::ZERO);

    if has_management && has_real {
        AccountingStatus::Complete
    } else {
        AccountingStatus::InProgress
    }
}

fn present(token: Option<&str>) -> Option<&str> {
    token.filter(|t| !t.trim().is_empty())
}
