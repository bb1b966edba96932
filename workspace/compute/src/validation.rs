use std::collections::HashSet;

use common::currency::is_known_currency;
use model::accounting::ProjectAccountingConfig;
use model::deposit::NewDeposit;

use crate::error::{ComputeError, Result};
use crate::period::Period;

/// Checks a configuration before it is written.
///
/// Present period tokens must be well formed, although the end may precede the
/// start. Expense months must be well formed and unique. Every currency code
/// must be a known ISO 4217 code. Rates and amounts are not range checked.
pub fn validate_config(config: &ProjectAccountingConfig) -> Result<()> {
    for token in [&config.period_start, &config.period_end].into_iter().flatten() {
        check_period(token)?;
    }

    if let Some(currency) = &config.final_month_actual_cost_currency {
        check_currency(currency)?;
    }

    let mut seen = HashSet::new();
    for entry in &config.monthly_expenses {
        let month = check_period(&entry.month)?;
        if !seen.insert(month) {
            return Err(ComputeError::DuplicateExpenseMonth(entry.month.clone()));
        }
        check_currency(&entry.expense_currency)?;
    }

    Ok(())
}

/// Checks a deposit before it is inserted.
pub fn validate_new_deposit(deposit: &NewDeposit) -> Result<()> {
    check_period(deposit.attribution_month.trim())?;
    check_currency(&deposit.currency)?;
    match (&deposit.one_time_expense_amount, &deposit.one_time_expense_currency) {
        (_, Some(currency)) => check_currency(currency),
        (Some(_), None) => Err(ComputeError::Validation(
            "one_time_expense_currency is required with one_time_expense_amount".to_string(),
        )),
        (None, None) => Ok(()),
    }
}

fn check_period(token: &str) -> Result<Period> {
    token.parse()
}

fn check_currency(code: &str) -> Result<()> {
    if is_known_currency(code) {
        Ok(())
    } else {
        Err(ComputeError::UnknownCurrency(code.to_string()))
    }
}
