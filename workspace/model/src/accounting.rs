use rust_decimal::Decimal;

/// Actual expense booked for one month of a project.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyExpenseEntry {
    /// Period token (`YYMM`) of the month the expense belongs to.
    pub month: String,
    pub expense_amount: Decimal,
    pub expense_currency: String,
}

impl MonthlyExpenseEntry {
    pub fn new(month: &str, expense_amount: Decimal, expense_currency: &str) -> Self {
        Self {
            month: month.to_string(),
            expense_amount,
            expense_currency: expense_currency.to_string(),
        }
    }
}

/// Accounting configuration of a project.
///
/// The configuration is stored per deposit record, but every record of a
/// project is always saved with the same configuration. Saving replaces the
/// whole object, the monthly expense list included.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProjectAccountingConfig {
    /// First month (`YYMM`) the project ran.
    pub period_start: Option<String>,
    /// Last month (`YYMM`) the project ran, inclusive.
    pub period_end: Option<String>,
    /// Target margin rate in percent (20 means 20%).
    pub target_margin_rate: Option<Decimal>,
    /// Cost actually incurred in the final month.
    pub final_month_actual_cost: Option<Decimal>,
    pub final_month_actual_cost_currency: Option<String>,
    pub monthly_expenses: Vec<MonthlyExpenseEntry>,
}

impl ProjectAccountingConfig {
    /// Creates a configuration with only the period set.
    pub fn with_period(period_start: &str, period_end: &str) -> Self {
        Self {
            period_start: Some(period_start.to_string()),
            period_end: Some(period_end.to_string()),
            ..Default::default()
        }
    }

    /// Builder-style setter for the management accounting inputs.
    pub fn with_management(
        mut self,
        target_margin_rate: Option<Decimal>,
        final_month_actual_cost: Option<Decimal>,
    ) -> Self {
        self.target_margin_rate = target_margin_rate;
        self.final_month_actual_cost = final_month_actual_cost;
        self
    }

    /// Builder-style setter for the monthly expenses.
    pub fn with_expenses(mut self, monthly_expenses: Vec<MonthlyExpenseEntry>) -> Self {
        self.monthly_expenses = monthly_expenses;
        self
    }

    /// Returns true when both period tokens are present.
    pub fn has_period(&self) -> bool {
        self.period_start.is_some() && self.period_end.is_some()
    }
}
