use rust_decimal::Decimal;

/// A single incoming payment as recorded by one of the business teams.
///
/// From the projection engine's point of view a deposit is an immutable fact:
/// it is read from the record store and never modified here. Several deposits
/// (an advance and a balance installment, for example) may belong to the same
/// accounting project, see [`ProjectKey`].
#[derive(Debug, Clone, PartialEq)]
pub struct DepositRecord {
    /// Opaque record id assigned by the store.
    pub id: i32,
    /// Deposited amount, in `currency`.
    pub amount: Decimal,
    /// ISO currency code of `amount`.
    pub currency: String,
    /// Free-text category ("project", "license", "consulting", ...).
    pub category: Option<String>,
    /// Sub-category used to tell projects of the same category apart.
    pub project_category: Option<String>,
    pub project_name: Option<String>,
    pub company_name: Option<String>,
    /// The team that owns the payment.
    pub team: Option<String>,
    /// Year-month token (`YYMM`) the deposit is attributed to.
    pub attribution_month: String,
    /// Expense booked against this deposit outside of any project accounting.
    pub one_time_expense_amount: Option<Decimal>,
    pub one_time_expense_currency: Option<String>,
    pub memo: Option<String>,
}

impl DepositRecord {
    /// Creates a deposit with only the mandatory fields set.
    pub fn new(id: i32, amount: Decimal, currency: &str, attribution_month: &str) -> Self {
        Self {
            id,
            amount,
            currency: currency.to_string(),
            category: None,
            project_category: None,
            project_name: None,
            company_name: None,
            team: None,
            attribution_month: attribution_month.to_string(),
            one_time_expense_amount: None,
            one_time_expense_currency: None,
            memo: None,
        }
    }

    /// Builder-style setter for the four project identity fields.
    pub fn with_project(
        mut self,
        category: &str,
        project_category: &str,
        project_name: &str,
        company_name: &str,
    ) -> Self {
        self.category = Some(category.to_string());
        self.project_category = Some(project_category.to_string());
        self.project_name = Some(project_name.to_string());
        self.company_name = Some(company_name.to_string());
        self
    }

    /// Builder-style setter for the one-time expense.
    pub fn with_one_time_expense(mut self, amount: Decimal, currency: &str) -> Self {
        self.one_time_expense_amount = Some(amount);
        self.one_time_expense_currency = Some(currency.to_string());
        self
    }

    /// Builder-style setter for the owning team.
    pub fn with_team(mut self, team: &str) -> Self {
        self.team = Some(team.to_string());
        self
    }

    /// Returns the project identity of this deposit, if all key fields are filled in.
    pub fn project_key(&self) -> Option<ProjectKey> {
        ProjectKey::from_record(self)
    }

    /// Returns true when the category of this deposit is one of `categories`.
    pub fn has_category_in<'a, I>(&self, categories: I) -> bool
    where
        I: IntoIterator<Item = &'a String>,
    {
        match self.category.as_deref().map(str::trim) {
            Some(category) if !category.is_empty() => {
                categories.into_iter().any(|c| c.as_str() == category)
            }
            _ => false,
        }
    }
}

/// Identity of an accounting project.
///
/// Deposits sharing the same (category, project category, project name,
/// company name) tuple are accounted for as one project. The key is
/// compared structurally, so no separator can make two different tuples
/// collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectKey {
    pub category: String,
    pub project_category: String,
    pub project_name: String,
    pub company_name: String,
}

impl ProjectKey {
    pub fn new(
        category: &str,
        project_category: &str,
        project_name: &str,
        company_name: &str,
    ) -> Self {
        Self {
            category: category.to_string(),
            project_category: project_category.to_string(),
            project_name: project_name.to_string(),
            company_name: company_name.to_string(),
        }
    }

    /// Builds the key of a deposit. Returns `None` when any of the four
    /// fields is missing or blank.
    pub fn from_record(record: &DepositRecord) -> Option<Self> {
        Some(Self {
            category: required(&record.category)?,
            project_category: required(&record.project_category)?,
            project_name: required(&record.project_name)?,
            company_name: required(&record.company_name)?,
        })
    }
}

impl std::fmt::Display for ProjectKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} / {} / {} / {}",
            self.category, self.project_category, self.project_name, self.company_name
        )
    }
}

fn required(field: &Option<String>) -> Option<String> {
    field
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Input for creating a deposit in the record store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDeposit {
    pub amount: Decimal,
    pub currency: String,
    pub category: Option<String>,
    pub project_category: Option<String>,
    pub project_name: Option<String>,
    pub company_name: Option<String>,
    pub team: Option<String>,
    pub attribution_month: String,
    pub one_time_expense_amount: Option<Decimal>,
    pub one_time_expense_currency: Option<String>,
    pub memo: Option<String>,
}

impl From<DepositRecord> for NewDeposit {
    fn from(record: DepositRecord) -> Self {
        Self {
            amount: record.amount,
            currency: record.currency,
            category: record.category,
            project_category: record.project_category,
            project_name: record.project_name,
            company_name: record.company_name,
            team: record.team,
            attribution_month: record.attribution_month,
            one_time_expense_amount: record.one_time_expense_amount,
            one_time_expense_currency: record.one_time_expense_currency,
            memo: record.memo,
        }
    }
}
