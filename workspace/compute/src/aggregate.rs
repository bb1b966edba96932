use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;

use common::AccountingView;
use common::currency::normalize_currency_code;
use model::accounting::ProjectAccountingConfig;
use model::deposit::{DepositRecord, ProjectKey};
use rust_decimal::Decimal;
use tracing::{debug, instrument, trace, warn};

use crate::grouping::ExclusionSet;
use crate::period::{CalendarMonth, Period, months_between};
use crate::projection::{ProjectionCalculator, calculator_for};

/// Inputs of [`aggregate_monthly`] that do not depend on the data snapshot.
#[derive(Debug, Clone, Default)]
pub struct AggregationOptions {
    /// Categories whose deposits are spread by the accounting views.
    pub eligible_categories: HashSet<String>,
    pub excluded: ExclusionSet,
}

impl AggregationOptions {
    pub fn new<I, S>(eligible_categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            eligible_categories: eligible_categories.into_iter().map(Into::into).collect(),
            excluded: ExclusionSet::new(),
        }
    }

    pub fn with_excluded(mut self, excluded: ExclusionSet) -> Self {
        self.excluded = excluded;
        self
    }
}

/// Summed figures of one calendar month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonthlyTotals {
    pub revenue: Decimal,
    pub expense: Decimal,
    pub profit: Decimal,
}

impl MonthlyTotals {
    /// `None` when any of the sums leaves the decimal range.
    pub fn checked_add(self, revenue: Decimal, expense: Decimal, profit: Decimal) -> Option<Self> {
        Some(Self {
            revenue: self.revenue.checked_add(revenue)?,
            expense: self.expense.checked_add(expense)?,
            profit: self.profit.checked_add(profit)?,
        })
    }
}

/// Data quality problems found while aggregating. Aggregation never fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggregationWarning {
    /// Amounts in several currencies were summed into the same month.
    MixedCurrency {
        calendar_month: CalendarMonth,
        currencies: Vec<String>,
    },
    /// A record that could not be projected has an unreadable attribution
    /// month and was left out.
    UnparseableAttributionMonth { record_id: i32, token: String },
    /// A record whose figures do not fit a decimal, alone or summed with the
    /// rest of its months. It was left out.
    AmountOutOfRange { record_id: i32 },
}

impl fmt::Display for AggregationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregationWarning::MixedCurrency {
                calendar_month,
                currencies,
            } => write!(
                f,
                "{} mixes currencies {} without conversion",
                calendar_month,
                currencies.join(", ")
            ),
            AggregationWarning::UnparseableAttributionMonth { record_id, token } => write!(
                f,
                "record {} has unreadable attribution month {:?}",
                record_id, token
            ),
            AggregationWarning::AmountOutOfRange { record_id } => {
                write!(f, "record {} has amounts out of range", record_id)
            }
        }
    }
}

/// Calendar-month series for one view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyAggregate {
    pub view: AccountingView,
    pub months: BTreeMap<CalendarMonth, MonthlyTotals>,
    pub warnings: Vec<AggregationWarning>,
}

impl MonthlyAggregate {
    pub fn get(&self, month: CalendarMonth) -> Option<&MonthlyTotals> {
        self.months.get(&month)
    }

    pub fn total_revenue(&self) -> Decimal {
        self.months.values().map(|t| t.revenue).sum()
    }

    pub fn total_profit(&self) -> Decimal {
        self.months.values().map(|t| t.profit).sum()
    }
}

#[derive(Default)]
struct Bucket {
    totals: MonthlyTotals,
    currencies: BTreeSet<String>,
}

impl Bucket {
    fn add_currency(&mut self, code: &str) {
        let code = normalize_currency_code(code).unwrap_or_else(|| code.trim().to_ascii_uppercase());
        if !code.is_empty() {
            self.currencies.insert(code);
        }
    }
}

/// Sums every included deposit into calendar-month totals for `view`.
///
/// In the default view each record lands in its own attribution month. In the
/// management and real views, records of an eligible category whose project
/// has a configuration with a non-empty period are spread with the matching
/// projector; every other record falls back to its attribution month.
///
/// Amounts in different currencies are summed as they are. Each month that
/// mixes currencies produces one [`AggregationWarning::MixedCurrency`].
#[instrument(skip(records, configs_by_key, options), fields(records = records.len(), configs = configs_by_key.len()))]
pub fn aggregate_monthly(
    records: &[DepositRecord],
    configs_by_key: &HashMap<ProjectKey, ProjectAccountingConfig>,
    view: AccountingView,
    options: &AggregationOptions,
) -> MonthlyAggregate {
    let calculator = calculator_for(view);
    let mut buckets: BTreeMap<CalendarMonth, Bucket> = BTreeMap::new();
    let mut warnings = Vec::new();
    let mut projected = 0usize;

    for record in records.iter().filter(|r| !options.excluded.contains(r.id)) {
        let projectable = calculator.as_ref().and_then(|calculator| {
            projectable_config(record, configs_by_key, options).map(|config| (calculator, config))
        });

        let warning = match projectable {
            Some((calculator, config)) => {
                let warning = project_into(&mut buckets, record, &**calculator, config);
                projected += usize::from(warning.is_none());
                warning
            }
            None => bucket_by_attribution(&mut buckets, record),
        };
        warnings.extend(warning);
    }

    let mut months = BTreeMap::new();
    for (month, bucket) in buckets {
        if bucket.currencies.len() > 1 {
            let currencies: Vec<String> = bucket.currencies.into_iter().collect();
            warn!(%month, ?currencies, "Summing amounts in different currencies");
            warnings.push(AggregationWarning::MixedCurrency {
                calendar_month: month,
                currencies,
            });
        }
        months.insert(month, bucket.totals);
    }

    debug!(
        %view,
        projected,
        months = months.len(),
        warnings = warnings.len(),
        "Aggregated monthly totals"
    );

    MonthlyAggregate {
        view,
        months,
        warnings,
    }
}

fn projectable_config<'a>(
    record: &DepositRecord,
    configs_by_key: &'a HashMap<ProjectKey, ProjectAccountingConfig>,
    options: &AggregationOptions,
) -> Option<&'a ProjectAccountingConfig> {
    if !record.has_category_in(&options.eligible_categories) {
        return None;
    }
    let key = record.project_key()?;
    let config = configs_by_key.get(&key)?;
    let usable = months_between(
        config.period_start.as_deref(),
        config.period_end.as_deref(),
    ) > 0;
    usable.then_some(config)
}

fn out_of_range(record: &DepositRecord) -> AggregationWarning {
    warn!(record_id = record.id, "Skipping deposit with amounts out of range");
    AggregationWarning::AmountOutOfRange {
        record_id: record.id,
    }
}

/// Totals of `month` once `revenue`, `expense` and `profit` are added, or
/// `None` on overflow. Buckets are left untouched.
fn summed(
    buckets: &BTreeMap<CalendarMonth, Bucket>,
    month: CalendarMonth,
    revenue: Decimal,
    expense: Decimal,
    profit: Decimal,
) -> Option<MonthlyTotals> {
    buckets
        .get(&month)
        .map(|bucket| bucket.totals)
        .unwrap_or_default()
        .checked_add(revenue, expense, profit)
}

fn project_into(
    buckets: &mut BTreeMap<CalendarMonth, Bucket>,
    record: &DepositRecord,
    calculator: &dyn ProjectionCalculator,
    config: &ProjectAccountingConfig,
) -> Option<AggregationWarning> {
    let Ok(projection) = calculator.project(record.amount, config) else {
        return Some(out_of_range(record));
    };
    trace!(record_id = record.id, months = projection.len(), "Projected deposit");

    // All months are summed before any is written, so a record is added whole or not at all
    let mut totals = Vec::with_capacity(projection.len());
    for month in &projection {
        let calendar_month = month.month.calendar_month();
        match summed(buckets, calendar_month, month.revenue, month.expense, month.profit) {
            Some(sum) => totals.push((calendar_month, sum)),
            None => return Some(out_of_range(record)),
        }
    }

    let last = projection.len().saturating_sub(1);
    for (index, (month, (calendar_month, sum))) in projection.iter().zip(totals).enumerate() {
        let bucket = buckets.entry(calendar_month).or_default();
        bucket.totals = sum;
        bucket.add_currency(&record.currency);

        match calculator.view() {
            AccountingView::Real => {
                for entry in config
                    .monthly_expenses
                    .iter()
                    .filter(|e| Period::parse(&e.month) == Some(month.month))
                {
                    bucket.add_currency(&entry.expense_currency);
                }
            }
            AccountingView::Management if index == last && config.final_month_actual_cost.is_some() => {
                if let Some(currency) = &config.final_month_actual_cost_currency {
                    bucket.add_currency(currency);
                }
            }
            _ => {}
        }
    }
    None
}

fn bucket_by_attribution(
    buckets: &mut BTreeMap<CalendarMonth, Bucket>,
    record: &DepositRecord,
) -> Option<AggregationWarning> {
    let Some(period) = Period::parse(record.attribution_month.trim()) else {
        warn!(
            record_id = record.id,
            token = %record.attribution_month,
            "Skipping deposit with unreadable attribution month"
        );
        return Some(AggregationWarning::UnparseableAttributionMonth {
            record_id: record.id,
            token: record.attribution_month.clone(),
        });
    };

    let calendar_month = period.calendar_month();
    let expense = record.one_time_expense_amount.unwrap_or(Decimal::ZERO);
    // Incremental, so projected profit already in the bucket is kept.
    let Some(sum) = record
        .amount
        .checked_sub(expense)
        .and_then(|profit| summed(buckets, calendar_month, record.amount, expense, profit))
    else {
        return Some(out_of_range(record));
    };

    let bucket = buckets.entry(calendar_month).or_default();
    bucket.totals = sum;
    bucket.add_currency(&record.currency);
    if let (Some(_), Some(currency)) = (record.one_time_expense_amount, &record.one_time_expense_currency) {
        bucket.add_currency(currency);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::accounting::MonthlyExpenseEntry;

    fn month(year: i32, month: u32) -> CalendarMonth {
        CalendarMonth { year, month }
    }

    fn portal_key() -> ProjectKey {
        ProjectKey::new("project", "web", "Portal", "Acme")
    }

    fn portal_config() -> ProjectAccountingConfig {
        ProjectAccountingConfig::with_period("2501", "2503")
            .with_management(Some(Decimal::from(20)), Some(Decimal::from(500_000)))
            .with_expenses(vec![
                MonthlyExpenseEntry::new("2501", Decimal::from(300_000), "JPY"),
                MonthlyExpenseEntry::new("2502", Decimal::from(200_000), "JPY"),
                MonthlyExpenseEntry::new("2503", Decimal::from(100_000), "JPY"),
            ])
    }

    fn records() -> Vec<DepositRecord> {
        vec![
            DepositRecord::new(1, Decimal::from(3_000_000), "JPY", "2502")
                .with_project("project", "web", "Portal", "Acme"),
            DepositRecord::new(2, Decimal::from(100_000), "JPY", "2502")
                .with_one_time_expense(Decimal::from(40_000), "JPY"),
        ]
    }

    fn configs() -> HashMap<ProjectKey, ProjectAccountingConfig> {
        HashMap::from([(portal_key(), portal_config())])
    }

    fn options() -> AggregationOptions {
        AggregationOptions::new(["project"])
    }

    #[test]
    fn test_default_view_buckets_by_attribution_month() {
        let aggregate = aggregate_monthly(&records(), &configs(), AccountingView::Default, &options());

        assert_eq!(aggregate.months.len(), 1);
        let february = aggregate.get(month(2025, 2)).unwrap();
        assert_eq!(february.revenue, Decimal::from(3_100_000));
        assert_eq!(february.expense, Decimal::from(40_000));
        assert_eq!(february.profit, Decimal::from(3_060_000));
        assert!(aggregate.warnings.is_empty());
    }

    #[test]
    fn test_management_view_spreads_eligible_projects() {
        let aggregate =
            aggregate_monthly(&records(), &configs(), AccountingView::Management, &options());

        let keys: Vec<String> = aggregate.months.keys().map(|m| m.to_string()).collect();
        assert_eq!(keys, vec!["2025-01", "2025-02", "2025-03"]);

        assert_eq!(aggregate.get(month(2025, 1)).unwrap().profit, Decimal::from(200_000));
        // Project month plus the fallback record
        let february = aggregate.get(month(2025, 2)).unwrap();
        assert_eq!(february.revenue, Decimal::from(1_100_000));
        assert_eq!(february.profit, Decimal::from(260_000));
        assert_eq!(aggregate.get(month(2025, 3)).unwrap().profit, Decimal::from(500_000));
        assert_eq!(aggregate.total_revenue(), Decimal::from(3_100_000));
    }

    #[test]
    fn test_real_view_uses_monthly_expenses() {
        let aggregate = aggregate_monthly(&records(), &configs(), AccountingView::Real, &options());

        let january = aggregate.get(month(2025, 1)).unwrap();
        assert_eq!(january.revenue, Decimal::from(3_000_000));
        assert_eq!(january.expense, Decimal::from(300_000));
        assert_eq!(january.profit, Decimal::from(2_700_000));

        let february = aggregate.get(month(2025, 2)).unwrap();
        assert_eq!(february.revenue, Decimal::from(100_000));
        assert_eq!(february.expense, Decimal::from(240_000));
        assert_eq!(february.profit, Decimal::from(-140_000));
    }

    #[test]
    fn test_ineligible_category_falls_back() {
        let options = AggregationOptions::new(["license"]);
        let aggregate = aggregate_monthly(&records(), &configs(), AccountingView::Real, &options);
        assert_eq!(aggregate.months.len(), 1);
        assert_eq!(aggregate.get(month(2025, 2)).unwrap().revenue, Decimal::from(3_100_000));
    }

    #[test]
    fn test_unusable_config_falls_back() {
        let configs = HashMap::from([(
            portal_key(),
            ProjectAccountingConfig::with_period("2503", "2501"),
        )]);
        let aggregate = aggregate_monthly(&records(), &configs, AccountingView::Management, &options());
        assert_eq!(aggregate.months.len(), 1);

        let aggregate =
            aggregate_monthly(&records(), &HashMap::new(), AccountingView::Management, &options());
        assert_eq!(aggregate.months.len(), 1);
    }

    #[test]
    fn test_excluded_records_are_left_out() {
        let options = options().with_excluded([1].into_iter().collect());
        for view in [AccountingView::Default, AccountingView::Management, AccountingView::Real] {
            let aggregate = aggregate_monthly(&records(), &configs(), view, &options);
            assert_eq!(aggregate.total_revenue(), Decimal::from(100_000), "view {}", view);
        }
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        for view in [AccountingView::Default, AccountingView::Management, AccountingView::Real] {
            let first = aggregate_monthly(&records(), &configs(), view, &options());
            let second = aggregate_monthly(&records(), &configs(), view, &options());
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_mixed_currencies_are_summed_and_reported() {
        let records = vec![
            DepositRecord::new(1, Decimal::from(100), "JPY", "2501"),
            DepositRecord::new(2, Decimal::from(5), "usd", "2501"),
            DepositRecord::new(3, Decimal::from(7), "USD", "2502"),
        ];
        let aggregate =
            aggregate_monthly(&records, &HashMap::new(), AccountingView::Default, &options());

        assert_eq!(aggregate.get(month(2025, 1)).unwrap().revenue, Decimal::from(105));
        assert_eq!(
            aggregate.warnings,
            vec![AggregationWarning::MixedCurrency {
                calendar_month: month(2025, 1),
                currencies: vec!["JPY".to_string(), "USD".to_string()],
            }]
        );
        assert_eq!(
            aggregate.warnings[0].to_string(),
            "2025-01 mixes currencies JPY, USD without conversion"
        );
    }

    #[test]
    fn test_unreadable_attribution_month_is_reported() {
        let records = vec![
            DepositRecord::new(1, Decimal::from(100), "JPY", "2501"),
            DepositRecord::new(9, Decimal::from(5), "JPY", "Jan-25"),
        ];
        let aggregate =
            aggregate_monthly(&records, &HashMap::new(), AccountingView::Default, &options());

        assert_eq!(aggregate.total_revenue(), Decimal::from(100));
        assert_eq!(
            aggregate.warnings,
            vec![AggregationWarning::UnparseableAttributionMonth {
                record_id: 9,
                token: "Jan-25".to_string(),
            }]
        );
    }

    #[test]
    fn test_projected_record_ignores_its_attribution_month() {
        let records = vec![DepositRecord::new(1, Decimal::from(3_000_000), "JPY", "bad")
            .with_project("project", "web", "Portal", "Acme")];
        let aggregate = aggregate_monthly(&records, &configs(), AccountingView::Real, &options());
        assert!(aggregate.warnings.is_empty());
        assert_eq!(aggregate.total_profit(), Decimal::from(2_400_000));
    }

    #[test]
    fn test_record_out_of_range_is_left_out_whole() {
        let records = vec![
            DepositRecord::new(1, Decimal::from(3_000_000), "JPY", "2502")
                .with_project("project", "web", "Portal", "Acme"),
            DepositRecord::new(2, Decimal::MAX, "JPY", "2412"),
            DepositRecord::new(3, Decimal::from(100), "JPY", "2412"),
        ];

        let aggregate = aggregate_monthly(&records, &configs(), AccountingView::Real, &options());

        // Record 3 no longer fits next to record 2 in December
        assert_eq!(
            aggregate.warnings,
            vec![AggregationWarning::AmountOutOfRange { record_id: 3 }]
        );
        assert_eq!(aggregate.get(month(2024, 12)).unwrap().revenue, Decimal::MAX);
        let january = aggregate.get(month(2025, 1)).unwrap();
        assert_eq!(january.revenue, Decimal::from(3_000_000));
        assert_eq!(january.profit, Decimal::from(2_700_000));
    }

    #[test]
    fn test_projection_out_of_range_is_reported() {
        let mut config = portal_config();
        config.target_margin_rate = Some(Decimal::from(1_000));
        config.final_month_actual_cost = None;
        let records = vec![DepositRecord::new(1, Decimal::MAX, "JPY", "2502")
            .with_project("project", "web", "Portal", "Acme")];

        let aggregate = aggregate_monthly(
            &records,
            &HashMap::from([(portal_key(), config)]),
            AccountingView::Management,
            &options(),
        );

        assert!(aggregate.months.is_empty());
        assert_eq!(
            aggregate.warnings,
            vec![AggregationWarning::AmountOutOfRange { record_id: 1 }]
        );
    }
}
