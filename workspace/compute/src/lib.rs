pub mod aggregate;
pub mod cache;
pub mod engine;
pub mod error;
pub mod grouping;
pub mod period;
pub mod projection;
pub mod status;
pub mod store;
pub mod validation;

#[cfg(test)]
pub mod testing;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

pub use aggregate::{AggregationOptions, AggregationWarning, MonthlyAggregate, MonthlyTotals, aggregate_monthly};
pub use engine::{ProjectOverview, ProjectStatus, ProjectionEngine};
pub use grouping::{AccountingProject, ExclusionSet, ProjectGrouping, group_projects};
pub use period::{CalendarMonth, Period, PeriodRange};
pub use projection::{MonthlyProjection, ProjectionCalculator, project_management, project_real};
pub use status::{AccountingStatus, classify_status};
pub use store::{DepositFilter, RecordStore};

/// Categories spread by the accounting views when nothing else is configured.
pub const DEFAULT_ACCOUNTING_CATEGORIES: &[&str] = &["project"];

/// Returns a default pre-configured engine that will be used most of the time.
///
/// Deposits and configurations are read from `db` through a
/// [`store::SeaOrmRecordStore`] and configurations are cached with the
/// default cache size. An empty `accounting_categories` falls back to
/// [`DEFAULT_ACCOUNTING_CATEGORIES`].
pub fn default_engine(db: DatabaseConnection, accounting_categories: &[String]) -> ProjectionEngine {
    let store = Arc::new(store::SeaOrmRecordStore::new(db));
    if accounting_categories.is_empty() {
        ProjectionEngine::new(store, DEFAULT_ACCOUNTING_CATEGORIES.iter().copied())
    } else {
        ProjectionEngine::new(store, accounting_categories.iter().cloned())
    }
}
