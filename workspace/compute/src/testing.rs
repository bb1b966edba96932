pub mod scenario_default;
pub mod scenario_management;
pub mod scenario_real;

pub use scenario_default::ScenarioDefault;
pub use scenario_management::ScenarioManagement;
pub use scenario_real::ScenarioReal;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use common::AccountingView;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, DbErr, Set};

use crate::engine::ProjectionEngine;
use crate::error::Result as ComputeResult;
use crate::grouping::ExclusionSet;
use crate::store::{DepositFilter, SeaOrmRecordStore};
use migration::{Migrator, MigratorTrait};
use model::entities::{deposit, monthly_expense, project_accounting_config};

pub async fn setup_db() -> Result<DatabaseConnection, DbErr> {
    // Connect to the SQLite database
    let db = Database::connect("sqlite::memory:").await?;

    // Enable foreign keys
    db.execute_unprepared("PRAGMA foreign_keys = ON;").await?;

    Migrator::up(&db, None).await.expect("Migrations failed.");
    Ok(db)
}

/// Expected series in the following schema
/// (calendar month, revenue, expense, profit)
pub type AssertResult = Vec<(&'static str, Decimal, Decimal, Decimal)>;

/// Prepared test scenario.
pub type TestScenario = (DatabaseConnection, AccountingView, AssertResult);

/// Trait for building test scenarios.
#[async_trait]
pub trait TestScenarioBuilder {
    async fn get_scenario(&self) -> Result<TestScenario, DbErr>;
}

/// Runs the scenario through a [`ProjectionEngine`] backed by its database
/// and compares the monthly series with the expected one.
pub async fn run_and_assert_scenario(builder: &dyn TestScenarioBuilder) -> ComputeResult<()> {
    let (db, view, assert_result) = builder.get_scenario().await?;

    let engine = ProjectionEngine::new(Arc::new(SeaOrmRecordStore::new(db)), ["project"]);
    let aggregate = engine
        .monthly_series(&DepositFilter::default(), view, &ExclusionSet::new())
        .await?;

    let actual: Vec<(String, Decimal, Decimal, Decimal)> = aggregate
        .months
        .iter()
        .map(|(month, totals)| (month.to_string(), totals.revenue, totals.expense, totals.profit))
        .collect();
    let expected: Vec<(String, Decimal, Decimal, Decimal)> = assert_result
        .into_iter()
        .map(|(month, revenue, expense, profit)| (month.to_string(), revenue, expense, profit))
        .collect();

    assert_eq!(actual, expected, "Unexpected {} series", view);
    Ok(())
}

/// Inserts a deposit row. `project` is (category, project category, name, company).
pub async fn insert_deposit(
    db: &DatabaseConnection,
    amount: i64,
    attribution_month: &str,
    project: Option<(&str, &str, &str, &str)>,
    one_time_expense: Option<i64>,
) -> Result<deposit::Model, DbErr> {
    let (category, project_category, project_name, company_name) = match project {
        Some((a, b, c, d)) => (
            Some(a.to_string()),
            Some(b.to_string()),
            Some(c.to_string()),
            Some(d.to_string()),
        ),
        None => (None, None, None, None),
    };

    deposit::ActiveModel {
        amount: Set(Decimal::from(amount)),
        currency: Set("JPY".to_string()),
        category: Set(category),
        project_category: Set(project_category),
        project_name: Set(project_name),
        company_name: Set(company_name),
        team: Set(Some("sales".to_string())),
        attribution_month: Set(attribution_month.to_string()),
        one_time_expense_amount: Set(one_time_expense.map(Decimal::from)),
        one_time_expense_currency: Set(one_time_expense.map(|_| "JPY".to_string())),
        memo: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// Inserts an accounting config row with its expenses for one deposit.
pub async fn insert_config(
    db: &DatabaseConnection,
    deposit_id: i32,
    period: (&str, &str),
    margin_rate: Option<i64>,
    final_cost: Option<i64>,
    expenses: &[(&str, i64)],
) -> Result<project_accounting_config::Model, DbErr> {
    let config = project_accounting_config::ActiveModel {
        deposit_id: Set(deposit_id),
        period_start: Set(Some(period.0.to_string())),
        period_end: Set(Some(period.1.to_string())),
        target_margin_rate: Set(margin_rate.map(Decimal::from)),
        final_month_actual_cost: Set(final_cost.map(Decimal::from)),
        final_month_actual_cost_currency: Set(final_cost.map(|_| "JPY".to_string())),
        updated_at: Set(NaiveDate::from_ymd_opt(2025, 4, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    for (month, amount) in expenses {
        monthly_expense::ActiveModel {
            config_id: Set(config.id),
            month: Set(month.to_string()),
            expense_amount: Set(Decimal::from(*amount)),
            expense_currency: Set("JPY".to_string()),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scenario_management() {
        let scenario = ScenarioManagement::new();
        run_and_assert_scenario(&scenario)
            .await
            .expect("Failed to run management scenario");
    }

    #[tokio::test]
    async fn test_scenario_real() {
        let scenario = ScenarioReal::new();
        run_and_assert_scenario(&scenario)
            .await
            .expect("Failed to run real scenario");
    }

    #[tokio::test]
    async fn test_scenario_default() {
        let scenario = ScenarioDefault::new();
        run_and_assert_scenario(&scenario)
            .await
            .expect("Failed to run default scenario");
    }
}
