use async_trait::async_trait;
use common::AccountingView;
use rust_decimal::Decimal;
use sea_orm::DbErr;

use super::{insert_config, insert_deposit, setup_db};
use crate::testing::{TestScenario, TestScenarioBuilder};

/// Advance and balance installments of one configured project, read in the
/// default view: configurations are ignored and each deposit stays in its
/// attribution month with its one-time expense.
pub struct ScenarioDefault {}

impl ScenarioDefault {
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait]
impl TestScenarioBuilder for ScenarioDefault {
    async fn get_scenario(&self) -> Result<TestScenario, DbErr> {
        let db = setup_db().await?;

        let project = ("project", "web", "Portal", "Acme");
        let advance = insert_deposit(&db, 1_000_000, "2501", Some(project), None).await?;
        let balance = insert_deposit(&db, 2_000_000, "2503", Some(project), Some(150_000)).await?;
        for deposit in [&advance, &balance] {
            insert_config(&db, deposit.id, ("2501", "2503"), Some(20), None, &[]).await?;
        }

        // No project key at all
        insert_deposit(&db, 30_000, "2503", None, Some(10_000)).await?;

        let assert_result = vec![
            ("2025-01", Decimal::from(1_000_000), Decimal::ZERO, Decimal::from(1_000_000)),
            ("2025-03", Decimal::from(2_030_000), Decimal::from(160_000), Decimal::from(1_870_000)),
        ];

        Ok((db, AccountingView::Default, assert_result))
    }
}
