use async_trait::async_trait;
use common::AccountingView;
use rust_decimal::Decimal;
use sea_orm::DbErr;

use super::{insert_config, insert_deposit, setup_db};
use crate::testing::{TestScenario, TestScenarioBuilder};

/// A three month project paid in one deposit, with a 20% target margin and a
/// final month cost of 500,000. A license sale in February is not spread and
/// lands in its attribution month.
pub struct ScenarioManagement {}

impl ScenarioManagement {
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait]
impl TestScenarioBuilder for ScenarioManagement {
    async fn get_scenario(&self) -> Result<TestScenario, DbErr> {
        let db = setup_db().await?;

        let project = ("project", "web", "Portal", "Acme");
        let deposit = insert_deposit(&db, 3_000_000, "2501", Some(project), None).await?;
        insert_config(&db, deposit.id, ("2501", "2503"), Some(20), Some(500_000), &[]).await?;

        let license = ("license", "tool", "Editor", "Acme");
        insert_deposit(&db, 100_000, "2502", Some(license), Some(40_000)).await?;

        let assert_result = vec![
            ("2025-01", Decimal::from(1_000_000), Decimal::ZERO, Decimal::from(200_000)),
            ("2025-02", Decimal::from(1_100_000), Decimal::from(40_000), Decimal::from(260_000)),
            // Final month trued up to revenue minus actual cost
            ("2025-03", Decimal::from(1_000_000), Decimal::ZERO, Decimal::from(500_000)),
        ];

        Ok((db, AccountingView::Management, assert_result))
    }
}
