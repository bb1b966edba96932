use async_trait::async_trait;
use common::AccountingView;
use rust_decimal::Decimal;
use sea_orm::DbErr;

use super::{insert_config, insert_deposit, setup_db};
use crate::testing::{TestScenario, TestScenarioBuilder};

/// The three month project again, this time with its actual monthly expenses.
/// The deposit was received in March but is recognized in January. A second
/// project has a reversed period, so its deposit stays in its own month.
pub struct ScenarioReal {}

impl ScenarioReal {
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait]
impl TestScenarioBuilder for ScenarioReal {
    async fn get_scenario(&self) -> Result<TestScenario, DbErr> {
        let db = setup_db().await?;

        let project = ("project", "web", "Portal", "Acme");
        let deposit = insert_deposit(&db, 3_000_000, "2503", Some(project), None).await?;
        insert_config(
            &db,
            deposit.id,
            ("2501", "2503"),
            Some(20),
            Some(500_000),
            &[("2501", 300_000), ("2502", 200_000), ("2503", 100_000)],
        )
        .await?;

        let reversed = ("project", "app", "Shop", "Beta");
        let deposit = insert_deposit(&db, 50_000, "2504", Some(reversed), None).await?;
        insert_config(&db, deposit.id, ("2506", "2504"), None, None, &[("2504", 1_000)]).await?;

        let assert_result = vec![
            ("2025-01", Decimal::from(3_000_000), Decimal::from(300_000), Decimal::from(2_700_000)),
            ("2025-02", Decimal::ZERO, Decimal::from(200_000), Decimal::from(-200_000)),
            ("2025-03", Decimal::ZERO, Decimal::from(100_000), Decimal::from(-100_000)),
            ("2025-04", Decimal::from(50_000), Decimal::ZERO, Decimal::from(50_000)),
        ];

        Ok((db, AccountingView::Real, assert_result))
    }
}
