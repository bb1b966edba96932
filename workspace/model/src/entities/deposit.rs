use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

use crate::deposit::DepositRecord;

/// An incoming payment recorded by a business team.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "deposits")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub amount: Decimal,
    /// ISO 4217 currency code of the amount.
    pub currency: String,
    pub category: Option<String>,
    pub project_category: Option<String>,
    pub project_name: Option<String>,
    pub company_name: Option<String>,
    pub team: Option<String>,
    /// Year-month token (`YYMM`) the payment is attributed to.
    pub attribution_month: String,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))", nullable)]
    pub one_time_expense_amount: Option<Decimal>,
    pub one_time_expense_currency: Option<String>,
    pub memo: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::project_accounting_config::Entity")]
    ProjectAccountingConfig,
}

impl Related<super::project_accounting_config::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProjectAccountingConfig.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for DepositRecord {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            amount: model.amount,
            currency: model.currency,
            category: model.category,
            project_category: model.project_category,
            project_name: model.project_name,
            company_name: model.company_name,
            team: model.team,
            attribution_month: model.attribution_month,
            one_time_expense_amount: model.one_time_expense_amount,
            one_time_expense_currency: model.one_time_expense_currency,
            memo: model.memo,
        }
    }
}
