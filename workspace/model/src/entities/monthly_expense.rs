use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

use crate::accounting::MonthlyExpenseEntry;

/// Actual expense of one project month.
/// Unique per (config, month).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "monthly_expenses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub config_id: i32,
    /// Period token (`YYMM`).
    pub month: String,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub expense_amount: Decimal,
    pub expense_currency: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::project_accounting_config::Entity",
        from = "Column::ConfigId",
        to = "super::project_accounting_config::Column::Id",
        on_delete = "Cascade"
    )]
    ProjectAccountingConfig,
}

impl Related<super::project_accounting_config::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProjectAccountingConfig.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for MonthlyExpenseEntry {
    fn from(model: Model) -> Self {
        Self {
            month: model.month,
            expense_amount: model.expense_amount,
            expense_currency: model.expense_currency,
        }
    }
}
