use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

use super::monthly_expense;
use crate::accounting::{MonthlyExpenseEntry, ProjectAccountingConfig};

/// Accounting configuration stored against one deposit record.
///
/// There is at most one row per deposit. The monthly expenses live in
/// [`monthly_expense`] and are replaced as a set on every save.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "project_accounting_configs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub deposit_id: i32,
    pub period_start: Option<String>,
    pub period_end: Option<String>,
    /// Target margin rate in percent.
    #[sea_orm(column_type = "Decimal(Some((9, 4)))", nullable)]
    pub target_margin_rate: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))", nullable)]
    pub final_month_actual_cost: Option<Decimal>,
    pub final_month_actual_cost_currency: Option<String>,
    pub updated_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::deposit::Entity",
        from = "Column::DepositId",
        to = "super::deposit::Column::Id",
        on_delete = "Cascade"
    )]
    Deposit,
    #[sea_orm(has_many = "super::monthly_expense::Entity")]
    MonthlyExpense,
}

impl Related<super::deposit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Deposit.def()
    }
}

impl Related<super::monthly_expense::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MonthlyExpense.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Assembles the domain configuration from this row and its expense rows.
    pub fn into_config(self, expenses: Vec<monthly_expense::Model>) -> ProjectAccountingConfig {
        ProjectAccountingConfig {
            period_start: self.period_start,
            period_end: self.period_end,
            target_margin_rate: self.target_margin_rate,
            final_month_actual_cost: self.final_month_actual_cost,
            final_month_actual_cost_currency: self.final_month_actual_cost_currency,
            monthly_expenses: expenses
                .into_iter()
                .map(MonthlyExpenseEntry::from)
                .collect(),
        }
    }
}
