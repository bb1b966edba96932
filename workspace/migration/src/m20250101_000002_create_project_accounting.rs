use sea_orm_migration::{prelude::*, schema::*};

use crate::m20250101_000001_create_deposits::Deposits;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 1. One accounting configuration per deposit record
        manager
            .create_table(
                Table::create()
                    .table(ProjectAccountingConfigs::Table)
                    .if_not_exists()
                    .col(pk_auto(ProjectAccountingConfigs::Id))
                    .col(integer(ProjectAccountingConfigs::DepositId).unique_key())
                    .col(string_len_null(ProjectAccountingConfigs::PeriodStart, 4))
                    .col(string_len_null(ProjectAccountingConfigs::PeriodEnd, 4))
                    .col(decimal_len_null(ProjectAccountingConfigs::TargetMarginRate, 9, 4))
                    .col(decimal_len_null(
                        ProjectAccountingConfigs::FinalMonthActualCost,
                        19,
                        4,
                    ))
                    .col(string_null(
                        ProjectAccountingConfigs::FinalMonthActualCostCurrency,
                    ))
                    .col(
                        date_time(ProjectAccountingConfigs::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_project_accounting_config_deposit")
                            .from(
                                ProjectAccountingConfigs::Table,
                                ProjectAccountingConfigs::DepositId,
                            )
                            .to(Deposits::Table, Deposits::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 2. Monthly expenses, replaced as a set on every save
        manager
            .create_table(
                Table::create()
                    .table(MonthlyExpenses::Table)
                    .if_not_exists()
                    .col(pk_auto(MonthlyExpenses::Id))
                    .col(integer(MonthlyExpenses::ConfigId))
                    .col(string_len(MonthlyExpenses::Month, 4))
                    .col(decimal_len(MonthlyExpenses::ExpenseAmount, 19, 4))
                    .col(string(MonthlyExpenses::ExpenseCurrency))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_monthly_expense_config")
                            .from(MonthlyExpenses::Table, MonthlyExpenses::ConfigId)
                            .to(
                                ProjectAccountingConfigs::Table,
                                ProjectAccountingConfigs::Id,
                            )
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 3. At most one expense row per month of a configuration
        manager
            .create_index(
                Index::create()
                    .name("idx_monthly_expenses_config_month")
                    .table(MonthlyExpenses::Table)
                    .col(MonthlyExpenses::ConfigId)
                    .col(MonthlyExpenses::Month)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MonthlyExpenses::Table).to_owned())
            .await?;

        manager
            .drop_table(
                Table::drop()
                    .table(ProjectAccountingConfigs::Table)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum ProjectAccountingConfigs {
    Table,
    Id,
    DepositId,
    PeriodStart,
    PeriodEnd,
    TargetMarginRate,
    FinalMonthActualCost,
    FinalMonthActualCostCurrency,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum MonthlyExpenses {
    Table,
    Id,
    ConfigId,
    Month,
    ExpenseAmount,
    ExpenseCurrency,
}
