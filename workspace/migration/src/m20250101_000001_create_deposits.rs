use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Deposits::Table)
                    .if_not_exists()
                    .col(pk_auto(Deposits::Id))
                    .col(decimal_len(Deposits::Amount, 19, 4))
                    .col(string(Deposits::Currency))
                    .col(string_null(Deposits::Category))
                    .col(string_null(Deposits::ProjectCategory))
                    .col(string_null(Deposits::ProjectName))
                    .col(string_null(Deposits::CompanyName))
                    .col(string_null(Deposits::Team))
                    .col(string_len(Deposits::AttributionMonth, 4))
                    .col(decimal_len_null(Deposits::OneTimeExpenseAmount, 19, 4))
                    .col(string_null(Deposits::OneTimeExpenseCurrency))
                    .col(string_null(Deposits::Memo))
                    .to_owned(),
            )
            .await?;

        // Grouping and filtering always go through the project identity
        manager
            .create_index(
                Index::create()
                    .name("idx_deposits_project_key")
                    .table(Deposits::Table)
                    .col(Deposits::Category)
                    .col(Deposits::ProjectCategory)
                    .col(Deposits::ProjectName)
                    .col(Deposits::CompanyName)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Deposits::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Deposits {
    Table,
    Id,
    Amount,
    Currency,
    Category,
    ProjectCategory,
    ProjectName,
    CompanyName,
    Team,
    AttributionMonth,
    OneTimeExpenseAmount,
    OneTimeExpenseCurrency,
    Memo,
}
