//! This file serves as the root for all SeaORM entity modules.
//! Deposits are owned by the surrounding bookkeeping tooling; the accounting
//! configuration and its monthly expenses hang off a deposit record.

pub mod deposit;
pub mod monthly_expense;
pub mod project_accounting_config;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::deposit::Entity as Deposit;
    pub use super::monthly_expense::Entity as MonthlyExpense;
    pub use super::project_accounting_config::Entity as ProjectAccountingConfig;
}
