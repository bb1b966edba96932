//! Access to deposits and their accounting configuration.
//!
//! The projection engine never talks to the database directly; everything it
//! reads or writes goes through [`RecordStore`].

use std::collections::HashMap;

use async_trait::async_trait;
use model::accounting::ProjectAccountingConfig;
use model::deposit::{DepositRecord, NewDeposit};

use crate::error::Result;
use crate::validation::validate_config;

pub mod database;
#[cfg(test)]
pub mod memory;

pub use database::SeaOrmRecordStore;
#[cfg(test)]
pub use memory::InMemoryRecordStore;

/// Optional exact-match filter applied when listing deposits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DepositFilter {
    pub team: Option<String>,
    pub category: Option<String>,
    pub company_name: Option<String>,
}

impl DepositFilter {
    pub fn matches(&self, record: &DepositRecord) -> bool {
        fn field_matches(wanted: &Option<String>, actual: &Option<String>) -> bool {
            wanted.is_none() || wanted == actual
        }
        field_matches(&self.team, &record.team)
            && field_matches(&self.category, &record.category)
            && field_matches(&self.company_name, &record.company_name)
    }
}

/// Store of deposit records and their accounting configurations.
///
/// Configurations are keyed by record id. Saving replaces the whole
/// configuration, monthly expenses included; the last writer wins.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Lists deposits matching `filter`, ordered by record id.
    async fn list_deposits(&self, filter: &DepositFilter) -> Result<Vec<DepositRecord>>;

    /// Stores a new deposit and returns it with its assigned id.
    async fn insert_deposit(&self, deposit: NewDeposit) -> Result<DepositRecord>;

    /// Removes a deposit together with its accounting configuration.
    async fn delete_deposit(&self, record_id: i32) -> Result<()>;

    /// Reads the configurations of several records at once. Records without a
    /// configuration are absent from the result.
    async fn get_accounting_configs(
        &self,
        record_ids: &[i32],
    ) -> Result<HashMap<i32, ProjectAccountingConfig>>;

    /// Writes `config` for every one of `record_ids` without validating it.
    ///
    /// The batch is all or nothing: if any id is unknown, or a write fails,
    /// no record is changed.
    async fn replace_accounting_configs(
        &self,
        record_ids: &[i32],
        config: &ProjectAccountingConfig,
    ) -> Result<()>;

    async fn get_accounting_config(&self, record_id: i32) -> Result<Option<ProjectAccountingConfig>> {
        let mut configs = self.get_accounting_configs(&[record_id]).await?;
        Ok(configs.remove(&record_id))
    }

    /// Validates `config` and replaces the stored configuration of
    /// `record_id` with it. Nothing is written when validation fails.
    async fn save_accounting_config(
        &self,
        record_id: i32,
        config: &ProjectAccountingConfig,
    ) -> Result<()> {
        validate_config(config)?;
        self.replace_accounting_configs(&[record_id], config).await
    }
}
