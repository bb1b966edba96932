use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use model::accounting::ProjectAccountingConfig;
use model::deposit::{DepositRecord, NewDeposit};
use tracing::trace;

use super::{DepositFilter, RecordStore};
use crate::error::{ComputeError, Result};

#[derive(Debug, Default)]
struct MemoryState {
    deposits: BTreeMap<i32, DepositRecord>,
    configs: HashMap<i32, ProjectAccountingConfig>,
    next_id: i32,
}

/// [`RecordStore`] kept entirely in memory.
///
/// Counts the batched configuration reads it serves so callers can check how
/// often they hit the store.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    state: Mutex<MemoryState>,
    config_reads: AtomicUsize,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store holding `records` with their ids kept as given.
    pub fn with_records(records: impl IntoIterator<Item = DepositRecord>) -> Self {
        let mut state = MemoryState::default();
        for record in records {
            state.next_id = state.next_id.max(record.id);
            state.deposits.insert(record.id, record);
        }
        Self {
            state: Mutex::new(state),
            config_reads: AtomicUsize::new(0),
        }
    }

    /// Number of `get_accounting_configs` calls served so far.
    pub fn config_reads(&self) -> usize {
        self.config_reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn list_deposits(&self, filter: &DepositFilter) -> Result<Vec<DepositRecord>> {
        let state = self.state.lock()?;
        Ok(state
            .deposits
            .values()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect())
    }

    async fn insert_deposit(&self, deposit: NewDeposit) -> Result<DepositRecord> {
        let mut state = self.state.lock()?;
        state.next_id += 1;
        let record = DepositRecord {
            id: state.next_id,
            amount: deposit.amount,
            currency: deposit.currency,
            category: deposit.category,
            project_category: deposit.project_category,
            project_name: deposit.project_name,
            company_name: deposit.company_name,
            team: deposit.team,
            attribution_month: deposit.attribution_month,
            one_time_expense_amount: deposit.one_time_expense_amount,
            one_time_expense_currency: deposit.one_time_expense_currency,
            memo: deposit.memo,
        };
        state.deposits.insert(record.id, record.clone());
        Ok(record)
    }

    async fn delete_deposit(&self, record_id: i32) -> Result<()> {
        let mut state = self.state.lock()?;
        state
            .deposits
            .remove(&record_id)
            .ok_or_else(|| ComputeError::NotFound(format!("deposit {}", record_id)))?;
        state.configs.remove(&record_id);
        Ok(())
    }

    async fn get_accounting_configs(
        &self,
        record_ids: &[i32],
    ) -> Result<HashMap<i32, ProjectAccountingConfig>> {
        self.config_reads.fetch_add(1, Ordering::SeqCst);
        trace!(count = record_ids.len(), "Reading configs from memory");
        let state = self.state.lock()?;
        Ok(record_ids
            .iter()
            .filter_map(|id| state.configs.get(id).map(|config| (*id, config.clone())))
            .collect())
    }

    async fn replace_accounting_configs(
        &self,
        record_ids: &[i32],
        config: &ProjectAccountingConfig,
    ) -> Result<()> {
        let mut state = self.state.lock()?;
        if let Some(missing) = record_ids.iter().find(|&&id| !state.deposits.contains_key(&id)) {
            return Err(ComputeError::NotFound(format!("deposit {}", missing)));
        }
        for &id in record_ids {
            state.configs.insert(id, config.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = InMemoryRecordStore::with_records([
            DepositRecord::new(4, Decimal::from(10), "JPY", "2501"),
        ]);
        let inserted = store
            .insert_deposit(DepositRecord::new(0, Decimal::from(20), "JPY", "2502").into())
            .await
            .unwrap();
        assert_eq!(inserted.id, 5);

        let config = ProjectAccountingConfig::with_period("2501", "2502");
        store.save_accounting_config(4, &config).await.unwrap();
        assert_eq!(store.get_accounting_config(4).await.unwrap(), Some(config));
        assert_eq!(store.get_accounting_config(5).await.unwrap(), None);
        assert_eq!(store.config_reads(), 2);

        store.delete_deposit(4).await.unwrap();
        assert_eq!(store.get_accounting_config(4).await.unwrap(), None);
        assert_eq!(store.list_deposits(&DepositFilter::default()).await.unwrap(), vec![inserted]);
    }

    #[tokio::test]
    async fn test_save_for_unknown_record_fails() {
        let store = InMemoryRecordStore::new();
        let result = store
            .save_accounting_config(1, &ProjectAccountingConfig::default())
            .await;
        assert!(matches!(result, Err(ComputeError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_batch_with_unknown_record_writes_nothing() {
        let store = InMemoryRecordStore::with_records([
            DepositRecord::new(1, Decimal::from(10), "JPY", "2501"),
            DepositRecord::new(2, Decimal::from(20), "JPY", "2502"),
        ]);
        let config = ProjectAccountingConfig::with_period("2501", "2502");

        let result = store.replace_accounting_configs(&[1, 7, 2], &config).await;
        assert!(matches!(result, Err(ComputeError::NotFound(_))));
        assert!(store.get_accounting_configs(&[1, 2]).await.unwrap().is_empty());
    }
}
