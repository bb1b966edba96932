use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use model::accounting::ProjectAccountingConfig;
use model::deposit::{DepositRecord, NewDeposit};
use model::entities::{deposit, monthly_expense, project_accounting_config};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, QueryTrait, Set, TransactionTrait,
};
use tracing::{debug, error, info, instrument, trace};

use super::{DepositFilter, RecordStore};
use crate::error::{ComputeError, Result};

/// [`RecordStore`] backed by the SeaORM entities of the `model` crate.
#[derive(Debug, Clone)]
pub struct SeaOrmRecordStore {
    db: DatabaseConnection,
}

impl SeaOrmRecordStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

async fn require_deposit(txn: &DatabaseTransaction, record_id: i32) -> Result<deposit::Model> {
    deposit::Entity::find_by_id(record_id)
        .one(txn)
        .await?
        .ok_or_else(|| ComputeError::NotFound(format!("deposit {}", record_id)))
}

/// Replaces the configuration of one record, monthly expenses included.
async fn write_config(
    txn: &DatabaseTransaction,
    record_id: i32,
    config: &ProjectAccountingConfig,
    now: NaiveDateTime,
) -> Result<()> {
    let existing = project_accounting_config::Entity::find()
        .filter(project_accounting_config::Column::DepositId.eq(record_id))
        .one(txn)
        .await?;

    let saved = match existing {
        Some(existing) => {
            let mut active: project_accounting_config::ActiveModel = existing.into();
            active.period_start = Set(config.period_start.clone());
            active.period_end = Set(config.period_end.clone());
            active.target_margin_rate = Set(config.target_margin_rate);
            active.final_month_actual_cost = Set(config.final_month_actual_cost);
            active.final_month_actual_cost_currency =
                Set(config.final_month_actual_cost_currency.clone());
            active.updated_at = Set(now);
            active.update(txn).await?
        }
        None => {
            project_accounting_config::ActiveModel {
                deposit_id: Set(record_id),
                period_start: Set(config.period_start.clone()),
                period_end: Set(config.period_end.clone()),
                target_margin_rate: Set(config.target_margin_rate),
                final_month_actual_cost: Set(config.final_month_actual_cost),
                final_month_actual_cost_currency: Set(
                    config.final_month_actual_cost_currency.clone()
                ),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(txn)
            .await?
        }
    };

    // Replace the expense set as a whole
    let removed = monthly_expense::Entity::delete_many()
        .filter(monthly_expense::Column::ConfigId.eq(saved.id))
        .exec(txn)
        .await?;

    if !config.monthly_expenses.is_empty() {
        let rows = config
            .monthly_expenses
            .iter()
            .map(|entry| monthly_expense::ActiveModel {
                config_id: Set(saved.id),
                month: Set(entry.month.clone()),
                expense_amount: Set(entry.expense_amount),
                expense_currency: Set(entry.expense_currency.clone()),
                ..Default::default()
            });
        monthly_expense::Entity::insert_many(rows)
            .exec(txn)
            .await
            .map_err(|e| {
                error!(record_id, "Failed to insert monthly expenses: {}", e);
                e
            })?;
    }

    trace!(
        record_id,
        removed = removed.rows_affected,
        inserted = config.monthly_expenses.len(),
        "Replaced accounting config"
    );
    Ok(())
}

#[async_trait]
impl RecordStore for SeaOrmRecordStore {
    #[instrument(skip(self))]
    async fn list_deposits(&self, filter: &DepositFilter) -> Result<Vec<DepositRecord>> {
        let models = deposit::Entity::find()
            .apply_if(filter.team.clone(), |query, team| {
                query.filter(deposit::Column::Team.eq(team))
            })
            .apply_if(filter.category.clone(), |query, category| {
                query.filter(deposit::Column::Category.eq(category))
            })
            .apply_if(filter.company_name.clone(), |query, company| {
                query.filter(deposit::Column::CompanyName.eq(company))
            })
            .order_by_asc(deposit::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| {
                error!("Failed to list deposits: {}", e);
                e
            })?;

        debug!(count = models.len(), "Listed deposits");
        Ok(models.into_iter().map(DepositRecord::from).collect())
    }

    #[instrument(skip(self, new_deposit), fields(attribution_month = %new_deposit.attribution_month))]
    async fn insert_deposit(&self, new_deposit: NewDeposit) -> Result<DepositRecord> {
        let model = deposit::ActiveModel {
            amount: Set(new_deposit.amount),
            currency: Set(new_deposit.currency),
            category: Set(new_deposit.category),
            project_category: Set(new_deposit.project_category),
            project_name: Set(new_deposit.project_name),
            company_name: Set(new_deposit.company_name),
            team: Set(new_deposit.team),
            attribution_month: Set(new_deposit.attribution_month),
            one_time_expense_amount: Set(new_deposit.one_time_expense_amount),
            one_time_expense_currency: Set(new_deposit.one_time_expense_currency),
            memo: Set(new_deposit.memo),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| {
            error!("Failed to insert deposit: {}", e);
            e
        })?;

        info!(record_id = model.id, "Inserted deposit");
        Ok(model.into())
    }

    #[instrument(skip(self))]
    async fn delete_deposit(&self, record_id: i32) -> Result<()> {
        let txn = self.db.begin().await?;
        let deposit = require_deposit(&txn, record_id).await?;

        if let Some(config) = project_accounting_config::Entity::find()
            .filter(project_accounting_config::Column::DepositId.eq(record_id))
            .one(&txn)
            .await?
        {
            monthly_expense::Entity::delete_many()
                .filter(monthly_expense::Column::ConfigId.eq(config.id))
                .exec(&txn)
                .await?;
            project_accounting_config::Entity::delete_by_id(config.id)
                .exec(&txn)
                .await?;
        }

        deposit::Entity::delete_by_id(deposit.id).exec(&txn).await?;
        txn.commit().await?;

        info!(record_id, "Deleted deposit");
        Ok(())
    }

    #[instrument(skip(self, record_ids), fields(count = record_ids.len()))]
    async fn get_accounting_configs(
        &self,
        record_ids: &[i32],
    ) -> Result<HashMap<i32, ProjectAccountingConfig>> {
        if record_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = project_accounting_config::Entity::find()
            .filter(project_accounting_config::Column::DepositId.is_in(record_ids.iter().copied()))
            .find_with_related(monthly_expense::Entity)
            .all(&self.db)
            .await
            .map_err(|e| {
                error!("Failed to load accounting configs: {}", e);
                e
            })?;

        let configs: HashMap<i32, ProjectAccountingConfig> = rows
            .into_iter()
            .map(|(config, mut expenses)| {
                expenses.sort_by_key(|expense| expense.id);
                (config.deposit_id, config.into_config(expenses))
            })
            .collect();

        trace!(found = configs.len(), "Loaded accounting configs");
        Ok(configs)
    }

    #[instrument(skip(self, config))]
    async fn replace_accounting_configs(
        &self,
        record_ids: &[i32],
        config: &ProjectAccountingConfig,
    ) -> Result<()> {
        let txn = self.db.begin().await?;
        let now = chrono::Local::now().naive_local();
        for &record_id in record_ids {
            // Dropping the transaction on error rolls back earlier records
            require_deposit(&txn, record_id).await?;
            write_config(&txn, record_id, config, now).await?;
        }
        txn.commit().await?;

        info!(
            records = record_ids.len(),
            expenses = config.monthly_expenses.len(),
            "Saved accounting configs"
        );
        Ok(())
    }
}
