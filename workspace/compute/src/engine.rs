use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use common::AccountingView;
use model::accounting::ProjectAccountingConfig;
use model::deposit::{DepositRecord, NewDeposit, ProjectKey};
use tracing::{debug, info, instrument};

use crate::aggregate::{AggregationOptions, MonthlyAggregate, aggregate_monthly};
use crate::cache::AccountingConfigCache;
use crate::error::{ComputeError, Result};
use crate::grouping::{ExclusionSet, group_projects};
use crate::status::{AccountingStatus, classify_status};
use crate::store::{DepositFilter, RecordStore};
use crate::validation::validate_new_deposit;

/// Accounting state of one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectStatus {
    pub key: ProjectKey,
    pub record_ids: Vec<i32>,
    pub status: AccountingStatus,
}

/// Projects and grouping of one listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectOverview {
    pub projects: Vec<ProjectStatus>,
    pub missing_required_fields: Vec<i32>,
}

/// Entry point used by the service: reads a snapshot from the store, then
/// groups, projects and aggregates it.
pub struct ProjectionEngine {
    store: Arc<dyn RecordStore>,
    cache: AccountingConfigCache,
    eligible_categories: HashSet<String>,
}

impl fmt::Debug for ProjectionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectionEngine")
            .field("eligible_categories", &self.eligible_categories)
            .field("cached_configs", &self.cache.len())
            .finish()
    }
}

impl ProjectionEngine {
    pub fn new<I, S>(store: Arc<dyn RecordStore>, eligible_categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_cache(store, AccountingConfigCache::with_defaults(), eligible_categories)
    }

    pub fn with_cache<I, S>(
        store: Arc<dyn RecordStore>,
        cache: AccountingConfigCache,
        eligible_categories: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            store,
            cache,
            eligible_categories: eligible_categories.into_iter().map(Into::into).collect(),
        }
    }

    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    pub fn cache(&self) -> &AccountingConfigCache {
        &self.cache
    }

    pub fn eligible_categories(&self) -> &HashSet<String> {
        &self.eligible_categories
    }

    /// Calendar-month series of every deposit matching `filter`.
    ///
    /// The default view never needs configurations, so none are read for it.
    #[instrument(skip(self, excluded), fields(excluded = excluded.len()))]
    pub async fn monthly_series(
        &self,
        filter: &DepositFilter,
        view: AccountingView,
        excluded: &ExclusionSet,
    ) -> Result<MonthlyAggregate> {
        let records = self.store.list_deposits(filter).await?;

        let configs = match view {
            AccountingView::Default => HashMap::new(),
            AccountingView::Management | AccountingView::Real => {
                let grouping = group_projects(&records, excluded);
                self.cache
                    .configs_for_projects(self.store.as_ref(), &grouping)
                    .await?
            }
        };

        let options = AggregationOptions {
            eligible_categories: self.eligible_categories.clone(),
            excluded: excluded.clone(),
        };
        let aggregate = aggregate_monthly(&records, &configs, view, &options);

        info!(
            %view,
            months = aggregate.months.len(),
            warnings = aggregate.warnings.len(),
            "Computed monthly series"
        );
        Ok(aggregate)
    }

    /// Accounting status of every project among the deposits matching `filter`.
    #[instrument(skip(self, excluded), fields(excluded = excluded.len()))]
    pub async fn project_statuses(
        &self,
        filter: &DepositFilter,
        excluded: &ExclusionSet,
    ) -> Result<ProjectOverview> {
        let records = self.store.list_deposits(filter).await?;
        let grouping = group_projects(&records, excluded);
        let configs = self
            .cache
            .configs_for_projects(self.store.as_ref(), &grouping)
            .await?;

        let projects = grouping
            .projects
            .iter()
            .map(|project| {
                let status = configs
                    .get(&project.key)
                    .map(classify_status)
                    .unwrap_or(AccountingStatus::NotEntered);
                ProjectStatus {
                    key: project.key.clone(),
                    record_ids: project.record_ids(),
                    status,
                }
            })
            .collect::<Vec<_>>();

        debug!(projects = projects.len(), "Classified projects");
        Ok(ProjectOverview {
            projects,
            missing_required_fields: grouping.missing_required_fields,
        })
    }

    /// Saves one configuration for every record of a project.
    ///
    /// `record_ids` must name exactly the records sharing one project key.
    /// A list covering only part of a project is rejected, since the project
    /// is read through its first record and would otherwise ignore the save.
    #[instrument(skip(self, config))]
    pub async fn save_project_config(
        &self,
        record_ids: &[i32],
        config: &ProjectAccountingConfig,
    ) -> Result<()> {
        if record_ids.is_empty() {
            return Err(ComputeError::Validation("record_ids must not be empty".to_string()));
        }

        let records = self.store.list_deposits(&DepositFilter::default()).await?;
        let by_id: HashMap<i32, &DepositRecord> = records.iter().map(|r| (r.id, r)).collect();

        let mut key: Option<ProjectKey> = None;
        for id in record_ids {
            let record = by_id
                .get(id)
                .ok_or_else(|| ComputeError::NotFound(format!("deposit {}", id)))?;
            let record_key = record.project_key().ok_or_else(|| {
                ComputeError::Validation(format!("deposit {} has no complete project key", id))
            })?;
            match &key {
                Some(existing) if existing != &record_key => {
                    return Err(ComputeError::Validation(format!(
                        "deposit {} belongs to project {}, expected {}",
                        id, record_key, existing
                    )));
                }
                Some(_) => {}
                None => key = Some(record_key),
            }
        }
        let key = key.ok_or_else(|| ComputeError::Runtime("no project key resolved".to_string()))?;

        let grouping = group_projects(&records, &ExclusionSet::new());
        let mut project_ids = grouping
            .project_for(&key)
            .map(|project| project.record_ids())
            .unwrap_or_default();
        project_ids.sort_unstable();
        let mut requested = record_ids.to_vec();
        requested.sort_unstable();
        requested.dedup();
        if requested != project_ids {
            return Err(ComputeError::Validation(format!(
                "project {} has records {:?}, got {:?}",
                key, project_ids, requested
            )));
        }

        self.cache
            .save_records(self.store.as_ref(), &project_ids, config)
            .await?;
        info!(records = project_ids.len(), "Saved project accounting config");
        Ok(())
    }

    /// Stored configuration of one record.
    pub async fn accounting_config(&self, record_id: i32) -> Result<Option<ProjectAccountingConfig>> {
        let mut configs = self.cache.get_many(self.store.as_ref(), &[record_id]).await?;
        Ok(configs.remove(&record_id))
    }

    /// Validates and stores a new deposit.
    #[instrument(skip(self, deposit))]
    pub async fn add_deposit(&self, deposit: NewDeposit) -> Result<DepositRecord> {
        validate_new_deposit(&deposit)?;
        self.store.insert_deposit(deposit).await
    }

    /// Lists deposits matching `filter`.
    pub async fn deposits(&self, filter: &DepositFilter) -> Result<Vec<DepositRecord>> {
        self.store.list_deposits(filter).await
    }

    /// Removes a deposit and forgets its cached configuration.
    pub async fn remove_deposit(&self, record_id: i32) -> Result<()> {
        self.store.delete_deposit(record_id).await?;
        self.cache.invalidate(&[record_id]);
        Ok(())
    }
}
