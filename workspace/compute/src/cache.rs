use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use cached::{Cached, TimedSizedCache};
use model::accounting::ProjectAccountingConfig;
use model::deposit::ProjectKey;
use tracing::{debug, instrument, trace};

use crate::error::Result;
use crate::grouping::{AccountingProject, ProjectGrouping};
use crate::store::RecordStore;
use crate::validation::validate_config;

type Entry = Option<ProjectAccountingConfig>;

/// Cached entries plus the bookkeeping that keeps a slow read from caching a
/// value older than a concurrent invalidation.
struct CacheState<C> {
    entries: C,
    /// Bumped on every invalidation and clear.
    epoch: u64,
    /// Epoch of the last invalidation of each id.
    invalidated_at: HashMap<i32, u64>,
    cleared_at: u64,
}

impl<C> CacheState<C> {
    fn invalidated_since(&self, id: i32, epoch: u64) -> bool {
        self.cleared_at > epoch
            || self
                .invalidated_at
                .get(&id)
                .is_some_and(|&invalidated| invalidated > epoch)
    }
}

/// Read-through cache of accounting configurations keyed by record id.
///
/// Records known to have no configuration are cached as `None`, so they are
/// not fetched again either. Every save made through the cache invalidates the
/// ids it wrote. Writes that bypass the cache need an explicit
/// [`invalidate`](Self::invalidate) or [`clear`](Self::clear).
///
/// Clones share the same underlying store.
pub struct AccountingConfigCache<C: Cached<i32, Entry> = TimedSizedCache<i32, Entry>> {
    state: Arc<Mutex<CacheState<C>>>,
}

impl<C: Cached<i32, Entry>> Clone for AccountingConfigCache<C> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<C: Cached<i32, Entry> + Send> AccountingConfigCache<C> {
    /// Creates a cache on top of a custom cache store.
    pub fn new_with_store(cache_store: C) -> Self {
        Self {
            state: Arc::new(Mutex::new(CacheState {
                entries: cache_store,
                epoch: 0,
                invalidated_at: HashMap::new(),
                cleared_at: 0,
            })),
        }
    }

    /// Removes every cached entry.
    pub fn clear(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.epoch += 1;
            state.cleared_at = state.epoch;
            state.invalidated_at.clear();
            state.entries.cache_clear();
        }
    }

    /// Number of cached record ids, absent configurations included.
    pub fn len(&self) -> usize {
        if let Ok(state) = self.state.lock() {
            state.entries.cache_size()
        } else {
            0
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forgets the entries of `record_ids`. Reads already in flight will not
    /// cache what they fetched for these ids.
    pub fn invalidate(&self, record_ids: &[i32]) {
        if let Ok(mut state) = self.state.lock() {
            state.epoch += 1;
            let epoch = state.epoch;
            for &id in record_ids {
                state.entries.cache_remove(&id);
                state.invalidated_at.insert(id, epoch);
            }
        }
    }

    /// Returns the configurations of `record_ids`. Ids without a configuration
    /// are absent from the result. Every id missing from the cache is fetched
    /// in a single batched store call.
    #[instrument(skip(self, store, record_ids), fields(count = record_ids.len()))]
    pub async fn get_many(
        &self,
        store: &dyn RecordStore,
        record_ids: &[i32],
    ) -> Result<HashMap<i32, ProjectAccountingConfig>> {
        let mut found = HashMap::new();
        let mut misses = Vec::new();
        let read_epoch = {
            let mut state = self.state.lock()?;
            for &id in record_ids {
                match state.entries.cache_get(&id) {
                    Some(Some(config)) => {
                        found.insert(id, config.clone());
                    }
                    Some(None) => {}
                    None => misses.push(id),
                }
            }
            state.epoch
        };

        if misses.is_empty() {
            trace!("All configs served from cache");
            return Ok(found);
        }

        misses.sort_unstable();
        misses.dedup();
        debug!(misses = misses.len(), "Fetching configs missing from cache");
        let mut fetched = store.get_accounting_configs(&misses).await?;

        let mut state = self.state.lock()?;
        for id in misses {
            let config = fetched.remove(&id);
            if let Some(config) = &config {
                found.insert(id, config.clone());
            }
            if state.invalidated_since(id, read_epoch) {
                trace!(id, "Not caching a config invalidated during the read");
                continue;
            }
            state.entries.cache_set(id, config);
        }
        Ok(found)
    }

    /// Returns the configuration of each project that has one, read through
    /// the project's first record.
    #[instrument(skip(self, store, grouping), fields(projects = grouping.projects.len()))]
    pub async fn configs_for_projects(
        &self,
        store: &dyn RecordStore,
        grouping: &ProjectGrouping,
    ) -> Result<HashMap<ProjectKey, ProjectAccountingConfig>> {
        let ids: Vec<i32> = grouping
            .projects
            .iter()
            .filter_map(AccountingProject::config_record_id)
            .collect();
        let mut configs = self.get_many(store, &ids).await?;

        Ok(grouping
            .projects
            .iter()
            .filter_map(|project| {
                let id = project.config_record_id()?;
                configs.remove(&id).map(|config| (project.key.clone(), config))
            })
            .collect())
    }

    /// Saves `config` for every record of `project`.
    pub async fn save_project(
        &self,
        store: &dyn RecordStore,
        project: &AccountingProject,
        config: &ProjectAccountingConfig,
    ) -> Result<()> {
        self.save_records(store, &project.record_ids(), config).await
    }

    /// Saves `config` for each of `record_ids` in one batch, replacing
    /// whatever they had, and invalidates them. An invalid config or a failed
    /// batch leaves every record unchanged.
    #[instrument(skip(self, store, config))]
    pub async fn save_records(
        &self,
        store: &dyn RecordStore,
        record_ids: &[i32],
        config: &ProjectAccountingConfig,
    ) -> Result<()> {
        validate_config(config)?;

        let result = store.replace_accounting_configs(record_ids, config).await;
        self.invalidate(record_ids);
        result
    }
}

impl AccountingConfigCache<TimedSizedCache<i32, Entry>> {
    /// Creates a cache holding at most `capacity` record ids, each for at
    /// most `ttl_secs` seconds.
    pub fn new(capacity: usize, ttl_secs: u64) -> Self {
        Self::new_with_store(TimedSizedCache::with_size_and_lifespan(
            capacity.max(1),
            ttl_secs.max(1),
        ))
    }

    /// Creates a cache with default settings:
    /// - Cache size: 1000 entries
    /// - TTL: 5 minutes
    pub fn with_defaults() -> Self {
        Self::new(1000, 300)
    }
}
