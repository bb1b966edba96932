use std::collections::{BTreeMap, HashSet};

use model::deposit::{DepositRecord, ProjectKey};
use tracing::{debug, instrument};

/// Record ids the user has pulled out of aggregation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet(HashSet<i32>);

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, record_id: i32) -> bool {
        self.0.contains(&record_id)
    }

    pub fn insert(&mut self, record_id: i32) -> bool {
        self.0.insert(record_id)
    }

    pub fn remove(&mut self, record_id: i32) -> bool {
        self.0.remove(&record_id)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl FromIterator<i32> for ExclusionSet {
    fn from_iter<I: IntoIterator<Item = i32>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Deposits accounted for together because they share a [`ProjectKey`].
#[derive(Debug, Clone, PartialEq)]
pub struct AccountingProject {
    pub key: ProjectKey,
    /// Records of the project, in input order.
    pub records: Vec<DepositRecord>,
}

impl AccountingProject {
    pub fn record_ids(&self) -> Vec<i32> {
        self.records.iter().map(|r| r.id).collect()
    }

    /// Every record of a project carries the same configuration, so it is read
    /// through the first one.
    pub fn config_record_id(&self) -> Option<i32> {
        self.records.first().map(|r| r.id)
    }
}

/// Result of [`group_projects`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectGrouping {
    /// Projects ordered by key.
    pub projects: Vec<AccountingProject>,
    /// Ids of included records lacking one of the four key fields.
    pub missing_required_fields: Vec<i32>,
}

impl ProjectGrouping {
    pub fn project_for(&self, key: &ProjectKey) -> Option<&AccountingProject> {
        self.projects
            .binary_search_by(|project| project.key.cmp(key))
            .ok()
            .map(|index| &self.projects[index])
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}

/// Partitions deposits into accounting projects.
///
/// Excluded records are dropped first. Records without a complete project key
/// are not grouped and are reported in `missing_required_fields`.
#[instrument(skip(records, excluded), fields(records = records.len(), excluded = excluded.len()))]
pub fn group_projects(records: &[DepositRecord], excluded: &ExclusionSet) -> ProjectGrouping {
    let mut groups: BTreeMap<ProjectKey, Vec<DepositRecord>> = BTreeMap::new();
    let mut missing_required_fields = Vec::new();

    for record in records.iter().filter(|r| !excluded.contains(r.id)) {
        match record.project_key() {
            Some(key) => groups.entry(key).or_default().push(record.clone()),
            None => missing_required_fields.push(record.id),
        }
    }

    let projects: Vec<AccountingProject> = groups
        .into_iter()
        .map(|(key, records)| AccountingProject { key, records })
        .collect();

    debug!(
        projects = projects.len(),
        missing = missing_required_fields.len(),
        "Grouped deposits into projects"
    );

    ProjectGrouping {
        projects,
        missing_required_fields,
    }
}
