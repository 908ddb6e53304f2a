//! In-Memory Release Store (for testing)
//!
//! Simple HashMap-based implementation for unit tests and fixtures.
//! NOT for production use.
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::domain::models::{HistoricalUsage, IdReportType, ReleaseInfo, UsageRecord};
use crate::domain::ports::{
    HistoryStream, IdMapWriter, IdReportSink, ReleaseHistory, UsageSource, UsageStream,
};
use crate::{Result, StorageError};

#[derive(Debug, Default)]
struct State {
    releases: Vec<(u32, ReleaseInfo)>,
    release_usages: HashMap<u32, Vec<UsageRecord>>,
    archived: HashMap<u32, Vec<HistoricalUsage>>,
    project_usages: HashMap<u32, Vec<UsageRecord>>,
    id_map: HashMap<u32, BTreeMap<String, String>>,
    pending_mappings: Vec<(u32, String, String)>,
    id_map_commits: usize,
    reports: Vec<(u32, IdReportType, u64)>,
    pending_reports: Vec<(u32, IdReportType, u64)>,
}

#[derive(Clone, Default)]
pub struct InMemoryReleaseStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryReleaseStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>> {
        self.state
            .read()
            .map_err(|_| StorageError::database("in-memory store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>> {
        self.state
            .write()
            .map_err(|_| StorageError::database("in-memory store lock poisoned"))
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // Fixture setup
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    pub fn add_release(&self, project_key: u32, release: ReleaseInfo) -> Result<()> {
        self.write()?.releases.push((project_key, release));
        Ok(())
    }

    pub fn add_release_usages(&self, dataset_key: u32, usages: Vec<UsageRecord>) -> Result<()> {
        self.write()?
            .release_usages
            .entry(dataset_key)
            .or_default()
            .extend(usages);
        Ok(())
    }

    pub fn add_archived_usages(&self, project_key: u32, usages: Vec<HistoricalUsage>) -> Result<()> {
        self.write()?
            .archived
            .entry(project_key)
            .or_default()
            .extend(usages);
        Ok(())
    }

    /// Replace the live usages of a project; order does not matter
    pub fn set_project_usages(&self, project_key: u32, usages: Vec<UsageRecord>) -> Result<()> {
        self.write()?.project_usages.insert(project_key, usages);
        Ok(())
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // Inspection
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Committed id map of a project
    pub fn id_map(&self, project_key: u32) -> Result<BTreeMap<String, String>> {
        Ok(self
            .read()?
            .id_map
            .get(&project_key)
            .cloned()
            .unwrap_or_default())
    }

    /// Number of id map batches committed so far
    pub fn id_map_commits(&self) -> Result<usize> {
        Ok(self.read()?.id_map_commits)
    }

    /// Number of mappings written but not yet committed
    pub fn pending_mappings(&self) -> Result<usize> {
        Ok(self.read()?.pending_mappings.len())
    }

    /// Committed report entries of a release
    pub fn id_reports(&self, dataset_key: u32) -> Result<Vec<(IdReportType, u64)>> {
        Ok(self
            .read()?
            .reports
            .iter()
            .filter(|(key, _, _)| *key == dataset_key)
            .map(|(_, kind, id)| (*kind, *id))
            .collect())
    }
}

fn nulls_last(value: Option<u64>) -> (bool, u64) {
    (value.is_none(), value.unwrap_or(0))
}

impl UsageSource for InMemoryReleaseStore {
    fn current_usages(&self, project_key: u32) -> Result<UsageStream<'_>> {
        let mut usages = self
            .read()?
            .project_usages
            .get(&project_key)
            .cloned()
            .unwrap_or_default();
        // stable sort keeps insertion order within a subgroup
        usages.sort_by_key(|u| {
            (
                nulls_last(u.canonical_name_index_id),
                nulls_last(u.name_index_id),
            )
        });
        Ok(Box::new(usages.into_iter().map(Ok)))
    }
}

impl ReleaseHistory for InMemoryReleaseStore {
    fn latest_release(&self, project_key: u32) -> Result<Option<u32>> {
        Ok(self
            .read()?
            .releases
            .iter()
            .filter(|(key, r)| *key == project_key && r.public && r.attempt.is_some())
            .max_by_key(|(_, r)| r.attempt)
            .map(|(_, r)| r.dataset_key))
    }

    fn release_attempts(&self, project_key: u32) -> Result<Vec<ReleaseInfo>> {
        Ok(self
            .read()?
            .releases
            .iter()
            .filter(|(key, _)| *key == project_key)
            .map(|(_, r)| *r)
            .collect())
    }

    fn release_usages(&self, dataset_key: u32) -> Result<HistoryStream<'_>> {
        let state = self.read()?;
        let attempt = state
            .releases
            .iter()
            .find(|(_, r)| r.dataset_key == dataset_key)
            .and_then(|(_, r)| r.attempt)
            .ok_or_else(|| StorageError::release_not_found(dataset_key))?;
        let rows: Vec<HistoricalUsage> = state
            .release_usages
            .get(&dataset_key)
            .map(|usages| {
                usages
                    .iter()
                    .cloned()
                    .map(|u| HistoricalUsage::new(u, dataset_key, attempt))
                    .collect()
            })
            .unwrap_or_default();
        Ok(Box::new(rows.into_iter().map(Ok)))
    }

    fn archived_usages(&self, project_key: u32) -> Result<HistoryStream<'_>> {
        let mut rows = self
            .read()?
            .archived
            .get(&project_key)
            .cloned()
            .unwrap_or_default();
        rows.sort_by(|a, b| b.attempt.cmp(&a.attempt));
        Ok(Box::new(rows.into_iter().map(Ok)))
    }
}

impl IdMapWriter for InMemoryReleaseStore {
    fn reset(&self, project_key: u32) -> Result<()> {
        let mut state = self.write()?;
        state.id_map.remove(&project_key);
        state.pending_mappings.retain(|(key, _, _)| *key != project_key);
        Ok(())
    }

    fn map_usage(&self, project_key: u32, usage_id: &str, stable_id: &str) -> Result<()> {
        self.write()?
            .pending_mappings
            .push((project_key, usage_id.to_string(), stable_id.to_string()));
        Ok(())
    }

    fn commit(&self, project_key: u32) -> Result<()> {
        let mut state = self.write()?;
        let (batch, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut state.pending_mappings)
            .into_iter()
            .partition(|(key, _, _)| *key == project_key);
        state.pending_mappings = rest;
        for (project_key, usage_id, stable_id) in batch {
            state
                .id_map
                .entry(project_key)
                .or_default()
                .insert(usage_id, stable_id);
        }
        state.id_map_commits += 1;
        Ok(())
    }
}

impl IdReportSink for InMemoryReleaseStore {
    fn reset_reports(&self, dataset_key: u32) -> Result<()> {
        let mut state = self.write()?;
        state.reports.retain(|(key, _, _)| *key != dataset_key);
        state.pending_reports.retain(|(key, _, _)| *key != dataset_key);
        Ok(())
    }

    fn record(&self, dataset_key: u32, kind: IdReportType, id: u64) -> Result<()> {
        self.write()?.pending_reports.push((dataset_key, kind, id));
        Ok(())
    }

    fn commit_reports(&self, dataset_key: u32) -> Result<()> {
        let mut state = self.write()?;
        let (batch, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut state.pending_reports)
            .into_iter()
            .partition(|(key, _, _)| *key == dataset_key);
        state.pending_reports = rest;
        state.reports.extend(batch);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Rank, TaxonomicStatus};

    fn usage(id: &str, canonical: Option<u64>, nidx: Option<u64>) -> UsageRecord {
        let mut u = UsageRecord::new(id, "Abies alba", Rank::Species, TaxonomicStatus::Accepted);
        u.canonical_name_index_id = canonical;
        u.name_index_id = nidx;
        u
    }

    #[test]
    fn test_current_usages_sorted_nulls_last() {
        let store = InMemoryReleaseStore::new();
        store
            .set_project_usages(
                3,
                vec![
                    usage("a", None, None),
                    usage("b", Some(5), None),
                    usage("c", Some(5), Some(9)),
                    usage("d", Some(2), Some(4)),
                    usage("e", Some(5), Some(7)),
                ],
            )
            .unwrap();

        let ids: Vec<String> = store
            .current_usages(3)
            .unwrap()
            .map(|u| u.unwrap().usage_id)
            .collect();
        assert_eq!(ids, vec!["d", "e", "c", "b", "a"]);
    }

    #[test]
    fn test_latest_public_release() {
        let store = InMemoryReleaseStore::new();
        store.add_release(3, ReleaseInfo::new(100, 1, true)).unwrap();
        store.add_release(3, ReleaseInfo::new(101, 2, true)).unwrap();
        store.add_release(3, ReleaseInfo::new(102, 3, false)).unwrap();
        store.add_release(4, ReleaseInfo::new(200, 9, true)).unwrap();

        assert_eq!(store.latest_release(3).unwrap(), Some(101));
        assert_eq!(store.latest_release(5).unwrap(), None);
        assert_eq!(store.release_attempts(3).unwrap().len(), 3);
    }

    #[test]
    fn test_release_usages_unknown_dataset() {
        let store = InMemoryReleaseStore::new();
        assert!(store.release_usages(42).is_err());
    }

    #[test]
    fn test_id_map_commit_and_reset() {
        let store = InMemoryReleaseStore::new();
        store.map_usage(3, "u1", "B").unwrap();
        assert!(store.id_map(3).unwrap().is_empty());
        assert_eq!(store.pending_mappings().unwrap(), 1);

        store.map_usage(4, "v1", "C").unwrap();
        store.commit(3).unwrap();
        assert_eq!(store.id_map(3).unwrap().get("u1").map(String::as_str), Some("B"));
        assert!(store.id_map(4).unwrap().is_empty());
        assert_eq!(store.pending_mappings().unwrap(), 1);
        assert_eq!(store.id_map_commits().unwrap(), 1);

        store.map_usage(3, "u2", "C").unwrap();
        store.reset(3).unwrap();
        assert!(store.id_map(3).unwrap().is_empty());
        assert_eq!(store.pending_mappings().unwrap(), 1);
    }

    #[test]
    fn test_reports() {
        let store = InMemoryReleaseStore::new();
        store.record(9, IdReportType::Created, 12).unwrap();
        store.record(9, IdReportType::Deleted, 4).unwrap();
        assert!(store.id_reports(9).unwrap().is_empty());

        store.commit_reports(9).unwrap();
        assert_eq!(
            store.id_reports(9).unwrap(),
            vec![(IdReportType::Created, 12), (IdReportType::Deleted, 4)]
        );
    }

    #[test]
    fn test_reset_reports_keeps_other_releases() {
        let store = InMemoryReleaseStore::new();
        store.record(9, IdReportType::Created, 12).unwrap();
        store.record(8, IdReportType::Created, 7).unwrap();
        store.commit_reports(9).unwrap();
        store.commit_reports(8).unwrap();
        store.record(9, IdReportType::Deleted, 4).unwrap();

        store.reset_reports(9).unwrap();
        store.commit_reports(9).unwrap();
        assert!(store.id_reports(9).unwrap().is_empty());
        assert_eq!(store.id_reports(8).unwrap(), vec![(IdReportType::Created, 7)]);
    }
}
