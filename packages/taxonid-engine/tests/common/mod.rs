//! Shared fixtures for reconciliation tests
#![allow(dead_code)]

use std::collections::BTreeMap;

use taxonid_engine::shared::utils::id_converter;
use taxonid_engine::{IdReconciler, ReconcileConfig, ReconcileJob, ReconciliationResult};
use taxonid_storage::{
    HistoricalUsage, InMemoryReleaseStore, MatchType, Rank, ReleaseInfo, TaxonomicStatus,
    UsageRecord,
};

pub const PROJECT: u32 = 3;

/// Dataset key of the release published in `attempt`
pub fn release_key(attempt: u32) -> u32 {
    1000 + attempt
}

/// Job building the release of `attempt`
pub fn job(attempt: u32) -> ReconcileJob {
    ReconcileJob::new(PROJECT, release_key(attempt), attempt)
}

/// Accepted species usage with an exact names index match
pub fn usage(id: &str, name: &str, authorship: &str, nidx: u64, canonical: u64) -> UsageRecord {
    UsageRecord::new(id, name, Rank::Species, TaxonomicStatus::Accepted)
        .with_authorship(authorship)
        .with_name_index(nidx, canonical)
}

/// The same usage as published under a stable id
pub fn published(id: u64, usage: &UsageRecord) -> UsageRecord {
    UsageRecord {
        usage_id: id_converter::encode(id),
        ..usage.clone()
    }
}

/// Publish the latest release of the project
pub fn publish_latest(store: &InMemoryReleaseStore, attempt: u32, usages: Vec<UsageRecord>) {
    let key = release_key(attempt);
    store
        .add_release(PROJECT, ReleaseInfo::new(key, attempt, true))
        .unwrap();
    store.add_release_usages(key, usages).unwrap();
}

/// Archive the usages of an older release
pub fn publish_archived(store: &InMemoryReleaseStore, attempt: u32, usages: Vec<UsageRecord>) {
    let key = release_key(attempt);
    store
        .add_release(PROJECT, ReleaseInfo::new(key, attempt, true))
        .unwrap();
    let rows = usages
        .into_iter()
        .map(|u| HistoricalUsage::new(u, key, attempt))
        .collect();
    store.add_archived_usages(PROJECT, rows).unwrap();
}

pub fn run(store: &InMemoryReleaseStore, attempt: u32, config: ReconcileConfig) -> ReconciliationResult {
    IdReconciler::new(store, job(attempt), config).run().unwrap()
}

/// Committed id map with decoded stable ids
pub fn id_map(store: &InMemoryReleaseStore) -> BTreeMap<String, u64> {
    store
        .id_map(PROJECT)
        .unwrap()
        .into_iter()
        .map(|(usage, id)| (usage, id_converter::decode(&id).unwrap()))
        .collect()
}

pub fn with_match(mut usage: UsageRecord, match_type: MatchType) -> UsageRecord {
    usage.match_type = match_type;
    usage
}
