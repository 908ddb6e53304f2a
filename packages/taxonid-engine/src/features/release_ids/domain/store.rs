//! In-memory index of released ids
//!
//! Ids are looked up by exact names index id during matching and removed once
//! claimed. Whatever remains after a run was not carried forward.

use std::collections::{BTreeMap, BTreeSet};

use rustc_hash::FxHashMap;
use tracing::{debug, info};

use super::released_id::ReleasedId;
use crate::errors::{ReconcileError, Result};

#[derive(Debug, Default)]
pub struct ReleaseIdStore {
    /// names index id -> released ids, ascending by id
    by_name_index: FxHashMap<u64, Vec<ReleasedId>>,
    /// id -> names index id
    index: FxHashMap<u64, u64>,
    max_id: u64,
    max_attempt: u32,
}

impl ReleaseIdStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a released id unless the id is already known
    ///
    /// Rows are fed newest release first, so the first occurrence wins.
    /// Returns `false` for ignored duplicates.
    pub fn add(&mut self, rid: ReleasedId) -> bool {
        if self.index.contains_key(&rid.id) {
            return false;
        }
        self.max_id = self.max_id.max(rid.id);
        self.max_attempt = self.max_attempt.max(rid.source_attempt);
        self.index.insert(rid.id, rid.name_index_id);

        let ids = self.by_name_index.entry(rid.name_index_id).or_default();
        let pos = ids.partition_point(|r| r.id < rid.id);
        ids.insert(pos, rid);
        true
    }

    /// Unclaimed released ids sharing a names index id, ascending by id
    pub fn by_name_index_id(&self, name_index_id: u64) -> &[ReleasedId] {
        self.by_name_index
            .get(&name_index_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Claim an id; claiming an unknown or already claimed id is a bug
    pub fn remove(&mut self, id: u64) -> Result<ReleasedId> {
        let name_index_id = self.index.remove(&id).ok_or_else(|| {
            ReconcileError::invariant(format!("released id {} claimed twice or never loaded", id))
        })?;
        let ids = self.by_name_index.get_mut(&name_index_id).ok_or_else(|| {
            ReconcileError::invariant(format!("names index {} lost released id {}", name_index_id, id))
        })?;
        let pos = ids
            .binary_search_by_key(&id, |r| r.id)
            .map_err(|_| ReconcileError::invariant(format!("released id {} not indexed", id)))?;
        let rid = ids.remove(pos);
        if ids.is_empty() {
            self.by_name_index.remove(&name_index_id);
        }
        Ok(rid)
    }

    pub fn contains_id(&self, id: u64) -> bool {
        self.index.contains_key(&id)
    }

    /// Largest id ever added, claimed or not
    pub fn max_id(&self) -> u64 {
        self.max_id
    }

    /// Latest attempt any loaded id was published in, 0 when empty
    pub fn max_attempt(&self) -> u32 {
        self.max_attempt
    }

    /// Number of unclaimed ids from the latest attempt
    pub fn max_attempt_id_count(&self) -> usize {
        self.iter()
            .filter(|r| r.source_attempt == self.max_attempt)
            .count()
    }

    /// Unclaimed ids from the latest attempt
    pub fn max_attempt_ids(&self) -> BTreeSet<u64> {
        self.iter()
            .filter(|r| r.source_attempt == self.max_attempt)
            .map(|r| r.id)
            .collect()
    }

    /// Unclaimed released id by id
    pub fn get(&self, id: u64) -> Option<&ReleasedId> {
        let name_index_id = self.index.get(&id)?;
        let ids = self.by_name_index.get(name_index_id)?;
        ids.binary_search_by_key(&id, |r| r.id)
            .ok()
            .map(|pos| &ids[pos])
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Unclaimed released ids in no particular order
    pub fn iter(&self) -> impl Iterator<Item = &ReleasedId> + '_ {
        self.by_name_index.values().flatten()
    }

    pub fn log_summary(&self) {
        let mut per_attempt: BTreeMap<u32, usize> = BTreeMap::new();
        for rid in self.iter() {
            *per_attempt.entry(rid.source_attempt).or_default() += 1;
        }
        info!(
            ids = self.len(),
            names = self.by_name_index.len(),
            max_id = self.max_id,
            max_attempt = self.max_attempt,
            "Release id store loaded"
        );
        for (attempt, count) in per_attempt {
            debug!(attempt, count, "Released ids per attempt");
        }
    }
}
