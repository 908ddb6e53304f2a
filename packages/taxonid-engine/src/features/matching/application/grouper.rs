//! Lazy grouping of the sorted current usage stream
//!
//! Usages arrive ordered by canonical names index id and then by exact names
//! index id, missing ids last. Each canonical group is emitted as soon as the
//! next key shows up, so only one group is held in memory.

use taxonid_storage::UsageRecord;

use crate::errors::{ReconcileError, Result};
use crate::features::matching::domain::Candidate;

/// Candidates sharing one canonical names index id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalGroup {
    pub canonical_name_index_id: Option<u64>,
    pub candidates: Vec<Candidate>,
}

/// Candidates sharing one exact names index id; the unit of matching
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subgroup {
    pub name_index_id: Option<u64>,
    pub candidates: Vec<Candidate>,
}

fn nulls_last(value: Option<u64>) -> (bool, u64) {
    (value.is_none(), value.unwrap_or(0))
}

impl CanonicalGroup {
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Split by exact names index id, ascending with missing ids last
    ///
    /// Input order is kept within each subgroup.
    pub fn into_subgroups(self) -> Vec<Subgroup> {
        let mut candidates = self.candidates;
        candidates.sort_by_key(|c| nulls_last(c.name_index_id));

        let mut subgroups: Vec<Subgroup> = Vec::new();
        for c in candidates {
            match subgroups.last_mut() {
                Some(sub) if sub.name_index_id == c.name_index_id => sub.candidates.push(c),
                _ => subgroups.push(Subgroup {
                    name_index_id: c.name_index_id,
                    candidates: vec![c],
                }),
            }
        }
        subgroups
    }
}

/// Iterator over canonical groups of a sorted usage stream
///
/// Yields an error and stops when the stream fails or a canonical key goes
/// backwards.
pub struct CandidateGrouper<I> {
    usages: I,
    pending: Option<Candidate>,
    previous_key: Option<Option<u64>>,
    done: bool,
}

impl<I, E> CandidateGrouper<I>
where
    I: Iterator<Item = std::result::Result<UsageRecord, E>>,
    ReconcileError: From<E>,
{
    pub fn new(usages: I) -> Self {
        Self {
            usages,
            pending: None,
            previous_key: None,
            done: false,
        }
    }

    fn pull(&mut self) -> Result<Option<Candidate>> {
        if let Some(c) = self.pending.take() {
            return Ok(Some(c));
        }
        match self.usages.next() {
            Some(row) => Ok(Some(Candidate::from(row?))),
            None => Ok(None),
        }
    }

    fn next_group(&mut self) -> Result<Option<CanonicalGroup>> {
        let Some(first) = self.pull()? else {
            return Ok(None);
        };
        let key = first.canonical_name_index_id;
        if let Some(previous) = self.previous_key {
            if nulls_last(key) < nulls_last(previous) {
                return Err(ReconcileError::UnsortedInput {
                    previous,
                    next: key,
                });
            }
        }
        self.previous_key = Some(key);

        let mut candidates = vec![first];
        while let Some(c) = self.pull()? {
            if c.canonical_name_index_id == key {
                candidates.push(c);
            } else {
                self.pending = Some(c);
                break;
            }
        }
        Ok(Some(CanonicalGroup {
            canonical_name_index_id: key,
            candidates,
        }))
    }
}

impl<I, E> Iterator for CandidateGrouper<I>
where
    I: Iterator<Item = std::result::Result<UsageRecord, E>>,
    ReconcileError: From<E>,
{
    type Item = Result<CanonicalGroup>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_group() {
            Ok(Some(group)) => Some(Ok(group)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
