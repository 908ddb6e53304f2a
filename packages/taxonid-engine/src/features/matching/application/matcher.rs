//! Greedy conflict-free assignment within one subgroup

use rustc_hash::FxHashSet;
use tracing::trace;

use crate::errors::Result;
use crate::features::matching::domain::{score, Candidate, IdSequence};
use crate::features::release_ids::domain::{ReleaseIdStore, ReleasedId};

/// Stable id given to one candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub candidate: Candidate,
    pub stable_id: u64,
    /// The released id that was carried forward, `None` for new ids
    pub claimed: Option<ReleasedId>,
}

impl Assignment {
    pub fn is_created(&self) -> bool {
        self.claimed.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ScoredPair {
    score: u32,
    candidate: usize,
    released: usize,
}

/// Pick candidate/released index pairs greedily by descending score
///
/// Ties go to the earlier candidate, then to the lower released id. Pairs
/// scoring zero are never picked, and neither side is picked twice.
pub fn greedy_pairs(candidates: &[Candidate], released: &[ReleasedId]) -> Vec<(usize, usize)> {
    let mut pairs = Vec::with_capacity(candidates.len() * released.len());
    for (ci, c) in candidates.iter().enumerate() {
        for (ri, r) in released.iter().enumerate() {
            let score = score(c, r);
            if score > 0 {
                pairs.push(ScoredPair {
                    score,
                    candidate: ci,
                    released: ri,
                });
            }
        }
    }
    pairs.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then(a.candidate.cmp(&b.candidate))
            .then(released[a.released].id.cmp(&released[b.released].id))
    });

    let mut open_candidates = vec![true; candidates.len()];
    let mut available: FxHashSet<u64> = released.iter().map(|r| r.id).collect();
    let limit = candidates.len().min(released.len());

    let mut picked = Vec::with_capacity(limit);
    for pair in pairs {
        if picked.len() == limit {
            break;
        }
        if open_candidates[pair.candidate] && available.remove(&released[pair.released].id) {
            open_candidates[pair.candidate] = false;
            picked.push((pair.candidate, pair.released));
        }
    }
    picked
}

/// Assigns stable ids to the candidates of one subgroup
///
/// Claimed ids are removed from the store, unmatched candidates draw from the
/// sequence.
pub struct SubgroupMatcher<'a> {
    store: &'a mut ReleaseIdStore,
    sequence: &'a mut IdSequence,
}

impl<'a> SubgroupMatcher<'a> {
    pub fn new(store: &'a mut ReleaseIdStore, sequence: &'a mut IdSequence) -> Self {
        Self { store, sequence }
    }

    /// Match candidates sharing `name_index_id`; output keeps candidate order
    pub fn assign(&mut self, name_index_id: u64, candidates: Vec<Candidate>) -> Result<Vec<Assignment>> {
        let released = self.store.by_name_index_id(name_index_id).to_vec();
        let mut claims: Vec<Option<u64>> = vec![None; candidates.len()];
        for (ci, ri) in greedy_pairs(&candidates, &released) {
            claims[ci] = Some(released[ri].id);
        }

        let mut assignments = Vec::with_capacity(candidates.len());
        for (candidate, claim) in candidates.into_iter().zip(claims) {
            let assignment = match claim {
                Some(id) => {
                    let rid = self.store.remove(id)?;
                    Assignment {
                        candidate,
                        stable_id: id,
                        claimed: Some(rid),
                    }
                }
                None => Assignment {
                    candidate,
                    stable_id: self.sequence.next(),
                    claimed: None,
                },
            };
            trace!(
                usage = %assignment.candidate.usage_id,
                id = assignment.stable_id,
                created = assignment.is_created(),
                "Assigned stable id"
            );
            assignments.push(assignment);
        }
        Ok(assignments)
    }
}
