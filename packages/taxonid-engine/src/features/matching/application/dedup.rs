//! Names index near-duplicate workaround
//!
//! The names index occasionally holds several entries for one full name that
//! differ only in case. Within a canonical group every candidate is moved to
//! the lowest names index id seen for its case-insensitive name, so the
//! duplicates land in one subgroup and compete for the same released ids.

use std::collections::BTreeSet;

use rustc_hash::FxHashMap;
use tracing::info;

use super::grouper::CanonicalGroup;

/// Collapse near-duplicate names index ids of one canonical group
///
/// Candidates without a names index id are left alone. Returns the number of
/// rewritten candidates.
pub fn deduplicate_name_index_ids(group: &mut CanonicalGroup) -> usize {
    let mut lowest: FxHashMap<String, u64> = FxHashMap::default();
    let mut distinct: BTreeSet<u64> = BTreeSet::new();
    for c in &group.candidates {
        if let Some(nidx) = c.name_index_id {
            distinct.insert(nidx);
            lowest
                .entry(c.name_key())
                .and_modify(|v| *v = (*v).min(nidx))
                .or_insert(nidx);
        }
    }

    let mut rewritten = 0;
    for c in &mut group.candidates {
        let Some(nidx) = c.name_index_id else {
            continue;
        };
        if let Some(&target) = lowest.get(&c.name_key()) {
            if target != nidx {
                c.name_index_id = Some(target);
                rewritten += 1;
            }
        }
    }

    if rewritten > 0 {
        let collapsed: BTreeSet<u64> = group
            .candidates
            .iter()
            .filter_map(|c| c.name_index_id)
            .collect();
        info!(
            canonical = ?group.canonical_name_index_id,
            before = distinct.len(),
            after = collapsed.len(),
            rewritten,
            "Reduced distinct names index ids of canonical group"
        );
    }
    rewritten
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::matching::domain::Candidate;
    use taxonid_storage::{Rank, TaxonomicStatus, UsageRecord};

    fn candidate(id: &str, name: &str, author: &str, nidx: Option<u64>) -> Candidate {
        let mut u = UsageRecord::new(id, name, Rank::Species, TaxonomicStatus::Accepted)
            .with_authorship(author);
        u.canonical_name_index_id = Some(1);
        u.name_index_id = nidx;
        u.into()
    }

    #[test]
    fn test_collapse_to_lowest_id() {
        let mut group = CanonicalGroup {
            canonical_name_index_id: Some(1),
            candidates: vec![
                candidate("a", "Abies alba", "Mill.", Some(12)),
                candidate("b", "Abies Alba", "MILL.", Some(11)),
                candidate("c", "Abies alba", "L.", Some(13)),
            ],
        };
        assert_eq!(deduplicate_name_index_ids(&mut group), 1);
        let nidx: Vec<Option<u64>> = group.candidates.iter().map(|c| c.name_index_id).collect();
        assert_eq!(nidx, vec![Some(11), Some(11), Some(13)]);
    }

    #[test]
    fn test_missing_ids_never_rewritten() {
        let mut group = CanonicalGroup {
            canonical_name_index_id: Some(1),
            candidates: vec![
                candidate("a", "Abies alba", "Mill.", Some(12)),
                candidate("b", "Abies alba", "Mill.", None),
            ],
        };
        assert_eq!(deduplicate_name_index_ids(&mut group), 0);
        assert_eq!(group.candidates[1].name_index_id, None);
    }

    #[test]
    fn test_distinct_names_untouched() {
        let mut group = CanonicalGroup {
            canonical_name_index_id: Some(1),
            candidates: vec![
                candidate("a", "Abies alba", "Mill.", Some(12)),
                candidate("b", "Abies alba", "L.", Some(11)),
            ],
        };
        let before = group.clone();
        assert_eq!(deduplicate_name_index_ids(&mut group), 0);
        assert_eq!(group, before);
    }
}
