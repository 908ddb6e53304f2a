//! Property-based tests for reconciliation
//!
//! Invariants that hold for any released population and any current usages:
//! - Uniqueness: no stable id is handed out twice
//! - Conservation: every matched usage is created, reused or resurrected
//! - Misapplied isolation: misapplied names only inherit misapplied ids
//! - Stability: reruns produce the same mapping

mod common;

use std::collections::{BTreeMap, BTreeSet};

use common::*;
use proptest::prelude::*;
use taxonid_engine::ReconcileConfig;
use taxonid_storage::{InMemoryReleaseStore, MatchType, Rank, TaxonomicStatus, UsageRecord};

const RANKS: [Rank; 3] = [Rank::Species, Rank::Subspecies, Rank::Variety];
const STATUSES: [TaxonomicStatus; 3] = [
    TaxonomicStatus::Accepted,
    TaxonomicStatus::Synonym,
    TaxonomicStatus::Misapplied,
];
const AUTHORS: [&str; 3] = ["L.", "Mill.", "DC."];

prop_compose! {
    fn arb_usage()(
        nidx in 1u64..5,
        rank in 0usize..3,
        status in 0usize..3,
        author in 0usize..3,
        exact in any::<bool>(),
    ) -> UsageRecord {
        let match_type = if exact { MatchType::Exact } else { MatchType::Variant };
        UsageRecord::new("", "Abies alba", RANKS[rank], STATUSES[status])
            .with_authorship(AUTHORS[author])
            .with_name_index(nidx, 1 + nidx / 3)
            .with_match_type(match_type)
    }
}

fn fixture(released: &[UsageRecord], current: &[UsageRecord]) -> InMemoryReleaseStore {
    let store = InMemoryReleaseStore::new();
    let published_usages = released
        .iter()
        .enumerate()
        .map(|(i, u)| published(100 + i as u64, u))
        .collect();
    publish_latest(&store, 1, published_usages);
    let usages = current
        .iter()
        .enumerate()
        .map(|(i, u)| UsageRecord {
            usage_id: format!("p{i}"),
            ..u.clone()
        })
        .collect();
    store.set_project_usages(PROJECT, usages).unwrap();
    store
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_mapping_is_injective_and_complete(
        released in prop::collection::vec(arb_usage(), 0..12),
        current in prop::collection::vec(arb_usage(), 0..12),
    ) {
        let store = fixture(&released, &current);
        let result = run(&store, 2, ReconcileConfig::default());
        let map = id_map(&store);

        prop_assert_eq!(map.len(), current.len());
        let distinct: BTreeSet<u64> = map.values().copied().collect();
        prop_assert_eq!(distinct.len(), map.len());

        prop_assert_eq!(
            result.created.len() + result.reused + result.resurrected.len(),
            current.len()
        );
        prop_assert_eq!(result.reused + result.deleted.len(), released.len());
        prop_assert!(result.resurrected.is_empty());
    }

    #[test]
    fn prop_misapplied_isolation(
        released in prop::collection::vec(arb_usage(), 0..12),
        current in prop::collection::vec(arb_usage(), 0..12),
    ) {
        let store = fixture(&released, &current);
        // keep names index ids as generated
        run(&store, 2, ReconcileConfig::default().with_nidx_deduplication(false));

        let released_status: BTreeMap<u64, TaxonomicStatus> = released
            .iter()
            .enumerate()
            .map(|(i, u)| (100 + i as u64, u.status))
            .collect();
        for (usage_id, id) in id_map(&store) {
            let i: usize = usage_id[1..].parse().unwrap();
            if let Some(status) = released_status.get(&id) {
                let misapplied = current[i].status == TaxonomicStatus::Misapplied;
                prop_assert_eq!(misapplied, *status == TaxonomicStatus::Misapplied);
                prop_assert_eq!(current[i].name_index_id, released[(id - 100) as usize].name_index_id);
            }
        }
    }

    #[test]
    fn prop_rerun_is_stable(
        released in prop::collection::vec(arb_usage(), 0..12),
        current in prop::collection::vec(arb_usage(), 0..12),
    ) {
        let store = fixture(&released, &current);
        let first = run(&store, 2, ReconcileConfig::default());
        let first_map = id_map(&store);
        let second = run(&store, 2, ReconcileConfig::default());

        prop_assert_eq!(first, second);
        prop_assert_eq!(first_map, id_map(&store));
    }

    #[test]
    fn prop_new_ids_above_history(
        released in prop::collection::vec(arb_usage(), 1..12),
        current in prop::collection::vec(arb_usage(), 0..12),
        floor in 0u64..500,
    ) {
        let store = fixture(&released, &current);
        let result = run(&store, 2, ReconcileConfig::default().with_start(floor));
        let max_released = 99 + released.len() as u64;
        for id in &result.created {
            prop_assert!(*id > max_released.max(floor));
        }
    }
}
