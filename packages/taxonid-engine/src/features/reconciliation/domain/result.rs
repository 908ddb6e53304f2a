//! Outcome of one reconciliation run

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationResult {
    /// Ids minted this run
    pub created: BTreeSet<u64>,
    /// Ids of the latest attempt not carried forward, with that attempt
    pub deleted: BTreeMap<u64, u32>,
    /// Ids of older attempts carried forward again, with their last attempt
    pub resurrected: BTreeMap<u64, u32>,
    /// Ids of the latest attempt carried forward
    pub reused: usize,
    /// Candidates left without a stable id for lack of a names match
    pub no_match: usize,
}

impl ReconciliationResult {
    /// Number of stable ids handed out this run
    pub fn mapped(&self) -> usize {
        self.created.len() + self.resurrected.len() + self.reused
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_summary() {
        let result = ReconciliationResult {
            created: BTreeSet::from([42]),
            deleted: BTreeMap::from([(7, 3)]),
            resurrected: BTreeMap::new(),
            reused: 5,
            no_match: 1,
        };
        assert_eq!(result.mapped(), 6);

        let json = result.to_json().unwrap();
        assert!(json.contains("\"created\""));
        let back: ReconciliationResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }
}
