//! Release dataset key <-> attempt lookup

use rustc_hash::FxHashMap;

/// Bidirectional map between release dataset keys and their attempt numbers
#[derive(Debug, Clone, Default)]
pub struct ReleaseAttempts {
    by_dataset: FxHashMap<u32, u32>,
    by_attempt: FxHashMap<u32, u32>,
}

impl ReleaseAttempts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a release; an earlier entry for either side is replaced
    pub fn insert(&mut self, dataset_key: u32, attempt: u32) {
        if let Some(old_attempt) = self.by_dataset.insert(dataset_key, attempt) {
            self.by_attempt.remove(&old_attempt);
        }
        if let Some(old_dataset) = self.by_attempt.insert(attempt, dataset_key) {
            if old_dataset != dataset_key {
                self.by_dataset.remove(&old_dataset);
            }
        }
    }

    pub fn attempt_of(&self, dataset_key: u32) -> Option<u32> {
        self.by_dataset.get(&dataset_key).copied()
    }

    pub fn dataset_of(&self, attempt: u32) -> Option<u32> {
        self.by_attempt.get(&attempt).copied()
    }

    pub fn len(&self) -> usize {
        self.by_dataset.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_dataset.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_directions() {
        let mut attempts = ReleaseAttempts::new();
        attempts.insert(1001, 1);
        attempts.insert(1002, 2);
        assert_eq!(attempts.attempt_of(1002), Some(2));
        assert_eq!(attempts.dataset_of(1), Some(1001));
        assert_eq!(attempts.attempt_of(7), None);
        assert_eq!(attempts.len(), 2);
    }

    #[test]
    fn test_reinsert_keeps_bijection() {
        let mut attempts = ReleaseAttempts::new();
        attempts.insert(1001, 1);
        attempts.insert(1001, 3);
        assert_eq!(attempts.dataset_of(1), None);
        assert_eq!(attempts.dataset_of(3), Some(1001));

        attempts.insert(1005, 3);
        assert_eq!(attempts.attempt_of(1001), None);
        assert_eq!(attempts.attempt_of(1005), Some(3));
        assert_eq!(attempts.len(), 1);
    }
}
