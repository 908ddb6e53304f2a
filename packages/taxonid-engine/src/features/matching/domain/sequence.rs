//! Mint for brand-new stable ids

/// Monotonic id counter
///
/// Seeded with the largest id already issued, so every minted id is unused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdSequence {
    last: u64,
}

impl IdSequence {
    pub fn new(seed: u64) -> Self {
        Self { last: seed }
    }

    /// Seed from the largest released id and a configured floor
    pub fn seeded(max_id: u64, floor: u64) -> Self {
        Self::new(max_id.max(floor))
    }

    /// Increment and return the new id
    pub fn next(&mut self) -> u64 {
        self.last += 1;
        self.last
    }

    /// Last id handed out, or the seed
    pub fn current(&self) -> u64 {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_is_monotonic() {
        let mut seq = IdSequence::seeded(41, 10);
        assert_eq!(seq.current(), 41);
        assert_eq!(seq.next(), 42);
        assert_eq!(seq.next(), 43);
        assert_eq!(seq.current(), 43);
    }

    #[test]
    fn test_floor_wins_over_small_max() {
        let mut seq = IdSequence::seeded(3, 1000);
        assert_eq!(seq.next(), 1001);
    }
}
