pub mod dedup;
pub mod grouper;
pub mod matcher;

pub use dedup::deduplicate_name_index_ids;
pub use grouper::{CandidateGrouper, CanonicalGroup, Subgroup};
pub use matcher::{greedy_pairs, Assignment, SubgroupMatcher};
