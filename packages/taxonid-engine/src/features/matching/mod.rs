//! Candidate Matching
//!
//! Streams current usages into canonical groups and exact-name subgroups and
//! assigns each candidate a stable id, reusing released ids where the pair
//! scores best.
//!
//! ```text
//! application/ (CandidateGrouper → dedup → SubgroupMatcher)
//!           ↓
//! domain/ (Candidate, score, IdSequence)
//! ```

pub mod application;
pub mod domain;

pub use application::{
    deduplicate_name_index_ids, greedy_pairs, Assignment, CandidateGrouper, CanonicalGroup,
    Subgroup, SubgroupMatcher,
};
pub use domain::{match_type_score, score, Candidate, IdSequence};
