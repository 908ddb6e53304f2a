//! Matching domain: candidates, pair scores and the id mint

pub mod candidate;
pub mod score;
pub mod sequence;

pub use candidate::Candidate;
pub use score::{match_type_score, score};
pub use sequence::IdSequence;
