//! Pair scoring between a candidate and a released id
//!
//! Only the relative order of the weights matters. Rank is the heaviest
//! criterion. Status, authorship, synonym parent and phrase come next with
//! near-equal weights (5 or 6 each). Match quality only breaks what is left.

use taxonid_storage::{MatchType, TaxonomicStatus};

use super::candidate::Candidate;
use crate::features::release_ids::domain::ReleasedId;
use crate::shared::utils::equals_digit_or_ascii_letters;

const BASE: u32 = 1;
const RANK_EQUAL: u32 = 10;
const STATUS_EQUAL: u32 = 5;
const SYNONYM_PARENT_EQUAL: u32 = 6;
const AUTHORSHIP_EQUAL: u32 = 6;
const PHRASE_EQUAL: u32 = 5;

/// Bonus for the names index match quality of one side
pub fn match_type_score(match_type: MatchType) -> u32 {
    match match_type {
        MatchType::Exact => 3,
        MatchType::Variant => 2,
        MatchType::Canonical => 1,
        MatchType::Ambiguous | MatchType::None => 0,
    }
}

/// Similarity of a candidate and a released id sharing one names index id
///
/// Zero means the pair must never be matched.
pub fn score(candidate: &Candidate, released: &ReleasedId) -> u32 {
    let c_misapplied = candidate.status == TaxonomicStatus::Misapplied;
    let r_misapplied = released.status == TaxonomicStatus::Misapplied;
    if c_misapplied != r_misapplied {
        return 0;
    }
    if c_misapplied
        && !equals_digit_or_ascii_letters(
            candidate.name_phrase.as_deref(),
            released.name_phrase.as_deref(),
        )
    {
        return 0;
    }

    let mut score = BASE;
    if candidate.rank == released.rank {
        score += RANK_EQUAL;
    }
    if candidate.status == released.status {
        score += STATUS_EQUAL;
    }
    if candidate.status.is_synonym()
        && released.status.is_synonym()
        && candidate.parent_label == released.parent_label
    {
        score += SYNONYM_PARENT_EQUAL;
    }
    if equals_digit_or_ascii_letters(candidate.authorship.as_deref(), released.authorship.as_deref()) {
        score += AUTHORSHIP_EQUAL;
    }
    if equals_digit_or_ascii_letters(candidate.name_phrase.as_deref(), released.name_phrase.as_deref()) {
        score += PHRASE_EQUAL;
    }
    score + match_type_score(candidate.match_type) + match_type_score(released.match_type)
}
