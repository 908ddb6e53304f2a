//! Current usage awaiting a stable id

use serde::{Deserialize, Serialize};
use taxonid_storage::{MatchType, Rank, TaxonomicStatus, UsageRecord};

use crate::shared::utils::build_label;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// The project's own, non-stable usage id
    pub usage_id: String,
    pub canonical_name_index_id: Option<u64>,
    pub name_index_id: Option<u64>,
    pub rank: Rank,
    pub status: TaxonomicStatus,
    pub scientific_name: String,
    pub authorship: Option<String>,
    pub parent_label: Option<String>,
    pub name_phrase: Option<String>,
    pub match_type: MatchType,
}

impl Candidate {
    /// Scientific name followed by authorship and phrase
    pub fn label(&self) -> String {
        build_label(
            &self.scientific_name,
            self.authorship.as_deref(),
            self.name_phrase.as_deref(),
        )
    }

    /// Case-insensitive scientific name plus authorship
    pub fn name_key(&self) -> String {
        match self.authorship.as_deref() {
            Some(a) if !a.is_empty() => format!("{} {}", self.scientific_name, a).to_lowercase(),
            _ => self.scientific_name.to_lowercase(),
        }
    }
}

impl From<UsageRecord> for Candidate {
    fn from(u: UsageRecord) -> Self {
        Self {
            usage_id: u.usage_id,
            canonical_name_index_id: u.canonical_name_index_id,
            name_index_id: u.name_index_id,
            rank: u.rank,
            status: u.status,
            scientific_name: u.scientific_name,
            authorship: u.authorship,
            parent_label: u.parent_label,
            name_phrase: u.name_phrase,
            match_type: u.match_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_key_ignores_case_and_phrase() {
        let a: Candidate = UsageRecord::new("1", "Abies alba", Rank::Species, TaxonomicStatus::Accepted)
            .with_authorship("Mill.")
            .into();
        let b: Candidate = UsageRecord::new("2", "ABIES ALBA", Rank::Species, TaxonomicStatus::Misapplied)
            .with_authorship("MILL.")
            .with_phrase("sensu Smith")
            .into();
        assert_eq!(a.name_key(), b.name_key());
        assert_eq!(b.label(), "ABIES ALBA MILL. sensu Smith");
    }
}
