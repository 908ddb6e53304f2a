//! Descriptive records behind the classification sets
//!
//! Kept alongside the id sets so reports can describe every created,
//! deleted and resurrected id without going back to storage.

use std::collections::BTreeMap;

use taxonid_storage::{MatchType, Rank, TaxonomicStatus};

use crate::features::matching::domain::Candidate;
use crate::features::release_ids::domain::ReleasedId;
use crate::shared::utils::build_label;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    pub id: u64,
    /// Release dataset the entry describes
    pub dataset_key: u32,
    pub rank: Rank,
    pub status: TaxonomicStatus,
    pub scientific_name: String,
    pub authorship: Option<String>,
    pub name_phrase: Option<String>,
    pub parent_label: Option<String>,
    pub name_index_id: Option<u64>,
    pub canonical_name_index_id: Option<u64>,
    pub match_type: MatchType,
}

impl AuditEntry {
    pub fn from_candidate(id: u64, dataset_key: u32, c: &Candidate) -> Self {
        Self {
            id,
            dataset_key,
            rank: c.rank,
            status: c.status,
            scientific_name: c.scientific_name.clone(),
            authorship: c.authorship.clone(),
            name_phrase: c.name_phrase.clone(),
            parent_label: c.parent_label.clone(),
            name_index_id: c.name_index_id,
            canonical_name_index_id: c.canonical_name_index_id,
            match_type: c.match_type,
        }
    }

    pub fn from_released(r: &ReleasedId) -> Self {
        Self {
            id: r.id,
            dataset_key: r.dataset_key,
            rank: r.rank,
            status: r.status,
            scientific_name: r.scientific_name.clone(),
            authorship: r.authorship.clone(),
            name_phrase: r.name_phrase.clone(),
            parent_label: r.parent_label.clone(),
            name_index_id: Some(r.name_index_id),
            canonical_name_index_id: Some(r.canonical_name_index_id),
            match_type: r.match_type,
        }
    }

    /// Scientific name followed by authorship and phrase
    pub fn label(&self) -> String {
        build_label(
            &self.scientific_name,
            self.authorship.as_deref(),
            self.name_phrase.as_deref(),
        )
    }
}

/// Audit entries of one run, keyed by id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditLog {
    pub created: BTreeMap<u64, AuditEntry>,
    pub deleted: BTreeMap<u64, AuditEntry>,
    pub resurrected: BTreeMap<u64, AuditEntry>,
}
