//! Released stable id with the descriptive data it was published with

use serde::{Deserialize, Serialize};
use taxonid_storage::{HistoricalUsage, MatchType, Rank, TaxonomicStatus};

use crate::errors::{ReconcileError, Result};
use crate::shared::utils::{build_label, id_converter};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleasedId {
    pub id: u64,
    pub name_index_id: u64,
    pub canonical_name_index_id: u64,
    pub rank: Rank,
    pub status: TaxonomicStatus,
    pub scientific_name: String,
    pub authorship: Option<String>,
    pub parent_label: Option<String>,
    pub name_phrase: Option<String>,
    pub match_type: MatchType,
    /// Release attempt the id was last published in
    pub source_attempt: u32,
    pub dataset_key: u32,
}

impl ReleasedId {
    /// Build from a release row published in `attempt`
    ///
    /// Fails with [`ReconcileError::Encoding`] for temporary ids and with an
    /// invariant violation for rows lacking a names index match.
    pub fn from_history(row: &HistoricalUsage, attempt: u32) -> Result<Self> {
        let usage = &row.usage;
        let name_index_id = usage.name_index_id.ok_or_else(|| {
            ReconcileError::invariant(format!("release usage {} has no names index id", usage.usage_id))
        })?;
        let id = id_converter::decode(&usage.usage_id)?;
        Ok(Self {
            id,
            name_index_id,
            // a missing canonical id means the name is its own canonical form
            canonical_name_index_id: usage.canonical_name_index_id.unwrap_or(name_index_id),
            rank: usage.rank,
            status: usage.status,
            scientific_name: usage.scientific_name.clone(),
            authorship: usage.authorship.clone(),
            parent_label: usage.parent_label.clone(),
            name_phrase: usage.name_phrase.clone(),
            match_type: usage.match_type,
            source_attempt: attempt,
            dataset_key: row.dataset_key,
        })
    }

    pub fn encoded_id(&self) -> String {
        id_converter::encode(self.id)
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
