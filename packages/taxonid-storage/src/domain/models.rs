//! Vocabularies and storage row shapes
//!
//! Everything here is plain data: the engine converts rows into its own
//! matching types, storage adapters convert them to and from their schema.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::StorageError;

/// Declares a closed vocabulary stored as upper snake case text.
macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        $name:ident ($label:literal) {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
        }

        impl $name {
            /// All terms in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = StorageError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let normalized = s.trim().to_ascii_uppercase().replace([' ', '-'], "_");
                match normalized.as_str() {
                    $($text => Ok($name::$variant),)+
                    _ => Err(StorageError::unknown_term($label, s)),
                }
            }
        }
    };
}

vocabulary! {
    /// Taxonomic rank, ordered from highest to lowest
    Rank ("rank") {
        Domain => "DOMAIN",
        Kingdom => "KINGDOM",
        Phylum => "PHYLUM",
        Class => "CLASS",
        Order => "ORDER",
        Family => "FAMILY",
        Subfamily => "SUBFAMILY",
        Tribe => "TRIBE",
        Genus => "GENUS",
        Subgenus => "SUBGENUS",
        Section => "SECTION",
        Species => "SPECIES",
        Subspecies => "SUBSPECIES",
        Variety => "VARIETY",
        Form => "FORM",
        Unranked => "UNRANKED",
        Other => "OTHER",
    }
}

vocabulary! {
    /// Taxonomic status of a name usage
    TaxonomicStatus ("status") {
        Accepted => "ACCEPTED",
        ProvisionallyAccepted => "PROVISIONALLY_ACCEPTED",
        Synonym => "SYNONYM",
        AmbiguousSynonym => "AMBIGUOUS_SYNONYM",
        /// Erroneous application of a name; identity hinges on its phrase
        Misapplied => "MISAPPLIED",
        BareName => "BARE_NAME",
    }
}

impl TaxonomicStatus {
    /// Synonym-like statuses point to an accepted parent usage
    pub fn is_synonym(&self) -> bool {
        matches!(
            self,
            TaxonomicStatus::Synonym
                | TaxonomicStatus::AmbiguousSynonym
                | TaxonomicStatus::Misapplied
        )
    }
}

vocabulary! {
    /// Quality tier of a names index match
    MatchType ("match type") {
        Exact => "EXACT",
        Variant => "VARIANT",
        Canonical => "CANONICAL",
        Ambiguous => "AMBIGUOUS",
        None => "NONE",
    }
}

impl Default for MatchType {
    fn default() -> Self {
        MatchType::None
    }
}

vocabulary! {
    /// Classification of an id change between two releases
    IdReportType ("id report type") {
        Created => "CREATED",
        Deleted => "DELETED",
        Resurrected => "RESURRECTED",
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Rows
// ═══════════════════════════════════════════════════════════════════════════

/// One name usage as delivered by storage
///
/// For the live project `usage_id` is the project's own, non-stable id.
/// For release rows it is the encoded stable id, or a temporary placeholder
/// for usages that never got one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub usage_id: String,
    /// Names index id ignoring authorship
    pub canonical_name_index_id: Option<u64>,
    /// Names index id including authorship
    pub name_index_id: Option<u64>,
    pub rank: Rank,
    pub status: TaxonomicStatus,
    pub scientific_name: String,
    pub authorship: Option<String>,
    /// Label of the accepted parent usage
    pub parent_label: Option<String>,
    pub name_phrase: Option<String>,
    #[serde(default)]
    pub match_type: MatchType,
}

impl UsageRecord {
    /// Create a usage without names index match
    ///
    /// # Examples
    ///
    /// ```rust
    /// use taxonid_storage::{Rank, TaxonomicStatus, UsageRecord};
    ///
    /// let u = UsageRecord::new("x1", "Abies alba", Rank::Species, TaxonomicStatus::Accepted)
    ///     .with_authorship("Mill.")
    ///     .with_name_index(17, 5);
    /// assert_eq!(u.label(), "Abies alba Mill.");
    /// assert_eq!(u.name_index_id, Some(17));
    /// ```
    pub fn new(
        usage_id: impl Into<String>,
        scientific_name: impl Into<String>,
        rank: Rank,
        status: TaxonomicStatus,
    ) -> Self {
        Self {
            usage_id: usage_id.into(),
            canonical_name_index_id: None,
            name_index_id: None,
            rank,
            status,
            scientific_name: scientific_name.into(),
            authorship: None,
            parent_label: None,
            name_phrase: None,
            match_type: MatchType::None,
        }
    }

    pub fn with_authorship(mut self, authorship: impl Into<String>) -> Self {
        self.authorship = Some(authorship.into());
        self
    }

    pub fn with_parent(mut self, parent_label: impl Into<String>) -> Self {
        self.parent_label = Some(parent_label.into());
        self
    }

    pub fn with_phrase(mut self, name_phrase: impl Into<String>) -> Self {
        self.name_phrase = Some(name_phrase.into());
        self
    }

    pub fn with_match_type(mut self, match_type: MatchType) -> Self {
        self.match_type = match_type;
        self
    }

    /// Set exact and canonical names index ids
    pub fn with_name_index(mut self, name_index_id: u64, canonical_name_index_id: u64) -> Self {
        self.name_index_id = Some(name_index_id);
        self.canonical_name_index_id = Some(canonical_name_index_id);
        if self.match_type == MatchType::None {
            self.match_type = MatchType::Exact;
        }
        self
    }

    /// Full name label: scientific name, authorship and phrase
    pub fn label(&self) -> String {
        let mut label = self.scientific_name.clone();
        for part in [&self.authorship, &self.name_phrase].into_iter().flatten() {
            if !part.is_empty() {
                label.push(' ');
                label.push_str(part);
            }
        }
        label
    }
}

/// A usage from a previous release or the archive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalUsage {
    pub usage: UsageRecord,
    /// Release dataset the usage was last seen in
    pub dataset_key: u32,
    /// Release attempt of that dataset
    pub attempt: u32,
}

impl HistoricalUsage {
    pub fn new(usage: UsageRecord, dataset_key: u32, attempt: u32) -> Self {
        Self {
            usage,
            dataset_key,
            attempt,
        }
    }
}

/// Release dataset of a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseInfo {
    pub dataset_key: u32,
    /// Release attempt, missing for releases that failed before numbering
    pub attempt: Option<u32>,
    /// Publicly visible release
    pub public: bool,
}

impl ReleaseInfo {
    pub fn new(dataset_key: u32, attempt: u32, public: bool) -> Self {
        Self {
            dataset_key,
            attempt: Some(attempt),
            public,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocabulary_parse() {
        assert_eq!("species".parse::<Rank>().unwrap(), Rank::Species);
        assert_eq!(
            "provisionally accepted".parse::<TaxonomicStatus>().unwrap(),
            TaxonomicStatus::ProvisionallyAccepted
        );
        assert_eq!("EXACT".parse::<MatchType>().unwrap(), MatchType::Exact);
        assert!("superspecies".parse::<Rank>().is_err());
    }

    #[test]
    fn test_vocabulary_display() {
        assert_eq!(TaxonomicStatus::AmbiguousSynonym.to_string(), "AMBIGUOUS_SYNONYM");
        assert_eq!(IdReportType::Resurrected.as_str(), "RESURRECTED");
        for rank in Rank::ALL {
            assert_eq!(rank.as_str().parse::<Rank>().unwrap(), *rank);
        }
    }

    #[test]
    fn test_synonym_like_statuses() {
        assert!(TaxonomicStatus::Synonym.is_synonym());
        assert!(TaxonomicStatus::AmbiguousSynonym.is_synonym());
        assert!(TaxonomicStatus::Misapplied.is_synonym());
        assert!(!TaxonomicStatus::Accepted.is_synonym());
        assert!(!TaxonomicStatus::BareName.is_synonym());
    }

    #[test]
    fn test_label() {
        let u = UsageRecord::new("1", "Poa annua", Rank::Species, TaxonomicStatus::Misapplied)
            .with_authorship("L.")
            .with_phrase("auct. non L.");
        assert_eq!(u.label(), "Poa annua L. auct. non L.");

        let bare = UsageRecord::new("2", "Poa", Rank::Genus, TaxonomicStatus::Accepted);
        assert_eq!(bare.label(), "Poa");
    }

    #[test]
    fn test_usage_serde() {
        let u = UsageRecord::new("x", "Poa", Rank::Genus, TaxonomicStatus::Accepted)
            .with_name_index(3, 3);
        let json = serde_json::to_string(&u).unwrap();
        assert!(json.contains("\"GENUS\""));
        assert!(json.contains("\"EXACT\""));

        let back: UsageRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, u);
    }
}
