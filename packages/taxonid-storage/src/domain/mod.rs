//! Domain layer: vocabularies, rows and storage ports

pub mod models;
pub mod ports;

pub use models::{
    HistoricalUsage, IdReportType, MatchType, Rank, ReleaseInfo, TaxonomicStatus, UsageRecord,
};
pub use ports::{
    HistoryStream, IdMapWriter, IdReportSink, ReleaseHistory, ReleaseStorage, UsageSource,
    UsageStream,
};
