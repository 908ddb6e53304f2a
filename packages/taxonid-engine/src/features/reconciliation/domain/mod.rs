//! Reconciliation domain

pub mod audit;
pub mod cancel;
pub mod result;

pub use audit::{AuditEntry, AuditLog};
pub use cancel::CancelToken;
pub use result::ReconciliationResult;
