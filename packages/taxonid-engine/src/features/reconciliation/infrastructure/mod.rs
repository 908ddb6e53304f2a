pub mod audit_report;

pub use audit_report::{AuditReporter, NoMatchLog};
