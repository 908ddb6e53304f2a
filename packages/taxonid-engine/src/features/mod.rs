//! Feature modules - each follows Hexagonal Architecture
//!
//! - domain/         - Pure logic
//! - application/    - Use cases driving the storage ports
//! - infrastructure/ - File output

pub mod matching;
pub mod reconciliation;
pub mod release_ids;
