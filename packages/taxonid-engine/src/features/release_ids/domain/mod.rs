//! Released id domain

pub mod attempts;
pub mod released_id;
pub mod store;

pub use attempts::ReleaseAttempts;
pub use released_id::ReleasedId;
pub use store::ReleaseIdStore;
