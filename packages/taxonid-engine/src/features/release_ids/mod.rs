//! Released Ids
//!
//! Population of every stable id issued in earlier releases of a project.
//!
//! ```text
//! application/ (ReleaseIdLoader - reads release history ports)
//!           ↓
//! domain/ (ReleasedId, ReleaseIdStore, ReleaseAttempts)
//! ```

pub mod application;
pub mod domain;

pub use application::{LoadStats, ReleaseIdLoader};
pub use domain::{ReleaseAttempts, ReleaseIdStore, ReleasedId};
