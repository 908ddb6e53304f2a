pub mod loader;

pub use loader::{LoadStats, ReleaseIdLoader};
