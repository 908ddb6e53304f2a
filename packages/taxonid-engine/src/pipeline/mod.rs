//! Pipeline - runs spanning several projects

pub mod multi_project;

pub use multi_project::{reconcile_projects, ProjectOutcome, ProjectRun};
