//! Configuration System
//!
//! One versioned YAML document configures a reconciliation run:
//! sequence floor, restart mode, the names index duplicate workaround,
//! batch sizes and where audit files go.
//!
//! # Examples
//!
//! ```rust,ignore
//! use taxonid_engine::config::ReconcileConfig;
//!
//! // Defaults
//! let config = ReconcileConfig::default();
//!
//! // Builder overrides
//! let config = ReconcileConfig::default().with_start(1_000_000).with_restart(false);
//!
//! // YAML
//! let config = ReconcileConfig::from_yaml("release-ids.yaml")?;
//! ```

pub mod error;
pub mod reconcile_config;
pub mod validation;

// Re-exports
pub use error::{ConfigError, ConfigResult};
pub use reconcile_config::{ReconcileConfig, ReconcileConfigFileV1, SUPPORTED_VERSIONS};
pub use validation::Validatable;
