//! Reconciliation settings and their YAML schema
//!
//! ```yaml
//! version: 1
//! reconcile:
//!   start: 1000
//!   restart: false
//!   nidx_deduplication: true
//!   batch_size: 10000
//!   report_batch_size: 25000
//!   report_dir: /var/lib/releases/reports
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::error::{ConfigError, ConfigResult};
use super::validation::Validatable;

/// Supported schema versions
pub const SUPPORTED_VERSIONS: &[u32] = &[1];

const MAX_BATCH_SIZE: usize = 1_000_000;

/// Settings of one reconciliation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReconcileConfig {
    /// Floor for the id sequence; new ids are always above it
    pub start: u64,

    /// Ignore all previously issued ids and mint everything fresh
    pub restart: bool,

    /// Collapse near-duplicate names index ids inside a canonical group
    pub nidx_deduplication: bool,

    /// Id mappings per committed batch
    pub batch_size: usize,

    /// Report entries per committed batch
    pub report_batch_size: usize,

    /// Root directory for audit files; `None` disables file reports
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_dir: Option<PathBuf>,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            start: 0,
            restart: false,
            nidx_deduplication: true,
            batch_size: 10_000,
            report_batch_size: 25_000,
            report_dir: None,
        }
    }
}

/// YAML Schema v1
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReconcileConfigFileV1 {
    /// Schema version (always 1 for v1)
    pub version: u32,

    #[serde(default)]
    pub reconcile: ReconcileConfig,
}

impl ReconcileConfig {
    pub fn with_start(mut self, start: u64) -> Self {
        self.start = start;
        self
    }

    pub fn with_restart(mut self, restart: bool) -> Self {
        self.restart = restart;
        self
    }

    pub fn with_nidx_deduplication(mut self, enabled: bool) -> Self {
        self.nidx_deduplication = enabled;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_report_batch_size(mut self, report_batch_size: usize) -> Self {
        self.report_batch_size = report_batch_size;
        self
    }

    pub fn with_report_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.report_dir = Some(dir.into());
        self
    }

    /// Directory for the audit files of one project release attempt
    pub fn report_dir_for(&self, project_key: u32, attempt: u32) -> Option<PathBuf> {
        self.report_dir
            .as_ref()
            .map(|root| root.join(project_key.to_string()).join(attempt.to_string()))
    }

    /// Load and validate a YAML configuration file
    pub fn from_yaml(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        let raw: serde_yaml::Value = serde_yaml::from_str(content)?;
        let version = raw
            .get("version")
            .ok_or(ConfigError::MissingVersion)?
            .as_u64()
            .ok_or(ConfigError::MissingVersion)?;
        let supported = u32::try_from(version)
            .map(|v| SUPPORTED_VERSIONS.contains(&v))
            .unwrap_or(false);
        if !supported {
            return Err(ConfigError::UnsupportedVersion {
                found: version,
                supported: SUPPORTED_VERSIONS.to_vec(),
            });
        }

        let file: ReconcileConfigFileV1 = serde_yaml::from_value(raw)?;
        file.reconcile.validate()?;
        Ok(file.reconcile)
    }

    pub fn to_yaml(&self) -> ConfigResult<String> {
        let file = ReconcileConfigFileV1 {
            version: 1,
            reconcile: self.clone(),
        };
        Ok(serde_yaml::to_string(&file)?)
    }
}

impl Validatable for ReconcileConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.batch_size == 0 || self.batch_size > MAX_BATCH_SIZE {
            return Err(ConfigError::range_with_hint(
                "batch_size",
                self.batch_size,
                1,
                MAX_BATCH_SIZE,
                "Id mappings are committed in batches; 10000 is a good default.",
            ));
        }
        if self.report_batch_size == 0 || self.report_batch_size > MAX_BATCH_SIZE {
            return Err(ConfigError::range_with_hint(
                "report_batch_size",
                self.report_batch_size,
                1,
                MAX_BATCH_SIZE,
                "Report entries are committed in batches; 25000 is a good default.",
            ));
        }
        Ok(())
    }

    fn config_name(&self) -> &'static str {
        "ReconcileConfig"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = ReconcileConfig::default();
        assert_eq!(config.batch_size, 10_000);
        assert_eq!(config.report_batch_size, 25_000);
        assert!(config.nidx_deduplication);
        assert!(!config.restart);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_roundtrip() {
        let config = ReconcileConfig::default()
            .with_start(5000)
            .with_report_dir("/tmp/reports");

        let yaml = config.to_yaml().unwrap();
        assert!(yaml.contains("version: 1"));
        assert!(yaml.contains("start: 5000"));

        let back = ReconcileConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_yaml_loading() {
        let yaml_content = r#"
version: 1
reconcile:
  start: 100
  nidx_deduplication: false
  batch_size: 500
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(yaml_content.as_bytes()).unwrap();

        let config = ReconcileConfig::from_yaml(temp_file.path()).unwrap();
        assert_eq!(config.start, 100);
        assert!(!config.nidx_deduplication);
        assert_eq!(config.batch_size, 500);
        assert_eq!(config.report_batch_size, 25_000);
    }

    #[test]
    fn test_yaml_missing_version() {
        let result = ReconcileConfig::from_yaml_str("reconcile:\n  start: 1\n");
        assert!(matches!(result, Err(ConfigError::MissingVersion)));
    }

    #[test]
    fn test_yaml_unsupported_version() {
        let result = ReconcileConfig::from_yaml_str("version: 2\n");
        assert!(matches!(
            result,
            Err(ConfigError::UnsupportedVersion { found: 2, .. })
        ));
    }

    #[test]
    fn test_yaml_version_beyond_u32_rejected() {
        // 2^32 + 1 would wrap to 1
        let result = ReconcileConfig::from_yaml_str("version: 4294967297\n");
        assert!(matches!(
            result,
            Err(ConfigError::UnsupportedVersion {
                found: 4_294_967_297,
                ..
            })
        ));
    }

    #[test]
    fn test_yaml_unknown_field() {
        let result = ReconcileConfig::from_yaml_str("version: 1\nreconcile:\n  batchsize: 3\n");
        assert!(matches!(result, Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let result = ReconcileConfig::from_yaml_str("version: 1\nreconcile:\n  batch_size: 0\n");
        assert!(matches!(result, Err(ConfigError::Range { .. })));
    }

    #[test]
    fn test_report_dir_for() {
        let config = ReconcileConfig::default().with_report_dir("/data/reports");
        assert_eq!(
            config.report_dir_for(3, 7),
            Some(PathBuf::from("/data/reports/3/7"))
        );
        assert_eq!(ReconcileConfig::default().report_dir_for(3, 7), None);
    }
}
