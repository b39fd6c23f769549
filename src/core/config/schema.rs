//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Validation
//!
//! Config values are validated after parsing so that a bad file fails at
//! startup rather than halfway through a fetch.

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Global configuration (user scope).
///
/// # Example
///
/// ```toml
/// api_base = "https://github.example.com/api/v3"
/// max_concurrency = 16
/// timeout_secs = 30
/// excluded_dirs = ["node_modules", ".sfdx", ".sf", "scripts"]
///
/// source_api_version = "60.0"
/// login_url = "https://test.salesforce.com"
/// sf_bin = "/usr/local/bin/sf"
/// keep_staging = false
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Base URL of the contents API
    pub api_base: Option<String>,

    /// Maximum number of requests in flight; unbounded when unset
    pub max_concurrency: Option<usize>,

    /// Per-request timeout in seconds
    pub timeout_secs: Option<u64>,

    /// Directory names never recursed into
    pub excluded_dirs: Option<Vec<String>>,

    /// `sourceApiVersion` written to the staged project
    pub source_api_version: Option<String>,

    /// `sfdcLoginUrl` written to the staged project
    pub login_url: Option<String>,

    /// Deploy tool binary
    pub sf_bin: Option<String>,

    /// Keep staging roots after deploy
    pub keep_staging: Option<bool>,
}

impl GlobalConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(base) = &self.api_base {
            if !(base.starts_with("http://") || base.starts_with("https://")) {
                return Err(ConfigError::InvalidValue(format!(
                    "api_base must be an http(s) URL, got '{}'",
                    base
                )));
            }
        }

        if self.max_concurrency == Some(0) {
            return Err(ConfigError::InvalidValue(
                "max_concurrency must be greater than 0".to_string(),
            ));
        }

        if self.timeout_secs == Some(0) {
            return Err(ConfigError::InvalidValue(
                "timeout_secs must be greater than 0".to_string(),
            ));
        }

        if let Some(dirs) = &self.excluded_dirs {
            if let Some(bad) = dirs.iter().find(|d| d.is_empty() || d.contains('/')) {
                return Err(ConfigError::InvalidValue(format!(
                    "excluded_dirs entries must be plain directory names, got '{}'",
                    bad
                )));
            }
        }

        if let Some(version) = &self.source_api_version {
            if !is_api_version(version) {
                return Err(ConfigError::InvalidValue(format!(
                    "invalid source_api_version '{}', expected e.g. '57.0'",
                    version
                )));
            }
        }

        if let Some(bin) = &self.sf_bin {
            if bin.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "sf_bin cannot be empty".to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// `NN.0` where `NN` is one or more digits.
fn is_api_version(version: &str) -> bool {
    match version.split_once('.') {
        Some((major, "0")) => !major.is_empty() && major.chars().all(|c| c.is_ascii_digit()),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod global_config {
        use super::*;

        #[test]
        fn defaults() {
            let config = GlobalConfig::default();
            assert!(config.api_base.is_none());
            assert!(config.max_concurrency.is_none());
            assert!(config.validate().is_ok());
        }

        #[test]
        fn zero_concurrency_rejected() {
            let config = GlobalConfig {
                max_concurrency: Some(0),
                ..Default::default()
            };
            assert!(config.validate().is_err());
        }

        #[test]
        fn zero_timeout_rejected() {
            let config = GlobalConfig {
                timeout_secs: Some(0),
                ..Default::default()
            };
            assert!(config.validate().is_err());
        }

        #[test]
        fn api_base_must_be_http() {
            let config = GlobalConfig {
                api_base: Some("ftp://example.com".to_string()),
                ..Default::default()
            };
            assert!(config.validate().is_err());

            let config = GlobalConfig {
                api_base: Some("http://127.0.0.1:8080".to_string()),
                ..Default::default()
            };
            assert!(config.validate().is_ok());
        }

        #[test]
        fn excluded_dirs_must_be_names() {
            let config = GlobalConfig {
                excluded_dirs: Some(vec!["node_modules".into(), "a/b".into()]),
                ..Default::default()
            };
            assert!(config.validate().is_err());
        }

        #[test]
        fn roundtrip() {
            let config = GlobalConfig {
                api_base: Some("https://api.github.com".to_string()),
                max_concurrency: Some(8),
                timeout_secs: Some(30),
                excluded_dirs: Some(vec!["node_modules".to_string()]),
                source_api_version: Some("60.0".to_string()),
                login_url: Some("https://test.salesforce.com".to_string()),
                sf_bin: Some("sf".to_string()),
                keep_staging: Some(true),
            };

            let toml = toml::to_string_pretty(&config).unwrap();
            let parsed: GlobalConfig = toml::from_str(&toml).unwrap();
            assert_eq!(config, parsed);
        }

        #[test]
        fn reject_unknown_fields() {
            let toml = r#"
                api_base = "https://api.github.com"
                unknown_field = true
            "#;

            let result: Result<GlobalConfig, _> = toml::from_str(toml);
            assert!(result.is_err());
        }
    }

    mod api_version {
        use super::*;

        #[test]
        fn accepts_major_dot_zero() {
            assert!(is_api_version("57.0"));
            assert!(is_api_version("9.0"));
        }

        #[test]
        fn rejects_other_shapes() {
            assert!(!is_api_version("57"));
            assert!(!is_api_version("57.1"));
            assert!(!is_api_version(".0"));
            assert!(!is_api_version("v57.0"));
            assert!(!is_api_version("57.0.0"));
        }
    }
}
