//! core::config
//!
//! Configuration schema and loading.
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. CLI flags (not handled here)
//!
//! # Config Locations
//!
//! Searched in order, first existing file wins:
//! 1. `$RDEPLOY_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/rdeploy/config.toml`
//! 3. `~/.rdeploy/config.toml`
//!
//! # Example
//!
//! ```no_run
//! use remote_deploy::core::config::Config;
//!
//! let config = Config::load().unwrap();
//! println!("API: {}", config.api_base());
//! println!("Excluded: {:?}", config.excluded_dirs());
//! ```

pub mod schema;

pub use schema::GlobalConfig;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::deploy::DEFAULT_SF_BIN;
use crate::remote::github::DEFAULT_API_BASE;
use crate::stage::{DEFAULT_LOGIN_URL, DEFAULT_SOURCE_API_VERSION};
use crate::walk::DEFAULT_EXCLUDED_DIRS;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "RDEPLOY_CONFIG";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Loaded configuration with defaults applied by the accessors.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Values from the config file
    pub global: GlobalConfig,
    /// Path to the config file (if loaded)
    path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default locations.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read, parsed or
    /// validated. A missing file is not an error (defaults are used).
    pub fn load() -> Result<Self, ConfigError> {
        let found = Self::locate(
            std::env::var_os(CONFIG_ENV).map(PathBuf::from),
            std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
            dirs::home_dir(),
        );

        match found {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let global: GlobalConfig =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        global.validate()?;

        log::debug!("loaded config from {}", path.display());
        Ok(Self {
            global,
            path: Some(path.to_path_buf()),
        })
    }

    /// First existing config file among the candidate locations.
    fn locate(
        explicit: Option<PathBuf>,
        xdg_home: Option<PathBuf>,
        home: Option<PathBuf>,
    ) -> Option<PathBuf> {
        let candidates = [
            explicit,
            xdg_home.map(|x| x.join("rdeploy/config.toml")),
            home.map(|h| h.join(".rdeploy/config.toml")),
        ];
        candidates.into_iter().flatten().find(|p| p.exists())
    }

    // =========================================================================
    // Accessor methods with defaults
    // =========================================================================

    /// Base URL of the contents API.
    ///
    /// Defaults to `https://api.github.com`.
    pub fn api_base(&self) -> &str {
        self.global.api_base.as_deref().unwrap_or(DEFAULT_API_BASE)
    }

    /// Cap on in-flight requests; `None` means unbounded.
    pub fn max_concurrency(&self) -> Option<usize> {
        self.global.max_concurrency
    }

    /// Per-request timeout; `None` means the client default.
    pub fn timeout(&self) -> Option<Duration> {
        self.global.timeout_secs.map(Duration::from_secs)
    }

    /// Directory names never recursed into.
    pub fn excluded_dirs(&self) -> Vec<String> {
        match &self.global.excluded_dirs {
            Some(dirs) => dirs.clone(),
            None => DEFAULT_EXCLUDED_DIRS.iter().map(|d| d.to_string()).collect(),
        }
    }

    /// Defaults to `57.0`.
    pub fn source_api_version(&self) -> &str {
        self.global
            .source_api_version
            .as_deref()
            .unwrap_or(DEFAULT_SOURCE_API_VERSION)
    }

    pub fn login_url(&self) -> &str {
        self.global.login_url.as_deref().unwrap_or(DEFAULT_LOGIN_URL)
    }

    /// Deploy tool binary, defaults to `sf` on the PATH.
    pub fn sf_bin(&self) -> &str {
        self.global.sf_bin.as_deref().unwrap_or(DEFAULT_SF_BIN)
    }

    /// Defaults to `false`.
    pub fn keep_staging(&self) -> bool {
        self.global.keep_staging.unwrap_or(false)
    }

    /// Get the path to the loaded config file.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults() {
        let config = Config::default();

        assert_eq!(config.api_base(), "https://api.github.com");
        assert_eq!(config.max_concurrency(), None);
        assert_eq!(config.timeout(), None);
        assert_eq!(config.excluded_dirs(), vec!["node_modules", ".sfdx", ".sf"]);
        assert_eq!(config.source_api_version(), "57.0");
        assert_eq!(config.login_url(), "https://login.salesforce.com");
        assert_eq!(config.sf_bin(), "sf");
        assert!(!config.keep_staging());
        assert!(config.loaded_from().is_none());
    }

    #[test]
    fn load_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            r#"
            max_concurrency = 4
            timeout_secs = 10
            excluded_dirs = ["scripts"]
            keep_staging = true
            "#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();

        assert_eq!(config.max_concurrency(), Some(4));
        assert_eq!(config.timeout(), Some(Duration::from_secs(10)));
        assert_eq!(config.excluded_dirs(), vec!["scripts"]);
        assert!(config.keep_staging());
        assert_eq!(config.loaded_from(), Some(path.as_path()));
    }

    #[test]
    fn invalid_value_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "source_api_version = \"latest\"").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[test]
    fn unknown_fields_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "unknown_field = true").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn missing_file_is_read_error() {
        let temp = TempDir::new().unwrap();
        assert!(matches!(
            Config::load_from(&temp.path().join("absent.toml")),
            Err(ConfigError::ReadError { .. })
        ));
    }

    mod locate {
        use super::*;

        fn touch(path: &Path) {
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "").unwrap();
        }

        #[test]
        fn explicit_wins() {
            let temp = TempDir::new().unwrap();
            let explicit = temp.path().join("explicit.toml");
            touch(&explicit);
            touch(&temp.path().join("xdg/rdeploy/config.toml"));

            let found = Config::locate(
                Some(explicit.clone()),
                Some(temp.path().join("xdg")),
                None,
            );
            assert_eq!(found, Some(explicit));
        }

        #[test]
        fn missing_explicit_falls_through() {
            let temp = TempDir::new().unwrap();
            let xdg_file = temp.path().join("xdg/rdeploy/config.toml");
            touch(&xdg_file);

            let found = Config::locate(
                Some(temp.path().join("absent.toml")),
                Some(temp.path().join("xdg")),
                Some(temp.path().join("home")),
            );
            assert_eq!(found, Some(xdg_file));
        }

        #[test]
        fn home_is_last_resort() {
            let temp = TempDir::new().unwrap();
            let home_file = temp.path().join("home/.rdeploy/config.toml");
            touch(&home_file);

            let found = Config::locate(
                None,
                Some(temp.path().join("xdg")),
                Some(temp.path().join("home")),
            );
            assert_eq!(found, Some(home_file));
        }

        #[test]
        fn nothing_found() {
            let temp = TempDir::new().unwrap();
            assert_eq!(
                Config::locate(None, Some(temp.path().join("xdg")), None),
                None
            );
        }
    }
}
