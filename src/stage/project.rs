//! stage::project
//!
//! The `sfdx-project.json` descriptor written at the top of a staging root.

use serde::{Deserialize, Serialize};

/// Source API version used when none is configured.
pub const DEFAULT_SOURCE_API_VERSION: &str = "57.0";

/// Login URL used when none is configured.
pub const DEFAULT_LOGIN_URL: &str = "https://login.salesforce.com";

/// One package directory entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageDirectory {
    pub path: String,
    pub default: bool,
}

/// Project descriptor consumed by the deploy tooling.
///
/// # Example
///
/// ```json
/// {
///   "packageDirectories": [{ "path": "src/", "default": true }],
///   "namespace": "",
///   "sfdcLoginUrl": "https://login.salesforce.com",
///   "sourceApiVersion": "57.0"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDescriptor {
    pub package_directories: Vec<PackageDirectory>,
    pub namespace: String,
    pub sfdc_login_url: String,
    pub source_api_version: String,
}

impl ProjectDescriptor {
    /// A descriptor with a single default package directory.
    pub fn new(source_dir: &str) -> Self {
        Self {
            package_directories: vec![PackageDirectory {
                path: format!("{}/", source_dir.trim_end_matches('/')),
                default: true,
            }],
            namespace: String::new(),
            sfdc_login_url: DEFAULT_LOGIN_URL.to_string(),
            source_api_version: DEFAULT_SOURCE_API_VERSION.to_string(),
        }
    }

    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.source_api_version = version.into();
        self
    }

    pub fn with_login_url(mut self, url: impl Into<String>) -> Self {
        self.sfdc_login_url = url.into();
        self
    }
}
