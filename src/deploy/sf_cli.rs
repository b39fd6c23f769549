//! deploy::sf_cli
//!
//! [`Deployer`] implementation that runs `sf project deploy start`.

use async_trait::async_trait;
use serde_json::Value;
use tokio::process::Command;

use super::{DeployError, DeployOutcome, DeployRequest, DeployTarget, Deployer};

/// Binary used when none is configured.
pub const DEFAULT_SF_BIN: &str = "sf";

/// Marker of the post-deploy local tracking failure. It is raised after the
/// org has accepted the deploy, so the deploy itself succeeded.
const TRACKING_MARKER: &str = "SourceTracking.updateLocalTracking";

/// Returns true if deploy output describes the benign tracking failure.
pub fn is_benign_tracking_error(output: &str) -> bool {
    output.contains(TRACKING_MARKER)
}

/// Runs the Salesforce CLI in the staging root.
#[derive(Debug, Clone)]
pub struct SfCliDeployer {
    bin: String,
}

impl SfCliDeployer {
    pub fn new() -> Self {
        Self::with_bin(DEFAULT_SF_BIN)
    }

    /// Use a specific binary, e.g. an absolute path or a wrapper script.
    pub fn with_bin(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }

    pub fn bin(&self) -> &str {
        &self.bin
    }

    /// Command-line arguments for a request.
    pub fn args(request: &DeployRequest) -> Vec<String> {
        let mut args: Vec<String> = ["project", "deploy", "start", "--json", "--ignore-conflicts"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        args.push("--target-org".to_string());
        args.push(request.target_org.clone());

        match &request.target {
            DeployTarget::SourceDirs(dirs) => {
                for dir in dirs {
                    args.push("--source-dir".to_string());
                    args.push(dir.clone());
                }
            }
            DeployTarget::Metadata(components) => {
                for component in components {
                    args.push("--metadata".to_string());
                    args.push(component.to_string());
                }
            }
        }

        if let Some(wait) = request.wait_minutes {
            args.push("--wait".to_string());
            args.push(wait.to_string());
        }

        args
    }
}

impl Default for SfCliDeployer {
    fn default() -> Self {
        Self::new()
    }
}

/// Pull `result.id` and `result.status` out of `--json` output.
fn parse_outcome(stdout: &str) -> DeployOutcome {
    let value: Value = match serde_json::from_str(stdout.trim()) {
        Ok(v) => v,
        Err(_) => return DeployOutcome::default(),
    };
    let result = &value["result"];
    DeployOutcome {
        id: result["id"].as_str().map(str::to_string),
        status: result["status"].as_str().map(str::to_string),
        tracking_warning: false,
    }
}

/// Best available failure message: the JSON `message`, else stderr, else
/// stdout.
fn failure_message(stdout: &str, stderr: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(stdout.trim()) {
        if let Some(message) = value["message"].as_str() {
            return message.to_string();
        }
    }
    let stderr = stderr.trim();
    if !stderr.is_empty() {
        return stderr.to_string();
    }
    stdout.trim().to_string()
}

#[async_trait]
impl Deployer for SfCliDeployer {
    fn name(&self) -> &'static str {
        "sf"
    }

    async fn deploy(&self, request: &DeployRequest) -> Result<DeployOutcome, DeployError> {
        let args = Self::args(request);
        log::debug!("running {} {}", self.bin, args.join(" "));

        let output = Command::new(&self.bin)
            .args(&args)
            .current_dir(&request.project_dir)
            .output()
            .await
            .map_err(|e| DeployError::Spawn {
                bin: self.bin.clone(),
                source: e,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if output.status.success() {
            return Ok(parse_outcome(&stdout));
        }

        if is_benign_tracking_error(&stdout) || is_benign_tracking_error(&stderr) {
            log::warn!("ignoring local source tracking failure after deploy");
            let mut outcome = parse_outcome(&stdout);
            outcome.tracking_warning = true;
            return Ok(outcome);
        }

        Err(DeployError::Failed {
            code: output.status.code(),
            message: failure_message(&stdout, &stderr),
        })
    }
}
