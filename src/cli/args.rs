//! Command line argument parsing and validation.
//!
//! Everything about the release itself lives in the manifest; flags only
//! override pipeline configuration and output style.

use crate::config::{PipelineConfig, ToolchainFailurePolicy};
use clap::Parser;
use std::path::PathBuf;

/// Package a desktop application and publish the release
#[derive(Parser, Debug)]
#[command(
    name = "electronifier-release",
    version,
    about = "Package a desktop application and publish the release",
    long_about = "Build native packages (.dmg, .deb, .zip) from compiled application binaries
and publish them to a local directory or a GitHub release.

The manifest is a JSON file:
  { \"project\": {...}, \"release\": {...}, \"launch_options\": {...} }

Usage:
  electronifier-release --manifest release.json
  electronifier-release --manifest release.json --on-toolchain-failure skip --json"
)]
pub struct Args {
    /// Release manifest (JSON)
    #[arg(short, long, value_name = "FILE")]
    pub manifest: PathBuf,

    /// Directory for per-target staging
    #[arg(long, value_name = "DIR", env = "ELECTRONIFIER_WORK_ROOT")]
    pub work_root: Option<PathBuf>,

    /// Wrapper template directory
    #[arg(long, value_name = "DIR", env = "ELECTRONIFIER_TEMPLATE_ROOT")]
    pub template_root: Option<PathBuf>,

    /// What to do when the build command fails for a target
    #[arg(long, value_enum, value_name = "POLICY")]
    pub on_toolchain_failure: Option<ToolchainFailurePolicy>,

    /// Print the result as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.manifest.as_os_str().is_empty() {
            return Err("Manifest path is required".to_string());
        }
        Ok(())
    }

    /// Applies flag overrides on top of `config`.
    pub fn apply_to(&self, config: &mut PipelineConfig) {
        if let Some(root) = &self.work_root {
            config.work_root = root.clone();
        }
        if let Some(root) = &self.template_root {
            config.template_root = Some(root.clone());
        }
        if let Some(policy) = self.on_toolchain_failure {
            config.toolchain_failure_policy = policy;
        }
    }

    /// Whether progress lines should be printed.
    pub fn shows_progress(&self) -> bool {
        !self.quiet && !self.json
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let args = Args::try_parse_from([
            "electronifier-release",
            "--manifest",
            "release.json",
            "--work-root",
            "/tmp/stage",
            "--on-toolchain-failure",
            "skip",
            "--json",
        ])
        .unwrap();
        assert!(args.validate().is_ok());
        assert!(!args.shows_progress());

        let mut config = PipelineConfig::default();
        args.apply_to(&mut config);
        assert_eq!(config.work_root, PathBuf::from("/tmp/stage"));
        assert_eq!(
            config.toolchain_failure_policy,
            ToolchainFailurePolicy::SkipTarget
        );
        assert_eq!(config.template_root, None);
    }

    #[test]
    fn test_manifest_is_required() {
        assert!(Args::try_parse_from(["electronifier-release"]).is_err());
    }

    #[test]
    fn test_unknown_policy_is_rejected() {
        let parsed = Args::try_parse_from([
            "electronifier-release",
            "-m",
            "release.json",
            "--on-toolchain-failure",
            "retry",
        ]);
        assert!(parsed.is_err());
    }
}
