//! Pipeline configuration.
//!
//! Defaults cover a stock installation; every field can be overridden from
//! the environment and again from command line flags.
//!
//! | Variable | Field |
//! |----------|-------|
//! | `ELECTRONIFIER_TEMPLATE_ROOT` | `template_root` |
//! | `ELECTRONIFIER_WORK_ROOT` | `work_root` |
//! | `ELECTRONIFIER_TOOLCHAIN` | `toolchain_command` (whitespace separated) |
//! | `ELECTRONIFIER_GITHUB_API` | `github_api_base` |
//! | `ELECTRONIFIER_HTTP_TIMEOUT_SECS` | `http_timeout` |
//! | `ELECTRONIFIER_ON_TOOLCHAIN_FAILURE` | `toolchain_failure_policy` (`abort` or `skip`) |

use crate::error::ConfigurationError;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Relative location of the wrapper template inside an installation.
const TEMPLATE_SUBDIR: [&str; 2] = ["templates", "PhotinoWrapper"];

/// Upper bound for `ELECTRONIFIER_HTTP_TIMEOUT_SECS`.
const MAX_HTTP_TIMEOUT_SECS: u64 = 4 * 60 * 60;

/// What to do when the external build command fails for one target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ToolchainFailurePolicy {
    /// Stop the whole run with an error
    #[default]
    #[value(name = "abort")]
    AbortRun,
    /// Report the failure and continue with the next target
    #[value(name = "skip")]
    SkipTarget,
}

impl FromStr for ToolchainFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" | "abort-run" => Ok(Self::AbortRun),
            "skip" | "skip-target" => Ok(Self::SkipTarget),
            other => Err(format!("unknown toolchain failure policy: {other}")),
        }
    }
}

/// Configuration shared by every stage of a release run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Wrapper template directory; searched for when `None`
    pub template_root: Option<PathBuf>,
    /// Root of per-run staging directories
    pub work_root: PathBuf,
    /// Build command and any leading arguments, e.g. `["dotnet"]`
    pub toolchain_command: Vec<String>,
    /// Project file passed to `publish`
    pub wrapper_project_file: String,
    /// Template files that receive placeholder substitution
    pub token_files: Vec<String>,
    /// GitHub REST API base URL
    pub github_api_base: String,
    /// User-Agent sent to GitHub
    pub user_agent: String,
    /// Per-request HTTP timeout (covers the largest upload)
    pub http_timeout: Duration,
    /// Behaviour when a target fails to build
    pub toolchain_failure_policy: ToolchainFailurePolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            template_root: None,
            work_root: std::env::temp_dir().join("Electronifier"),
            toolchain_command: vec!["dotnet".to_string()],
            wrapper_project_file: "PhotinoWrapper.csproj".to_string(),
            token_files: vec!["Program.cs".to_string(), "PhotinoWrapper.csproj".to_string()],
            github_api_base: "https://api.github.com".to_string(),
            user_agent: "Electronifier/1.0".to_string(),
            http_timeout: Duration::from_secs(30 * 60),
            toolchain_failure_policy: ToolchainFailurePolicy::AbortRun,
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables with fallback to defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(root) = get("ELECTRONIFIER_TEMPLATE_ROOT") {
            config.template_root = Some(PathBuf::from(root));
        }
        if let Some(root) = get("ELECTRONIFIER_WORK_ROOT") {
            config.work_root = PathBuf::from(root);
        }
        if let Some(command) = get("ELECTRONIFIER_TOOLCHAIN") {
            config.toolchain_command = command.split_whitespace().map(str::to_string).collect();
        }
        if let Some(base) = get("ELECTRONIFIER_GITHUB_API") {
            config.github_api_base = base.trim_end_matches('/').to_string();
        }
        if let Some(secs) = get("ELECTRONIFIER_HTTP_TIMEOUT_SECS")
            .and_then(|s| s.trim().parse::<u64>().ok())
        {
            config.http_timeout = Duration::from_secs(secs.clamp(1, MAX_HTTP_TIMEOUT_SECS));
        }
        if let Some(policy) = get("ELECTRONIFIER_ON_TOOLCHAIN_FAILURE") {
            match policy.parse() {
                Ok(policy) => config.toolchain_failure_policy = policy,
                Err(e) => log::warn!("Ignoring ELECTRONIFIER_ON_TOOLCHAIN_FAILURE: {e}"),
            }
        }

        config
    }

    /// Program name of the build command, for messages.
    pub fn toolchain_program(&self) -> &str {
        self.toolchain_command
            .first()
            .map(String::as_str)
            .unwrap_or("dotnet")
    }

    /// Locations checked for the wrapper template, in order.
    pub fn template_candidates(&self) -> Vec<PathBuf> {
        if let Some(root) = &self.template_root {
            return vec![root.clone()];
        }

        let mut bases = Vec::new();
        if let Ok(exe) = std::env::current_exe()
            && let Some(dir) = exe.parent()
        {
            bases.push(dir.to_path_buf());
            // target/<profile>/ inside a source checkout
            if let Some(repo) = dir.parent().and_then(|p| p.parent()) {
                bases.push(repo.to_path_buf());
            }
        }
        if let Ok(cwd) = std::env::current_dir() {
            bases.push(cwd);
        }
        if let Some(data) = dirs::data_dir() {
            bases.push(data.join("Electronifier"));
        }

        bases
            .into_iter()
            .map(|base| TEMPLATE_SUBDIR.iter().fold(base, |acc, part| acc.join(part)))
            .collect()
    }

    /// HTTP client carrying the configured user agent and timeout.
    pub fn http_client(&self) -> reqwest::Result<reqwest::Client> {
        reqwest::Client::builder()
            .user_agent(self.user_agent.clone())
            .timeout(self.http_timeout)
            .build()
    }

    /// Find the wrapper template directory.
    pub fn locate_template_root(&self) -> Result<PathBuf, ConfigurationError> {
        let searched = self.template_candidates();
        match searched.iter().find(|candidate| candidate.is_dir()) {
            Some(found) => Ok(found.clone()),
            None => Err(ConfigurationError::TemplateNotFound { searched }),
        }
    }
}
