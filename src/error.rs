//! Error types for release runs.
//!
//! Only conditions that stop a run are errors. Skipped targets, degraded
//! packaging and failed publications are reported as data on the result.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for release operations
pub type Result<T> = std::result::Result<T, ReleaseError>;

/// Main error type for a release run
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// The run was rejected before any target was processed
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// The external build command failed for a target
    #[error("{program} publish failed for {platform} ({arch}): {detail}")]
    ToolchainInvocationFailed {
        /// Build command that was run
        program: String,
        /// Platform being built
        platform: String,
        /// Architecture label being built
        arch: String,
        /// First lines of the command output
        detail: String,
    },

    /// Cancellation was requested
    #[error("Release was cancelled")]
    Cancelled,

    /// Packaging errors (I/O while staging or writing archives)
    #[error("Packaging error: {0}")]
    Packaging(#[from] crate::bundler::Error),

    /// The HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON errors (manifest loading)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Structural problems with the release request
#[derive(Error, Debug)]
pub enum ConfigurationError {
    /// Release version is blank
    #[error("Release version cannot be empty.")]
    MissingVersion,

    /// No publication destination on the release
    #[error("Publication destination is required.")]
    MissingDestination,

    /// Neither the release nor the project names a platform
    #[error("No platforms were selected for the release.")]
    NoPlatformsSelected,

    /// The wrapper template directory could not be found
    #[error(
        "Unable to locate the wrapper template directory. Searched: {}",
        searched.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", ")
    )]
    TemplateNotFound {
        /// Candidate locations that were checked
        searched: Vec<PathBuf>,
    },

    /// The release manifest could not be read
    #[error("Invalid release manifest {path}: {reason}")]
    InvalidManifest {
        /// Manifest path
        path: PathBuf,
        /// Reason for the error
        reason: String,
    },
}

impl ReleaseError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            ReleaseError::Configuration(ConfigurationError::MissingVersion) => vec![
                "Set a version on the release, e.g. \"version\": \"1.0.0\"".to_string(),
            ],
            ReleaseError::Configuration(ConfigurationError::MissingDestination) => vec![
                "Add a publication_destination of type LocalDirectory or GitHubRelease".to_string(),
            ],
            ReleaseError::Configuration(ConfigurationError::NoPlatformsSelected) => vec![
                "List platforms on the release or default_platform_targets on the project"
                    .to_string(),
            ],
            ReleaseError::Configuration(ConfigurationError::TemplateNotFound { .. }) => vec![
                "Set ELECTRONIFIER_TEMPLATE_ROOT or pass --template-root".to_string(),
                "Ensure templates/PhotinoWrapper ships next to the executable".to_string(),
            ],
            ReleaseError::ToolchainInvocationFailed { program, .. } => vec![
                format!("Check that `{program}` is installed and on PATH"),
                "Run with RUST_LOG=debug to see the full build output".to_string(),
                "Use --on-toolchain-failure skip to package the remaining targets".to_string(),
            ],
            _ => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toolchain_failure_message() {
        let err = ReleaseError::ToolchainInvocationFailed {
            program: "dotnet".into(),
            platform: "Linux".into(),
            arch: "x64".into(),
            detail: "error CS1002".into(),
        };
        assert_eq!(
            err.to_string(),
            "dotnet publish failed for Linux (x64): error CS1002"
        );
        assert!(!err.recovery_suggestions().is_empty());
    }

    #[test]
    fn test_template_not_found_lists_paths() {
        let err = ConfigurationError::TemplateNotFound {
            searched: vec![PathBuf::from("/a/templates"), PathBuf::from("/b/templates")],
        };
        let message = err.to_string();
        assert!(message.contains("/a/templates, /b/templates"));
    }
}
