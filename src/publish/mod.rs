//! Artifact publication to a release destination.
//!
//! Publishing never fails the run: every error is folded into a
//! [`ReleasePublicationOutcome`] so the caller can report it next to the
//! artifacts that were built.

mod local;

pub use local::publish_to_directory;

use crate::config::PipelineConfig;
use crate::github::GitHubReleasePublisher;
use crate::project::{PublicationDestination, PublicationDestinationType};
use crate::release::{ReleaseArtifact, ReleasePublicationOutcome};
use std::path::PathBuf;
use thiserror::Error;

/// Identifier reported when a destination has no path or URL.
pub const UNSET_TARGET: &str = "<unset>";

/// Why a publication failed.
#[derive(Error, Debug)]
pub enum PublishError {
    /// Required destination setting is empty
    #[error("{0}")]
    MissingConfiguration(String),

    /// Access token is empty
    #[error("{0}")]
    MissingCredential(String),

    /// Repository URL does not name an owner and repository
    #[error("Unable to parse GitHub repository owner and name.")]
    InvalidRepositoryReference,

    /// The remote rejected the release
    #[error("GitHub release creation failed: {status} - {body}")]
    ReleaseCreationFailed {
        /// HTTP status
        status: reqwest::StatusCode,
        /// Response body
        body: String,
    },

    /// The remote rejected an asset upload
    #[error("Uploading {asset} failed: {status} - {body}")]
    AssetUploadFailed {
        /// Asset file name
        asset: String,
        /// HTTP status
        status: reqwest::StatusCode,
        /// Response body
        body: String,
    },

    /// Malformed response from the remote
    #[error("Unexpected GitHub response: {0}")]
    InvalidResponse(String),

    /// Transport errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Copying or reading an artifact failed
    #[error("{context} {}: {source}", path.display())]
    Io {
        /// What was being done
        context: &'static str,
        /// Path involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

/// Facts about the release that remote destinations need.
#[derive(Debug, Clone, Copy)]
pub struct PublishRequest<'a> {
    /// Project display name
    pub app_name: &'a str,
    /// Release version, unsanitized
    pub version: &'a str,
    /// Release notes, if any
    pub release_notes: Option<&'a str>,
}

/// Publishes `artifacts` to `destination`.
///
/// Always returns exactly one outcome.
pub async fn publish(
    destination: &PublicationDestination,
    artifacts: &[ReleaseArtifact],
    request: PublishRequest<'_>,
    http: &reqwest::Client,
    config: &PipelineConfig,
) -> ReleasePublicationOutcome {
    let kind = destination.kind();
    log::info!("Publishing {} artifact(s) to {}", artifacts.len(), kind);

    match destination {
        PublicationDestination::LocalDirectory { path } => {
            if path.as_os_str().is_empty() {
                return ReleasePublicationOutcome::failed(
                    kind,
                    UNSET_TARGET,
                    PublishError::MissingConfiguration(
                        "Local directory is not configured.".to_string(),
                    )
                    .to_string(),
                );
            }
            let target = path.display().to_string();
            match publish_to_directory(path, artifacts).await {
                Ok(count) => ReleasePublicationOutcome::succeeded(
                    kind,
                    target,
                    format!("Copied {count} artifact(s)."),
                ),
                Err(e) => failure(kind, target, e),
            }
        }
        PublicationDestination::GitHubRelease {
            repository_url,
            access_token,
        } => {
            let repository_url = repository_url.trim();
            if repository_url.is_empty() {
                return ReleasePublicationOutcome::failed(
                    kind,
                    UNSET_TARGET,
                    PublishError::MissingConfiguration(
                        "GitHub repository URL is missing.".to_string(),
                    )
                    .to_string(),
                );
            }
            let result = GitHubReleasePublisher::new(http.clone(), config)
                .publish(repository_url, access_token, request, artifacts)
                .await;
            match result {
                Ok(count) => ReleasePublicationOutcome::succeeded(
                    kind,
                    repository_url,
                    format!("Published {count} artifact(s) to GitHub."),
                ),
                Err(e) => failure(kind, repository_url.to_string(), e),
            }
        }
    }
}

fn failure(
    kind: PublicationDestinationType,
    target: String,
    error: PublishError,
) -> ReleasePublicationOutcome {
    log::warn!("Publishing to {} failed: {}", target, error);
    ReleasePublicationOutcome::failed(kind, target, error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::PlatformTarget;

    fn request() -> PublishRequest<'static> {
        PublishRequest {
            app_name: "Viewer",
            version: "1.0.0",
            release_notes: None,
        }
    }

    #[tokio::test]
    async fn test_local_without_path() {
        let outcome = publish(
            &PublicationDestination::LocalDirectory {
                path: PathBuf::new(),
            },
            &[],
            request(),
            &reqwest::Client::new(),
            &PipelineConfig::default(),
        )
        .await;
        assert!(!outcome.success);
        assert_eq!(outcome.target_identifier, "<unset>");
        assert_eq!(outcome.detail, "Local directory is not configured.");
    }

    #[tokio::test]
    async fn test_github_preflight_failures() {
        let config = PipelineConfig::default();
        let http = reqwest::Client::new();

        let missing_url = publish(
            &PublicationDestination::GitHubRelease {
                repository_url: " ".into(),
                access_token: "t".into(),
            },
            &[],
            request(),
            &http,
            &config,
        )
        .await;
        assert_eq!(missing_url.target_identifier, "<unset>");
        assert_eq!(missing_url.detail, "GitHub repository URL is missing.");

        let missing_token = publish(
            &PublicationDestination::GitHubRelease {
                repository_url: "https://github.com/acme/viewer".into(),
                access_token: String::new(),
            },
            &[],
            request(),
            &http,
            &config,
        )
        .await;
        assert!(!missing_token.success);
        assert_eq!(missing_token.target_identifier, "https://github.com/acme/viewer");
        assert_eq!(missing_token.detail, "GitHub access token is missing.");

        let unparsable = publish(
            &PublicationDestination::GitHubRelease {
                repository_url: "https://gitlab.com/acme/viewer".into(),
                access_token: "t".into(),
            },
            &[],
            request(),
            &http,
            &config,
        )
        .await;
        assert_eq!(
            unparsable.detail,
            "Unable to parse GitHub repository owner and name."
        );
    }

    #[tokio::test]
    async fn test_local_copies_artifacts() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("viewer-linux-x64-1-0.deb");
        std::fs::write(&file, b"!<arch>\n").unwrap();
        let out = tmp.path().join("out");

        let outcome = publish(
            &PublicationDestination::LocalDirectory { path: out.clone() },
            &[ReleaseArtifact {
                platform: PlatformTarget::Linux,
                package_path: file,
                packaging_note: None,
            }],
            request(),
            &reqwest::Client::new(),
            &PipelineConfig::default(),
        )
        .await;
        assert!(outcome.success);
        assert_eq!(outcome.detail, "Copied 1 artifact(s).");
        assert_eq!(outcome.target_identifier, out.display().to_string());
        assert!(out.join("viewer-linux-x64-1-0.deb").is_file());
    }
}
