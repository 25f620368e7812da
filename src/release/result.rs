//! Results of a release run.

use crate::project::{PlatformTarget, PublicationDestinationType};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

/// One packaged file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseArtifact {
    /// Platform the artifact installs on
    pub platform: PlatformTarget,
    /// Artifact on disk
    pub package_path: PathBuf,
    /// How the artifact was produced, when it differs from the norm
    pub packaging_note: Option<String>,
}

impl ReleaseArtifact {
    /// File name of the artifact.
    pub fn file_name(&self) -> String {
        self.package_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Result of publishing to one destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleasePublicationOutcome {
    /// Kind of destination
    pub destination_type: PublicationDestinationType,
    /// Directory path or repository URL, `<unset>` when missing
    pub target_identifier: String,
    /// Whether every artifact reached the destination
    pub success: bool,
    /// Human-readable detail
    pub detail: String,
}

impl ReleasePublicationOutcome {
    /// A successful outcome.
    pub fn succeeded(
        destination_type: PublicationDestinationType,
        target_identifier: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            destination_type,
            target_identifier: target_identifier.into(),
            success: true,
            detail: detail.into(),
        }
    }

    /// A failed outcome.
    pub fn failed(
        destination_type: PublicationDestinationType,
        target_identifier: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            destination_type,
            target_identifier: target_identifier.into(),
            success: false,
            detail: detail.into(),
        }
    }
}

/// Aggregate result of [`ReleaseAutomation::publish`](super::ReleaseAutomation::publish).
#[derive(Debug, Clone, Serialize)]
pub struct ReleaseAutomationResult {
    /// Packaged files, in target order
    pub artifacts: Vec<ReleaseArtifact>,
    /// One entry per destination attempted
    pub publications: Vec<ReleasePublicationOutcome>,
    /// At least one artifact and every publication succeeded
    pub success: bool,
    /// One-paragraph human summary
    pub summary: String,
    /// Completion time, set only on success
    pub published_at: Option<DateTime<Utc>>,
}

impl ReleaseAutomationResult {
    /// Assembles a result, deriving `success`, `summary` and `published_at`.
    pub fn new(
        artifacts: Vec<ReleaseArtifact>,
        publications: Vec<ReleasePublicationOutcome>,
    ) -> Self {
        let success = !artifacts.is_empty() && publications.iter().all(|p| p.success);
        let summary = summarize(&artifacts, &publications);
        Self {
            artifacts,
            publications,
            success,
            summary,
            published_at: success.then(Utc::now),
        }
    }
}

/// `Built N Photino artifact(s): <Platform> (<file>[ - note]), .... <target>: published | ...`
pub fn summarize(
    artifacts: &[ReleaseArtifact],
    publications: &[ReleasePublicationOutcome],
) -> String {
    let built = artifacts
        .iter()
        .map(|a| match &a.packaging_note {
            Some(note) => format!("{} ({} - {})", a.platform, a.file_name(), note),
            None => format!("{} ({})", a.platform, a.file_name()),
        })
        .collect::<Vec<_>>()
        .join(", ");
    let published = publications
        .iter()
        .map(|p| {
            if p.success {
                format!("{}: published", p.target_identifier)
            } else {
                format!("{}: failed - {}", p.target_identifier, p.detail)
            }
        })
        .collect::<Vec<_>>()
        .join(" | ");

    format!(
        "Built {} Photino artifact(s): {}. {}",
        artifacts.len(),
        built,
        published
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(platform: PlatformTarget, path: &str, note: Option<&str>) -> ReleaseArtifact {
        ReleaseArtifact {
            platform,
            package_path: PathBuf::from(path),
            packaging_note: note.map(str::to_string),
        }
    }

    #[test]
    fn test_summary_format() {
        let artifacts = vec![
            artifact(PlatformTarget::Linux, "/w/viewer-linux-x64-1-0.deb", None),
            artifact(
                PlatformTarget::Windows,
                "/w/viewer-windows-x64-1-0.zip",
                Some("MSI skipped"),
            ),
        ];
        let publications = vec![
            ReleasePublicationOutcome::succeeded(
                PublicationDestinationType::LocalDirectory,
                "/out",
                "Copied 2 artifact(s).",
            ),
            ReleasePublicationOutcome::failed(
                PublicationDestinationType::GitHubRelease,
                "https://github.com/acme/viewer",
                "GitHub access token is missing.",
            ),
        ];
        assert_eq!(
            summarize(&artifacts, &publications),
            "Built 2 Photino artifact(s): Linux (viewer-linux-x64-1-0.deb), \
             Windows (viewer-windows-x64-1-0.zip - MSI skipped). /out: published | \
             https://github.com/acme/viewer: failed - GitHub access token is missing."
        );
    }

    #[test]
    fn test_success_requires_artifacts_and_publications() {
        let ok = ReleasePublicationOutcome::succeeded(
            PublicationDestinationType::LocalDirectory,
            "/out",
            "Copied 0 artifact(s).",
        );
        let empty = ReleaseAutomationResult::new(Vec::new(), vec![ok.clone()]);
        assert!(!empty.success);
        assert!(empty.published_at.is_none());

        let built = ReleaseAutomationResult::new(
            vec![artifact(PlatformTarget::Linux, "/w/a.deb", None)],
            vec![ok],
        );
        assert!(built.success);
        assert!(built.published_at.is_some());
    }
}
