//! Release manifest loading.

use crate::error::{ConfigurationError, ReleaseError};
use crate::project::{LaunchOptions, ProjectDefinition, ProjectRelease, PublicationDestination};
use serde::Deserialize;
use std::path::Path;

/// Environment variables consulted for a missing GitHub token, in order.
const TOKEN_VARIABLES: [&str; 2] = ["GH_TOKEN", "GITHUB_TOKEN"];

/// Everything one CLI release run needs, as stored on disk.
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseManifest {
    /// Application being packaged
    pub project: ProjectDefinition,
    /// Release request
    pub release: ProjectRelease,
    /// Window options; the project's launch configuration when absent
    #[serde(default)]
    pub launch_options: Option<LaunchOptions>,
}

impl ReleaseManifest {
    /// Reads and parses a manifest file.
    pub fn load(path: &Path) -> Result<Self, ReleaseError> {
        let invalid = |reason: String| ConfigurationError::InvalidManifest {
            path: path.to_path_buf(),
            reason,
        };
        let text = std::fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
        let manifest = serde_json::from_str(&text).map_err(|e| invalid(e.to_string()))?;
        Ok(manifest)
    }

    /// Effective launch options.
    pub fn launch_options(&self) -> &LaunchOptions {
        self.launch_options
            .as_ref()
            .unwrap_or(&self.project.publication_settings.launch_configuration)
    }

    /// Fills a blank GitHub access token from `GH_TOKEN` or `GITHUB_TOKEN`.
    pub fn fill_token_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(PublicationDestination::GitHubRelease { access_token, .. }) =
            &mut self.release.publication_destination
            && access_token.trim().is_empty()
            && let Some(token) = TOKEN_VARIABLES
                .iter()
                .filter_map(|key| lookup(key))
                .find(|value| !value.trim().is_empty())
        {
            log::debug!("Using GitHub token from environment");
            *access_token = token;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::PlatformTarget;

    const MANIFEST: &str = r#"{
        "project": {
            "name": "Viewer",
            "linux_bin_path": "/opt/viewer/bin",
            "publication_settings": {
                "launch_configuration": { "width": 640, "height": 480 }
            }
        },
        "release": {
            "version": "2.1.0",
            "platforms": ["Linux"],
            "publication_destination": {
                "type": "GitHubRelease",
                "repository_url": "https://github.com/acme/viewer"
            }
        }
    }"#;

    fn write_manifest(text: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("release.json");
        std::fs::write(&path, text).unwrap();
        (tmp, path)
    }

    #[test]
    fn test_load_defaults_launch_options_to_project() {
        let (_tmp, path) = write_manifest(MANIFEST);
        let manifest = ReleaseManifest::load(&path).unwrap();
        assert_eq!(manifest.release.platforms, vec![PlatformTarget::Linux]);
        assert_eq!(manifest.launch_options().width, 640);
        assert_eq!(manifest.launch_options().height, 480);
    }

    #[test]
    fn test_blank_token_is_filled_from_environment() {
        let (_tmp, path) = write_manifest(MANIFEST);
        let mut manifest = ReleaseManifest::load(&path).unwrap();
        manifest.fill_token_from(|key| match key {
            "GH_TOKEN" => Some("  ".to_string()),
            "GITHUB_TOKEN" => Some("ghp_secret".to_string()),
            _ => None,
        });
        match manifest.release.publication_destination {
            Some(PublicationDestination::GitHubRelease { access_token, .. }) => {
                assert_eq!(access_token, "ghp_secret")
            }
            other => panic!("unexpected destination: {other:?}"),
        }
    }

    #[test]
    fn test_explicit_token_is_kept() {
        let text = MANIFEST.replace(
            r#""repository_url": "https://github.com/acme/viewer""#,
            r#""repository_url": "https://github.com/acme/viewer", "access_token": "mine""#,
        );
        let (_tmp, path) = write_manifest(&text);
        let mut manifest = ReleaseManifest::load(&path).unwrap();
        manifest.fill_token_from(|_| Some("from-env".to_string()));
        assert!(matches!(
            manifest.release.publication_destination,
            Some(PublicationDestination::GitHubRelease { ref access_token, .. }) if access_token == "mine"
        ));
    }

    #[test]
    fn test_unreadable_manifest_is_a_configuration_error() {
        let err = ReleaseManifest::load(Path::new("/no/such/release.json")).unwrap_err();
        assert!(matches!(
            err,
            ReleaseError::Configuration(ConfigurationError::InvalidManifest { .. })
        ));

        let (_tmp, path) = write_manifest("{ not json");
        assert!(matches!(
            ReleaseManifest::load(&path),
            Err(ReleaseError::Configuration(ConfigurationError::InvalidManifest { .. }))
        ));
    }
}
