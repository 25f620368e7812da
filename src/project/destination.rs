//! Publication destinations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Where a release's artifacts are delivered.
///
/// The access token arrives here already decrypted; at-rest protection is the
/// job of whoever persists the project.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PublicationDestination {
    /// Copy artifacts into a directory on this machine
    LocalDirectory {
        /// Target directory, created when missing
        #[serde(default)]
        path: PathBuf,
    },
    /// Create a GitHub release and attach artifacts as assets
    GitHubRelease {
        /// Repository URL in https or ssh form
        #[serde(default)]
        repository_url: String,
        /// Personal access token with `contents: write`
        #[serde(default)]
        access_token: String,
    },
}

impl PublicationDestination {
    /// The destination's kind.
    pub fn kind(&self) -> PublicationDestinationType {
        match self {
            PublicationDestination::LocalDirectory { .. } => {
                PublicationDestinationType::LocalDirectory
            }
            PublicationDestination::GitHubRelease { .. } => {
                PublicationDestinationType::GitHubRelease
            }
        }
    }
}

// Manual impl keeps the token out of logs.
impl fmt::Debug for PublicationDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublicationDestination::LocalDirectory { path } => f
                .debug_struct("LocalDirectory")
                .field("path", path)
                .finish(),
            PublicationDestination::GitHubRelease {
                repository_url,
                access_token,
            } => f
                .debug_struct("GitHubRelease")
                .field("repository_url", repository_url)
                .field(
                    "access_token",
                    &if access_token.is_empty() {
                        "<unset>"
                    } else {
                        "<redacted>"
                    },
                )
                .finish(),
        }
    }
}

/// Kind of a [`PublicationDestination`], as reported in outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PublicationDestinationType {
    /// Local directory copy
    LocalDirectory,
    /// GitHub release
    GitHubRelease,
}

impl fmt::Display for PublicationDestinationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublicationDestinationType::LocalDirectory => f.write_str("LocalDirectory"),
            PublicationDestinationType::GitHubRelease => f.write_str("GitHubRelease"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_is_tagged_by_type() {
        let dest: PublicationDestination =
            serde_json::from_str(r#"{"type": "LocalDirectory", "path": "/srv/releases"}"#).unwrap();
        assert_eq!(
            dest,
            PublicationDestination::LocalDirectory {
                path: PathBuf::from("/srv/releases")
            }
        );
        assert_eq!(dest.kind(), PublicationDestinationType::LocalDirectory);
    }

    #[test]
    fn test_debug_redacts_token() {
        let dest = PublicationDestination::GitHubRelease {
            repository_url: "https://github.com/acme/viewer".into(),
            access_token: "ghp_secret".into(),
        };
        let rendered = format!("{dest:?}");
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("ghp_secret"));
    }
}
