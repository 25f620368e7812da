//! Project, release and launch configuration models.
//!
//! These are the inputs of a release run. They are produced by whatever
//! front end owns the project (the desktop editor, or a JSON manifest handed
//! to the command line driver) and are treated as read-only by the pipeline.
//! Blank strings and empty paths are treated as "not set" throughout.

mod destination;
mod launch;

pub use destination::{PublicationDestination, PublicationDestinationType};
pub use launch::{LaunchOptions, LaunchPosition};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Operating system family an artifact is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlatformTarget {
    /// Apple macOS (.app bundle inside a .dmg, or a .zip fallback)
    #[serde(rename = "macOS", alias = "macos", alias = "MacOS")]
    MacOs,
    /// Microsoft Windows (.zip of the publish output)
    #[serde(alias = "windows")]
    Windows,
    /// Debian-family Linux (.deb)
    #[serde(alias = "linux")]
    Linux,
}

impl PlatformTarget {
    /// Every supported platform, in the order releases default to.
    pub const ALL: [PlatformTarget; 3] = [
        PlatformTarget::MacOs,
        PlatformTarget::Windows,
        PlatformTarget::Linux,
    ];

    /// Lower-case segment used in staging paths and artifact file names.
    pub fn segment(&self) -> &'static str {
        match self {
            PlatformTarget::MacOs => "macos",
            PlatformTarget::Windows => "windows",
            PlatformTarget::Linux => "linux",
        }
    }
}

impl fmt::Display for PlatformTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlatformTarget::MacOs => "macOS",
            PlatformTarget::Windows => "Windows",
            PlatformTarget::Linux => "Linux",
        };
        f.write_str(name)
    }
}

/// Per-project publication preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PublicationSettings {
    /// Platforms used when a release does not name any
    pub default_platform_targets: Vec<PlatformTarget>,
    /// Launch configuration stored with the project
    pub launch_configuration: LaunchOptions,
    /// Script the wrapper runs before opening its window
    pub execution_script: Option<String>,
}

impl Default for PublicationSettings {
    fn default() -> Self {
        Self {
            default_platform_targets: PlatformTarget::ALL.to_vec(),
            launch_configuration: LaunchOptions::default(),
            execution_script: None,
        }
    }
}

/// The application being packaged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectDefinition {
    /// Stable project identifier
    pub id: String,
    /// Display name, also the source of every sanitized file name
    pub name: String,
    /// Current project version (informational; releases carry their own)
    pub version: Option<String>,
    /// Short description used in package metadata
    pub description: Option<String>,
    /// Explicit bundle identifier, e.g. `com.example.viewer`
    pub namespace: Option<String>,
    /// Publishing organization
    pub organization: Option<String>,
    /// Package maintainer
    pub author: Option<String>,
    /// Project homepage or support page
    pub support_url: Option<String>,
    /// Support contact address
    pub support_email: Option<String>,
    /// Source image for the application icon
    pub icon_path: Option<PathBuf>,
    /// Fallback binaries for any platform that has no specific path
    pub bin_path: Option<PathBuf>,
    /// macOS arm64 binaries
    pub mac_bin_path: Option<PathBuf>,
    /// macOS x64 binaries
    pub mac_bin_path_x64: Option<PathBuf>,
    /// Windows x64 binaries
    pub windows_bin_path: Option<PathBuf>,
    /// Windows x86 binaries
    pub windows_bin_path_x86: Option<PathBuf>,
    /// Linux x64 binaries
    pub linux_bin_path: Option<PathBuf>,
    /// Publication preferences
    pub publication_settings: PublicationSettings,
}

impl ProjectDefinition {
    /// Description, if one is set.
    pub fn description(&self) -> Option<&str> {
        non_blank(self.description.as_deref())
    }

    /// Bundle namespace, if one is set.
    pub fn namespace(&self) -> Option<&str> {
        non_blank(self.namespace.as_deref())
    }

    /// Organization, if one is set.
    pub fn organization(&self) -> Option<&str> {
        non_blank(self.organization.as_deref())
    }

    /// Author, if one is set.
    pub fn author(&self) -> Option<&str> {
        non_blank(self.author.as_deref())
    }

    /// Support URL, if one is set.
    pub fn support_url(&self) -> Option<&str> {
        non_blank(self.support_url.as_deref())
    }

    /// Icon source path, if one is set.
    pub fn icon_path(&self) -> Option<&Path> {
        usable_path(self.icon_path.as_deref())
    }

    /// Execution script, if one is set.
    pub fn execution_script(&self) -> Option<&str> {
        non_blank(self.publication_settings.execution_script.as_deref())
    }
}

/// One release of a project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectRelease {
    /// Version string, free-form (`1.2.0`, `v3.0.0-beta`)
    pub version: String,
    /// Release notes used as the remote release body
    pub release_notes: Option<String>,
    /// Platforms requested for this release; empty means the project defaults
    pub platforms: Vec<PlatformTarget>,
    /// Where artifacts go once built
    pub publication_destination: Option<PublicationDestination>,
    /// Set by the caller after a successful run
    pub published_at: Option<DateTime<Utc>>,
}

impl ProjectRelease {
    /// Release notes, if any were written.
    pub fn release_notes(&self) -> Option<&str> {
        non_blank(self.release_notes.as_deref())
    }

    /// Records the publication timestamp of a successful run.
    pub fn mark_published(&mut self, at: DateTime<Utc>) {
        self.published_at = Some(at);
    }
}

/// Returns `value` unless it is empty or whitespace.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Returns `path` unless it is empty.
pub(crate) fn usable_path(path: Option<&Path>) -> Option<&Path> {
    path.filter(|p| !p.as_os_str().is_empty())
}
