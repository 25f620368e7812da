//! Platform-specific packaging.
//!
//! Each packager turns a staged `publish/` directory into one artifact file.
//!
//! | Platform | Artifact | Module |
//! |----------|----------|--------|
//! | macOS | `.dmg` (or `.zip` of the `.app` when `hdiutil` fails) | [`macos`] |
//! | Linux | `.deb` built in-process | [`linux`] |
//! | Windows | `.zip` of the publish output | [`windows`] |
//!
//! Artifacts are named `<safe-name>-<platform>-<arch>-<safe-version>.<ext>`
//! and written to the platform directory above the per-architecture staging
//! root. Every packager is compiled on every host; external tools are only
//! invoked at run time.

pub mod linux;
pub mod macos;
pub mod windows;

use crate::bundler::error::Result;
use crate::bundler::target::BuildTarget;
use crate::bundler::toolchain::StagedBuild;
use crate::bundler::utils::naming::sanitize_for_file_system;
use crate::project::{PlatformTarget, ProjectDefinition};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

/// Receives packaging messages, with a progress value for tool output.
pub type MessageSink<'a> = dyn FnMut(&str, Option<f64>) + Send + 'a;

/// Everything a packager needs to know about one target.
#[derive(Debug, Clone, Copy)]
pub struct PackageContext<'a> {
    /// Project being released
    pub project: &'a ProjectDefinition,
    /// Release version, unsanitized
    pub version: &'a str,
    /// Target being packaged
    pub target: &'a BuildTarget,
    /// Staged wrapper with its publish output
    pub staged: &'a StagedBuild,
    /// Cancellation for external tools
    pub cancel: Option<&'a CancellationToken>,
}

impl PackageContext<'_> {
    /// File-system safe project name.
    pub fn safe_name(&self) -> String {
        sanitize_for_file_system(&self.project.name)
    }

    /// File-system safe version.
    pub fn safe_version(&self) -> String {
        sanitize_for_file_system(self.version)
    }

    /// Output path for an artifact with extension `ext`.
    pub fn artifact_path(&self, ext: &str) -> PathBuf {
        self.staged.platform_dir().join(format!(
            "{}-{}-{}-{}.{}",
            self.safe_name(),
            self.target.platform.segment(),
            self.target.arch_label(),
            self.safe_version(),
            ext
        ))
    }
}

/// A finished artifact file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagedArtifact {
    /// Artifact on disk
    pub path: PathBuf,
    /// Informational note about how it was produced
    pub note: Option<String>,
}

/// Packages a staged target for its platform.
pub async fn package(ctx: PackageContext<'_>, sink: &mut MessageSink<'_>) -> Result<PackagedArtifact> {
    match ctx.target.platform {
        PlatformTarget::MacOs => macos::bundle_project(ctx, sink).await,
        PlatformTarget::Linux => linux::bundle_project(ctx).await,
        PlatformTarget::Windows => windows::bundle_project(ctx).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::target::Arch;

    #[test]
    fn test_artifact_naming() {
        let project = ProjectDefinition {
            name: "My App".into(),
            ..Default::default()
        };
        let target = BuildTarget {
            platform: PlatformTarget::Windows,
            arch: Arch::X86,
            source_path: PathBuf::from("/bin"),
        };
        let staged = StagedBuild {
            root: PathBuf::from("/work/my-app/1-2/windows/x86"),
            publish_dir: PathBuf::from("/work/my-app/1-2/windows/x86/publish"),
            icon_file: None,
        };
        let ctx = PackageContext {
            project: &project,
            version: "1.2",
            target: &target,
            staged: &staged,
            cancel: None,
        };
        assert_eq!(
            ctx.artifact_path("zip"),
            PathBuf::from("/work/my-app/1-2/windows/my-app-windows-x86-1-2.zip")
        );
    }
}
