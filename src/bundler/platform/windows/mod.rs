//! Windows packaging.
//!
//! The publish output is zipped as-is (no base directory), so extracting the
//! archive yields the wrapper executable and its runtime side by side. MSI
//! packaging is not produced; the artifact carries a note saying so.

use super::{PackageContext, PackagedArtifact};
use crate::bundler::{archive::zip_directory, error::Result, utils::fs};

const NOTE_ON_WINDOWS: &str = "MSI packaging requires WiX v4 CLI; produced ZIP fallback.";
const NOTE_ELSEWHERE: &str = "MSI packaging not implemented in this environment; produced ZIP instead.";

/// Zips the publish output into `<safe-name>-windows-<arch>-<safe-version>.zip`.
pub async fn bundle_project(ctx: PackageContext<'_>) -> Result<PackagedArtifact> {
    let zip_path = ctx.artifact_path("zip");
    log::info!("Bundling {} ({})", ctx.target.platform, zip_path.display());

    fs::remove_file_if_exists(&zip_path).await?;
    let src = ctx.staged.publish_dir.clone();
    let dest = zip_path.clone();
    tokio::task::spawn_blocking(move || zip_directory(&src, &dest, false)).await??;

    Ok(PackagedArtifact {
        path: zip_path,
        note: Some(packaging_note().to_string()),
    })
}

fn packaging_note() -> &'static str {
    if cfg!(windows) {
        NOTE_ON_WINDOWS
    } else {
        NOTE_ELSEWHERE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::target::{Arch, BuildTarget};
    use crate::bundler::toolchain::StagedBuild;
    use crate::project::{PlatformTarget, ProjectDefinition};
    use std::fs::File;

    #[tokio::test]
    async fn test_zip_has_no_base_dir_and_a_note() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("viewer/1-0/windows/x64");
        let publish = root.join("publish");
        std::fs::create_dir_all(publish.join("wwwroot")).unwrap();
        std::fs::write(publish.join("PhotinoWrapper.exe"), b"MZ").unwrap();
        std::fs::write(publish.join("wwwroot/index.html"), b"<html/>").unwrap();

        let project = ProjectDefinition {
            name: "Viewer".into(),
            ..Default::default()
        };
        let target = BuildTarget {
            platform: PlatformTarget::Windows,
            arch: Arch::X64,
            source_path: tmp.path().to_path_buf(),
        };
        let staged = StagedBuild {
            root: root.clone(),
            publish_dir: publish,
            icon_file: None,
        };
        let ctx = PackageContext {
            project: &project,
            version: "1.0",
            target: &target,
            staged: &staged,
            cancel: None,
        };

        let artifact = bundle_project(ctx).await.unwrap();
        assert_eq!(
            artifact.path,
            tmp.path().join("viewer/1-0/windows/viewer-windows-x64-1-0.zip")
        );
        assert_eq!(artifact.note.as_deref(), Some(packaging_note()));

        let archive = zip::ZipArchive::new(File::open(&artifact.path).unwrap()).unwrap();
        let names: Vec<&str> = archive.file_names().collect();
        assert!(names.contains(&"PhotinoWrapper.exe"));
        assert!(names.contains(&"wwwroot/index.html"));
    }
}
