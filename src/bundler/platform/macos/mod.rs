//! macOS packaging for `.app` bundles and DMG disk images.
//!
//! The `.app` is assembled in the staging root, zipped as a fallback artifact,
//! then copied into a drag-to-install folder that `hdiutil` turns into a
//! compressed disk image. Exactly one of the two files is returned: the
//! `.dmg` when `hdiutil` succeeds, the `.zip` otherwise.
//!
//! # Build Requirements
//!
//! | Step | Tool | On failure |
//! |------|------|------------|
//! | Icon resize | `sips` | original icon is copied |
//! | Icon conversion | `iconutil` | original icon is copied |
//! | Disk image | `hdiutil` | `.zip` of the `.app` is returned |

pub mod app;
pub mod dmg;
pub mod icon;

use super::{MessageSink, PackageContext, PackagedArtifact};
use crate::bundler::{archive::zip_directory, error::Result, utils::fs};

/// Builds the `.app` and returns a `.dmg`, or a `.zip` of the bundle.
pub async fn bundle_project(
    ctx: PackageContext<'_>,
    sink: &mut MessageSink<'_>,
) -> Result<PackagedArtifact> {
    let app_bundle = app::bundle_project(ctx, sink).await?;

    let zip_path = ctx.artifact_path("zip");
    let dmg_path = ctx.artifact_path("dmg");
    fs::remove_file_if_exists(&zip_path).await?;
    fs::remove_file_if_exists(&dmg_path).await?;

    let src = app_bundle.clone();
    let dest = zip_path.clone();
    tokio::task::spawn_blocking(move || zip_directory(&src, &dest, true)).await??;

    if dmg::create_dmg(ctx, &app_bundle, &dmg_path, sink).await? {
        fs::remove_file_if_exists(&zip_path).await?;
        return Ok(PackagedArtifact {
            path: dmg_path,
            note: None,
        });
    }

    fs::remove_file_if_exists(&dmg_path).await?;
    log::info!("Using {} as the macOS artifact", zip_path.display());
    Ok(PackagedArtifact {
        path: zip_path,
        note: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::target::{Arch, BuildTarget};
    use crate::bundler::toolchain::StagedBuild;
    use crate::project::{PlatformTarget, ProjectDefinition};

    #[tokio::test]
    async fn test_exactly_one_artifact() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("viewer/1-0/macos/arm64");
        let publish = root.join("publish");
        std::fs::create_dir_all(&publish).unwrap();
        std::fs::write(publish.join("PhotinoWrapper"), b"\xcf\xfa\xed\xfe").unwrap();

        let project = ProjectDefinition {
            name: "Viewer".into(),
            ..Default::default()
        };
        let target = BuildTarget {
            platform: PlatformTarget::MacOs,
            arch: Arch::Arm64,
            source_path: tmp.path().to_path_buf(),
        };
        let staged = StagedBuild {
            root,
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

        let mut messages = Vec::new();
        let artifact = bundle_project(ctx, &mut |m: &str, _: Option<f64>| {
            messages.push(m.to_string())
        })
        .await
        .unwrap();

        let zip = ctx.artifact_path("zip");
        let dmg = ctx.artifact_path("dmg");
        assert!(artifact.path == zip || artifact.path == dmg);
        assert!(artifact.path.is_file());
        assert_ne!(zip.exists(), dmg.exists());
        assert!(artifact.note.is_none());
    }
}
