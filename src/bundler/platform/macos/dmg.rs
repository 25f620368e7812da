//! macOS DMG disk image creator.
//!
//! Creates drag-to-install DMG files using the native hdiutil tool. The image
//! holds a copy of the .app bundle and an Applications symlink.

use super::super::{MessageSink, PackageContext};
use super::app::LAUNCHER_NAME;
use crate::bundler::{
    error::Result,
    utils::{fs, process::run_process},
};
use std::ffi::OsStr;
use std::path::Path;

/// Progress value attached to hdiutil output.
pub const DMG_PROGRESS: f64 = 0.70;

/// Builds `dmg_path` from `app_bundle`.
///
/// Returns `Ok(false)` when hdiutil is unavailable or fails; the caller then
/// falls back to the zipped bundle. Only staging I/O errors are returned.
pub async fn create_dmg(
    ctx: PackageContext<'_>,
    app_bundle: &Path,
    dmg_path: &Path,
    sink: &mut MessageSink<'_>,
) -> Result<bool> {
    let hdiutil = match super::icon::require_tool("hdiutil") {
        Ok(path) => path,
        Err(e) => {
            log::info!("Skipping DMG creation: {}", e);
            return Ok(false);
        }
    };

    log::info!("Creating DMG {}", dmg_path.display());

    let staging = ctx.staged.root.join("dmg-staging");
    fs::create_dir_all(&staging, true).await?;

    let bundle_name = app_bundle.file_name().unwrap_or(OsStr::new("App.app"));
    let staged_app = staging.join(bundle_name);
    fs::copy_dir(app_bundle, &staged_app).await?;
    fs::mark_executable(&staged_app.join("Contents/MacOS").join(LAUNCHER_NAME)).await?;

    if let Err(e) = fs::symlink_dir(Path::new("/Applications"), &staging.join("Applications")) {
        log::debug!("Could not create Applications symlink: {}", e);
    }

    let args = [
        OsStr::new("create"),
        OsStr::new("-fs"),
        OsStr::new("HFS+"),
        OsStr::new("-srcfolder"),
        staging.as_os_str(),
        OsStr::new("-volname"),
        OsStr::new(&ctx.project.name),
        OsStr::new("-ov"),
        OsStr::new("-format"),
        OsStr::new("UDZO"),
        dmg_path.as_os_str(),
    ];
    let result = run_process(&hdiutil, args, &ctx.staged.root, ctx.cancel, |line| {
        sink(line, Some(DMG_PROGRESS))
    })
    .await;

    if result.success && dmg_path.is_file() {
        Ok(true)
    } else {
        log::warn!("hdiutil did not produce {}", dmg_path.display());
        Ok(false)
    }
}
