//! ICNS icon generation for macOS applications.
//!
//! The project icon is resized into an `.iconset` with `sips` and compiled
//! with `iconutil`. Both tools ship with macOS; elsewhere, or when either
//! fails, the original image is copied into the bundle instead.

use super::super::MessageSink;
use crate::bail;
use crate::bundler::{
    error::{Error, Result},
    utils::{
        fs,
        process::{run_process, summarize_output},
    },
};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

/// (pixel size, file name) of every image in an `.iconset`.
pub const ICONSET_IMAGES: [(u32, &str); 10] = [
    (16, "icon_16x16.png"),
    (32, "icon_16x16@2x.png"),
    (32, "icon_32x32.png"),
    (64, "icon_32x32@2x.png"),
    (128, "icon_128x128.png"),
    (256, "icon_128x128@2x.png"),
    (256, "icon_256x256.png"),
    (512, "icon_256x256@2x.png"),
    (512, "icon_512x512.png"),
    (1024, "icon_512x512@2x.png"),
];

/// Installs the app icon into `resources_dir` and returns its file name.
///
/// Tries to build `appicon.icns`; on failure copies `source` as-is and emits
/// a warning through `sink`.
pub async fn install_app_icon(
    source: &Path,
    staging_root: &Path,
    resources_dir: &Path,
    cancel: Option<&CancellationToken>,
    sink: &mut MessageSink<'_>,
) -> Result<String> {
    let installed = match create_icns_file(source, staging_root, cancel).await {
        Ok(icns) => icns,
        Err(e) => {
            log::warn!("Failed to generate .icns file: {}", e);
            sink(
                &format!("Warning: Failed to generate .icns file ({e}). Falling back to PNG."),
                None,
            );
            source.to_path_buf()
        }
    };

    let file_name = installed
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| Error::GenericError(format!("{} has no file name", installed.display())))?;
    fs::copy_file(&installed, &resources_dir.join(&file_name)).await?;
    Ok(file_name)
}

/// Builds `<staging_root>/appicon.icns` from `source`.
pub async fn create_icns_file(
    source: &Path,
    staging_root: &Path,
    cancel: Option<&CancellationToken>,
) -> Result<PathBuf> {
    let sips = require_tool("sips")?;
    let iconutil = require_tool("iconutil")?;

    let iconset = staging_root.join("icons.iconset");
    fs::create_dir_all(&iconset, true).await?;

    for (size, name) in ICONSET_IMAGES {
        let dest = iconset.join(name);
        let size = size.to_string();
        let args = [
            OsStr::new("-z"),
            OsStr::new(&size),
            OsStr::new(&size),
            source.as_os_str(),
            OsStr::new("--out"),
            dest.as_os_str(),
        ];
        let result = run_process(&sips, args, staging_root, cancel, |line| {
            log::debug!("[sips] {}", line)
        })
        .await;
        if !result.success {
            bail!(
                "Failed to resize icon to {}x{}: {}",
                size,
                size,
                summarize_output(&result.output)
            );
        }
    }

    let icns = staging_root.join("appicon.icns");
    let args = [
        OsStr::new("-c"),
        OsStr::new("icns"),
        iconset.as_os_str(),
        OsStr::new("-o"),
        icns.as_os_str(),
    ];
    let result = run_process(&iconutil, args, staging_root, cancel, |line| {
        log::debug!("[iconutil] {}", line)
    })
    .await;
    if !result.success {
        bail!(
            "Failed to create .icns file: {}",
            summarize_output(&result.output)
        );
    }

    Ok(icns)
}

/// Resolves a tool on `PATH`.
pub(super) fn require_tool(name: &str) -> Result<String> {
    which::which(name)
        .map(|path| path.to_string_lossy().into_owned())
        .map_err(|_| Error::GenericError(format!("{name} was not found on PATH")))
}
