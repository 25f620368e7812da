//! Debian package (.deb) bundler.
//!
//! A .deb file is an ar archive containing, in order:
//! - debian-binary: Format version (2.0)
//! - control.tar.gz: Package metadata (control)
//! - data.tar.gz: The publish output under `opt/<safe-name>/`

use super::super::{PackageContext, PackagedArtifact};
use crate::bundler::{
    archive::{
        TarGzBuilder,
        targz::{now, unix_seconds},
    },
    error::{Context, Error, ErrorExt, Result},
    target::Arch,
    utils::fs::{dir_size, remove_file_if_exists},
};
use crate::project::{ProjectDefinition, non_blank};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use walkdir::WalkDir;

const FALLBACK_PACKAGE_NAME: &str = "electronifier-app";
const FALLBACK_MAINTAINER: &str = "Electronifier";
const FALLBACK_DESCRIPTION: &str = "Packaged via Electronifier.";

/// Bundle the publish output as `<safe-name>-linux-<arch>-<safe-version>.deb`.
pub async fn bundle_project(ctx: PackageContext<'_>) -> Result<PackagedArtifact> {
    let deb_path = ctx.artifact_path("deb");
    log::info!("Bundling {} ({})", ctx.target.platform, deb_path.display());

    remove_file_if_exists(&deb_path).await?;

    let publish_dir = ctx.staged.publish_dir.clone();
    let install_root = format!("opt/{}", ctx.safe_name());
    let control = control_file(
        ctx.project,
        &ctx.safe_version(),
        ctx.target.arch,
        installed_size_kib(&publish_dir),
    );
    let output = deb_path.clone();

    tokio::task::spawn_blocking(move || {
        write_deb(&output, &control, &publish_dir, &install_root)
    })
    .await
    .map_err(|e| Error::GenericError(format!("Debian packaging task failed: {}", e)))??;

    Ok(PackagedArtifact {
        path: deb_path,
        note: None,
    })
}

/// Maps an architecture to its Debian name.
pub fn debian_arch(arch: Arch) -> &'static str {
    match arch {
        Arch::X64 => "amd64",
        Arch::X86 => "i386",
        Arch::Arm64 => "arm64",
        Arch::Arm => "armhf",
        Arch::Unknown => "amd64",
    }
}

/// Debian package name: lower-case, hyphenated.
pub fn package_name(project: &ProjectDefinition) -> String {
    match non_blank(Some(project.name.as_str())) {
        Some(name) => crate::bundler::utils::naming::sanitize_for_file_system(name).replace('_', "-"),
        None => FALLBACK_PACKAGE_NAME.to_string(),
    }
}

/// Renders the `control` file.
pub fn control_file(
    project: &ProjectDefinition,
    safe_version: &str,
    arch: Arch,
    installed_size: Option<u64>,
) -> String {
    let maintainer = project
        .author()
        .or_else(|| project.organization())
        .unwrap_or(FALLBACK_MAINTAINER);
    let description = project
        .description()
        .map(|d| d.lines().next().unwrap_or(d).trim())
        .unwrap_or(FALLBACK_DESCRIPTION);

    let mut control = String::new();
    control.push_str(&format!("Package: {}\n", package_name(project)));
    control.push_str(&format!("Version: {}\n", safe_version));
    control.push_str(&format!("Architecture: {}\n", debian_arch(arch)));
    if let Some(size) = installed_size {
        control.push_str(&format!("Installed-Size: {}\n", size));
    }
    control.push_str("Priority: optional\n");
    control.push_str("Section: misc\n");
    control.push_str(&format!("Maintainer: {}\n", maintainer));
    if let Some(url) = project.support_url() {
        control.push_str(&format!("Homepage: {}\n", url));
    }
    control.push_str(&format!("Description: {}\n", description));
    control
}

fn installed_size_kib(publish_dir: &Path) -> Option<u64> {
    match dir_size(publish_dir) {
        Ok(bytes) => Some(bytes.div_ceil(1024)),
        Err(e) => {
            log::debug!("Skipping Installed-Size: {}", e);
            None
        }
    }
}

fn write_deb(output: &Path, control: &str, publish_dir: &Path, install_root: &str) -> Result<()> {
    let mut control_tar = TarGzBuilder::new();
    control_tar.append_bytes("control", control.as_bytes(), 0o644, now())?;
    let control_tar = control_tar.finish().context("failed to build control.tar.gz")?;

    let data_tar = data_archive(publish_dir, install_root).context("failed to build data.tar.gz")?;

    let file = File::create(output).fs_context("creating deb package", output)?;
    let mtime = now();
    let members = [
        ("debian-binary", &b"2.0\n"[..]),
        ("control.tar.gz", &control_tar[..]),
        ("data.tar.gz", &data_tar[..]),
    ];
    let identifiers = members
        .iter()
        .map(|(name, _)| name.as_bytes().to_vec())
        .collect();
    // GNU variant: names are written as `debian-binary/`
    let mut builder = ar::GnuBuilder::new(BufWriter::new(file), identifiers);
    for (name, data) in members {
        builder
            .append(&member_header(name, data.len(), mtime), data)
            .fs_context("writing deb member", output)?;
    }

    let writer = builder.into_inner().fs_context("finishing deb package", output)?;
    let file = writer.into_inner().map_err(|e| Error::Fs {
        context: "flushing deb package",
        path: output.to_path_buf(),
        error: e.into_error(),
    })?;
    file.sync_all().fs_context("syncing deb package", output)?;
    Ok(())
}

/// Root-owned regular file header, as dpkg expects for every member.
fn member_header(name: &str, size: usize, mtime: u64) -> ar::Header {
    let mut header = ar::Header::new(name.as_bytes().to_vec(), size as u64);
    header.set_mtime(mtime);
    header.set_uid(0);
    header.set_gid(0);
    header.set_mode(0o100644);
    header
}

/// Builds `data.tar.gz` with `publish_dir` mounted at `install_root`.
fn data_archive(publish_dir: &Path, install_root: &str) -> Result<Vec<u8>> {
    let mut tar = TarGzBuilder::new();

    for entry in WalkDir::new(publish_dir).follow_links(true).sort_by_file_name() {
        let entry = entry?;
        let rel = entry.path().strip_prefix(publish_dir)?;
        let rel = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        let name = if rel.is_empty() {
            install_root.to_string()
        } else {
            format!("{install_root}/{rel}")
        };

        if entry.file_type().is_dir() {
            let mtime = entry
                .metadata()?
                .modified()
                .map(unix_seconds)
                .unwrap_or_else(|_| now());
            tar.append_dir(&name, 0o755, mtime)?;
        } else {
            tar.append_file(&name, entry.path(), 0o755)?;
        }
    }

    tar.finish()
}
