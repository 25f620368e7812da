//! Zip archive writer for directory trees.

use crate::bundler::error::{Context, ErrorExt, Result};
use std::fs::File;
use std::io;
use std::path::Path;
use walkdir::WalkDir;
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

/// Zips the contents of `src` into `dest`, replacing any existing file.
///
/// With `include_base_dir` the entries are rooted at the directory's own name
/// (`Viewer.app/Contents/...`); otherwise at its contents. Unix permission
/// bits are preserved so executables stay executable after extraction.
pub fn zip_directory(src: &Path, dest: &Path, include_base_dir: bool) -> Result<()> {
    let base = if include_base_dir {
        src.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .with_context(|| format!("{} has no directory name", src.display()))?
    } else {
        String::new()
    };

    let file = File::create(dest).fs_context("creating zip archive", dest)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .large_file(true);

    if include_base_dir {
        zip.add_directory(format!("{base}/"), options.unix_permissions(0o755))?;
    }

    for entry in WalkDir::new(src).follow_links(true).sort_by_file_name() {
        let entry = entry?;
        let rel = entry.path().strip_prefix(src)?;
        if rel.as_os_str().is_empty() {
            continue;
        }

        let rel_name = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        let name = if base.is_empty() {
            rel_name
        } else {
            format!("{base}/{rel_name}")
        };
        let mode = permissions_of(&entry);

        if entry.file_type().is_dir() {
            zip.add_directory(format!("{name}/"), options.unix_permissions(mode))?;
        } else {
            zip.start_file(name, options.unix_permissions(mode))?;
            let mut source =
                File::open(entry.path()).fs_context("opening file for zip", entry.path())?;
            io::copy(&mut source, &mut zip)?;
        }
    }

    zip.finish()?;
    Ok(())
}

#[cfg(unix)]
fn permissions_of(entry: &walkdir::DirEntry) -> u32 {
    use std::os::unix::fs::PermissionsExt;

    entry
        .metadata()
        .map(|m| m.permissions().mode() & 0o777)
        .unwrap_or(if entry.file_type().is_dir() { 0o755 } else { 0o644 })
}

#[cfg(not(unix))]
fn permissions_of(entry: &walkdir::DirEntry) -> u32 {
    if entry.file_type().is_dir() { 0o755 } else { 0o644 }
}
