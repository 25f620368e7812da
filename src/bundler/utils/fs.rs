//! File system utilities for staging and packaging.
//!
//! Provides file operations with automatic directory creation,
//! symlink preservation, and path-carrying errors.

use crate::bundler::error::{Error, ErrorExt, Result};
use std::{io, path::Path};
use tokio::fs;

/// Creates all of the directories of the specified path, erasing it first if specified.
pub async fn create_dir_all(path: &Path, erase: bool) -> Result<()> {
    if erase {
        remove_dir_all(path).await?;
    }
    fs::create_dir_all(path)
        .await
        .fs_context("creating directory", path)
}

/// Removes the directory and its contents if it exists.
pub async fn remove_dir_all(path: &Path) -> Result<()> {
    if fs::try_exists(path).await.unwrap_or(false) {
        fs::remove_dir_all(path)
            .await
            .fs_context("removing directory", path)
    } else {
        Ok(())
    }
}

/// Removes a file if it exists.
pub async fn remove_file_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::Fs {
            context: "removing file",
            path: path.to_path_buf(),
            error: e,
        }),
    }
}

/// Makes a symbolic link to a directory.
#[cfg(unix)]
pub fn symlink_dir(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(src, dst)
}

/// Makes a symbolic link to a directory.
#[cfg(windows)]
pub fn symlink_dir(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_dir(src, dst)
}

/// Makes a symbolic link to a file.
#[cfg(unix)]
fn symlink_file(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(src, dst)
}

/// Makes a symbolic link to a file.
#[cfg(windows)]
fn symlink_file(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(src, dst)
}

/// Copies a regular file, creating any parent directories of the destination
/// and overwriting an existing destination file.
///
/// Fails if the source path is a directory or doesn't exist.
pub async fn copy_file(from: &Path, to: &Path) -> Result<()> {
    if !from.is_file() {
        return Err(Error::GenericError(format!(
            "{} does not exist or is not a file",
            from.display()
        )));
    }
    if let Some(dest_dir) = to.parent() {
        fs::create_dir_all(dest_dir)
            .await
            .fs_context("creating directory", dest_dir)?;
    }
    fs::copy(from, to).await.fs_context("copying file", from)?;
    Ok(())
}

/// Recursively copies a directory into `to`, creating it as needed.
///
/// Existing files in the destination are overwritten. Symlinks are recreated
/// rather than followed.
pub async fn copy_dir(from: &Path, to: &Path) -> Result<()> {
    if !from.is_dir() {
        return Err(Error::GenericError(format!(
            "{} does not exist or is not a directory",
            from.display()
        )));
    }
    fs::create_dir_all(to)
        .await
        .fs_context("creating directory", to)?;

    for entry in walkdir::WalkDir::new(from) {
        let entry = entry?;
        let rel_path = entry.path().strip_prefix(from)?;
        if rel_path.as_os_str().is_empty() {
            continue;
        }
        let dest_path = to.join(rel_path);

        if entry.file_type().is_symlink() {
            let target = fs::read_link(entry.path())
                .await
                .fs_context("reading symlink", entry.path())?;
            remove_file_if_exists(&dest_path).await?;
            let linked = if entry.path().is_dir() {
                symlink_dir(&target, &dest_path)
            } else {
                symlink_file(&target, &dest_path)
            };
            linked.fs_context("creating symlink", &dest_path)?;
        } else if entry.file_type().is_dir() {
            fs::create_dir_all(&dest_path)
                .await
                .fs_context("creating directory", &dest_path)?;
        } else {
            fs::copy(entry.path(), &dest_path)
                .await
                .fs_context("copying file", entry.path())?;
        }
    }

    Ok(())
}

/// Adds execute permission for user, group and other.
#[cfg(unix)]
pub async fn mark_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = fs::metadata(path)
        .await
        .fs_context("reading permissions", path)?;
    let mode = metadata.permissions().mode() | 0o111;
    fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
        .await
        .fs_context("setting executable permission", path)
}

/// Adds execute permission for user, group and other.
#[cfg(not(unix))]
pub async fn mark_executable(_path: &Path) -> Result<()> {
    Ok(())
}

/// Total size in bytes of the regular files below `dir`.
pub fn dir_size(dir: &Path) -> Result<u64> {
    let mut total = 0u64;
    for entry in walkdir::WalkDir::new(dir) {
        let entry = entry?;
        if entry.file_type().is_file() {
            total += entry.metadata()?.len();
        }
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_copy_dir_overwrites_and_nests() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("src");
        std::fs::create_dir_all(src.join("wwwroot/js")).unwrap();
        std::fs::write(src.join("app.dll"), b"new").unwrap();
        std::fs::write(src.join("wwwroot/js/site.js"), b"js").unwrap();

        let dst = tmp.path().join("dst");
        std::fs::create_dir_all(&dst).unwrap();
        std::fs::write(dst.join("app.dll"), b"old contents").unwrap();

        copy_dir(&src, &dst).await.unwrap();

        assert_eq!(std::fs::read(dst.join("app.dll")).unwrap(), b"new");
        assert_eq!(std::fs::read(dst.join("wwwroot/js/site.js")).unwrap(), b"js");
    }

    #[tokio::test]
    async fn test_copy_file_rejects_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let err = copy_file(tmp.path(), &tmp.path().join("out")).await;
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn test_create_dir_all_erases() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("stage");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("stale.txt"), b"x").unwrap();

        create_dir_all(&dir, true).await.unwrap();

        assert!(dir.is_dir());
        assert!(!dir.join("stale.txt").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_mark_executable_sets_all_bits() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("launcher");
        std::fs::write(&file, b"#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&file, std::fs::Permissions::from_mode(0o644)).unwrap();

        mark_executable(&file).await.unwrap();

        let mode = std::fs::metadata(&file).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[test]
    fn test_dir_size_counts_files() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("a")).unwrap();
        std::fs::write(tmp.path().join("a/one"), vec![0u8; 10]).unwrap();
        std::fs::write(tmp.path().join("two"), vec![0u8; 5]).unwrap();
        assert_eq!(dir_size(tmp.path()).unwrap(), 15);
    }
}
