//! Local directory destination.

use super::PublishError;
use crate::release::ReleaseArtifact;
use std::path::Path;

/// Copies every artifact into `dir` by file name, overwriting existing files.
///
/// Returns the number of files copied.
pub async fn publish_to_directory(
    dir: &Path,
    artifacts: &[ReleaseArtifact],
) -> Result<usize, PublishError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| PublishError::Io {
            context: "creating directory",
            path: dir.to_path_buf(),
            source,
        })?;

    for artifact in artifacts {
        let Some(name) = artifact.package_path.file_name() else {
            continue;
        };
        let dest = dir.join(name);
        log::debug!(
            "Copying {} to {}",
            artifact.package_path.display(),
            dest.display()
        );
        tokio::fs::copy(&artifact.package_path, &dest)
            .await
            .map_err(|source| PublishError::Io {
                context: "copying artifact",
                path: artifact.package_path.clone(),
                source,
            })?;
    }

    Ok(artifacts.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::PlatformTarget;

    #[tokio::test]
    async fn test_republish_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let mut artifacts = Vec::new();
        for name in ["a.deb", "b.zip"] {
            let path = tmp.path().join(name);
            std::fs::write(&path, name).unwrap();
            artifacts.push(ReleaseArtifact {
                platform: PlatformTarget::Linux,
                package_path: path,
                packaging_note: None,
            });
        }
        let out = tmp.path().join("nested/out");

        assert_eq!(publish_to_directory(&out, &artifacts).await.unwrap(), 2);
        assert_eq!(publish_to_directory(&out, &artifacts).await.unwrap(), 2);

        let mut names: Vec<String> = std::fs::read_dir(&out)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, ["a.deb", "b.zip"]);
        assert_eq!(std::fs::read_to_string(out.join("a.deb")).unwrap(), "a.deb");
    }
}
