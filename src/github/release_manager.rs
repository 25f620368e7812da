//! GitHub Release creation and asset upload over the REST API.

use crate::config::PipelineConfig;
use crate::publish::{PublishError, PublishRequest};
use crate::release::ReleaseArtifact;
use regex::Regex;
use reqwest::header::{ACCEPT, CONTENT_LENGTH, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;
use tokio_util::io::ReaderStream;

const GITHUB_JSON: &str = "application/vnd.github+json";

static REPOSITORY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)github\.com[:/](?P<owner>[^/]+)/(?P<repo>[^/]+?)(?:\.git)?(?:/|$)")
        .expect("repository regex is valid")
});

/// Owner and name of a GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubRepository {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
}

/// Extracts owner and repository from an https or ssh URL.
///
/// A trailing `.git` is ignored.
pub fn parse_github_repository(url: &str) -> Option<GitHubRepository> {
    let captures = REPOSITORY_PATTERN.captures(url.trim())?;
    Some(GitHubRepository {
        owner: captures.name("owner")?.as_str().to_string(),
        repo: captures.name("repo")?.as_str().to_string(),
    })
}

/// Tag name for a version: `v` prefixed unless it already starts with `v`/`V`.
pub fn release_tag(version: &str) -> String {
    let version = version.trim();
    if version.starts_with(['v', 'V']) {
        version.to_string()
    } else {
        format!("v{version}")
    }
}

/// Detect MIME type for bundle artifacts
pub fn detect_bundle_content_type(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("deb") => "application/vnd.debian.binary-package",
        Some("exe") => "application/x-msdownload",
        Some("dmg") => "application/x-apple-diskimage",
        Some("zip") => "application/zip",
        Some("tar") | Some("gz") | Some("tgz") => "application/gzip",
        _ => "application/octet-stream",
    }
}

#[derive(Debug, Serialize)]
struct CreateReleaseRequest<'a> {
    tag_name: &'a str,
    name: &'a str,
    body: &'a str,
    draft: bool,
    prerelease: bool,
}

#[derive(Debug, Deserialize)]
struct CreatedRelease {
    upload_url: Option<String>,
}

/// Publishes artifacts as a GitHub release
pub struct GitHubReleasePublisher {
    client: reqwest::Client,
    api_base: String,
}

impl GitHubReleasePublisher {
    /// Create a publisher on a shared `client` against the configured API base
    pub fn new(client: reqwest::Client, config: &PipelineConfig) -> Self {
        Self {
            client,
            api_base: config.github_api_base.trim_end_matches('/').to_string(),
        }
    }

    /// Creates the release and uploads every artifact in order.
    ///
    /// Returns the number of uploaded assets. Assets uploaded before a
    /// failure stay on the release.
    pub async fn publish(
        &self,
        repository_url: &str,
        access_token: &str,
        request: PublishRequest<'_>,
        artifacts: &[ReleaseArtifact],
    ) -> Result<usize, PublishError> {
        let access_token = access_token.trim();
        if access_token.is_empty() {
            return Err(PublishError::MissingCredential(
                "GitHub access token is missing.".to_string(),
            ));
        }
        let repository =
            parse_github_repository(repository_url).ok_or(PublishError::InvalidRepositoryReference)?;

        let upload_url = self
            .create_release(&repository, access_token, request)
            .await?;

        for artifact in artifacts {
            self.upload_asset(&upload_url, access_token, &artifact.package_path)
                .await?;
        }

        Ok(artifacts.len())
    }

    /// Create a GitHub release and return its upload URL template
    async fn create_release(
        &self,
        repository: &GitHubRepository,
        access_token: &str,
        request: PublishRequest<'_>,
    ) -> Result<String, PublishError> {
        let tag_name = release_tag(request.version);
        let name = format!("{} {}", request.app_name, request.version);
        let body = match request.release_notes {
            Some(notes) => notes.to_string(),
            None => format!("Automatic release for {}.", request.app_name),
        };
        let url = format!(
            "{}/repos/{}/{}/releases",
            self.api_base, repository.owner, repository.repo
        );

        log::info!(
            "Creating GitHub release {} on {}/{}",
            tag_name,
            repository.owner,
            repository.repo
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(access_token)
            .header(ACCEPT, GITHUB_JSON)
            .json(&CreateReleaseRequest {
                tag_name: &tag_name,
                name: &name,
                body: &body,
                draft: false,
                prerelease: false,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::ReleaseCreationFailed { status, body });
        }

        let created: CreatedRelease = response.json().await?;
        created
            .upload_url
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| PublishError::InvalidResponse("release has no upload_url".to_string()))
    }

    /// Streams one file to the release's upload endpoint
    async fn upload_asset(
        &self,
        upload_url: &str,
        access_token: &str,
        path: &Path,
    ) -> Result<(), PublishError> {
        let asset = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| PublishError::InvalidResponse(format!("{} has no file name", path.display())))?;

        let base = upload_url.split('{').next().unwrap_or(upload_url);
        let mut url = url::Url::parse(base)
            .map_err(|e| PublishError::InvalidResponse(format!("invalid upload_url {base}: {e}")))?;
        url.query_pairs_mut().append_pair("name", &asset);

        let file = tokio::fs::File::open(path)
            .await
            .map_err(|source| artifact_error("opening artifact", path, source))?;
        let size = file
            .metadata()
            .await
            .map_err(|source| artifact_error("reading artifact metadata", path, source))?
            .len();

        log::info!("Uploading {} ({} bytes)", asset, size);

        let response = self
            .client
            .post(url)
            .bearer_auth(access_token)
            .header(ACCEPT, GITHUB_JSON)
            .header(CONTENT_TYPE, detect_bundle_content_type(path))
            .header(CONTENT_LENGTH, size)
            .body(reqwest::Body::wrap_stream(ReaderStream::new(file)))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::AssetUploadFailed {
                asset,
                status,
                body,
            });
        }
        Ok(())
    }
}

fn artifact_error(context: &'static str, path: &Path, source: std::io::Error) -> PublishError {
    PublishError::Io {
        context,
        path: path.to_path_buf(),
        source,
    }
}

impl std::fmt::Debug for GitHubReleasePublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubReleasePublisher")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_repository_forms() {
        let expected = Some(GitHubRepository {
            owner: "acme".into(),
            repo: "viewer".into(),
        });
        assert_eq!(parse_github_repository("https://github.com/acme/viewer"), expected);
        assert_eq!(parse_github_repository("https://github.com/acme/viewer.git"), expected);
        assert_eq!(parse_github_repository("git@github.com:acme/viewer.git"), expected);
        assert_eq!(parse_github_repository("HTTPS://GitHub.com/acme/viewer/"), expected);
        assert_eq!(
            parse_github_repository("https://github.com/acme/viewer/releases/latest"),
            expected
        );
        assert_eq!(parse_github_repository("https://gitlab.com/acme/viewer"), None);
        assert_eq!(parse_github_repository("https://github.com/acme"), None);
    }

    #[test]
    fn test_parse_dotted_repository_name() {
        let expected = Some(GitHubRepository {
            owner: "acme".into(),
            repo: "my.app".into(),
        });
        assert_eq!(parse_github_repository("https://github.com/acme/my.app"), expected);
        assert_eq!(parse_github_repository("https://github.com/acme/my.app.git"), expected);
        assert_eq!(parse_github_repository("git@github.com:acme/my.app.git/"), expected);
        assert_eq!(
            parse_github_repository("https://github.com/acme/acme.github.io")
                .map(|r| r.repo),
            Some("acme.github.io".to_string())
        );
    }

    #[test]
    fn test_release_tag() {
        assert_eq!(release_tag("2.1.0"), "v2.1.0");
        assert_eq!(release_tag("v3.0.0"), "v3.0.0");
        assert_eq!(release_tag("V3.0.0"), "V3.0.0");
    }

    #[test]
    fn test_content_types() {
        assert_eq!(
            detect_bundle_content_type(Path::new("a.deb")),
            "application/vnd.debian.binary-package"
        );
        assert_eq!(
            detect_bundle_content_type(Path::new("a.DMG")),
            "application/x-apple-diskimage"
        );
        assert_eq!(detect_bundle_content_type(Path::new("a.zip")), "application/zip");
        assert_eq!(
            detect_bundle_content_type(Path::new("a.bin")),
            "application/octet-stream"
        );
    }
}
