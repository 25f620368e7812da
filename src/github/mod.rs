//! GitHub integration for release publication

mod release_manager;

pub use release_manager::{
    GitHubReleasePublisher, GitHubRepository, detect_bundle_content_type, parse_github_repository,
    release_tag,
};
