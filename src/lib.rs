//! # Electronifier Release
//!
//! Packages compiled desktop applications into native installers and
//! publishes them.
//!
//! A release run takes a project description, a release request and the
//! window launch options, then:
//!
//! - **Resolves targets**: the (platform, architecture) pairs this host can package
//! - **Builds a wrapper**: stages the Photino wrapper template and runs `dotnet publish`
//! - **Packages**: `.dmg`/`.zip` on macOS, `.deb` on Linux, `.zip` on Windows
//! - **Publishes**: copies to a local directory or uploads to a GitHub release
//!
//! ## Usage
//!
//! ```bash
//! electronifier-release --manifest release.json
//! electronifier-release --manifest release.json --on-toolchain-failure skip --json
//! ```
//!
//! Library callers use [`ReleaseAutomation`] directly.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// Core modules
pub mod bundler;
pub mod cli;
pub mod config;
pub mod error;
pub mod github;
pub mod project;
pub mod publish;
pub mod release;

// Re-export main types for public API
pub use bundler::{Arch, BuildTarget, HostPlatform};
pub use cli::Args;
pub use config::{PipelineConfig, ToolchainFailurePolicy};
pub use error::{ConfigurationError, ReleaseError, Result};
pub use project::{
    LaunchOptions, LaunchPosition, PlatformTarget, ProjectDefinition, ProjectRelease,
    PublicationDestination, PublicationDestinationType,
};
pub use release::{
    ProgressSink, ReleaseArtifact, ReleaseAutomation, ReleaseAutomationResult,
    ReleaseProgress, ReleasePublicationOutcome,
};
