//! Multi-platform packaging for wrapped desktop applications.
//!
//! This module turns a project's compiled binaries into one distributable
//! artifact per (platform, architecture) target.
//!
//! # Pipeline
//!
//! 1. [`target::resolve_targets`] picks the targets the host can build.
//! 2. [`toolchain::ToolchainInvoker`] stages the wrapper template and runs the
//!    external `publish` command.
//! 3. [`platform::package`] assembles the artifact from the publish output.
//!
//! # Supported Formats
//!
//! | Platform | Formats | Notes |
//! |----------|---------|-------|
//! | Linux | .deb | Built in-process, no `dpkg-deb` needed |
//! | macOS | .dmg, .zip | `.zip` of the `.app` when `hdiutil` fails |
//! | Windows | .zip | MSI is not produced |
//!
//! # Example
//!
//! ```no_run
//! use electronifier_release::bundler::target::{HostPlatform, resolve_targets};
//! use electronifier_release::project::{PlatformTarget, ProjectDefinition};
//!
//! let project = ProjectDefinition {
//!     name: "Viewer".into(),
//!     linux_bin_path: Some("build/linux".into()),
//!     ..Default::default()
//! };
//! let targets = resolve_targets(&project, &[PlatformTarget::Linux], HostPlatform::current());
//! for target in &targets {
//!     println!("{} ({}) -> {}", target.platform, target.arch, target.runtime_identifier());
//! }
//! ```

#![warn(missing_docs)]

pub mod archive;
pub mod error;
pub mod platform;
pub mod target;
pub mod toolchain;
pub mod utils;

pub use error::{Context, Error, ErrorExt, Result};
pub use platform::{PackageContext, PackagedArtifact};
pub use target::{Arch, BuildTarget, HostPlatform};
pub use toolchain::{StagedBuild, ToolchainInvoker};
