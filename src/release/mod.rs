//! Release orchestration.
//!
//! [`ReleaseAutomation::publish`] is the library entry point: it resolves
//! build targets, drives the toolchain and packagers for each, publishes the
//! artifacts and reports progress along the way.
//!
//! ```no_run
//! use electronifier_release::config::PipelineConfig;
//! use electronifier_release::project::{
//!     PlatformTarget, ProjectDefinition, ProjectRelease, PublicationDestination,
//! };
//! use electronifier_release::release::{ReleaseAutomation, ReleaseProgress};
//!
//! # async fn run() -> electronifier_release::error::Result<()> {
//! let project = ProjectDefinition {
//!     name: "Viewer".into(),
//!     linux_bin_path: Some("build/linux".into()),
//!     ..Default::default()
//! };
//! let release = ProjectRelease {
//!     version: "1.0.0".into(),
//!     platforms: vec![PlatformTarget::Linux],
//!     publication_destination: Some(PublicationDestination::LocalDirectory {
//!         path: "dist".into(),
//!     }),
//!     ..Default::default()
//! };
//!
//! let automation = ReleaseAutomation::new(PipelineConfig::from_env())?;
//! let print = |p: ReleaseProgress| println!("{p}");
//! let result = automation
//!     .publish(
//!         &project,
//!         &release,
//!         &project.publication_settings.launch_configuration,
//!         Some(&print),
//!         None,
//!     )
//!     .await?;
//! println!("{}", result.summary);
//! # Ok(())
//! # }
//! ```

mod orchestrator;
mod progress;
mod result;

pub use orchestrator::ReleaseAutomation;
pub use progress::{ProgressSink, ReleaseProgress};
pub use result::{ReleaseArtifact, ReleaseAutomationResult, ReleasePublicationOutcome, summarize};
