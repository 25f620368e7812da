//! Release run sequencing.
//!
//! ```text
//! Resolving ─▶ for each target: Staging ─▶ Invoking ─▶ Packaging ─▶ Publishing ─▶ Done
//! ```
//!
//! Targets are processed one at a time. Publication runs exactly once,
//! against every artifact that was produced.

use super::progress::{ProgressSink, Reporter};
use super::result::{ReleaseArtifact, ReleaseAutomationResult};
use crate::bundler::platform::{self, PackageContext};
use crate::bundler::target::{BuildTarget, HostPlatform, resolve_targets};
use crate::bundler::toolchain::ToolchainInvoker;
use crate::bundler::utils::process::summarize_output;
use crate::config::{PipelineConfig, ToolchainFailurePolicy};
use crate::error::{ConfigurationError, ReleaseError, Result};
use crate::project::{LaunchOptions, PlatformTarget, ProjectDefinition, ProjectRelease};
use crate::publish::{self, PublishRequest};
use std::path::Path;
use tokio_util::sync::CancellationToken;

const TEMPLATE_PROGRESS: f64 = 0.05;
const TARGETS_START: f64 = 0.10;
const TARGETS_SPAN: f64 = 0.55;
const TOOLCHAIN_PROGRESS: f64 = 0.55;
const PUBLISH_PROGRESS: f64 = 0.82;
const PARTIAL_PROGRESS: f64 = 0.9;

/// Packages and publishes releases.
///
/// One HTTP client is built up front and shared by every publication the
/// orchestrator makes.
#[derive(Debug, Clone)]
pub struct ReleaseAutomation {
    config: PipelineConfig,
    host: HostPlatform,
    http: reqwest::Client,
}

impl ReleaseAutomation {
    /// Creates an orchestrator for the current host.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let http = config.http_client()?;
        Ok(Self {
            config,
            host: HostPlatform::current(),
            http,
        })
    }

    /// Publishes through `client` instead of the one built from the config.
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    /// Overrides host detection.
    pub fn with_host(mut self, host: HostPlatform) -> Self {
        self.host = host;
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs one release: build every target the host supports, then publish.
    ///
    /// Structural problems are returned as `Err` before any target is
    /// processed. Skipped targets and publication failures are reported in
    /// the result. A failing build command aborts the run unless the policy
    /// is [`ToolchainFailurePolicy::SkipTarget`].
    pub async fn publish(
        &self,
        project: &ProjectDefinition,
        release: &ProjectRelease,
        launch_options: &LaunchOptions,
        progress: Option<&dyn ProgressSink>,
        cancel: Option<&CancellationToken>,
    ) -> Result<ReleaseAutomationResult> {
        let reporter = Reporter::new(progress);

        let version = release.version.trim();
        if version.is_empty() {
            return Err(ConfigurationError::MissingVersion.into());
        }
        let destination = release
            .publication_destination
            .as_ref()
            .ok_or(ConfigurationError::MissingDestination)?;
        let platforms: &[PlatformTarget] = if release.platforms.is_empty() {
            &project.publication_settings.default_platform_targets
        } else {
            &release.platforms
        };
        if platforms.is_empty() {
            return Err(ConfigurationError::NoPlatformsSelected.into());
        }
        let template_root = self.config.locate_template_root()?;

        reporter.report("Preparing Photino wrapper template...", TEMPLATE_PROGRESS);

        let targets = resolve_targets(project, platforms, self.host);
        if targets.is_empty() {
            log::warn!(
                "No build targets for {:?} on this host ({:?})",
                platforms,
                self.host.platform
            );
        }

        let invoker = ToolchainInvoker::new(&self.config, &template_root);
        let increment = TARGETS_SPAN / targets.len().max(1) as f64;
        let mut artifacts: Vec<ReleaseArtifact> = Vec::new();

        for target in &targets {
            check_cancelled(cancel)?;

            let base = TARGETS_START + artifacts.len() as f64 * increment;
            let label = format!("{} ({})", target.platform, target.arch_label());
            reporter.report(format!("Building Photino wrapper for {label}..."), base);

            if !target.has_usable_source() {
                reporter.report(format!("Skipping {label}: no bin folder selected."), base);
                continue;
            }

            match self
                .build_target(&invoker, project, version, launch_options, target, reporter, cancel)
                .await
            {
                Ok(artifact) => {
                    artifacts.push(artifact);
                    reporter.report(
                        format!("Packaged {label} artifact."),
                        base + increment * 0.75,
                    );
                }
                Err(error @ ReleaseError::ToolchainInvocationFailed { .. })
                    if self.config.toolchain_failure_policy == ToolchainFailurePolicy::SkipTarget =>
                {
                    reporter.report(format!("Skipping {label}: {error}"), base);
                }
                Err(error) => return Err(error),
            }
        }

        check_cancelled(cancel)?;
        reporter.report("Publishing artifacts...", PUBLISH_PROGRESS);

        let request = PublishRequest {
            app_name: &project.name,
            version,
            release_notes: release.release_notes(),
        };
        let outcome =
            publish::publish(destination, &artifacts, request, &self.http, &self.config).await;

        let result = ReleaseAutomationResult::new(artifacts, vec![outcome]);
        if result.success {
            reporter.report("Release completed successfully.", 1.0);
        } else {
            reporter.report("Release completed with issues.", PARTIAL_PROGRESS);
        }
        log::info!("{}", result.summary);

        Ok(result)
    }

    /// Stage, build and package one target.
    #[allow(clippy::too_many_arguments)]
    async fn build_target(
        &self,
        invoker: &ToolchainInvoker<'_>,
        project: &ProjectDefinition,
        version: &str,
        launch_options: &LaunchOptions,
        target: &BuildTarget,
        reporter: Reporter<'_>,
        cancel: Option<&CancellationToken>,
    ) -> Result<ReleaseArtifact> {
        let staged = invoker.stage(project, version, launch_options, target).await?;

        let run = invoker
            .invoke(&staged, target, cancel, |line| {
                reporter.report(line, TOOLCHAIN_PROGRESS)
            })
            .await;
        check_cancelled(cancel)?;
        if !run.success {
            return Err(ReleaseError::ToolchainInvocationFailed {
                program: self.config.toolchain_program().to_string(),
                platform: target.platform.to_string(),
                arch: target.arch_label().to_string(),
                detail: summarize_output(&run.output),
            });
        }
        ensure_publish_output(&staged.publish_dir)?;

        let ctx = PackageContext {
            project,
            version,
            target,
            staged: &staged,
            cancel,
        };
        let mut current = TOOLCHAIN_PROGRESS;
        let mut sink = |message: &str, fraction: Option<f64>| {
            if let Some(fraction) = fraction {
                current = fraction;
            }
            reporter.report(message, current);
        };
        let packaged = platform::package(ctx, &mut sink).await?;
        check_cancelled(cancel)?;

        Ok(ReleaseArtifact {
            platform: target.platform,
            package_path: packaged.path,
            packaging_note: packaged.note,
        })
    }
}

fn check_cancelled(cancel: Option<&CancellationToken>) -> Result<()> {
    match cancel {
        Some(token) if token.is_cancelled() => Err(ReleaseError::Cancelled),
        _ => Ok(()),
    }
}

/// The build command can exit 0 without writing anything.
fn ensure_publish_output(publish_dir: &Path) -> Result<()> {
    if publish_dir.is_dir() {
        Ok(())
    } else {
        Err(crate::bundler::Error::GenericError(format!(
            "build output directory {} was not created",
            publish_dir.display()
        ))
        .into())
    }
}
