//! Command line interface for electronifier-release.
//!
//! Loads a release manifest, runs [`ReleaseAutomation`] and renders progress
//! and the final result on the terminal.

mod args;
mod manifest;
mod output;

pub use args::Args;
pub use manifest::ReleaseManifest;
pub use output::OutputManager;

use crate::config::PipelineConfig;
use crate::release::{ReleaseAutomation, ReleaseAutomationResult, ReleaseProgress};
use anyhow::Context as _;
use tokio_util::sync::CancellationToken;

/// Exit code for a run that finished but did not fully succeed.
pub const EXIT_PARTIAL_FAILURE: i32 = 2;

/// Main CLI entry point
pub async fn run() -> anyhow::Result<i32> {
    let args = Args::parse_args();
    execute(args).await
}

/// Runs a release for already-parsed arguments and returns the exit code.
pub async fn execute(args: Args) -> anyhow::Result<i32> {
    args.validate().map_err(anyhow::Error::msg)?;

    let mut manifest = ReleaseManifest::load(&args.manifest)?;
    manifest.fill_token_from(|key| std::env::var(key).ok());

    let mut config = PipelineConfig::from_env();
    args.apply_to(&mut config);
    log::debug!("Pipeline configuration: {config:?}");

    let output = OutputManager::new(false, !args.shows_progress());
    let _ = output.section(&format!(
        "Releasing {} {}",
        manifest.project.name, manifest.release.version
    ));

    let cancel = CancellationToken::new();
    let ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::warn!("Interrupt received, cancelling release");
                cancel.cancel();
            }
        })
    };

    let sink = |progress: ReleaseProgress| {
        let _ = output.progress(&progress.to_string());
    };
    let automation = ReleaseAutomation::new(config)?;
    let outcome = automation
        .publish(
            &manifest.project,
            &manifest.release,
            manifest.launch_options(),
            Some(&sink),
            Some(&cancel),
        )
        .await;
    ctrl_c.abort();

    let result = outcome?;
    if args.json {
        let json = serde_json::to_string_pretty(&result).context("serializing release result")?;
        println!("{json}");
    } else {
        render_result(&output, &result);
    }

    Ok(if result.success { 0 } else { EXIT_PARTIAL_FAILURE })
}

fn render_result(output: &OutputManager, result: &ReleaseAutomationResult) {
    let _ = output.section("Artifacts");
    if result.artifacts.is_empty() {
        let _ = output.warn("No artifacts were produced");
    }
    for artifact in &result.artifacts {
        let _ = output.success(&format!(
            "{}: {}",
            artifact.platform,
            artifact.package_path.display()
        ));
        if let Some(note) = &artifact.packaging_note {
            let _ = output.indent(note);
        }
    }

    let _ = output.section("Publication");
    for publication in &result.publications {
        let line = format!(
            "{} ({}): {}",
            publication.destination_type, publication.target_identifier, publication.detail
        );
        if publication.success {
            let _ = output.success(&line);
        } else {
            let _ = output.warn(&line);
        }
    }

    let _ = output.println("");
    if result.success {
        let _ = output.success(&result.summary);
    } else {
        output.error(&result.summary);
    }
}
