//! Wrapper staging and build command invocation.
//!
//! For every target a fresh copy of the wrapper template is prepared under
//! `<work_root>/<safe-name>/<safe-version>/<platform>/<arch>`:
//!
//! ```text
//! <arch>/
//! ├── Program.cs, PhotinoWrapper.csproj   (placeholders substituted)
//! ├── launch-settings.json
//! ├── icons/appicon.<ext>                 (when the project has an icon)
//! ├── runtime/                            (the target's compiled binaries)
//! └── publish/                            (build command output)
//! ```
//!
//! The build command then publishes a self-contained wrapper into `publish/`.

use crate::bundler::error::{ErrorExt, Result};
use crate::bundler::target::BuildTarget;
use crate::bundler::utils::{
    fs,
    naming::{sanitize_for_assembly_name, sanitize_for_file_system},
    process::{ProcessRunResult, run_process},
};
use crate::config::PipelineConfig;
use crate::project::{LaunchOptions, LaunchPosition, ProjectDefinition, non_blank};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

/// Name of the launch configuration file read by the wrapper.
pub const LAUNCH_SETTINGS_FILE: &str = "launch-settings.json";

const DEFAULT_APP_NAME: &str = "Photino Wrapper";
const DEFAULT_APP_DESCRIPTION: &str = "Packaged via Electronifier.";
const DEFAULT_ICON_RELATIVE: &str = "icons/appicon.png";

/// A staged wrapper directory for one target.
#[derive(Debug, Clone)]
pub struct StagedBuild {
    /// Staging root for this target
    pub root: PathBuf,
    /// Where the build command writes its output
    pub publish_dir: PathBuf,
    /// Icon copied into the staging root, if the project has one
    pub icon_file: Option<PathBuf>,
}

impl StagedBuild {
    /// Directory shared by every architecture of one platform; artifacts are
    /// written here so restaging a sibling target leaves them intact.
    pub fn platform_dir(&self) -> &Path {
        self.root.parent().unwrap_or(&self.root)
    }
}

/// Wire shape of `launch-settings.json`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LaunchSettingsPayload<'a> {
    width: u32,
    height: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    width_percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    height_percentage: Option<f64>,
    position: LaunchPosition,
    create_desktop_shortcut: bool,
    add_to_dock: bool,
    #[serde(rename = "enableDevTools")]
    enable_developer_tools: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    execution_script: Option<&'a str>,
    entry_url: Option<&'a str>,
    icon: &'a str,
}

/// Stages the wrapper template and drives the external build command.
#[derive(Debug)]
pub struct ToolchainInvoker<'a> {
    config: &'a PipelineConfig,
    template_root: &'a Path,
}

impl<'a> ToolchainInvoker<'a> {
    /// Creates an invoker that copies from `template_root`.
    pub fn new(config: &'a PipelineConfig, template_root: &'a Path) -> Self {
        Self {
            config,
            template_root,
        }
    }

    /// Staging directory for `target`.
    pub fn staging_dir(
        &self,
        project: &ProjectDefinition,
        version: &str,
        target: &BuildTarget,
    ) -> PathBuf {
        self.config
            .work_root
            .join(sanitize_for_file_system(&project.name))
            .join(sanitize_for_file_system(version))
            .join(target.platform.segment())
            .join(target.arch_label())
    }

    /// Prepares a fresh staging directory for `target`.
    pub async fn stage(
        &self,
        project: &ProjectDefinition,
        version: &str,
        launch: &LaunchOptions,
        target: &BuildTarget,
    ) -> Result<StagedBuild> {
        let root = self.staging_dir(project, version, target);
        log::info!(
            "Staging {} ({}) in {}",
            target.platform,
            target.arch_label(),
            root.display()
        );

        fs::create_dir_all(&root, true).await?;
        fs::copy_dir(self.template_root, &root).await?;

        let icon_file = self.copy_icon(project, &root).await?;
        let icon_relative = icon_file
            .as_ref()
            .and_then(|icon| icon.strip_prefix(&root).ok())
            .map(|rel| rel.to_string_lossy().replace('\\', "/"))
            .unwrap_or_else(|| DEFAULT_ICON_RELATIVE.to_string());

        write_launch_settings(&root, launch, project.execution_script(), &icon_relative).await?;
        copy_runtime(&target.source_path, &root.join("runtime")).await?;
        self.replace_tokens(project, &root).await?;

        Ok(StagedBuild {
            publish_dir: root.join("publish"),
            root,
            icon_file,
        })
    }

    /// Arguments passed after the configured build command.
    pub fn publish_args(&self, staged: &StagedBuild, target: &BuildTarget) -> Vec<String> {
        let mut args: Vec<String> = self.config.toolchain_command.iter().skip(1).cloned().collect();
        args.extend([
            "publish".to_string(),
            self.config.wrapper_project_file.clone(),
            "-c".to_string(),
            "Release".to_string(),
            "-r".to_string(),
            target.runtime_identifier().to_string(),
            "--self-contained".to_string(),
            "true".to_string(),
            "--output".to_string(),
            staged.publish_dir.to_string_lossy().into_owned(),
            "/p:PublishSingleFile=false".to_string(),
            "/p:PublishTrimmed=false".to_string(),
            "/p:IncludeNativeLibrariesForSelfExtract=false".to_string(),
        ]);
        args
    }

    /// Runs the build command for a staged target.
    ///
    /// Every output line is passed to `on_line` prefixed with
    /// `[<program> publish:<platform>-<arch>]`.
    pub async fn invoke<F>(
        &self,
        staged: &StagedBuild,
        target: &BuildTarget,
        cancel: Option<&CancellationToken>,
        mut on_line: F,
    ) -> ProcessRunResult
    where
        F: FnMut(&str),
    {
        let program = self.config.toolchain_program();
        let prefix = format!(
            "[{} publish:{}-{}]",
            program,
            target.platform,
            target.arch_label()
        );
        let args = self.publish_args(staged, target);
        log::debug!("{} {}", program, args.join(" "));

        run_process(program, &args, &staged.root, cancel, |line| {
            on_line(&format!("{prefix} {line}"))
        })
        .await
    }

    async fn copy_icon(&self, project: &ProjectDefinition, root: &Path) -> Result<Option<PathBuf>> {
        let Some(icon) = project.icon_path().filter(|p| p.is_file()) else {
            return Ok(None);
        };
        let ext = icon
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_else(|| "png".to_string());
        let dest = root.join("icons").join(format!("appicon.{ext}"));
        fs::copy_file(icon, &dest).await?;
        log::debug!("Copied icon {} to {}", icon.display(), dest.display());
        Ok(Some(dest))
    }

    async fn replace_tokens(&self, project: &ProjectDefinition, root: &Path) -> Result<()> {
        let name = non_blank(Some(project.name.as_str())).unwrap_or(DEFAULT_APP_NAME);
        let description = project.description().unwrap_or(DEFAULT_APP_DESCRIPTION);
        let assembly = sanitize_for_assembly_name(name);

        for file in &self.config.token_files {
            let path = root.join(file);
            if !path.is_file() {
                continue;
            }
            let text = tokio::fs::read_to_string(&path)
                .await
                .fs_context("reading template file", &path)?;
            let replaced = text
                .replace("__APP_NAME__", name)
                .replace("__APP_DESCRIPTION__", description)
                .replace("__ASSEMBLY_NAME__", &assembly);
            tokio::fs::write(&path, replaced)
                .await
                .fs_context("writing template file", &path)?;
        }
        Ok(())
    }
}

async fn write_launch_settings(
    root: &Path,
    launch: &LaunchOptions,
    execution_script: Option<&str>,
    icon: &str,
) -> Result<()> {
    let payload = LaunchSettingsPayload {
        width: launch.width,
        height: launch.height,
        width_percentage: launch.width_percentage,
        height_percentage: launch.height_percentage,
        position: launch.position,
        create_desktop_shortcut: launch.create_desktop_shortcut,
        add_to_dock: launch.add_to_dock,
        enable_developer_tools: launch.enable_developer_tools,
        execution_script,
        entry_url: non_blank(Some(launch.entry_url.as_str())),
        icon,
    };
    let json = serde_json::to_string_pretty(&payload)?;
    let path = root.join(LAUNCH_SETTINGS_FILE);
    tokio::fs::write(&path, json)
        .await
        .fs_context("writing launch settings", &path)
}

/// Copies the target's binaries (a directory or a single file) into `dest`.
async fn copy_runtime(source: &Path, dest: &Path) -> Result<()> {
    if source.is_dir() {
        fs::copy_dir(source, dest).await?;
    } else if let Some(name) = source.file_name() {
        fs::copy_file(source, &dest.join(name)).await?;
    }
    log::debug!("Copied runtime from {}", source.display());
    Ok(())
}
