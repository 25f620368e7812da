//! macOS application bundle (.app) creation.

use super::super::{MessageSink, PackageContext};
use crate::bundler::{
    error::{Error, ErrorExt, Result},
    utils::{fs, naming::sanitize_for_file_system},
};
use crate::project::ProjectDefinition;
use plist::{Dictionary, Value};
use std::path::{Path, PathBuf};

/// Name of the shell launcher set as `CFBundleExecutable`.
pub const LAUNCHER_NAME: &str = "launcher";

const RUNTIME_CONFIG_SUFFIX: &str = ".runtimeconfig.json";

/// Bundles the publish output as `<staging>/<safe-name>.app`.
///
/// Returns the path to the created bundle.
pub async fn bundle_project(ctx: PackageContext<'_>, sink: &mut MessageSink<'_>) -> Result<PathBuf> {
    let safe_name = ctx.safe_name();
    let app_bundle_path = ctx.staged.root.join(format!("{safe_name}.app"));

    log::info!("Bundling {} at {}", safe_name, app_bundle_path.display());

    let contents_dir = app_bundle_path.join("Contents");
    let macos_dir = contents_dir.join("MacOS");
    let resources_dir = contents_dir.join("Resources");

    fs::remove_dir_all(&app_bundle_path).await?;
    fs::create_dir_all(&resources_dir, false).await?;
    fs::copy_dir(&ctx.staged.publish_dir, &macos_dir).await?;

    let executable = find_entry_executable(&macos_dir, &safe_name)?;
    let launcher_path = macos_dir.join(LAUNCHER_NAME);
    tokio::fs::write(&launcher_path, launcher_script(&executable))
        .await
        .fs_context("writing launcher script", &launcher_path)?;
    fs::mark_executable(&launcher_path).await?;

    let executable_path = macos_dir.join(&executable);
    if executable_path.is_file() {
        fs::mark_executable(&executable_path).await?;
    } else {
        log::warn!("Entry executable {} not found in bundle", executable);
    }

    let icon_name = match ctx.staged.icon_file.as_deref() {
        Some(icon) => Some(
            super::icon::install_app_icon(icon, &ctx.staged.root, &resources_dir, ctx.cancel, sink)
                .await?,
        ),
        None => None,
    };

    create_info_plist(&contents_dir, ctx.project, ctx.version, icon_name.as_deref())?;

    Ok(app_bundle_path)
}

/// Picks the file the launcher executes.
///
/// Preference order: the base name of a `*.runtimeconfig.json` when that
/// file exists, the first file without an extension, any file, `fallback`.
pub fn find_entry_executable(macos_dir: &Path, fallback: &str) -> Result<String> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(macos_dir).fs_context("listing bundle executables", macos_dir)? {
        let entry = entry.fs_context("listing bundle executables", macos_dir)?;
        if entry.path().is_file() {
            files.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    files.sort();

    let from_runtime_config = files
        .iter()
        .filter_map(|name| name.strip_suffix(RUNTIME_CONFIG_SUFFIX))
        .find(|base| !base.is_empty() && macos_dir.join(base).is_file());
    if let Some(base) = from_runtime_config {
        return Ok(base.to_string());
    }

    if let Some(native) = files
        .iter()
        .find(|name| !name.contains('.') && !name.to_ascii_lowercase().ends_with(".dylib"))
    {
        return Ok(native.clone());
    }

    Ok(files
        .into_iter()
        .next()
        .unwrap_or_else(|| fallback.to_string()))
}

/// Shell script that runs `executable` from the bundle's MacOS directory.
pub fn launcher_script(executable: &str) -> String {
    format!(
        "#!/bin/bash\n\
         DIR=\"$(cd \"$(dirname \"$0\")\" && pwd)\"\n\
         export DOTNET_ROOT=\"$DIR\"\n\
         cd \"$DIR\"\n\
         exec \"$DIR/./{executable}\" \"$@\"\n"
    )
}

/// `CFBundleIdentifier`: the project namespace, or one derived from the
/// organization and name.
pub fn bundle_identifier(project: &ProjectDefinition) -> String {
    match project.namespace() {
        Some(namespace) => namespace.trim().to_string(),
        None => format!(
            "com.{}.{}",
            sanitize_for_file_system(project.organization().unwrap_or("electronifier")),
            sanitize_for_file_system(&project.name)
        ),
    }
}

/// Creates the Info.plist file for the macOS bundle
fn create_info_plist(
    contents_dir: &Path,
    project: &ProjectDefinition,
    version: &str,
    icon_name: Option<&str>,
) -> Result<()> {
    let mut dict = Dictionary::new();

    dict.insert("CFBundleName".into(), project.name.clone().into());
    dict.insert("CFBundleDisplayName".into(), project.name.clone().into());
    dict.insert("CFBundleIdentifier".into(), bundle_identifier(project).into());
    dict.insert("CFBundleVersion".into(), version.to_string().into());
    dict.insert("CFBundleShortVersionString".into(), version.to_string().into());
    dict.insert("CFBundleExecutable".into(), LAUNCHER_NAME.into());
    dict.insert("CFBundlePackageType".into(), "APPL".into());
    dict.insert("LSMinimumSystemVersion".into(), "11.0".into());
    dict.insert(
        "LSApplicationCategoryType".into(),
        "public.app-category.developer-tools".into(),
    );
    dict.insert("NSHighResolutionCapable".into(), true.into());

    if let Some(icon) = icon_name {
        dict.insert("CFBundleIconFile".into(), icon.to_string().into());
    }

    dict.insert(
        "NSAppTransportSecurity".into(),
        Value::Dictionary(app_transport_security()),
    );

    let plist_path = contents_dir.join("Info.plist");
    Value::Dictionary(dict)
        .to_file_xml(&plist_path)
        .map_err(Error::Plist)?;

    Ok(())
}

/// Local networking plus plain-HTTP exceptions for the loopback hosts the
/// wrapper serves from.
fn app_transport_security() -> Dictionary {
    let mut domains = Dictionary::new();
    for host in ["localhost", "127.0.0.1"] {
        let mut exception = Dictionary::new();
        exception.insert("NSExceptionAllowsInsecureHTTPLoads".into(), true.into());
        exception.insert("NSExceptionRequiresForwardSecrecy".into(), false.into());
        exception.insert("NSIncludesSubdomains".into(), true.into());
        domains.insert(host.into(), Value::Dictionary(exception));
    }

    let mut ats = Dictionary::new();
    ats.insert("NSAllowsLocalNetworking".into(), true.into());
    ats.insert("NSExceptionDomains".into(), Value::Dictionary(domains));
    ats
}
