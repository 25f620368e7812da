//! Build target resolution.
//!
//! A project carries up to six source-binary paths. Resolution turns the
//! requested platforms into concrete (platform, architecture, path) targets,
//! keeping only the platform the current host can package.

use crate::project::{PlatformTarget, ProjectDefinition, usable_path};
use std::fmt;
use std::path::{Path, PathBuf};

/// CPU architecture of a build target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    /// 64-bit ARM
    Arm64,
    /// x86-64
    X64,
    /// 32-bit x86
    X86,
    /// 32-bit ARM
    Arm,
    /// Anything else the host reports
    Unknown,
}

impl Arch {
    /// Architecture of the running process.
    pub fn current() -> Self {
        Self::from_rust_arch(std::env::consts::ARCH)
    }

    /// Maps a `std::env::consts::ARCH` value.
    pub fn from_rust_arch(arch: &str) -> Self {
        match arch {
            "aarch64" => Arch::Arm64,
            "x86_64" => Arch::X64,
            "x86" => Arch::X86,
            "arm" => Arch::Arm,
            _ => Arch::Unknown,
        }
    }

    /// Label used in progress messages and artifact names.
    pub fn label(&self) -> &'static str {
        match self {
            Arch::Arm64 => "arm64",
            Arch::X64 => "x64",
            Arch::X86 => "x86",
            Arch::Arm => "arm",
            Arch::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The machine the pipeline runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostPlatform {
    /// Platform this host can package, if any
    pub platform: Option<PlatformTarget>,
    /// Host architecture
    pub arch: Arch,
}

impl HostPlatform {
    /// Detects the running host.
    pub fn current() -> Self {
        Self {
            platform: Self::platform_for_os(std::env::consts::OS),
            arch: Arch::current(),
        }
    }

    /// Maps a `std::env::consts::OS` value. Other Unix-likes package as Linux.
    pub fn platform_for_os(os: &str) -> Option<PlatformTarget> {
        match os {
            "macos" => Some(PlatformTarget::MacOs),
            "windows" => Some(PlatformTarget::Windows),
            "linux" | "freebsd" | "openbsd" | "netbsd" | "dragonfly" => {
                Some(PlatformTarget::Linux)
            }
            _ => None,
        }
    }
}

/// One (platform, architecture) build with its source binaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTarget {
    /// Target platform
    pub platform: PlatformTarget,
    /// Target architecture
    pub arch: Arch,
    /// Compiled application binaries (directory or single file)
    pub source_path: PathBuf,
}

impl BuildTarget {
    /// Architecture label, e.g. `arm64`.
    pub fn arch_label(&self) -> &'static str {
        self.arch.label()
    }

    /// Whether the source path names an existing file or directory.
    pub fn has_usable_source(&self) -> bool {
        !self.source_path.as_os_str().is_empty() && self.source_path.exists()
    }

    /// .NET runtime identifier passed to `publish -r`.
    pub fn runtime_identifier(&self) -> &'static str {
        match (self.platform, self.arch) {
            (PlatformTarget::MacOs, Arch::Arm64) => "osx-arm64",
            (PlatformTarget::MacOs, _) => "osx-x64",
            (PlatformTarget::Windows, Arch::X86) => "win-x86",
            (PlatformTarget::Windows, _) => "win-x64",
            (PlatformTarget::Linux, Arch::Arm64) => "linux-arm64",
            (PlatformTarget::Linux, _) => "linux-x64",
        }
    }
}

/// Expands `platforms` into build targets for `host`.
///
/// Platforms other than the host's are ignored. Each platform yields its
/// architecture-specific targets in a fixed order; when none is configured
/// the generic `bin_path` produces one target for the host architecture.
/// Paths are not checked for existence here.
pub fn resolve_targets(
    project: &ProjectDefinition,
    platforms: &[PlatformTarget],
    host: HostPlatform,
) -> Vec<BuildTarget> {
    let mut targets = Vec::new();

    for &platform in platforms {
        if host.platform != Some(platform) {
            continue;
        }
        if targets.iter().any(|t: &BuildTarget| t.platform == platform) {
            continue;
        }

        let specific: Vec<(Option<&Path>, Arch)> = match platform {
            PlatformTarget::MacOs => vec![
                (project.mac_bin_path.as_deref(), Arch::Arm64),
                (project.mac_bin_path_x64.as_deref(), Arch::X64),
            ],
            PlatformTarget::Windows => vec![
                (project.windows_bin_path.as_deref(), Arch::X64),
                (project.windows_bin_path_x86.as_deref(), Arch::X86),
            ],
            PlatformTarget::Linux => vec![(project.linux_bin_path.as_deref(), Arch::X64)],
        };

        let before = targets.len();
        for (path, arch) in specific {
            if let Some(path) = usable_path(path) {
                targets.push(target(platform, arch, path));
            }
        }

        if targets.len() == before
            && let Some(path) = usable_path(project.bin_path.as_deref())
        {
            targets.push(target(platform, host.arch, path));
        }
    }

    targets
}

fn target(platform: PlatformTarget, arch: Arch, path: &Path) -> BuildTarget {
    BuildTarget {
        platform,
        arch,
        source_path: path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host(platform: PlatformTarget, arch: Arch) -> HostPlatform {
        HostPlatform {
            platform: Some(platform),
            arch,
        }
    }

    #[test]
    fn test_macos_yields_both_architectures() {
        let project = ProjectDefinition {
            name: "Viewer".into(),
            mac_bin_path: Some("/bin/arm".into()),
            mac_bin_path_x64: Some("/bin/intel".into()),
            linux_bin_path: Some("/bin/linux".into()),
            ..Default::default()
        };
        let targets = resolve_targets(
            &project,
            &PlatformTarget::ALL,
            host(PlatformTarget::MacOs, Arch::Arm64),
        );
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].arch, Arch::Arm64);
        assert_eq!(targets[0].runtime_identifier(), "osx-arm64");
        assert_eq!(targets[1].arch_label(), "x64");
        assert_eq!(targets[1].runtime_identifier(), "osx-x64");
    }

    #[test]
    fn test_other_platforms_are_ignored() {
        let project = ProjectDefinition {
            windows_bin_path: Some("C:/bin".into()),
            ..Default::default()
        };
        let targets = resolve_targets(
            &project,
            &[PlatformTarget::Windows],
            host(PlatformTarget::Linux, Arch::X64),
        );
        assert!(targets.is_empty());
    }

    #[test]
    fn test_generic_path_uses_host_arch() {
        let project = ProjectDefinition {
            bin_path: Some("/bin/any".into()),
            ..Default::default()
        };
        let targets = resolve_targets(
            &project,
            &[PlatformTarget::Linux],
            host(PlatformTarget::Linux, Arch::Arm64),
        );
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].arch, Arch::Arm64);
        assert_eq!(targets[0].runtime_identifier(), "linux-arm64");
        assert_eq!(targets[0].source_path, PathBuf::from("/bin/any"));
    }

    #[test]
    fn test_specific_path_wins_over_generic() {
        let project = ProjectDefinition {
            bin_path: Some("/bin/any".into()),
            windows_bin_path_x86: Some("/bin/win32".into()),
            ..Default::default()
        };
        let targets = resolve_targets(
            &project,
            &[PlatformTarget::Windows],
            host(PlatformTarget::Windows, Arch::X64),
        );
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].arch, Arch::X86);
        assert_eq!(targets[0].runtime_identifier(), "win-x86");
    }

    #[test]
    fn test_empty_paths_produce_nothing() {
        let project = ProjectDefinition {
            linux_bin_path: Some(PathBuf::new()),
            ..Default::default()
        };
        let targets = resolve_targets(
            &project,
            &[PlatformTarget::Linux],
            host(PlatformTarget::Linux, Arch::X64),
        );
        assert!(targets.is_empty());
    }

    #[test]
    fn test_duplicate_platforms_resolve_once() {
        let project = ProjectDefinition {
            linux_bin_path: Some("/bin/linux".into()),
            ..Default::default()
        };
        let targets = resolve_targets(
            &project,
            &[PlatformTarget::Linux, PlatformTarget::Linux],
            host(PlatformTarget::Linux, Arch::X64),
        );
        assert_eq!(targets.len(), 1);
    }

    #[test]
    fn test_host_mapping() {
        assert_eq!(HostPlatform::platform_for_os("macos"), Some(PlatformTarget::MacOs));
        assert_eq!(HostPlatform::platform_for_os("freebsd"), Some(PlatformTarget::Linux));
        assert_eq!(HostPlatform::platform_for_os("solaris"), None);
        assert_eq!(Arch::from_rust_arch("riscv64"), Arch::Unknown);
        assert_eq!(Arch::Unknown.label(), "unknown");
    }
}
