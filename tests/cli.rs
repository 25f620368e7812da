//! Tests for the electronifier-release binary.

use assert_cmd::Command;
use predicates::prelude::*;

fn cli() -> Command {
    let mut cmd = Command::cargo_bin("electronifier-release").unwrap();
    cmd.env_remove("ELECTRONIFIER_TOOLCHAIN")
        .env_remove("ELECTRONIFIER_TEMPLATE_ROOT")
        .env_remove("ELECTRONIFIER_WORK_ROOT");
    cmd
}

#[test]
fn test_help_lists_flags() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--manifest"))
        .stdout(predicate::str::contains("--on-toolchain-failure"));
}

#[test]
fn test_missing_manifest_is_fatal() {
    cli()
        .args(["--manifest", "/no/such/release.json"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid release manifest"));
}

#[test]
fn test_manifest_without_destination_is_fatal() {
    let tmp = tempfile::tempdir().unwrap();
    let manifest = tmp.path().join("release.json");
    std::fs::write(
        &manifest,
        r#"{ "project": { "name": "Viewer" }, "release": { "version": "1.0.0" } }"#,
    )
    .unwrap();

    cli()
        .arg("--manifest")
        .arg(&manifest)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Publication destination is required."));
}

#[cfg(target_os = "linux")]
mod linux {
    use super::*;
    use std::path::Path;

    const FAKE_TOOLCHAIN: &str = r#"#!/bin/sh
out=""
while [ $# -gt 0 ]; do
  if [ "$1" = "--output" ]; then out="$2"; fi
  shift
done
mkdir -p "$out"
cp -R runtime/. "$out/"
echo "Build succeeded"
"#;

    fn workspace(bin_path: &Path) -> tempfile::TempDir {
        let tmp = tempfile::tempdir().unwrap();
        let template = tmp.path().join("template");
        std::fs::create_dir_all(&template).unwrap();
        std::fs::write(template.join("Program.cs"), "// __APP_NAME__\n").unwrap();
        std::fs::write(tmp.path().join("toolchain.sh"), FAKE_TOOLCHAIN).unwrap();

        let bin = tmp.path().join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        std::fs::write(bin.join("Viewer.dll"), b"MZ").unwrap();

        let manifest = serde_json::json!({
            "project": {
                "name": "Viewer",
                "linux_bin_path": tmp.path().join(bin_path),
            },
            "release": {
                "version": "1.0.0",
                "platforms": ["Linux"],
                "publication_destination": {
                    "type": "LocalDirectory",
                    "path": tmp.path().join("releases"),
                },
            },
        });
        std::fs::write(tmp.path().join("release.json"), manifest.to_string()).unwrap();
        tmp
    }

    fn run(tmp: &tempfile::TempDir) -> assert_cmd::assert::Assert {
        let toolchain = format!("sh {}", tmp.path().join("toolchain.sh").display());
        cli()
            .env("ELECTRONIFIER_TOOLCHAIN", toolchain)
            .arg("--manifest")
            .arg(tmp.path().join("release.json"))
            .arg("--template-root")
            .arg(tmp.path().join("template"))
            .arg("--work-root")
            .arg(tmp.path().join("work"))
            .arg("--json")
            .assert()
    }

    #[test]
    fn test_json_result_on_success() {
        let tmp = workspace(Path::new("bin"));
        let output = run(&tmp).code(0).get_output().stdout.clone();

        let result: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(result["success"], true);
        assert_eq!(result["artifacts"].as_array().unwrap().len(), 1);
        assert!(
            tmp.path()
                .join("releases/viewer-linux-x64-1-0-0.deb")
                .is_file()
        );
    }

    #[test]
    fn test_partial_failure_exit_code() {
        let tmp = workspace(Path::new("missing-bin"));
        let output = run(&tmp).code(2).get_output().stdout.clone();

        let result: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(result["success"], false);
        assert!(result["artifacts"].as_array().unwrap().is_empty());
    }
}
