//! Integration tests for the addonkit binary.
//!
//! The addons here have no entry points and no themes, so the compiler is
//! never started and esbuild does not need to be installed.

#![allow(non_snake_case)]

use addonkit_bundle::ArchiveReader;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;
use test_case::test_case;

const MANIFEST: &str = r#"{
  "id": "dev.example.Empty",
  "name": "Empty",
  "version": "1.0.0",
  "type": "replugged-plugin"
}"#;

fn addonkit(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_addonkit"))
        .args(args)
        .arg("--path")
        .arg(dir)
        .arg("--esbuild")
        .arg("/nonexistent/esbuild")
        .env("NO_UPDATE_NOTIFIER", "1")
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

/// Run with an empty `PATH` and no `--esbuild`, so esbuild cannot be found
fn addonkit_without_esbuild(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_addonkit"))
        .args(args)
        .arg("--path")
        .arg(dir)
        .env("PATH", "")
        .env("NO_UPDATE_NOTIFIER", "1")
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn addon(manifest: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("manifest.json"), manifest).unwrap();
    dir
}

mod build {
    use super::*;

    #[test]
    fn build___no_targets___writes_manifest() {
        let dir = addon(MANIFEST);

        let output = addonkit(dir.path(), &["build", "--no-install"]);

        assert!(output.status.success(), "{output:?}");
        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("dist/manifest.json")).unwrap())
                .unwrap();
        assert_eq!(written["id"], "dev.example.Empty");
        assert_eq!(written["version"], "1.0.0");
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("Built Empty"), "{stdout}");
    }

    #[test]
    fn build___missing_manifest___fails() {
        let dir = TempDir::new().unwrap();

        let output = addonkit(dir.path(), &["build", "--no-install"]);

        assert!(!output.status.success());
        assert!(!dir.path().join("dist").exists());
    }

    #[test]
    fn build___no_esbuild_and_no_targets___succeeds() {
        let dir = addon(MANIFEST);

        let output = addonkit_without_esbuild(dir.path(), &["build", "--no-install"]);

        assert!(output.status.success(), "{output:?}");
        assert!(dir.path().join("dist/manifest.json").is_file());
    }

    #[test]
    fn build___no_esbuild_and_no_manifest___reports_missing_manifest() {
        let dir = TempDir::new().unwrap();

        let output = addonkit_without_esbuild(dir.path(), &["build", "--no-install"]);

        assert!(!output.status.success());
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("manifest not found"), "{stderr}");
        assert!(!stderr.contains("compiler unavailable"), "{stderr}");
    }

    #[test]
    fn build___no_esbuild_with_renderer___reports_compiler_unavailable() {
        let dir = addon(r#"{ "id": "dev.example.Addon", "renderer": "src/index.ts" }"#);
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/index.ts"), "export const start = () => {};").unwrap();

        let output = addonkit_without_esbuild(dir.path(), &["build", "--no-install"]);

        assert!(!output.status.success());
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("compiler unavailable"), "{stderr}");
    }

    #[test]
    fn build___malformed_manifest___fails() {
        let dir = addon("{ \"id\": ");

        let output = addonkit(dir.path(), &["build", "--no-install"]);

        assert!(!output.status.success());
    }
}

mod bundle {
    use super::*;

    #[test]
    fn bundle___no_targets___writes_archive_and_manifest() {
        let dir = addon(MANIFEST);

        let output = addonkit(dir.path(), &["bundle"]);

        assert!(output.status.success(), "{output:?}");
        let archive = dir.path().join("bundle/dev.example.Empty.asar");
        let manifest = dir.path().join("bundle/dev.example.Empty.json");
        assert!(manifest.is_file());

        let mut reader = ArchiveReader::open(&archive).unwrap();
        assert!(reader.has_file("manifest.json"));
        let packed: serde_json::Value =
            serde_json::from_str(&reader.read_file_string("manifest.json").unwrap()).unwrap();
        let copied: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&manifest).unwrap()).unwrap();
        assert_eq!(packed, copied);
    }

    #[test]
    fn bundle___manifest_without_id___fails() {
        let dir = addon(r#"{ "name": "Anonymous" }"#);

        let output = addonkit(dir.path(), &["bundle"]);

        assert!(!output.status.success());
        assert!(!dir.path().join("bundle").exists());
    }
}

mod usage {
    use super::*;
    use test_case::test_case;

    #[test_case(&["--help"] ; "top level")]
    #[test_case(&["build", "--help"] ; "build")]
    #[test_case(&["bundle", "--help"] ; "bundle")]
    fn help___prints_usage(args: &[&str]) {
        let output = Command::new(env!("CARGO_BIN_EXE_addonkit"))
            .args(args)
            .output()
            .unwrap();

        assert!(output.status.success());
        assert!(String::from_utf8_lossy(&output.stdout).contains("Usage"));
    }

    #[test]
    fn unknown_command___exits_with_error() {
        let output = Command::new(env!("CARGO_BIN_EXE_addonkit"))
            .arg("publish")
            .output()
            .unwrap();

        assert!(!output.status.success());
    }
}
