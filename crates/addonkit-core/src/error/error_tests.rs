#![allow(non_snake_case)]

use super::*;

#[test]
fn AddonError___manifest_not_found___displays_path() {
    let err = AddonError::ManifestNotFound {
        path: PathBuf::from("addon/manifest.json"),
    };

    assert_eq!(err.to_string(), "manifest not found: addon/manifest.json");
}

#[test]
fn AddonError___reserved_import_path___mentions_offending_path() {
    let err = AddonError::ReservedImportPath {
        path: "replugged/common".to_string(),
        namespace: "replugged".to_string(),
    };

    let msg = err.to_string();
    assert!(msg.contains("(replugged/common)"));
    assert!(msg.contains("import from \"replugged\""));
}

#[test]
fn AddonError___duplicate_output_path___names_both_sources() {
    let err = AddonError::DuplicateOutputPath {
        output: PathBuf::from("dist/themes/Dark.css"),
        first: PathBuf::from("src/themes/Dark.css"),
        second: PathBuf::from("src/themes/dark.css"),
    };

    let msg = err.to_string();
    assert!(msg.contains("dist/themes/Dark.css"));
    assert!(msg.contains("src/themes/Dark.css"));
    assert!(msg.contains("src/themes/dark.css"));
}

#[test]
fn AddonError___compilation___lists_every_failed_target() {
    let err = AddonError::Compilation {
        failures: vec![
            TargetFailure {
                entry_point: PathBuf::from("src/index.ts"),
                output_path: PathBuf::from("dist/renderer.js"),
                diagnostics: vec![Diagnostic::new("unexpected token")],
            },
            TargetFailure {
                entry_point: PathBuf::from("src/themes/github.css"),
                output_path: PathBuf::from("dist/themes/github.css"),
                diagnostics: vec![
                    Diagnostic::new("expected \"}\"").with_file("src/themes/github.css"),
                ],
            },
        ],
    };

    let msg = err.to_string();
    assert!(msg.starts_with("build failed: 2 target(s) failed"));
    assert!(msg.contains("src/index.ts -> dist/renderer.js"));
    assert!(msg.contains("unexpected token"));
    assert!(msg.contains("src/themes/github.css: expected \"}\""));
}

#[test]
fn AddonError___from_io_error___converts() {
    let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
    let err: AddonError = io_err.into();

    assert!(matches!(err, AddonError::Io(_)));
}

#[test]
fn AddonError___package___keeps_source() {
    let io_err = std::io::Error::other("disk full");
    let err = AddonError::package("bundle/dev.example.asar", io_err);

    assert!(err.to_string().contains("bundle/dev.example.asar"));
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn Diagnostic___display___includes_plugin_and_file() {
    let diagnostic = Diagnostic::new("boom")
        .with_file("src/index.ts")
        .with_plugin("globalModules");

    assert_eq!(
        diagnostic.to_string(),
        "[plugin globalModules] src/index.ts: boom"
    );
}

#[test]
fn Diagnostic___display___plain_message_without_context() {
    assert_eq!(Diagnostic::new("boom").to_string(), "boom");
}
