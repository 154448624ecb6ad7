#![allow(non_snake_case)]

use super::*;
use std::fs;
use tempfile::TempDir;

fn manifest(json: &str) -> Manifest {
    Manifest::from_json(json).unwrap()
}

fn touch(root: &Path, relative: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, "x").unwrap();
}

fn outputs(targets: &[Target]) -> Vec<String> {
    targets
        .iter()
        .map(|t| t.output_path.to_string_lossy().replace('\\', "/"))
        .collect()
}

#[test]
fn enumerate_targets___renderer_and_patches___both_targets_in_order() {
    let dir = TempDir::new().unwrap();
    let manifest = manifest(
        r#"{"id":"a.b","renderer":"src/index.ts","plaintextPatches":"src/plaintextPatches.ts"}"#,
    );

    let targets = enumerate_targets(dir.path(), &manifest, &BuildConfig::default()).unwrap();

    assert_eq!(targets.len(), 2);
    assert_eq!(targets[0].kind, TargetKind::Renderer);
    assert_eq!(targets[0].entry_point, PathBuf::from("src/index.ts"));
    assert_eq!(targets[0].output_path, Path::new("dist").join("renderer.js"));
    assert_eq!(targets[1].kind, TargetKind::PlaintextPatches);
    assert_eq!(
        targets[1].output_path,
        Path::new("dist").join("plaintextPatches.js")
    );
}

#[test]
fn enumerate_targets___no_entry_points_no_themes___empty() {
    let dir = TempDir::new().unwrap();

    let targets =
        enumerate_targets(dir.path(), &manifest(r#"{"id":"a.b"}"#), &BuildConfig::default())
            .unwrap();

    assert!(targets.is_empty());
}

#[test]
fn enumerate_targets___themes___skips_images_and_expands_base16() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "src/themes/main.css");
    touch(dir.path(), "src/themes/logo.png");
    touch(dir.path(), "src/themes/Photo.JPG");
    touch(dir.path(), "src/themes/base16/dark.css");
    touch(dir.path(), "src/themes/base16/light.css");

    let targets =
        enumerate_targets(dir.path(), &manifest(r#"{"id":"a.b"}"#), &BuildConfig::default())
            .unwrap();

    assert_eq!(
        outputs(&targets),
        vec![
            "dist/themes/base16/dark.css",
            "dist/themes/base16/light.css",
            "dist/themes/main.css",
        ]
    );
    assert!(targets.iter().all(|t| t.kind == TargetKind::Theme));
    assert_eq!(
        targets[2].entry_point,
        Path::new("src").join("themes").join("main.css")
    );
}

#[test]
fn enumerate_targets___theme_targets___carry_image_loaders() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "src/themes/main.css");

    let targets =
        enumerate_targets(dir.path(), &manifest(r#"{"id":"a.b"}"#), &BuildConfig::default())
            .unwrap();

    assert_eq!(targets[0].loaders.get(".png"), Some(&Loader::DataUrl));
    assert_eq!(targets[0].loaders.get(".jpg"), Some(&Loader::DataUrl));
}

#[test]
fn enumerate_targets___nested_base16_directory___skipped() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "src/themes/base16/dark.css");
    touch(dir.path(), "src/themes/base16/extra/inner.css");

    let targets =
        enumerate_targets(dir.path(), &manifest(r#"{"id":"a.b"}"#), &BuildConfig::default())
            .unwrap();

    assert_eq!(outputs(&targets), vec!["dist/themes/base16/dark.css"]);
}

#[test]
fn enumerate_targets___other_theme_directory___emitted_as_is() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "src/themes/partials/colors.css");

    let targets =
        enumerate_targets(dir.path(), &manifest(r#"{"id":"a.b"}"#), &BuildConfig::default())
            .unwrap();

    assert_eq!(outputs(&targets), vec!["dist/themes/partials"]);
}

#[test]
fn enumerate_targets___custom_out_dir___used_for_outputs() {
    let dir = TempDir::new().unwrap();
    let config = BuildConfig::default().with_out_dir("build");

    let targets =
        enumerate_targets(dir.path(), &manifest(r#"{"renderer":"src/index.ts"}"#), &config)
            .unwrap();

    assert_eq!(outputs(&targets), vec!["build/renderer.js"]);
}

#[test]
fn enumerate_targets___case_insensitive_collision___fails() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "src/themes/main.css");
    let config = BuildConfig::default().with_theme_dir("src/themes");
    // A second theme root that lands in the same output directory
    let mut targets = enumerate_targets(dir.path(), &manifest("{}"), &config).unwrap();
    let mut clash = targets[0].clone();
    clash.entry_point = PathBuf::from("src/other/MAIN.css");
    clash.output_path = Path::new("dist").join("themes").join("MAIN.css");
    targets.push(clash);

    let err = check_unique_outputs(&targets).unwrap_err();

    assert!(matches!(err, AddonError::DuplicateOutputPath { .. }));
}
