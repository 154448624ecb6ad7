#![allow(non_snake_case)]

use super::*;
use crate::target::{Loader, TargetKind};
use addonkit_core::{BuildConfig, BuildOptions};
use std::collections::BTreeMap;
use std::fs;

fn renderer_target() -> Target {
    Target {
        kind: TargetKind::Renderer,
        entry_point: PathBuf::from("src/index.ts"),
        output_path: PathBuf::from("dist/renderer.js"),
        loaders: BTreeMap::new(),
    }
}

fn settings(production: bool) -> CompileSettings {
    let options = BuildOptions {
        production,
        ..BuildOptions::default()
    };
    CompileSettings::new("/addon", &options, &BuildConfig::default())
}

#[test]
fn EsbuildCompiler___arguments___development_build() {
    let args = EsbuildCompiler::arguments(&renderer_target(), &settings(false), &[]);

    assert_eq!(
        args,
        vec![
            "src/index.ts",
            "--bundle",
            "--format=esm",
            "--log-level=info",
            "--platform=browser",
            "--sourcemap",
            "--target=chrome91",
            "--outfile=dist/renderer.js",
            "--color=false",
        ]
    );
}

#[test]
fn EsbuildCompiler___arguments___production_minifies_without_sourcemap() {
    let args = EsbuildCompiler::arguments(&renderer_target(), &settings(true), &[]);

    assert!(args.contains(&"--minify".to_string()));
    assert!(!args.contains(&"--sourcemap".to_string()));
}

#[test]
fn EsbuildCompiler___arguments___loaders_and_aliases_appended() {
    let mut target = renderer_target();
    target.loaders.insert(".png".to_string(), Loader::DataUrl);
    target.loaders.insert(".jpg".to_string(), Loader::DataUrl);
    let aliases = vec![(
        "replugged".to_string(),
        "./.addonkit-abc/0-replugged.js".to_string(),
    )];

    let args = EsbuildCompiler::arguments(&target, &settings(false), &aliases);

    let tail: Vec<_> = args.iter().rev().take(3).rev().cloned().collect();
    assert_eq!(
        tail,
        vec![
            "--loader:.jpg=dataurl",
            "--loader:.png=dataurl",
            "--alias:replugged=./.addonkit-abc/0-replugged.js",
        ]
    );
}

#[test]
fn EsbuildCompiler___locate___prefers_project_binary() {
    let dir = tempfile::TempDir::new().unwrap();
    let bin = dir.path().join("node_modules").join(".bin");
    fs::create_dir_all(&bin).unwrap();
    let name = if cfg!(windows) { "esbuild.cmd" } else { "esbuild" };
    fs::write(bin.join(name), "").unwrap();

    let compiler = EsbuildCompiler::locate(dir.path()).unwrap();

    assert_eq!(compiler.binary(), Some(bin.join(name).as_path()));
}

#[test]
fn EsbuildCompiler___discover___looks_up_on_prepare() {
    let dir = tempfile::TempDir::new().unwrap();
    let bin = dir.path().join("node_modules").join(".bin");
    fs::create_dir_all(&bin).unwrap();
    let name = if cfg!(windows) { "esbuild.cmd" } else { "esbuild" };

    let compiler = EsbuildCompiler::discover(dir.path());
    assert_eq!(compiler.binary(), None);

    fs::write(bin.join(name), "").unwrap();
    compiler.prepare().unwrap();

    assert_eq!(compiler.binary(), Some(bin.join(name).as_path()));
}

#[test]
fn EsbuildCompiler___new___explicit_binary_needs_no_lookup() {
    let compiler = EsbuildCompiler::new("/opt/esbuild/bin/esbuild");

    compiler.prepare().unwrap();

    assert_eq!(compiler.binary(), Some(Path::new("/opt/esbuild/bin/esbuild")));
}

fn replugged_stub() -> Vec<VirtualModule> {
    vec![VirtualModule {
        specifier: "replugged".to_string(),
        namespace: "replugged".to_string(),
        contents: "module.exports = window.replugged".to_string(),
    }]
}

#[test]
fn write_stubs___virtual_modules___written_under_scratch_dir() {
    let dir = tempfile::TempDir::new().unwrap();

    let (scratch, aliases) =
        write_stubs(dir.path(), Path::new("dist/renderer.js"), &replugged_stub()).unwrap();
    let scratch = scratch.unwrap();

    assert_eq!(
        aliases,
        vec![(
            "replugged".to_string(),
            "./.addonkit-dist_renderer_js/0-replugged.js".to_string()
        )]
    );
    assert_eq!(
        fs::read_to_string(dir.path().join(".addonkit-dist_renderer_js/0-replugged.js")).unwrap(),
        "module.exports = window.replugged"
    );

    let scratch_path = scratch.path().to_path_buf();
    drop(scratch);
    assert!(!scratch_path.exists());
}

#[test]
fn write_stubs___repeated_builds___same_paths() {
    let dir = tempfile::TempDir::new().unwrap();
    let output = Path::new("dist/renderer.js");

    let (first_dir, first) = write_stubs(dir.path(), output, &replugged_stub()).unwrap();
    drop(first_dir);
    let (_second_dir, second) = write_stubs(dir.path(), output, &replugged_stub()).unwrap();

    assert_eq!(first, second);
}

#[test]
fn write_stubs___stale_scratch_dir___replaced() {
    let dir = tempfile::TempDir::new().unwrap();
    let stale = dir.path().join(".addonkit-dist_renderer_js");
    fs::create_dir_all(&stale).unwrap();
    fs::write(stale.join("leftover.js"), "").unwrap();

    let (_scratch, aliases) =
        write_stubs(dir.path(), Path::new("dist/renderer.js"), &replugged_stub()).unwrap();

    assert_eq!(aliases.len(), 1);
    assert!(!stale.join("leftover.js").exists());
    assert!(stale.join("0-replugged.js").is_file());
}

#[test]
fn write_stubs___targets___separate_scratch_dirs() {
    assert_ne!(
        scratch_dir_name(Path::new("dist/renderer.js")),
        scratch_dir_name(Path::new("dist/plaintextPatches.js"))
    );
    assert!(scratch_dir_name(Path::new("dist/themes/a.css")).starts_with(SCRATCH_PREFIX));
}

#[test]
fn write_stubs___no_modules___no_scratch_dir() {
    let dir = tempfile::TempDir::new().unwrap();

    let (scratch, aliases) = write_stubs(dir.path(), Path::new("dist/renderer.js"), &[]).unwrap();

    assert!(scratch.is_none());
    assert!(aliases.is_empty());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn parse_messages___errors_and_warnings___split_with_locations() {
    let stderr = r#"
✘ [ERROR] Could not resolve "left-pad"

    src/index.ts:3:7:
      3 │ import "left-pad";
        ╵        ~~~~~~~~~~

  You can mark the path "left-pad" as external to exclude it from the bundle.

▲ [WARNING] Comparison with -0 using the "===" operator will also match 0 [equals-negative-zero]

    src/util.ts:1:4:
      1 │ if (x === -0) {}
        ╵     ~~~~~~~~

1 warning and 1 error
"#;

    let messages = parse_messages(stderr);

    assert_eq!(messages.errors.len(), 1);
    assert_eq!(messages.errors[0].text, "Could not resolve \"left-pad\"");
    assert_eq!(
        messages.errors[0].file.as_deref(),
        Some(Path::new("src/index.ts"))
    );
    assert_eq!(messages.warnings.len(), 1);
    assert_eq!(
        messages.warnings[0].file.as_deref(),
        Some(Path::new("src/util.ts"))
    );
}

#[test]
fn parse_messages___no_markers___empty() {
    let messages = parse_messages("\n  dist/renderer.js  1.2kb\n\n⚡ Done in 5ms\n");

    assert_eq!(messages, Messages::default());
}
