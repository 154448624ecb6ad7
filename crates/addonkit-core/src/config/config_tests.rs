#![allow(non_snake_case)]

use super::*;
use test_case::test_case;

#[test]
fn BuildConfig___default___matches_conventional_layout() {
    let config = BuildConfig::default();

    assert_eq!(config.out_dir, PathBuf::from("dist"));
    assert_eq!(config.package_dir, PathBuf::from("bundle"));
    assert_eq!(config.theme_dir, PathBuf::from("src").join("themes"));
    assert_eq!(config.base16_dir, "base16");
    assert_eq!(config.reserved_namespace, "replugged");
    assert_eq!(config.runtime_global, "window.replugged");
    assert_eq!(config.engine_target, "chrome91");
    assert_eq!(config.watch_debounce_ms, 200);
}

#[test]
fn BuildConfig___from_empty_bytes___returns_defaults() {
    let config = BuildConfig::from_json(&[]).unwrap();

    assert_eq!(config, BuildConfig::default());
}

#[test]
fn BuildConfig___from_json___overrides_only_given_fields() {
    let json = r#"{"out_dir": "build", "engine_target": "chrome108"}"#;

    let config = BuildConfig::from_json(json.as_bytes()).unwrap();

    assert_eq!(config.out_dir, PathBuf::from("build"));
    assert_eq!(config.engine_target, "chrome108");
    assert_eq!(config.package_dir, PathBuf::from("bundle"));
}

#[test]
fn BuildConfig___from_json___invalid_json_fails() {
    assert!(BuildConfig::from_json(b"{ nope").is_err());
}

#[test]
fn BuildConfig___builder___sets_directories() {
    let config = BuildConfig::new()
        .with_out_dir("out")
        .with_theme_dir("styles")
        .with_package_dir("release");

    assert_eq!(config.out_dir, PathBuf::from("out"));
    assert_eq!(config.theme_dir, PathBuf::from("styles"));
    assert_eq!(config.package_dir, PathBuf::from("release"));
}

#[test_case("background.png", true)]
#[test_case("photo.jpg", true)]
#[test_case("LOGO.PNG", true)]
#[test_case("dracula.css", false)]
#[test_case("png.css", false)]
#[test_case("photo.jpeg", false)]
fn BuildConfig___is_image___matches_configured_extensions(name: &str, expected: bool) {
    assert_eq!(BuildConfig::default().is_image(name), expected);
}

#[test]
fn BuildOptions___packaging___is_production_without_install_or_watch() {
    let options = BuildOptions::packaging();

    assert!(options.production);
    assert!(options.no_install);
    assert!(!options.watch);
}

#[test]
fn BuildOptions___default___is_development_build_with_install() {
    let options = BuildOptions::default();

    assert!(!options.production);
    assert!(!options.no_install);
    assert!(!options.watch);
}
