//! Tests for loading the registry with its override file

use emufs_config::{load_user_paths, PathOverrides, UserPath, UserPaths, XdgResolver};
use std::fs;
use std::path::MAIN_SEPARATOR;
use tempfile::TempDir;

/// Resolver whose home lives in a fresh temp directory
fn setup_temp_home() -> (TempDir, XdgResolver) {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let resolver = XdgResolver::new(temp.path().join("bin")).with_home(temp.path().join("home"));
    (temp, resolver)
}

#[test]
fn test_load_without_override_file() {
    let (_temp, resolver) = setup_temp_home();

    let loaded = load_user_paths(&resolver).expect("Failed to load");
    let derived = UserPaths::resolve(&resolver).unwrap();
    assert_eq!(loaded, derived);
}

#[test]
fn test_load_applies_override_file() {
    let (temp, resolver) = setup_temp_home();
    let derived = UserPaths::resolve(&resolver).unwrap();
    let screenshots = temp.path().join("shots");
    fs::create_dir(&screenshots).unwrap();

    let mut overrides = PathOverrides::default();
    overrides.insert(UserPath::ScreenshotsDir, screenshots.to_str().unwrap());
    overrides
        .save_to(&PathOverrides::default_path(&derived))
        .expect("Failed to save");

    let loaded = load_user_paths(&resolver).expect("Failed to load");
    assert_eq!(
        loaded.get(UserPath::ScreenshotsDir),
        format!("{}{}", screenshots.display(), MAIN_SEPARATOR)
    );
    assert_eq!(loaded.get(UserPath::NandDir), derived.get(UserPath::NandDir));
}

#[test]
fn test_load_with_malformed_override_file() {
    let (_temp, resolver) = setup_temp_home();
    let derived = UserPaths::resolve(&resolver).unwrap();
    let file = PathOverrides::default_path(&derived);
    fs::create_dir_all(file.parent().unwrap()).unwrap();
    fs::write(&file, "{ not json").unwrap();

    assert!(load_user_paths(&resolver).is_err());
}
