//! Command tests for emufs, run against an isolated home directory

mod common;

use common::TestEnv;
use predicates::prelude::*;
use std::fs;

// ============================================================================
// Paths and init
// ============================================================================

/// Test that the default layout follows the XDG variables
#[test]
fn test_paths_follow_xdg_variables() {
    let env = TestEnv::default();
    let expected_sdmc = format!("{}/sdmc/", env.user_dir().display());
    let expected_config = format!("{}/", env.config_dir().display());

    env.command()
        .args(["paths", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "\"sdmc_dir\": \"{}\"",
            expected_sdmc
        )))
        .stdout(predicate::str::contains(format!(
            "\"config_dir\": \"{}\"",
            expected_config
        )));
}

/// Test that the table view lists every category
#[test]
fn test_paths_table_lists_categories() {
    let env = TestEnv::default();

    env.command()
        .arg("paths")
        .assert()
        .success()
        .stdout(predicate::str::contains("user_dir"))
        .stdout(predicate::str::contains("screenshots_dir"))
        .stdout(predicate::str::contains("external_keys"));
}

/// Test that init creates the user directory tree
#[test]
fn test_init_creates_directories() {
    let env = TestEnv::default();

    env.command()
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created user directories"));

    for name in ["sdmc", "nand", "load", "dump", "screenshots", "shader", "keys", "log"] {
        assert!(env.user_dir().join(name).is_dir(), "{name} missing");
    }
    assert!(env.config_dir().is_dir());
    assert!(env.cache_home.join("emufs").is_dir());
}

/// Test that a relative XDG variable is reported instead of used
#[test]
fn test_relative_xdg_variable_fails() {
    let env = TestEnv::default();

    env.command()
        .env("XDG_DATA_HOME", "relative/data")
        .arg("paths")
        .assert()
        .failure()
        .stderr(predicate::str::contains("XDG_DATA_HOME"));
}

// ============================================================================
// Overrides
// ============================================================================

/// Test that set persists an override which later commands honour
#[test]
fn test_set_persists_override() {
    let env = TestEnv::default();
    let card = env.scratch("card");
    fs::create_dir_all(&card).unwrap();

    env.command()
        .args(["set", "sdmc", card.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("sdmc_dir"));

    assert!(env.config_dir().join("paths.json").is_file());

    env.command()
        .args(["paths", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "\"sdmc_dir\": \"{}/\"",
            card.display()
        )));
}

/// Test that set refuses a directory that does not exist
#[test]
fn test_set_rejects_missing_directory() {
    let env = TestEnv::default();

    env.command()
        .args(["set", "dump_dir", env.scratch("nowhere").to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not a directory"));

    assert!(!env.config_dir().join("paths.json").exists());
}

/// Test that moving the user directory moves everything under it
#[test]
fn test_user_dir_override_cascades() {
    let env = TestEnv::default();
    let portable = env.scratch("elsewhere");
    fs::create_dir_all(&portable).unwrap();

    env.command()
        .args(["set", "user_dir", portable.to_str().unwrap()])
        .assert()
        .success();

    env.command()
        .args(["paths", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "\"log_dir\": \"{}/log/\"",
            portable.display()
        )));
}

// ============================================================================
// Path utilities
// ============================================================================

/// Test sanitizing towards forward slashes
#[test]
fn test_sanitize_forward() {
    let env = TestEnv::default();

    env.command()
        .args(["sanitize", "a//b\\\\c/", "--separator", "forward"])
        .assert()
        .success()
        .stdout("a/b/c\n");
}

/// Test that a share root survives sanitizing towards backslashes
#[test]
fn test_sanitize_backward_keeps_share_root() {
    let env = TestEnv::default();

    env.command()
        .args(["sanitize", "//server//share/", "-s", "backward"])
        .assert()
        .success()
        .stdout("\\\\server\\share\n");
}

/// Test 8.3 short names
#[test]
fn test_short_name() {
    let env = TestEnv::default();

    env.command()
        .args(["short-name", "readme.txt"])
        .assert()
        .success()
        .stdout("README.TXT\n");

    env.command()
        .args(["short-name", "averylongfilename.extra"])
        .assert()
        .success()
        .stdout("AVERYL~1.EXT\n");
}

// ============================================================================
// Directory operations
// ============================================================================

/// Test that ls prints sorted entries and a count
#[test]
fn test_ls_lists_entries() {
    let env = TestEnv::default();
    let dir = env.scratch("listing");
    fs::create_dir_all(dir.join("sub")).unwrap();
    fs::write(dir.join("b.txt"), "b").unwrap();
    fs::write(dir.join("a.bin"), "a").unwrap();

    env.command()
        .arg("ls")
        .arg(&dir)
        .assert()
        .success()
        .stdout("a.bin\nb.txt\nsub/\n3 entries\n");
}

/// Test that ls on a missing directory fails
#[test]
fn test_ls_missing_directory_fails() {
    let env = TestEnv::default();

    env.command()
        .arg("ls")
        .arg(env.scratch("missing"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unable to list"));
}

/// Test size of a file and refusal for a directory
#[test]
fn test_size() {
    let env = TestEnv::default();
    let file = env.scratch("ten.bin");
    fs::write(&file, [0u8; 10]).unwrap();

    env.command().arg("size").arg(&file).assert().success().stdout("10\n");

    env.command()
        .arg("size")
        .arg(env.temp_dir.path())
        .assert()
        .failure();
}

/// Test that copy-dir leaves existing destination files untouched
#[test]
fn test_copy_dir_does_not_overwrite() {
    let env = TestEnv::default();
    let src = env.scratch("src");
    let dst = env.scratch("dst");
    fs::create_dir_all(src.join("nested")).unwrap();
    fs::write(src.join("keep.txt"), "new").unwrap();
    fs::write(src.join("nested/fresh.txt"), "fresh").unwrap();
    fs::create_dir_all(&dst).unwrap();
    fs::write(dst.join("keep.txt"), "old").unwrap();

    env.command()
        .arg("copy-dir")
        .arg(&src)
        .arg(&dst)
        .assert()
        .success();

    assert_eq!(fs::read_to_string(dst.join("keep.txt")).unwrap(), "old");
    assert_eq!(
        fs::read_to_string(dst.join("nested/fresh.txt")).unwrap(),
        "fresh"
    );
}

/// Test removing files and trees
#[test]
fn test_remove() {
    let env = TestEnv::default();
    let tree = env.scratch("tree");
    fs::create_dir_all(tree.join("a/b")).unwrap();
    fs::write(tree.join("a/b/file"), "x").unwrap();

    // A non-empty directory needs --recursive
    env.command().arg("remove").arg(&tree).assert().failure();
    assert!(tree.exists());

    env.command()
        .args(["remove", "--recursive"])
        .arg(&tree)
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed"));
    assert!(!tree.exists());

    env.command()
        .arg("remove")
        .arg(&tree)
        .assert()
        .success()
        .stdout(predicate::str::contains("does not exist"));
}
