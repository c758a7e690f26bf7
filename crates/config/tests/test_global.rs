//! Tests for the process-wide registry
//!
//! Kept in its own test binary: the registry is initialised once per process.

use emufs_config::{install_user_paths, user_path, user_paths, UserPath, UserPaths, XdgResolver};
use serial_test::serial;
use std::fs;
use std::path::MAIN_SEPARATOR;

#[test]
#[serial]
fn test_global_registry_lifecycle() {
    let temp = tempfile::tempdir().expect("Failed to create temp dir");
    let resolver = XdgResolver::new(temp.path().join("bin")).with_home(temp.path());
    let paths = UserPaths::resolve(&resolver).unwrap();

    assert!(install_user_paths(paths.clone()).is_ok());

    // Only the first registry wins
    let rejected = install_user_paths(paths.clone()).unwrap_err();
    assert_eq!(rejected, paths);

    assert_eq!(user_path(UserPath::NandDir, None), paths.get(UserPath::NandDir));

    // Empty override is no override
    assert_eq!(
        user_path(UserPath::NandDir, Some("")),
        paths.get(UserPath::NandDir)
    );

    // Invalid override keeps the previous value
    let missing = temp.path().join("missing");
    assert_eq!(
        user_path(UserPath::LoadDir, Some(missing.to_str().unwrap())),
        paths.get(UserPath::LoadDir)
    );

    // Valid override on the user directory cascades
    let user = temp.path().join("override");
    fs::create_dir(&user).unwrap();
    let value = user_path(UserPath::UserDir, Some(user.to_str().unwrap()));
    assert_eq!(value, format!("{}{}", user.display(), MAIN_SEPARATOR));
    assert_eq!(
        user_path(UserPath::SdmcDir, None),
        format!("{}{}", user.join("sdmc").display(), MAIN_SEPARATOR)
    );

    assert_eq!(user_paths().get(UserPath::UserDir), value);
}
