//! emufs command implementations

use anyhow::{bail, Context, Result};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

use emufs_config::{load_user_paths, NativeResolver, PathOverrides, UserPath, UserPaths};
use emufs_fs::{
    copy_dir, delete, delete_dir_recursively, foreach_directory_entry, is_directory,
    sanitize_path, split_filename_83, try_exists, try_get_size, DirectorySeparator, DIR_SEP,
};

fn current_user_paths() -> Result<UserPaths> {
    load_user_paths(&NativeResolver::from_env()).context("Failed to derive user directories")
}

/// Print every category and its directory
pub fn paths_command(json: bool) -> Result<()> {
    let user_paths = current_user_paths()?;

    if json {
        let map: BTreeMap<String, &str> = user_paths
            .iter()
            .map(|(path, dir)| (path.to_string(), dir))
            .collect();
        println!("{}", serde_json::to_string_pretty(&map)?);
        return Ok(());
    }

    println!("emufs user directories");
    println!("━━━━━━━━━━━━━━━━━━━━━━");
    for (path, dir) in user_paths.iter() {
        println!("  {:<16} {}", path.as_str(), dir);
    }
    if let Some(keys) = user_paths.external_keys_dir() {
        println!("  {:<16} {}", "external_keys", keys.display());
    }
    if user_paths.is_portable() {
        println!();
        println!("Portable mode: data lives next to the executable");
    }

    Ok(())
}

/// Create the user directory tree
pub fn init_command() -> Result<()> {
    let user_paths = current_user_paths()?;
    info!("Creating user directories under {}", user_paths.get(UserPath::UserDir));

    if !user_paths.create_all() {
        bail!("Failed to create one or more user directories");
    }

    println!("Created user directories:");
    for (path, dir) in user_paths.iter().filter(|(path, _)| *path != UserPath::RootDir) {
        println!("  {:<16} {}", path.as_str(), dir);
    }
    Ok(())
}

/// Persist an override in the config directory's override file
pub fn set_command(category: UserPath, dir: &str) -> Result<()> {
    if !is_directory(dir) {
        bail!("{} is not a directory", dir);
    }

    // The override file lives in the config directory before overrides apply
    let user_paths = UserPaths::resolve(&NativeResolver::from_env())
        .context("Failed to derive user directories")?;
    let overrides_path = PathOverrides::default_path(&user_paths);

    let mut overrides = PathOverrides::load_from(&overrides_path)
        .with_context(|| format!("Failed to read {}", overrides_path.display()))?;
    overrides.insert(category, dir);
    overrides
        .save_to(&overrides_path)
        .with_context(|| format!("Failed to write {}", overrides_path.display()))?;

    println!("{} -> {}", category, dir);
    println!("Saved to {}", overrides_path.display());
    Ok(())
}

pub fn sanitize_command(path: &str, separator: DirectorySeparator) -> Result<()> {
    println!("{}", sanitize_path(path, separator));
    Ok(())
}

/// Print the FAT short name of `filename`
pub fn short_name_command(filename: &str) -> Result<()> {
    let short = split_filename_83(filename);
    let (name, extension) = short.to_fat_buffers();
    debug!("8.3 buffers for {}: {:?} {:?}", filename, name, extension);
    println!("{}", short);
    Ok(())
}

/// List a directory, sorted, directories marked with a trailing separator
pub fn list_command(dir: &Path) -> Result<()> {
    let mut names = Vec::new();
    let mut count = 0u64;

    let listed = foreach_directory_entry(Some(&mut count), dir, |contribution, parent, name| {
        let mut entry = name.to_string();
        if is_directory(parent.join(name)) {
            entry.push(DIR_SEP);
        }
        names.push(entry);
        *contribution = 1;
        true
    });

    if !listed {
        bail!("Unable to list {}", dir.display());
    }

    names.sort();
    for name in &names {
        println!("{}", name);
    }
    println!("{} entries", count);
    Ok(())
}

pub fn size_command(path: &Path) -> Result<()> {
    let size = try_get_size(path).with_context(|| format!("Failed to size {}", path.display()))?;
    println!("{}", size);
    Ok(())
}

/// Copy `src` into `dst`, leaving existing files alone
pub fn copy_dir_command(src: &Path, dst: &Path) -> Result<()> {
    if !is_directory(src) {
        bail!("{} is not a directory", src.display());
    }
    if !copy_dir(src, dst) {
        bail!("Failed to copy {} to {}", src.display(), dst.display());
    }
    println!("Copied {} to {}", src.display(), dst.display());
    Ok(())
}

pub fn remove_command(path: &Path, recursive: bool) -> Result<()> {
    if !try_exists(path)? {
        println!("{} does not exist", path.display());
        return Ok(());
    }

    let removed = if recursive && is_directory(path) {
        delete_dir_recursively(path)
    } else {
        delete(path)
    };
    if !removed {
        bail!("Failed to remove {}", path.display());
    }

    println!("Removed {}", path.display());
    Ok(())
}
