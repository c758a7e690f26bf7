//! File and directory operations
//!
//! The plain functions log OS failures and report them as `false`/`0`, and
//! treat "already there" / "already gone" as success. `exists`,
//! `is_directory` and `get_size` fold errors into their falsy result; the
//! `try_*` variants keep the two apart.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, error, trace};

use crate::error::{FsError, Result};
use crate::io_file::IoFile;
use crate::path::{sanitize_path, DirectorySeparator};

pub fn exists(path: impl AsRef<Path>) -> bool {
    path.as_ref().try_exists().unwrap_or(false)
}

pub fn try_exists(path: impl AsRef<Path>) -> Result<bool> {
    let path = path.as_ref();
    path.try_exists().map_err(|e| FsError::io(path, e))
}

pub fn is_directory(path: impl AsRef<Path>) -> bool {
    fs::metadata(path).map(|m| m.is_dir()).unwrap_or(false)
}

pub fn try_is_directory(path: impl AsRef<Path>) -> Result<bool> {
    let path = path.as_ref();
    match fs::metadata(path) {
        Ok(metadata) => Ok(metadata.is_dir()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(FsError::io(path, e)),
    }
}

/// Remove a file or an empty directory. A missing path counts as removed.
pub fn delete(path: impl AsRef<Path>) -> bool {
    let path = path.as_ref();
    trace!("file {}", path.display());

    let Ok(metadata) = fs::symlink_metadata(path) else {
        debug!("{} does not exist", path.display());
        return true;
    };

    let result = if metadata.is_dir() {
        fs::remove_dir(path)
    } else {
        fs::remove_file(path)
    };

    match result {
        Ok(()) => true,
        Err(e) => {
            error!("Unable to delete {}: {}", path.display(), e);
            false
        }
    }
}

/// Create a single directory level
pub fn create_dir(path: impl AsRef<Path>) -> bool {
    let path = path.as_ref();
    trace!("directory {}", path.display());

    if exists(path) {
        debug!("path exists {}", path.display());
        return true;
    }

    match fs::create_dir(path) {
        Ok(()) => true,
        Err(e) => {
            error!("Unable to create directory {}: {}", path.display(), e);
            false
        }
    }
}

/// Create a directory and every missing parent
pub fn create_dirs(path: impl AsRef<Path>) -> bool {
    let path = path.as_ref();
    trace!("path {}", path.display());

    if exists(path) {
        debug!("path exists {}", path.display());
        return true;
    }

    match fs::create_dir_all(path) {
        Ok(()) => true,
        Err(e) => {
            error!("Unable to create directories {}: {}", path.display(), e);
            false
        }
    }
}

/// Create the directories a path needs.
///
/// If the last component has no `.` the whole path is taken to be a
/// directory; otherwise it is taken to be a file and only its parent chain
/// is created. A directory named like `saves.old` is therefore treated as a
/// file.
pub fn create_full_path(path: &str) -> bool {
    trace!("path {}", path);

    let sanitized = sanitize_path(path, DirectorySeparator::ForwardSlash);
    let (parent, last) = match sanitized.rfind('/') {
        Some(index) => (&sanitized[..index], &sanitized[index + 1..]),
        None => ("", sanitized.as_str()),
    };

    if !last.contains('.') {
        return create_dirs(&sanitized);
    }

    if parent.is_empty() {
        // A bare filename relative to the working directory, or directly under the root
        return true;
    }
    create_dirs(parent)
}

pub fn rename(src: impl AsRef<Path>, dst: impl AsRef<Path>) -> bool {
    let (src, dst) = (src.as_ref(), dst.as_ref());
    trace!("{} --> {}", src.display(), dst.display());

    match fs::rename(src, dst) {
        Ok(()) => true,
        Err(e) => {
            error!(
                "Unable to rename file from {} to {}: {}",
                src.display(),
                dst.display(),
                e
            );
            false
        }
    }
}

/// Copy a file, overwriting `dst` if it exists
pub fn copy(src: impl AsRef<Path>, dst: impl AsRef<Path>) -> bool {
    let (src, dst) = (src.as_ref(), dst.as_ref());
    trace!("{} --> {}", src.display(), dst.display());

    match fs::copy(src, dst) {
        Ok(_) => true,
        Err(e) => {
            error!(
                "Unable to copy file {} to {}: {}",
                src.display(),
                dst.display(),
                e
            );
            false
        }
    }
}

/// Size of a file in bytes. Empty files and errors both give `0`.
pub fn get_size(path: impl AsRef<Path>) -> u64 {
    let path = path.as_ref();
    match try_get_size(path) {
        Ok(size) => size,
        Err(e) => {
            error!("Unable to retrieve file size ({}): {}", path.display(), e);
            0
        }
    }
}

pub fn try_get_size(path: impl AsRef<Path>) -> Result<u64> {
    let path = path.as_ref();
    let metadata = fs::metadata(path).map_err(|e| FsError::io(path, e))?;
    if metadata.is_dir() {
        return Err(FsError::io(path, io::Error::other("is a directory")));
    }
    Ok(metadata.len())
}

/// Create `path` as an empty file, truncating it if it exists
pub fn create_empty_file(path: impl AsRef<Path>) -> bool {
    let path = path.as_ref();
    trace!("{}", path.display());

    if !IoFile::from_path(path, "wb", 0).is_open() {
        error!("Unable to create empty file {}", path.display());
        return false;
    }
    true
}

/// Walk the direct children of `directory` once.
///
/// `callback(&mut contribution, directory, name)` runs for every entry except
/// `.` and `..`; returning `false` stops the walk and the whole call reports
/// failure. On success the summed contributions go to `num_entries_out` when
/// it is given. A directory that cannot be opened is a failure and the
/// callback never runs.
pub fn foreach_directory_entry<F>(
    num_entries_out: Option<&mut u64>,
    directory: impl AsRef<Path>,
    mut callback: F,
) -> bool
where
    F: FnMut(&mut u64, &Path, &str) -> bool,
{
    let directory = directory.as_ref();
    trace!("directory {}", directory.display());

    let entries = match fs::read_dir(directory) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("Unable to open directory {}: {}", directory.display(), e);
            return false;
        }
    };

    let mut found_entries = 0u64;
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                error!("Error reading directory {}: {}", directory.display(), e);
                return false;
            }
        };

        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            error!(
                "Skipping non UTF-8 entry {:?} in {}",
                file_name,
                directory.display()
            );
            continue;
        };
        if name == "." || name == ".." {
            continue;
        }

        let mut contribution = 0u64;
        if !callback(&mut contribution, directory, name) {
            return false;
        }
        found_entries += contribution;
    }

    if let Some(out) = num_entries_out {
        *out = found_entries;
    }
    true
}

/// Remove a directory tree. A missing path counts as removed.
pub fn delete_dir_recursively(path: impl AsRef<Path>) -> bool {
    let path = path.as_ref();
    trace!("directory {}", path.display());

    match fs::remove_dir_all(path) {
        Ok(()) => true,
        Err(e) if e.kind() == io::ErrorKind::NotFound => true,
        Err(e) => {
            error!(
                "Unable to completely delete directory {}: {}",
                path.display(),
                e
            );
            false
        }
    }
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(fs::read_link(src)?, dst)
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, _dst: &Path) -> io::Result<()> {
    debug!("Skipping symbolic link {}", src.display());
    Ok(())
}

/// Links are recreated, never followed
fn copy_recursive(src: &Path, dst: &Path) -> io::Result<()> {
    let metadata = fs::symlink_metadata(src)?;
    if metadata.file_type().is_symlink() {
        if fs::symlink_metadata(dst).is_err() {
            copy_symlink(src, dst)?;
        }
        return Ok(());
    }

    if !metadata.is_dir() {
        if !dst.try_exists()? {
            fs::copy(src, dst)?;
        }
        return Ok(());
    }

    if !dst.try_exists()? {
        fs::create_dir(dst)?;
    }

    for entry in fs::read_dir(src)? {
        let entry = entry?;
        copy_recursive(&entry.path(), &dst.join(entry.file_name()))?;
    }
    Ok(())
}

/// Copy a tree, skipping anything that already exists under `dst`
pub fn copy_dir(src: impl AsRef<Path>, dst: impl AsRef<Path>) -> bool {
    let (src, dst) = (src.as_ref(), dst.as_ref());

    match copy_recursive(src, dst) {
        Ok(()) => {
            trace!("Successfully copied directory.");
            true
        }
        Err(e) => {
            error!(
                "Error copying directory {} to {}: {}",
                src.display(),
                dst.display(),
                e
            );
            false
        }
    }
}

pub fn get_current_dir() -> Option<PathBuf> {
    match std::env::current_dir() {
        Ok(path) => Some(path),
        Err(e) => {
            error!("Unable to retrieve current working directory: {}", e);
            None
        }
    }
}

pub fn set_current_dir(path: impl AsRef<Path>) -> bool {
    let path = path.as_ref();
    match std::env::set_current_dir(path) {
        Ok(()) => true,
        Err(e) => {
            error!(
                "Unable to set {} as working directory: {}",
                path.display(),
                e
            );
            false
        }
    }
}

/// Replace the contents of `path` with `text`; returns bytes written
pub fn write_string_to_file(path: impl AsRef<Path>, text: &str) -> usize {
    let path = path.as_ref();
    let mut file = IoFile::from_path(path, "wb", 0);
    if !file.is_open() {
        error!("Unable to open {} for writing", path.display());
        return 0;
    }

    let written = file.write_string(text);
    if !file.close() {
        return 0;
    }
    written
}

/// Whole contents of `path` as UTF-8 text
pub fn read_file_to_string(path: impl AsRef<Path>) -> Option<String> {
    let path = path.as_ref();
    let mut file = IoFile::from_path(path, "rb", 0);
    if !file.is_open() {
        debug!("Unable to open {} for reading", path.display());
        return None;
    }

    let Ok(size) = usize::try_from(file.get_size()) else {
        error!("{} is too large to read into memory", path.display());
        return None;
    };
    let mut buffer = vec![0u8; size];
    let read = file.read_bytes(&mut buffer);
    buffer.truncate(read);

    match String::from_utf8(buffer) {
        Ok(text) => Some(text),
        Err(e) => {
            error!("{} is not valid UTF-8: {}", path.display(), e);
            None
        }
    }
}
