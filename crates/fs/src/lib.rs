//! Filesystem primitives for emulator user data
//!
//! Path string helpers, FAT 8.3 short names, directory operations with
//! log-and-report failure semantics, and the [`IoFile`] handle.

pub mod error;
pub mod io_file;
pub mod ops;
pub mod path;
pub mod short_name;

pub use error::{FsError, Result};
pub use io_file::{IoFile, OpenMode, SeekOrigin};
pub use ops::{
    copy, copy_dir, create_dir, create_dirs, create_empty_file, create_full_path, delete,
    delete_dir_recursively, exists, foreach_directory_entry, get_current_dir, get_size,
    is_directory, read_file_to_string, rename, set_current_dir, try_exists, try_get_size,
    try_is_directory, write_string_to_file,
};
pub use path::{
    get_extension_from_filename, get_filename, get_parent_path, get_path_without_top,
    remove_trailing_slash, sanitize_path, split_path_components, DirectorySeparator, DIR_SEP,
};
pub use short_name::{split_filename_83, ShortName};
