//! Path string helpers
//!
//! Everything here works on plain `&str` and treats both `/` and `\` as
//! directory separators regardless of the host platform, since guest paths
//! and user-supplied paths mix the two freely.

/// Native directory separator of the host
pub const DIR_SEP: char = std::path::MAIN_SEPARATOR;

/// Separator convention to normalise towards in [`sanitize_path`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DirectorySeparator {
    ForwardSlash,
    BackwardSlash,
    #[default]
    PlatformDefault,
}

impl DirectorySeparator {
    /// Concrete separator character this convention resolves to
    pub fn as_char(self) -> char {
        match self {
            DirectorySeparator::ForwardSlash => '/',
            DirectorySeparator::BackwardSlash => '\\',
            DirectorySeparator::PlatformDefault => {
                if cfg!(windows) {
                    '\\'
                } else {
                    '/'
                }
            }
        }
    }
}

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

/// Normalise separators, collapse repeated separators and drop a trailing one.
///
/// A leading double separator (`\\server\share`) survives when normalising
/// towards backslashes or when running on Windows. A path made only of a
/// root marker keeps it.
pub fn sanitize_path(path: &str, separator: DirectorySeparator) -> String {
    let target = separator.as_char();
    let keep_share_root = cfg!(windows) || target == '\\';

    let mut out = String::with_capacity(path.len());
    let mut prev_was_separator = false;
    for (index, c) in path.chars().enumerate() {
        if is_separator(c) {
            if prev_was_separator && !(keep_share_root && index == 1) {
                continue;
            }
            prev_was_separator = true;
            out.push(target);
        } else {
            prev_was_separator = false;
            out.push(c);
        }
    }

    if out.len() > 1 && out.ends_with(target) {
        out.pop();
    }
    out
}

/// Split on either separator, keeping empty segments.
///
/// `"/a/b/"` yields `["", "a", "b", ""]`. An empty path has no components.
pub fn split_path_components(path: &str) -> Vec<&str> {
    if path.is_empty() {
        return Vec::new();
    }
    path.split(is_separator).collect()
}

/// Everything before the last separator, or `""` if there is none
pub fn get_parent_path(path: &str) -> &str {
    match path.rfind(is_separator) {
        Some(index) => &path[..index],
        None => "",
    }
}

/// Drop leading separators and the first component.
///
/// `"/a/b/c"` yields `"b/c"`; a single component yields `""`.
pub fn get_path_without_top(path: &str) -> &str {
    let trimmed = path.trim_start_matches(is_separator);
    match trimmed.find(is_separator) {
        Some(index) => &trimmed[index + 1..],
        None => "",
    }
}

/// Text after the last separator, or `""` if there is none
pub fn get_filename(path: &str) -> &str {
    match path.rfind(is_separator) {
        Some(index) => &path[index + 1..],
        None => "",
    }
}

/// Text after the last `.`, or `""` if there is none
pub fn get_extension_from_filename(name: &str) -> &str {
    match name.rfind('.') {
        Some(index) => &name[index + 1..],
        None => "",
    }
}

/// Strip exactly one trailing separator if present
pub fn remove_trailing_slash(path: &str) -> &str {
    match path.chars().last() {
        Some(c) if is_separator(c) => &path[..path.len() - 1],
        _ => path,
    }
}
