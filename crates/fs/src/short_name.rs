//! FAT 8.3 short-name derivation

use std::fmt;

/// Characters that never appear in a short name
const FORBIDDEN_CHARACTERS: &[u8] = b".\"/\\[]:;=, ";

/// An 8.3 short name as stored in a FAT directory entry.
///
/// Both fields are uppercase ASCII padded with spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShortName {
    name: [u8; 8],
    extension: [u8; 3],
}

impl ShortName {
    pub fn name(&self) -> &[u8; 8] {
        &self.name
    }

    pub fn extension(&self) -> &[u8; 3] {
        &self.extension
    }

    /// The 11 bytes of the directory entry name field
    pub fn to_entry_bytes(&self) -> [u8; 11] {
        let mut out = [b' '; 11];
        out[..8].copy_from_slice(&self.name);
        out[8..].copy_from_slice(&self.extension);
        out
    }

    /// Null-terminated 9-byte name and 4-byte extension buffers
    pub fn to_fat_buffers(&self) -> ([u8; 9], [u8; 4]) {
        let mut name = [0u8; 9];
        name[..8].copy_from_slice(&self.name);
        let mut extension = [0u8; 4];
        extension[..3].copy_from_slice(&self.extension);
        (name, extension)
    }
}

impl fmt::Display for ShortName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = String::from_utf8_lossy(&self.name);
        let extension = String::from_utf8_lossy(&self.extension);
        let (name, extension) = (name.trim_end(), extension.trim_end());
        if extension.is_empty() {
            write!(f, "{name}")
        } else {
            write!(f, "{name}.{extension}")
        }
    }
}

/// Derive the 8.3 short name of `filename`.
///
/// Forbidden characters are dropped and letters uppercased. A base name
/// longer than eight characters is cut and ends in `~1`. The extension is at
/// most three characters taken after the last `.`; when the filename ends in
/// `.` the dot before it is used instead.
pub fn split_filename_83(filename: &str) -> ShortName {
    let bytes = filename.as_bytes();

    let mut point = filename.rfind('.');
    if let Some(index) = point {
        if index + 1 == bytes.len() {
            point = filename[..index].rfind('.');
        }
    }

    let base = match point {
        Some(index) => &bytes[..index],
        None => bytes,
    };

    let mut name = [b' '; 8];
    let mut written = 0;
    for &letter in base {
        if FORBIDDEN_CHARACTERS.contains(&letter) {
            continue;
        }
        if written == name.len() {
            // TODO: pick ~2, ~3, ... when two files collide on the same short name
            name[6] = b'~';
            name[7] = b'1';
            break;
        }
        name[written] = letter.to_ascii_uppercase();
        written += 1;
    }

    let mut extension = [b' '; 3];
    if let Some(index) = point {
        let letters = bytes[index + 1..]
            .iter()
            .filter(|letter| !FORBIDDEN_CHARACTERS.contains(*letter));
        for (slot, letter) in extension.iter_mut().zip(letters) {
            *slot = letter.to_ascii_uppercase();
        }
    }

    ShortName { name, extension }
}
