//! Buffered, exclusively owned file handle
//!
//! [`IoFile`] mirrors the classic stdio contract: a handle is either closed
//! or open, calls on a closed handle return sentinels instead of failing
//! loudly, and element counts are reported the way `fread`/`fwrite` do.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Read, Seek, SeekFrom, Write};
use std::mem;
use std::path::Path;
use std::str::FromStr;

use tracing::{debug, error};

use crate::error::FsError;

/// Reference point for [`IoFile::seek`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekOrigin {
    Start,
    Current,
    End,
}

/// Parsed C-style open mode (`"rb"`, `"w+"`, `"ab"`, `"wx"`, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenMode {
    read: bool,
    write: bool,
    append: bool,
    truncate: bool,
    create: bool,
    create_new: bool,
}

impl OpenMode {
    pub const READ: OpenMode = OpenMode {
        read: true,
        write: false,
        append: false,
        truncate: false,
        create: false,
        create_new: false,
    };

    pub const WRITE: OpenMode = OpenMode {
        read: false,
        write: true,
        append: false,
        truncate: true,
        create: true,
        create_new: false,
    };

    pub const APPEND: OpenMode = OpenMode {
        read: false,
        write: false,
        append: true,
        truncate: false,
        create: true,
        create_new: false,
    };

    pub const READ_WRITE: OpenMode = OpenMode {
        read: true,
        write: true,
        append: false,
        truncate: false,
        create: false,
        create_new: false,
    };

    pub fn is_readable(&self) -> bool {
        self.read
    }

    pub fn is_writable(&self) -> bool {
        self.write || self.append
    }

    fn to_options(self) -> OpenOptions {
        let mut options = OpenOptions::new();
        options
            .read(self.read)
            .write(self.write)
            .append(self.append)
            .truncate(self.truncate)
            .create(self.create)
            .create_new(self.create_new);
        options
    }
}

impl FromStr for OpenMode {
    type Err = FsError;

    fn from_str(mode: &str) -> Result<Self, Self::Err> {
        let invalid = || FsError::InvalidMode(mode.to_string());

        let mut chars = mode.chars();
        let mut parsed = match chars.next() {
            Some('r') => OpenMode::READ,
            Some('w') => OpenMode::WRITE,
            Some('a') => OpenMode::APPEND,
            _ => return Err(invalid()),
        };

        for c in chars {
            match c {
                '+' => {
                    parsed.read = true;
                    if !parsed.append {
                        parsed.write = true;
                    }
                }
                // Text and binary are the same thing here
                'b' | 't' => {}
                'x' if parsed.truncate => {
                    parsed.create = false;
                    parsed.truncate = false;
                    parsed.create_new = true;
                }
                _ => return Err(invalid()),
            }
        }

        Ok(parsed)
    }
}

#[cfg(unix)]
fn apply_platform_flags(options: &mut OpenOptions, flags: u32) {
    use std::os::unix::fs::OpenOptionsExt;

    if flags != 0 {
        options.custom_flags(flags as i32);
    }
}

#[cfg(windows)]
fn apply_platform_flags(options: &mut OpenOptions, flags: u32) {
    use std::os::windows::fs::OpenOptionsExt;

    if flags != 0 {
        options.share_mode(flags);
    }
}

#[cfg(not(any(unix, windows)))]
fn apply_platform_flags(_options: &mut OpenOptions, _flags: u32) {}

/// Read until `buf` is full, end of file, or an error
fn read_up_to(file: &mut File, buf: &mut [u8]) -> usize {
    let mut total = 0;
    while total < buf.len() {
        match file.read(&mut buf[total..]) {
            Ok(0) => break,
            Ok(n) => total += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                error!("Read failed after {} bytes: {}", total, e);
                break;
            }
        }
    }
    total
}

/// Write until `buf` is consumed or an error
fn write_up_to(writer: &mut BufWriter<File>, buf: &[u8]) -> usize {
    let mut total = 0;
    while total < buf.len() {
        match writer.write(&buf[total..]) {
            Ok(0) => break,
            Ok(n) => total += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                error!("Write failed after {} bytes: {}", total, e);
                break;
            }
        }
    }
    total
}

/// Size through the seek sequence: save position, seek to end, restore
fn size_by_seeking(file: &mut File) -> io::Result<u64> {
    let position = file.stream_position()?;
    let size = file.seek(SeekFrom::End(0))?;
    if size != position {
        file.seek(SeekFrom::Start(position))?;
    }
    Ok(size)
}

/// An open file together with the mode it was opened in
#[derive(Debug)]
struct OpenFile {
    writer: BufWriter<File>,
    mode: OpenMode,
}

impl OpenFile {
    fn new(file: File, mode: OpenMode) -> Self {
        Self {
            writer: BufWriter::new(file),
            mode,
        }
    }

    /// Same file and position, pending writes dropped
    fn without_pending(self) -> Self {
        let (file, _pending) = self.writer.into_parts();
        Self::new(file, self.mode)
    }
}

/// An exclusively owned handle to at most one open file.
///
/// Writes are buffered; the buffer is flushed before any read, seek, size
/// query or resize, and when the handle is closed or dropped. Bytes the OS
/// refuses on flush are discarded, so one failed write never poisons the
/// handle.
#[derive(Debug, Default)]
pub struct IoFile {
    file: Option<OpenFile>,
}

impl IoFile {
    /// A closed handle
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a handle and immediately try to open `path`.
    ///
    /// Check [`IoFile::is_open`] for the outcome.
    pub fn from_path(path: impl AsRef<Path>, mode: &str, flags: u32) -> Self {
        let mut file = Self::new();
        file.open(path, mode, flags);
        file
    }

    /// Open `path` with a C-style mode string, closing any open file first
    pub fn open(&mut self, path: impl AsRef<Path>, mode: &str, flags: u32) -> bool {
        self.close();
        match mode.parse::<OpenMode>() {
            Ok(mode) => self.open_with(path, mode, flags),
            Err(e) => {
                error!("Unable to open {}: {}", path.as_ref().display(), e);
                false
            }
        }
    }

    /// Open `path` with an already parsed mode, closing any open file first
    pub fn open_with(&mut self, path: impl AsRef<Path>, mode: OpenMode, flags: u32) -> bool {
        self.close();

        let path = path.as_ref();
        let mut options = mode.to_options();
        apply_platform_flags(&mut options, flags);

        match options.open(path) {
            Ok(file) => {
                self.file = Some(OpenFile::new(file, mode));
                true
            }
            Err(e) => {
                debug!("Unable to open {}: {}", path.display(), e);
                false
            }
        }
    }

    /// Flush and release the file. Closing a closed handle succeeds.
    ///
    /// The file is released even when the final flush fails.
    pub fn close(&mut self) -> bool {
        let Some(open) = self.file.take() else {
            return true;
        };

        match open.writer.into_inner() {
            Ok(_) => true,
            Err(e) => {
                error!("Flush on close failed: {}", e.error());
                false
            }
        }
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    /// Write out the buffer; on failure drop what the OS refused
    fn flush_pending(&mut self) -> bool {
        let Some(open) = self.file.as_mut() else {
            return false;
        };

        match open.writer.flush() {
            Ok(()) => true,
            Err(e) => {
                error!(
                    "Flush failed, discarding {} buffered bytes: {}",
                    open.writer.buffer().len(),
                    e
                );
                self.file = self.file.take().map(OpenFile::without_pending);
                false
            }
        }
    }

    /// The OS file with an empty write buffer in front of it
    fn synced(&mut self) -> Option<&mut OpenFile> {
        self.flush_pending();
        self.file.as_mut()
    }

    /// Size in bytes, or `0` when closed or when the size cannot be queried
    pub fn get_size(&mut self) -> u64 {
        let Some(open) = self.synced() else {
            return 0;
        };

        match size_by_seeking(open.writer.get_mut()) {
            Ok(size) => size,
            Err(e) => {
                error!("GetSize: seek failed: {}", e);
                0
            }
        }
    }

    pub fn seek(&mut self, offset: i64, origin: SeekOrigin) -> bool {
        let target = match origin {
            SeekOrigin::Start => match u64::try_from(offset) {
                Ok(offset) => SeekFrom::Start(offset),
                Err(_) => return false,
            },
            SeekOrigin::Current => SeekFrom::Current(offset),
            SeekOrigin::End => SeekFrom::End(offset),
        };

        match self.synced() {
            Some(open) => open.writer.get_mut().seek(target).is_ok(),
            None => false,
        }
    }

    /// Current position, or `u64::MAX` when closed or on failure
    pub fn tell(&mut self) -> u64 {
        self.synced()
            .and_then(|open| open.writer.get_mut().stream_position().ok())
            .unwrap_or(u64::MAX)
    }

    pub fn flush(&mut self) -> bool {
        self.flush_pending()
    }

    /// Read whole elements of `element_size` bytes into `data`.
    ///
    /// Returns `usize::MAX` when closed, `0` without touching the file when
    /// `data` holds no whole element or the handle was not opened for
    /// reading, otherwise the number of complete elements read, which may be
    /// short at end of file.
    pub fn read_elements(&mut self, data: &mut [u8], element_size: usize) -> usize {
        let Some(open) = self.file.as_ref() else {
            return usize::MAX;
        };

        let count = data.len().checked_div(element_size).unwrap_or(0);
        if count == 0 {
            return 0;
        }
        if !open.mode.is_readable() {
            error!("Read on a handle not opened for reading");
            return 0;
        }

        match self.synced() {
            Some(open) => {
                read_up_to(open.writer.get_mut(), &mut data[..count * element_size]) / element_size
            }
            None => 0,
        }
    }

    /// Write whole elements of `element_size` bytes from `data`.
    ///
    /// Same sentinel rules as [`IoFile::read_elements`], with writability in
    /// place of readability.
    pub fn write_elements(&mut self, data: &[u8], element_size: usize) -> usize {
        let Some(open) = self.file.as_mut() else {
            return usize::MAX;
        };

        let count = data.len().checked_div(element_size).unwrap_or(0);
        if count == 0 {
            return 0;
        }
        if !open.mode.is_writable() {
            error!("Write on a handle not opened for writing");
            return 0;
        }

        write_up_to(&mut open.writer, &data[..count * element_size]) / element_size
    }

    pub fn read_bytes(&mut self, data: &mut [u8]) -> usize {
        self.read_elements(data, 1)
    }

    pub fn write_bytes(&mut self, data: &[u8]) -> usize {
        self.write_elements(data, 1)
    }

    pub fn write_string(&mut self, text: &str) -> usize {
        self.write_bytes(text.as_bytes())
    }

    /// Truncate or zero-extend the file to exactly `size` bytes
    pub fn resize(&mut self, size: u64) -> bool {
        let Some(open) = self.synced() else {
            return false;
        };

        match open.writer.get_ref().set_len(size) {
            Ok(()) => true,
            Err(e) => {
                error!("Resize to {} bytes failed: {}", size, e);
                false
            }
        }
    }

    /// Move the open file out, leaving this handle closed
    pub fn take(&mut self) -> IoFile {
        mem::take(self)
    }

    pub fn swap(&mut self, other: &mut IoFile) {
        mem::swap(&mut self.file, &mut other.file);
    }
}

impl Drop for IoFile {
    fn drop(&mut self) {
        self.close();
    }
}
