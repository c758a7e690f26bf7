//! Error type for the explicit-result filesystem calls

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from the `try_*` operations (`Io`) and from parsing an
/// [`crate::OpenMode`] (`InvalidMode`)
#[derive(Error, Debug)]
pub enum FsError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid open mode: {0:?}")]
    InvalidMode(String),
}

impl FsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        FsError::Io {
            path: path.into(),
            source,
        }
    }

    /// Underlying OS error kind, if this is an I/O failure
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            FsError::Io { source, .. } => Some(source.kind()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, FsError>;
