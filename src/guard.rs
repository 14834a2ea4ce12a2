//! Refuses to let oversized files into the project tree. The tree is usually
//! committed to a storage backend that rejects single files over 100 MiB.

use std::fmt;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Walks everything under `root` and fails on the first regular file larger
/// than `max_size` bytes. Symlinks are not followed.
pub fn check_file_sizes(root: &Path, max_size: u64) -> Result<()> {
    for result in WalkDir::new(root) {
        let entry = result?;
        if !entry.file_type().is_file() {
            continue;
        }
        let size = entry.metadata()?.len();
        if size > max_size {
            return Err(Error::TooLarge {
                path: entry.into_path(),
                size,
                max_size,
            });
        }
    }
    Ok(())
}

/// The result of a size check.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a failed size check.
#[derive(Debug)]
pub enum Error {
    /// Returned when a file exceeds the limit.
    TooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    /// Returned for I/O errors while walking the tree.
    WalkDir(walkdir::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::TooLarge {
                path,
                size,
                max_size,
            } => write!(
                f,
                "File too large for Git: '{}' is {} bytes, over the {} byte limit",
                path.display(),
                size,
                max_size
            ),
            Error::WalkDir(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::TooLarge { .. } => None,
            Error::WalkDir(err) => Some(err),
        }
    }
}

impl From<walkdir::Error> for Error {
    /// Converts a [`walkdir::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator while walking.
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}
