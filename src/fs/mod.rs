//! Storage backends
//!
//! Every backend supports the basic capability set (enumerate, mkdir,
//! create/truncate, remove). Only backends that return `Some` from
//! [`Filesystem::as_symlink`] additionally support creating and reading
//! symbolic links; `use` and `current` fail with
//! [`Error::SymlinkUnsupported`](crate::Error::SymlinkUnsupported) otherwise.

mod mem;
mod os;

pub use mem::MemFs;
pub use os::OsFs;

use crate::error::Result;
use std::io::Write;
use std::path::{Path, PathBuf};

/// One immediate child of a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    /// True for real directories. Symlinks are never reported as directories.
    pub is_dir: bool,
}

pub trait Filesystem {
    /// Short backend name used in error messages.
    fn name(&self) -> &'static str;

    /// Immediate children of `path`, in the backend's native order.
    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>>;

    /// Create `path` and missing ancestors. Existing directories are fine.
    fn create_dir_all(&self, path: &Path, mode: u32) -> Result<()>;

    /// Create or truncate a file for writing.
    fn create_file<'a>(&'a self, path: &Path, mode: u32) -> Result<Box<dyn Write + 'a>>;

    /// Remove a file, symlink or empty directory.
    fn remove(&self, path: &Path) -> Result<()>;

    /// The symlink capability, if this backend has it.
    fn as_symlink(&self) -> Option<&dyn SymlinkFs> {
        None
    }
}

/// Extended capability: real symbolic links.
pub trait SymlinkFs {
    /// Create `link` pointing at `original`.
    fn symlink(&self, original: &Path, link: &Path) -> Result<()>;

    /// Read the target `link` points at.
    fn read_link(&self, link: &Path) -> Result<PathBuf>;
}
