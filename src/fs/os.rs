use super::{DirEntry, Filesystem, SymlinkFs};
use crate::error::{Error, Result};
use std::fs::{self, DirBuilder, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// The host operating system's filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFs;

impl OsFs {
    pub fn new() -> Self {
        OsFs
    }
}

impl Filesystem for OsFs {
    fn name(&self) -> &'static str {
        "os"
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path).map_err(|e| Error::io(path, e))? {
            let entry = entry.map_err(|e| Error::io(path, e))?;
            // file_type() does not follow symlinks
            let file_type = entry.file_type().map_err(|e| Error::io(entry.path(), e))?;
            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_dir: file_type.is_dir(),
            });
        }
        Ok(entries)
    }

    fn create_dir_all(&self, path: &Path, mode: u32) -> Result<()> {
        let mut builder = DirBuilder::new();
        builder.recursive(true);
        set_dir_mode(&mut builder, mode);
        builder.create(path).map_err(|e| Error::io(path, e))
    }

    fn create_file<'a>(&'a self, path: &Path, mode: u32) -> Result<Box<dyn Write + 'a>> {
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        set_file_mode(&mut options, mode);
        let file = options.open(path).map_err(|e| Error::io(path, e))?;
        Ok(Box::new(file))
    }

    fn remove(&self, path: &Path) -> Result<()> {
        let md = fs::symlink_metadata(path).map_err(|e| Error::io(path, e))?;
        if md.is_dir() {
            fs::remove_dir(path).map_err(|e| Error::io(path, e))
        } else {
            fs::remove_file(path).map_err(|e| Error::io(path, e))
        }
    }

    fn as_symlink(&self) -> Option<&dyn SymlinkFs> {
        Some(self)
    }
}

impl SymlinkFs for OsFs {
    fn symlink(&self, original: &Path, link: &Path) -> Result<()> {
        os_symlink(original, link).map_err(|e| Error::io(link, e))
    }

    fn read_link(&self, link: &Path) -> Result<PathBuf> {
        fs::read_link(link).map_err(|e| Error::io(link, e))
    }
}

#[cfg(unix)]
fn set_dir_mode(builder: &mut DirBuilder, mode: u32) {
    use std::os::unix::fs::DirBuilderExt;
    builder.mode(mode);
}

#[cfg(not(unix))]
fn set_dir_mode(_builder: &mut DirBuilder, _mode: u32) {}

#[cfg(unix)]
fn set_file_mode(options: &mut OpenOptions, mode: u32) {
    use std::os::unix::fs::OpenOptionsExt;
    options.mode(mode);
}

#[cfg(not(unix))]
fn set_file_mode(_options: &mut OpenOptions, _mode: u32) {}

#[cfg(unix)]
fn os_symlink(original: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(original, link)
}

#[cfg(windows)]
fn os_symlink(original: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_dir(original, link)
}

#[cfg(not(any(unix, windows)))]
fn os_symlink(_original: &Path, _link: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "symlinks are not supported on this platform",
    ))
}
