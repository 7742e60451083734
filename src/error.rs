//! Error types shared by every command.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while managing Go SDKs.
#[derive(Error, Debug)]
pub enum Error {
    #[error(
        "provided wrong number of argument for subcommand '{subcommand}'; expected={expected}; provided={provided}"
    )]
    Usage {
        subcommand: String,
        expected: usize,
        provided: usize,
    },

    #[error("version must not be empty")]
    EmptyVersion,

    #[error("symbolic links are not supported by the {backend} storage backend")]
    SymlinkUnsupported { backend: &'static str },

    #[error("failed downloading go sdk {version} from the remote server {host}: {cause}")]
    Download {
        version: String,
        host: String,
        cause: String,
    },

    #[error("corrupt archive: {0}")]
    CorruptArchive(String),

    #[error("archive contains unsafe path: {}", .0.display())]
    UnsafeEntryPath(PathBuf),

    #[error("failed to extract {}: {source}", path.display())]
    Extract {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write output: {0}")]
    Output(#[source] io::Error),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// True when the error is an I/O failure caused by a missing path.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Io { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
