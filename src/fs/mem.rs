use super::{DirEntry, Filesystem};
use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone)]
enum Node {
    Dir { mode: u32 },
    File { mode: u32, data: Arc<Mutex<Vec<u8>>> },
}

/// In-memory backend without symlink support.
///
/// Paths are used as given; callers are expected to pass absolute paths.
#[derive(Debug, Default)]
pub struct MemFs {
    nodes: Mutex<BTreeMap<PathBuf, Node>>,
}

impl MemFs {
    pub fn new() -> Self {
        Self::default()
    }

    fn nodes(&self) -> MutexGuard<'_, BTreeMap<PathBuf, Node>> {
        self.nodes.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Contents of a regular file, if one exists at `path`.
    pub fn read(&self, path: &Path) -> Option<Vec<u8>> {
        match self.nodes().get(path)? {
            Node::File { data, .. } => Some(lock(data).clone()),
            Node::Dir { .. } => None,
        }
    }

    /// Permission bits recorded for `path`.
    pub fn mode(&self, path: &Path) -> Option<u32> {
        self.nodes().get(path).map(|node| match node {
            Node::Dir { mode } | Node::File { mode, .. } => *mode,
        })
    }

    pub fn is_dir(&self, path: &Path) -> bool {
        is_root(path) || matches!(self.nodes().get(path), Some(Node::Dir { .. }))
    }
}

fn is_root(path: &Path) -> bool {
    path.parent().is_none()
}

fn lock(data: &Mutex<Vec<u8>>) -> MutexGuard<'_, Vec<u8>> {
    data.lock().unwrap_or_else(|e| e.into_inner())
}

fn not_found(path: &Path) -> Error {
    Error::io(path, io::Error::from(io::ErrorKind::NotFound))
}

fn not_a_directory(path: &Path) -> Error {
    Error::io(path, io::Error::other("not a directory"))
}

impl Filesystem for MemFs {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        let nodes = self.nodes();
        if !is_root(path) {
            match nodes.get(path) {
                Some(Node::Dir { .. }) => {}
                Some(Node::File { .. }) => return Err(not_a_directory(path)),
                None => return Err(not_found(path)),
            }
        }
        Ok(nodes
            .iter()
            .filter(|(p, _)| p.parent() == Some(path))
            .filter_map(|(p, node)| {
                let name = p.file_name()?.to_string_lossy().into_owned();
                Some(DirEntry {
                    name,
                    is_dir: matches!(node, Node::Dir { .. }),
                })
            })
            .collect())
    }

    fn create_dir_all(&self, path: &Path, mode: u32) -> Result<()> {
        let mut nodes = self.nodes();
        let mut missing: Vec<&Path> = Vec::new();
        for ancestor in path.ancestors() {
            if is_root(ancestor) || ancestor.as_os_str().is_empty() {
                break;
            }
            match nodes.get(ancestor) {
                Some(Node::Dir { .. }) => break,
                Some(Node::File { .. }) => return Err(not_a_directory(ancestor)),
                None => missing.push(ancestor),
            }
        }
        for dir in missing.into_iter().rev() {
            nodes.insert(dir.to_path_buf(), Node::Dir { mode });
        }
        Ok(())
    }

    fn create_file<'a>(&'a self, path: &Path, mode: u32) -> Result<Box<dyn Write + 'a>> {
        let mut nodes = self.nodes();
        if let Some(parent) = path.parent()
            && !is_root(parent)
            && !parent.as_os_str().is_empty()
        {
            match nodes.get(parent) {
                Some(Node::Dir { .. }) => {}
                Some(Node::File { .. }) => return Err(not_a_directory(parent)),
                None => return Err(not_found(parent)),
            }
        }
        let data = match nodes.get(path) {
            Some(Node::Dir { .. }) => {
                return Err(Error::io(path, io::Error::other("is a directory")));
            }
            // Truncate in place; the existing mode is kept like open(2) does
            Some(Node::File { data, .. }) => {
                lock(data).clear();
                Arc::clone(data)
            }
            None => {
                let data = Arc::new(Mutex::new(Vec::new()));
                nodes.insert(
                    path.to_path_buf(),
                    Node::File {
                        mode,
                        data: Arc::clone(&data),
                    },
                );
                data
            }
        };
        Ok(Box::new(MemWriter { data }))
    }

    fn remove(&self, path: &Path) -> Result<()> {
        let mut nodes = self.nodes();
        let is_dir = match nodes.get(path) {
            None => return Err(not_found(path)),
            Some(node) => matches!(node, Node::Dir { .. }),
        };
        if is_dir && nodes.keys().any(|p| p.parent() == Some(path)) {
            return Err(Error::io(path, io::Error::other("directory not empty")));
        }
        nodes.remove(path);
        Ok(())
    }
}

struct MemWriter {
    data: Arc<Mutex<Vec<u8>>>,
}

impl Write for MemWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        lock(&self.data).extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
