//! Filesystem access
//!
//! Staging and reclaiming go through the [`FileSystem`] trait so the gate and
//! deletion logic can be tested without touching a disk. [`OsFs`] is the real
//! implementation; [`MemoryFs`] is an in-memory fake.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Kind of a filesystem entry, as seen without following symlinks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
    Symlink,
}

/// A path found while listing or walking a directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub path: PathBuf,
    pub kind: EntryKind,
}

/// Operations the stager and reclaimer need from a filesystem
pub trait FileSystem {
    /// True if `path` exists, following symlinks.
    fn exists(&self, path: &Path) -> bool;

    /// Kind of the entry at `path` without following symlinks, `None` if absent.
    fn entry_kind(&self, path: &Path) -> Option<EntryKind>;

    /// Copy a file's bytes, returning the number of bytes copied.
    fn copy(&self, from: &Path, to: &Path) -> io::Result<u64>;

    /// Create `path` and every missing ancestor.
    fn make_dirs(&self, path: &Path) -> io::Result<()>;

    /// Remove a file or a symlink (never its target).
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Remove a directory and everything below it without following symlinks.
    fn remove_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Direct children of `path`, sorted by path.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<Entry>>;

    /// Every entry below `root` (excluding `root`), parents before children.
    /// Symlinked directories are reported but never descended into; entries
    /// that cannot be read are skipped.
    fn walk(&self, root: &Path) -> Vec<Entry>;

    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;
}

/// The real filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFs;

fn kind_of(file_type: fs::FileType) -> EntryKind {
    if file_type.is_symlink() {
        EntryKind::Symlink
    } else if file_type.is_dir() {
        EntryKind::Dir
    } else {
        EntryKind::File
    }
}

impl FileSystem for OsFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn entry_kind(&self, path: &Path) -> Option<EntryKind> {
        fs::symlink_metadata(path)
            .ok()
            .map(|metadata| kind_of(metadata.file_type()))
    }

    fn copy(&self, from: &Path, to: &Path) -> io::Result<u64> {
        fs::copy(from, to)
    }

    fn make_dirs(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        match fs::remove_file(path) {
            // Directory symlinks on Windows are removed with remove_dir
            Err(err) if cfg!(windows) && path.is_dir() => fs::remove_dir(path).map_err(|_| err),
            result => result,
        }
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir_all(path)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<Entry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            entries.push(Entry {
                path: entry.path(),
                kind: kind_of(entry.file_type()?),
            });
        }
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    fn walk(&self, root: &Path) -> Vec<Entry> {
        WalkDir::new(root)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(err) => {
                    crate::debug!("skipping unreadable entry below {}: {err}", root.display());
                    None
                }
            })
            .map(|entry| Entry {
                kind: kind_of(entry.file_type()),
                path: entry.into_path(),
            })
            .collect()
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        fs::write(path, contents)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    File(Vec<u8>),
    Dir,
    Symlink(PathBuf),
}

/// In-memory filesystem
///
/// Paths are compared lexically, so tests should use one absolute prefix
/// throughout (e.g. `/project`). Removal of individual paths can be denied to
/// exercise permission failures.
#[derive(Debug, Default)]
pub struct MemoryFs {
    nodes: RefCell<BTreeMap<PathBuf, Node>>,
    denied: RefCell<BTreeSet<PathBuf>>,
    copies: Cell<usize>,
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("no such file or directory: {}", path.display()),
    )
}

fn insert_parents(nodes: &mut BTreeMap<PathBuf, Node>, path: &Path) {
    for ancestor in path.ancestors().skip(1) {
        if ancestor.as_os_str().is_empty() {
            break;
        }
        nodes.entry(ancestor.to_path_buf()).or_insert(Node::Dir);
    }
}

impl MemoryFs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, creating its parent directories.
    pub fn add_file(&self, path: impl AsRef<Path>, contents: impl Into<Vec<u8>>) {
        let path = path.as_ref();
        let mut nodes = self.nodes.borrow_mut();
        insert_parents(&mut nodes, path);
        nodes.insert(path.to_path_buf(), Node::File(contents.into()));
    }

    /// Add a directory and its ancestors.
    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let mut nodes = self.nodes.borrow_mut();
        insert_parents(&mut nodes, path);
        nodes.insert(path.to_path_buf(), Node::Dir);
    }

    /// Add a symlink at `path` pointing to `target`.
    pub fn add_symlink(&self, path: impl AsRef<Path>, target: impl AsRef<Path>) {
        let path = path.as_ref();
        let mut nodes = self.nodes.borrow_mut();
        insert_parents(&mut nodes, path);
        nodes.insert(path.to_path_buf(), Node::Symlink(target.as_ref().to_path_buf()));
    }

    /// Make every later removal of `path` fail with `PermissionDenied`.
    pub fn deny_removal(&self, path: impl AsRef<Path>) {
        self.denied.borrow_mut().insert(path.as_ref().to_path_buf());
    }

    /// Contents of the file at `path`, if it is a file.
    pub fn file_contents(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        match self.nodes.borrow().get(path.as_ref()) {
            Some(Node::File(bytes)) => Some(bytes.clone()),
            _ => None,
        }
    }

    /// Number of successful `copy` calls so far.
    pub fn copy_count(&self) -> usize {
        self.copies.get()
    }

    /// Every path currently present, sorted.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.nodes.borrow().keys().cloned().collect()
    }

    fn check_removal(&self, path: &Path) -> io::Result<()> {
        if self.denied.borrow().contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("permission denied: {}", path.display()),
            ));
        }
        Ok(())
    }

    fn resolved(&self, path: &Path) -> Option<Node> {
        let nodes = self.nodes.borrow();
        match nodes.get(path)? {
            Node::Symlink(target) => nodes.get(target).cloned(),
            node => Some(node.clone()),
        }
    }

    fn parent_is_dir(&self, path: &Path) -> bool {
        path.parent()
            .is_none_or(|parent| matches!(self.resolved(parent), Some(Node::Dir)))
    }
}

impl FileSystem for MemoryFs {
    fn exists(&self, path: &Path) -> bool {
        self.resolved(path).is_some()
    }

    fn entry_kind(&self, path: &Path) -> Option<EntryKind> {
        let kind = match self.nodes.borrow().get(path)? {
            Node::File(_) => EntryKind::File,
            Node::Dir => EntryKind::Dir,
            Node::Symlink(_) => EntryKind::Symlink,
        };
        Some(kind)
    }

    fn copy(&self, from: &Path, to: &Path) -> io::Result<u64> {
        let Some(Node::File(bytes)) = self.resolved(from) else {
            return Err(not_found(from));
        };
        if !self.parent_is_dir(to) {
            return Err(not_found(to));
        }
        let len = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
        self.nodes
            .borrow_mut()
            .insert(to.to_path_buf(), Node::File(bytes));
        self.copies.set(self.copies.get() + 1);
        Ok(len)
    }

    fn make_dirs(&self, path: &Path) -> io::Result<()> {
        if let Some(Node::File(_)) = self.resolved(path) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("file exists: {}", path.display()),
            ));
        }
        self.add_dir(path);
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        self.check_removal(path)?;
        match self.entry_kind(path) {
            Some(EntryKind::File | EntryKind::Symlink) => {
                self.nodes.borrow_mut().remove(path);
                Ok(())
            }
            Some(EntryKind::Dir) => Err(io::Error::other(format!(
                "is a directory: {}",
                path.display()
            ))),
            None => Err(not_found(path)),
        }
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        self.check_removal(path)?;
        match self.entry_kind(path) {
            Some(EntryKind::Dir) => {
                self.nodes
                    .borrow_mut()
                    .retain(|candidate, _| !candidate.starts_with(path));
                Ok(())
            }
            Some(_) => Err(io::Error::other(format!(
                "not a directory: {}",
                path.display()
            ))),
            None => Err(not_found(path)),
        }
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<Entry>> {
        if !matches!(self.nodes.borrow().get(path), Some(Node::Dir)) {
            return Err(not_found(path));
        }
        Ok(self
            .walk(path)
            .into_iter()
            .filter(|entry| entry.path.parent() == Some(path))
            .collect())
    }

    fn walk(&self, root: &Path) -> Vec<Entry> {
        self.nodes
            .borrow()
            .iter()
            .filter(|(path, _)| path.starts_with(root) && path.as_path() != root)
            .map(|(path, node)| Entry {
                path: path.clone(),
                kind: match node {
                    Node::File(_) => EntryKind::File,
                    Node::Dir => EntryKind::Dir,
                    Node::Symlink(_) => EntryKind::Symlink,
                },
            })
            .collect()
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        match self.resolved(path) {
            Some(Node::File(bytes)) => String::from_utf8(bytes)
                .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err)),
            _ => Err(not_found(path)),
        }
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        if !self.parent_is_dir(path) {
            return Err(not_found(path));
        }
        self.nodes
            .borrow_mut()
            .insert(path.to_path_buf(), Node::File(contents.to_vec()));
        Ok(())
    }
}
